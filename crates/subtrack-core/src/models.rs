//! Data models for the billing projection engine
//!
//! Two kinds of types live here:
//! - Externally-owned records (`Subscription`, `HistoryEntry`) read from a
//!   snapshot and never mutated by the engine.
//! - Derived structures (`Occurrence`, aggregates, reports, timelines) built
//!   fresh on every query and discarded after the response is produced.
//!
//! Records serialize with camelCase field names to match the snapshot
//! store's JSON and keep exports reproducible.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ========== Subscription Records ==========

/// Billing cadence for a subscription.
///
/// The set of cycle strings in stored data is open: anything other than the
/// four known cadences is preserved as `Other` and rejected at expansion
/// time rather than silently defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BillingCycle {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    /// Unrecognized cadence string, kept verbatim
    Other(String),
}

impl BillingCycle {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for BillingCycle {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            "quarterly" => Self::Quarterly,
            "yearly" => Self::Yearly,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for BillingCycle {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<BillingCycle> for String {
    fn from(cycle: BillingCycle) -> Self {
        cycle.as_str().to_string()
    }
}

/// A tracked subscription as stored by the surrounding CRUD layer.
///
/// The engine treats this as immutable input for a given snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub name: String,
    /// Free-form category label ("Entertainment", "Productivity", ...).
    /// Aggregation must not assume an exhaustive set.
    pub category: String,
    pub cost: f64,
    pub billing_cycle: BillingCycle,
    /// Next concrete billing date as of snapshot time; also the anchor that
    /// seeds recurrence expansion.
    pub next_billing_date: NaiveDate,
    pub is_active: bool,
    /// When set, `next_billing_date` marks trial-end, not a paid charge.
    #[serde(default)]
    pub is_trial: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_days: Option<u32>,
    pub created_at: DateTime<Utc>,
}

// ========== History Records ==========

/// Lifecycle action recorded in the append-only history log.
///
/// The action set is open: unrecognized strings are preserved as `Other`
/// and render generically in timelines instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HistoryAction {
    Created,
    Updated,
    Deleted,
    PaymentSuccess,
    PaymentFailed,
    CostChanged,
    Renewal,
    Pause,
    Resume,
    Cancel,
    Refund,
    TrialStart,
    TrialEnd,
    Other(String),
}

impl HistoryAction {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::PaymentSuccess => "payment_success",
            Self::PaymentFailed => "payment_failed",
            Self::CostChanged => "cost_changed",
            Self::Renewal => "renewal",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Cancel => "cancel",
            Self::Refund => "refund",
            Self::TrialStart => "trial_start",
            Self::TrialEnd => "trial_end",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for HistoryAction {
    fn from(s: String) -> Self {
        match s.as_str() {
            "created" => Self::Created,
            "updated" => Self::Updated,
            "deleted" => Self::Deleted,
            "payment_success" => Self::PaymentSuccess,
            "payment_failed" => Self::PaymentFailed,
            "cost_changed" => Self::CostChanged,
            "renewal" => Self::Renewal,
            "pause" => Self::Pause,
            "resume" => Self::Resume,
            "cancel" => Self::Cancel,
            "refund" => Self::Refund,
            "trial_start" => Self::TrialStart,
            "trial_end" => Self::TrialEnd,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for HistoryAction {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<HistoryAction> for String {
    fn from(action: HistoryAction) -> Self {
        action.as_str().to_string()
    }
}

/// One entry in the append-only subscription history log.
///
/// Immutable once produced; the timeline builder reorders and groups but
/// never edits `action`, `old_value`, or `new_value`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub subscription_id: String,
    pub subscription_name: String,
    pub action: HistoryAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ========== Derived: Occurrences ==========

/// One predicted future billing event, derived and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub subscription_id: String,
    pub subscription_name: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub is_trial: bool,
}

// ========== Skipped Records ==========

/// Why a subscription was excluded from a computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SkipReason {
    /// Cost is NaN or infinite
    NonFiniteCost,
    /// Cost is below zero
    NegativeCost,
    /// Billing cycle string is not one of the known cadences
    UnrecognizedCycle { cycle: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteCost => write!(f, "cost is not a finite number"),
            Self::NegativeCost => write!(f, "cost is negative"),
            Self::UnrecognizedCycle { cycle } => {
                write!(f, "unrecognized billing cycle \"{}\"", cycle)
            }
        }
    }
}

/// Non-fatal advisory attached to results when a record is excluded.
///
/// One bad record must not blank the dashboard; callers surface these to
/// the user instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRecord {
    pub subscription_id: String,
    pub subscription_name: String,
    pub reason: SkipReason,
}

// ========== Derived: Category Breakdown ==========

/// Per-category rollup of active, non-trial subscriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAggregate {
    pub category: String,
    pub count: usize,
    pub total_monthly_cost: f64,
    pub total_yearly_cost: f64,
    /// Share of the grand monthly total, 0-100
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    /// Sorted by monthly total descending, ties by category name
    pub categories: Vec<CategoryAggregate>,
    pub total_monthly_cost: f64,
    pub total_yearly_cost: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRecord>,
}

// ========== Derived: Monthly Projection ==========

/// Projected spend for one calendar month in the horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthProjection {
    /// Sortable year+month key, e.g. "2024-06"
    pub month_key: String,
    /// Human label, e.g. "June 2024"
    pub month_label: String,
    pub total_amount: f64,
    /// True when this month's total exceeds the mean across all buckets
    pub above_average: bool,
    pub occurrences: Vec<Occurrence>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionReport {
    pub horizon_months: u32,
    /// Chronological month buckets covering the horizon
    pub months: Vec<MonthProjection>,
    pub average_month_total: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRecord>,
}

/// One entry in the peak-months ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakMonth {
    /// 1-based position; highest spend first
    pub rank: usize,
    pub month_key: String,
    pub month_label: String,
    pub total_amount: f64,
    pub above_average: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakMonthsReport {
    /// Descending by total; ties broken by earliest month
    pub months: Vec<PeakMonth>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRecord>,
}

// ========== Derived: Historical Trends ==========

/// Actual (backward-looking) activity folded from history for one month.
///
/// Distinct from `MonthProjection`, which is forward-looking; the two are
/// never conflated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub month_key: String,
    pub month_label: String,
    pub renewal_count: u64,
    /// `cancel` plus `deleted` events
    pub cancellation_count: u64,
    pub payment_count: u64,
    /// Sum of recorded successful payment amounts
    pub amount_paid: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsReport {
    /// Chronological, one point per month with recorded activity
    pub points: Vec<TrendPoint>,
}

// ========== Derived: Payment Calendar ==========

/// One dated entry on the payment calendar.
///
/// Unlike `Occurrence`, calendar entries also cover inactive subscriptions
/// (a single informational entry at the stored anchor date) and carry the
/// active flag so renderers can distinguish them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub subscription_id: String,
    pub subscription_name: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub is_trial: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonth {
    pub month_key: String,
    pub month_label: String,
    /// Events sorted by date, then subscription name
    pub events: Vec<CalendarEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCalendar {
    pub months: Vec<CalendarMonth>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRecord>,
}

// ========== Derived: Upcoming Renewals ==========

/// Renewals due within a short look-ahead window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingRenewals {
    pub window_days: i64,
    /// Sorted by date, then subscription name
    pub items: Vec<Occurrence>,
    /// Sum of non-trial amounts due in the window
    pub total_due: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRecord>,
}

// ========== Derived: Timeline ==========

/// Inclusive time-range predicate for timeline filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeRange {
    Today,
    ThisWeek,
    ThisMonth,
    #[default]
    All,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::ThisWeek => "thisWeek",
            Self::ThisMonth => "thisMonth",
            Self::All => "all",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "thisweek" | "this-week" | "week" => Ok(Self::ThisWeek),
            "thismonth" | "this-month" | "month" => Ok(Self::ThisMonth),
            "all" => Ok(Self::All),
            _ => Err(format!("Unknown time range: {}", s)),
        }
    }
}

/// Timeline filter; all parts optional, composed with AND semantics.
#[derive(Debug, Clone, Default)]
pub struct TimelineFilter {
    /// Case-insensitive substring match on subscription name or action
    pub search_term: Option<String>,
    /// Exact action match
    pub action: Option<HistoryAction>,
    pub time_range: TimeRange,
}

/// A history entry annotated with its rendered description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    #[serde(flatten)]
    pub entry: HistoryEntry,
    pub description: String,
}

/// Entries under one relative-date bucket ("Today", "June 2023", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineGroup {
    pub label: String,
    /// Newest first
    pub entries: Vec<TimelineEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCount {
    pub action: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionActivity {
    pub subscription_name: String,
    pub event_count: u64,
}

/// Analytics computed over the filtered entry set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineAnalytics {
    pub total_events: u64,
    /// Sorted by action name for stable output
    pub action_counts: Vec<ActionCount>,
    /// Top 5 by event count descending, ties by name ascending
    pub most_active: Vec<SubscriptionActivity>,
    pub events_last_30_days: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedTimeline {
    /// Most recent bucket first
    pub groups: Vec<TimelineGroup>,
    pub analytics: TimelineAnalytics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_billing_cycle_round_trip() {
        assert_eq!(BillingCycle::from("Monthly"), BillingCycle::Monthly);
        assert_eq!(BillingCycle::from("weekly").as_str(), "weekly");

        let odd = BillingCycle::from("fortnightly");
        assert_eq!(odd, BillingCycle::Other("fortnightly".to_string()));
        assert_eq!(String::from(odd), "fortnightly");
    }

    #[test]
    fn test_history_action_open_set() {
        assert_eq!(
            HistoryAction::from("payment_success"),
            HistoryAction::PaymentSuccess
        );

        let unknown = HistoryAction::from("chargeback");
        assert_eq!(unknown.as_str(), "chargeback");
        // Survives a serde round-trip verbatim
        let json = serde_json::to_string(&unknown).unwrap();
        assert_eq!(json, "\"chargeback\"");
        let back: HistoryAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, unknown);
    }

    #[test]
    fn test_time_range_parsing() {
        assert_eq!(TimeRange::from_str("thisWeek").unwrap(), TimeRange::ThisWeek);
        assert_eq!(TimeRange::from_str("this-month").unwrap(), TimeRange::ThisMonth);
        assert!(TimeRange::from_str("fortnight").is_err());
    }

    #[test]
    fn test_subscription_camel_case_fields() {
        let json = r#"{
            "id": "sub-1",
            "name": "Netflix",
            "category": "Entertainment",
            "cost": 15.99,
            "billingCycle": "monthly",
            "nextBillingDate": "2024-06-15",
            "isActive": true,
            "createdAt": "2023-01-01T00:00:00Z"
        }"#;
        let sub: Subscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.billing_cycle, BillingCycle::Monthly);
        assert!(!sub.is_trial);
        assert_eq!(sub.next_billing_date.to_string(), "2024-06-15");
    }
}
