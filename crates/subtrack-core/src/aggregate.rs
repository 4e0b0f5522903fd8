//! Aggregation over occurrences and history
//!
//! Builds the derived dashboard views: category breakdowns, forward-looking
//! monthly projections with peak-month rankings, and backward-looking trends
//! folded from the history log. The projection and trends views answer
//! different questions (what *will* be charged vs. what *was* charged) and
//! are kept strictly apart.
//!
//! Failure policy: a malformed record is excluded and reported as a
//! `SkippedRecord` advisory; it never aborts the whole computation. Empty
//! input yields zeroed structures, not errors.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::calendar;
use crate::error::Error;
use crate::models::*;
use crate::normalize;
use crate::occurrence;

/// Cost sanity check applied at every per-record boundary.
fn cost_skip_reason(sub: &Subscription) -> Option<SkipReason> {
    if !sub.cost.is_finite() {
        Some(SkipReason::NonFiniteCost)
    } else if sub.cost < 0.0 {
        Some(SkipReason::NegativeCost)
    } else {
        None
    }
}

/// Map a per-record engine error to a skip advisory, if it is one of the
/// record-level failures.
fn skip_reason_for(err: &Error) -> Option<SkipReason> {
    match err {
        Error::UnrecognizedCycle { cycle, .. } => Some(SkipReason::UnrecognizedCycle {
            cycle: cycle.clone(),
        }),
        _ => None,
    }
}

fn skip(skipped: &mut Vec<SkippedRecord>, sub: &Subscription, reason: SkipReason) {
    tracing::warn!(
        subscription = %sub.id,
        reason = %reason,
        "Excluding subscription from aggregation"
    );
    skipped.push(SkippedRecord {
        subscription_id: sub.id.clone(),
        subscription_name: sub.name.clone(),
        reason,
    });
}

// ========== Category Breakdown ==========

/// Group active, non-trial subscriptions by category with normalized
/// monthly/yearly totals and percentage shares.
///
/// The grand total equals the sum of every included subscription's
/// normalized monthly cost, so the per-category figures always close over
/// the subscription set.
pub fn category_breakdown(subscriptions: &[Subscription]) -> CategoryBreakdown {
    let mut skipped = Vec::new();
    let mut groups: BTreeMap<String, (usize, f64)> = BTreeMap::new();

    for sub in subscriptions.iter().filter(|s| s.is_active && !s.is_trial) {
        if let Some(reason) = cost_skip_reason(sub) {
            skip(&mut skipped, sub, reason);
            continue;
        }
        let monthly = match normalize::monthly_equivalent(sub) {
            Ok(monthly) => monthly,
            Err(err) => {
                if let Some(reason) = skip_reason_for(&err) {
                    skip(&mut skipped, sub, reason);
                }
                continue;
            }
        };
        let entry = groups.entry(sub.category.clone()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += monthly;
    }

    let total_monthly: f64 = groups.values().map(|(_, monthly)| monthly).sum();

    let mut categories: Vec<CategoryAggregate> = groups
        .into_iter()
        .map(|(category, (count, monthly))| CategoryAggregate {
            category,
            count,
            total_monthly_cost: monthly,
            total_yearly_cost: monthly * 12.0,
            percentage: if total_monthly > 0.0 {
                (monthly / total_monthly) * 100.0
            } else {
                0.0
            },
        })
        .collect();

    // Largest spend first; stable on equal totals via category name
    categories.sort_by(|a, b| {
        b.total_monthly_cost
            .partial_cmp(&a.total_monthly_cost)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });

    tracing::debug!(
        categories = categories.len(),
        skipped = skipped.len(),
        "Category breakdown complete"
    );

    CategoryBreakdown {
        categories,
        total_monthly_cost: total_monthly,
        total_yearly_cost: total_monthly * 12.0,
        skipped,
    }
}

// ========== Monthly Projection ==========

struct MonthBucket {
    first_of_month: NaiveDate,
    total: f64,
    occurrences: Vec<Occurrence>,
}

/// Bucket projected occurrences of active, non-trial subscriptions by
/// calendar month across the horizon.
///
/// Every month in the horizon gets a bucket even when nothing falls in it,
/// so averages and above-average flags are well-defined; an occurrence
/// landing in the horizon-end month past the seeded range still gets one.
pub fn monthly_projection(
    subscriptions: &[Subscription],
    today: NaiveDate,
    horizon_months: u32,
) -> ProjectionReport {
    let mut skipped = Vec::new();
    let mut buckets: BTreeMap<String, MonthBucket> = BTreeMap::new();

    let start = calendar::first_of_month(today);
    for offset in 0..horizon_months {
        let month = calendar::add_months(start, offset, 1);
        buckets.insert(
            calendar::month_key(month),
            MonthBucket {
                first_of_month: month,
                total: 0.0,
                occurrences: Vec::new(),
            },
        );
    }

    for sub in subscriptions.iter().filter(|s| s.is_active && !s.is_trial) {
        if let Some(reason) = cost_skip_reason(sub) {
            skip(&mut skipped, sub, reason);
            continue;
        }
        let occurrences = match occurrence::generate(sub, today, horizon_months) {
            Ok(occurrences) => occurrences,
            Err(err) => {
                if let Some(reason) = skip_reason_for(&err) {
                    skip(&mut skipped, sub, reason);
                }
                continue;
            }
        };
        for occ in occurrences {
            let bucket = buckets
                .entry(calendar::month_key(occ.date))
                .or_insert_with(|| MonthBucket {
                    first_of_month: calendar::first_of_month(occ.date),
                    total: 0.0,
                    occurrences: Vec::new(),
                });
            bucket.total += occ.amount;
            bucket.occurrences.push(occ);
        }
    }

    let bucket_count = buckets.len();
    let grand_total: f64 = buckets.values().map(|b| b.total).sum();
    let average = if bucket_count > 0 {
        grand_total / bucket_count as f64
    } else {
        0.0
    };

    // BTreeMap keys are "YYYY-MM", so iteration is already chronological
    let months: Vec<MonthProjection> = buckets
        .into_values()
        .map(|mut bucket| {
            bucket.occurrences.sort_by(|a, b| {
                a.date
                    .cmp(&b.date)
                    .then_with(|| a.subscription_name.cmp(&b.subscription_name))
            });
            MonthProjection {
                month_key: calendar::month_key(bucket.first_of_month),
                month_label: calendar::month_label(bucket.first_of_month),
                total_amount: bucket.total,
                above_average: bucket.total > average,
                occurrences: bucket.occurrences,
            }
        })
        .collect();

    ProjectionReport {
        horizon_months,
        months,
        average_month_total: average,
        skipped,
    }
}

/// Rank projection buckets by total spend, highest first; ties broken by
/// the earliest month.
pub fn peak_months(projection: &ProjectionReport) -> PeakMonthsReport {
    let mut ranked: Vec<&MonthProjection> = projection.months.iter().collect();
    ranked.sort_by(|a, b| {
        b.total_amount
            .partial_cmp(&a.total_amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.month_key.cmp(&b.month_key))
    });

    PeakMonthsReport {
        months: ranked
            .into_iter()
            .enumerate()
            .map(|(index, month)| PeakMonth {
                rank: index + 1,
                month_key: month.month_key.clone(),
                month_label: month.month_label.clone(),
                total_amount: month.total_amount,
                above_average: month.above_average,
            })
            .collect(),
        skipped: projection.skipped.clone(),
    }
}

// ========== Historical Trends ==========

/// Parse a recorded payment amount; tolerates a leading currency symbol.
fn parse_amount(value: Option<&str>) -> Option<f64> {
    value
        .map(|v| v.trim().trim_start_matches('$'))
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Fold the history log into per-month renewal/cancellation counts and
/// actual paid amounts.
///
/// This view is backward-looking; the monthly projection is forward-looking.
/// Months with none of the tracked actions produce no point.
pub fn spending_trends(history: &[HistoryEntry]) -> TrendsReport {
    let mut buckets: BTreeMap<String, (NaiveDate, TrendPoint)> = BTreeMap::new();

    for entry in history {
        let tracked = matches!(
            entry.action,
            HistoryAction::Renewal
                | HistoryAction::Cancel
                | HistoryAction::Deleted
                | HistoryAction::PaymentSuccess
        );
        if !tracked {
            continue;
        }

        let date = entry.created_at.date_naive();
        let key = calendar::month_key(date);
        let (_, point) = buckets.entry(key.clone()).or_insert_with(|| {
            let month = calendar::first_of_month(date);
            (
                month,
                TrendPoint {
                    month_key: key,
                    month_label: calendar::month_label(month),
                    renewal_count: 0,
                    cancellation_count: 0,
                    payment_count: 0,
                    amount_paid: 0.0,
                },
            )
        });

        match entry.action {
            HistoryAction::Renewal => point.renewal_count += 1,
            HistoryAction::Cancel | HistoryAction::Deleted => point.cancellation_count += 1,
            HistoryAction::PaymentSuccess => {
                point.payment_count += 1;
                // Amount travels in the entry's new value; an unparseable
                // amount still counts the payment event
                point.amount_paid += parse_amount(entry.new_value.as_deref()).unwrap_or(0.0);
            }
            _ => {}
        }
    }

    TrendsReport {
        points: buckets.into_values().map(|(_, point)| point).collect(),
    }
}

// ========== Payment Calendar ==========

/// Month-grouped calendar of upcoming billing events for display.
///
/// Unlike the spend projection this covers *all* subscriptions: active ones
/// contribute their full expansion (trial markers included), inactive ones a
/// single informational entry at their stored anchor date.
pub fn payment_calendar(
    subscriptions: &[Subscription],
    today: NaiveDate,
    horizon_months: u32,
) -> PaymentCalendar {
    let mut skipped = Vec::new();
    let mut buckets: BTreeMap<String, (NaiveDate, Vec<CalendarEvent>)> = BTreeMap::new();

    let start = calendar::first_of_month(today);
    for offset in 0..horizon_months {
        let month = calendar::add_months(start, offset, 1);
        buckets.insert(calendar::month_key(month), (month, Vec::new()));
    }

    fn push_event(
        buckets: &mut BTreeMap<String, (NaiveDate, Vec<CalendarEvent>)>,
        occ: Occurrence,
        is_active: bool,
    ) {
        let entry = buckets
            .entry(calendar::month_key(occ.date))
            .or_insert_with(|| (calendar::first_of_month(occ.date), Vec::new()));
        entry.1.push(CalendarEvent {
            subscription_id: occ.subscription_id,
            subscription_name: occ.subscription_name,
            date: occ.date,
            amount: occ.amount,
            is_trial: occ.is_trial,
            is_active,
        });
    }

    let end = calendar::horizon_end(today, horizon_months);
    for sub in subscriptions {
        if !sub.is_active {
            let occ = occurrence::informational(sub);
            if occ.date <= end {
                push_event(&mut buckets, occ, false);
            }
            continue;
        }
        match occurrence::generate(sub, today, horizon_months) {
            Ok(occurrences) => {
                for occ in occurrences {
                    push_event(&mut buckets, occ, true);
                }
            }
            Err(err) => {
                if let Some(reason) = skip_reason_for(&err) {
                    skip(&mut skipped, sub, reason);
                }
            }
        }
    }

    let months = buckets
        .into_values()
        .map(|(first, mut events)| {
            events.sort_by(|a, b| {
                a.date
                    .cmp(&b.date)
                    .then_with(|| a.subscription_name.cmp(&b.subscription_name))
            });
            CalendarMonth {
                month_key: calendar::month_key(first),
                month_label: calendar::month_label(first),
                events,
            }
        })
        .collect();

    PaymentCalendar { months, skipped }
}

// ========== Upcoming Renewals ==========

/// Active subscriptions billing within the next `window_days` days.
///
/// Trial markers appear in the item list but never in the amount due.
pub fn upcoming_renewals(
    subscriptions: &[Subscription],
    today: NaiveDate,
    window_days: i64,
) -> UpcomingRenewals {
    let mut skipped = Vec::new();
    let end = today + Duration::days(window_days);

    let mut items: Vec<Occurrence> = Vec::new();
    for sub in subscriptions.iter().filter(|s| s.is_active) {
        if let Some(reason) = cost_skip_reason(sub) {
            skip(&mut skipped, sub, reason);
            continue;
        }
        if sub.next_billing_date >= today && sub.next_billing_date <= end {
            items.push(occurrence::informational(sub));
        }
    }

    items.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.subscription_name.cmp(&b.subscription_name))
    });

    let total_due = items
        .iter()
        .filter(|item| !item.is_trial)
        .map(|item| item.amount)
        .sum();

    UpcomingRenewals {
        window_days,
        items,
        total_due,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{history_entry, subscription, trial, ts, with_values};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_breakdown_groups_and_percentages() {
        let subs = vec![
            subscription("s1", "Netflix", "Entertainment", 12.0, "monthly", "2024-07-01"),
            subscription("s2", "Hulu", "Entertainment", 6.0, "monthly", "2024-07-02"),
            subscription("s3", "Notion", "Productivity", 6.0, "monthly", "2024-07-03"),
        ];

        let breakdown = category_breakdown(&subs);
        assert_eq!(breakdown.categories.len(), 2);
        assert!((breakdown.total_monthly_cost - 24.0).abs() < 1e-9);

        let entertainment = &breakdown.categories[0];
        assert_eq!(entertainment.category, "Entertainment");
        assert_eq!(entertainment.count, 2);
        assert!((entertainment.percentage - 75.0).abs() < 1e-9);
        assert!((entertainment.total_yearly_cost - 216.0).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_excludes_trials_and_inactive() {
        let mut inactive_sub =
            subscription("s2", "Old", "Other", 99.0, "monthly", "2024-07-01");
        inactive_sub.is_active = false;

        let subs = vec![
            subscription("s1", "Netflix", "Entertainment", 12.0, "monthly", "2024-07-01"),
            inactive_sub,
            trial(
                subscription("s3", "Disney+", "Entertainment", 11.0, "monthly", "2024-07-10"),
                30,
            ),
        ];

        let breakdown = category_breakdown(&subs);
        assert!((breakdown.total_monthly_cost - 12.0).abs() < 1e-9);
        assert_eq!(breakdown.categories[0].count, 1);
    }

    #[test]
    fn test_breakdown_skips_bad_cost_without_blanking() {
        let bad = subscription("s2", "Broken", "Other", f64::NAN, "monthly", "2024-07-01");

        let subs = vec![
            subscription("s1", "Netflix", "Entertainment", 12.0, "monthly", "2024-07-01"),
            bad,
            subscription("s3", "Negative", "Other", -5.0, "monthly", "2024-07-01"),
        ];

        let breakdown = category_breakdown(&subs);
        assert!((breakdown.total_monthly_cost - 12.0).abs() < 1e-9);
        assert_eq!(breakdown.skipped.len(), 2);
        assert_eq!(breakdown.skipped[0].reason, SkipReason::NonFiniteCost);
        assert_eq!(breakdown.skipped[1].reason, SkipReason::NegativeCost);
    }

    #[test]
    fn test_breakdown_empty_input_is_zeroed() {
        let breakdown = category_breakdown(&[]);
        assert!(breakdown.categories.is_empty());
        assert_eq!(breakdown.total_monthly_cost, 0.0);
        assert!(breakdown.skipped.is_empty());
    }

    #[test]
    fn test_projection_seeds_every_horizon_month() {
        let subs = vec![subscription(
            "s1", "Prime", "Other", 120.0, "yearly", "2024-09-05",
        )];
        let report = monthly_projection(&subs, d(2024, 6, 15), 12);

        assert_eq!(report.months.len(), 12);
        assert_eq!(report.months[0].month_key, "2024-06");
        let september = report
            .months
            .iter()
            .find(|m| m.month_key == "2024-09")
            .unwrap();
        assert!((september.total_amount - 120.0).abs() < 1e-9);
        // One non-zero bucket out of twelve is above the mean
        assert!(september.above_average);
        assert!(!report.months[0].above_average);
    }

    #[test]
    fn test_projection_unknown_cycle_becomes_advisory() {
        let subs = vec![
            subscription("s1", "Netflix", "Entertainment", 12.0, "monthly", "2024-07-01"),
            subscription("s2", "Odd", "Other", 9.0, "biweekly", "2024-07-01"),
        ];
        let report = monthly_projection(&subs, d(2024, 6, 15), 3);

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(
            report.skipped[0].reason,
            SkipReason::UnrecognizedCycle {
                cycle: "biweekly".to_string()
            }
        );
        // The good record still projects
        assert!(report.months.iter().any(|m| m.total_amount > 0.0));
    }

    #[test]
    fn test_peak_ranking_breaks_ties_by_earliest_month() {
        let subs = vec![
            // Jan: 50, Feb: 120, Mar: 120, Apr: 10 via one-off yearly anchors
            subscription("s1", "A", "Other", 50.0, "yearly", "2024-01-10"),
            subscription("s2", "B", "Other", 120.0, "yearly", "2024-02-10"),
            subscription("s3", "C", "Other", 120.0, "yearly", "2024-03-10"),
            subscription("s4", "D", "Other", 10.0, "yearly", "2024-04-10"),
        ];
        let projection = monthly_projection(&subs, d(2024, 1, 1), 4);
        let peaks = peak_months(&projection);

        let keys: Vec<&str> = peaks.months.iter().map(|m| m.month_key.as_str()).collect();
        assert_eq!(keys, vec!["2024-02", "2024-03", "2024-01", "2024-04"]);
        assert_eq!(peaks.months[0].rank, 1);
    }

    #[test]
    fn test_trends_fold_tracked_actions() {
        let history = vec![
            with_values(
                history_entry("h1", "s1", "Netflix", "payment_success", ts("2024-05-10T12:00:00Z")),
                None,
                Some("15.99"),
            ),
            history_entry("h2", "s1", "Netflix", "renewal", ts("2024-05-11T12:00:00Z")),
            history_entry("h3", "s2", "Hulu", "cancel", ts("2024-06-01T08:00:00Z")),
            history_entry("h4", "s3", "Gym", "deleted", ts("2024-06-02T08:00:00Z")),
            // Untracked action produces no point on its own
            history_entry("h5", "s1", "Netflix", "updated", ts("2024-04-01T08:00:00Z")),
        ];

        let trends = spending_trends(&history);
        assert_eq!(trends.points.len(), 2);

        let may = &trends.points[0];
        assert_eq!(may.month_key, "2024-05");
        assert_eq!(may.renewal_count, 1);
        assert_eq!(may.payment_count, 1);
        assert!((may.amount_paid - 15.99).abs() < 1e-9);

        let june = &trends.points[1];
        assert_eq!(june.cancellation_count, 2);
    }

    #[test]
    fn test_trends_unparseable_amount_still_counts_event() {
        let history = vec![with_values(
            history_entry("h1", "s1", "Netflix", "payment_success", ts("2024-05-10T12:00:00Z")),
            None,
            Some("charged ok"),
        )];
        let trends = spending_trends(&history);
        assert_eq!(trends.points[0].payment_count, 1);
        assert_eq!(trends.points[0].amount_paid, 0.0);
    }

    #[test]
    fn test_calendar_includes_inactive_as_informational() {
        let mut cancelled = subscription("s2", "Old", "Other", 9.0, "monthly", "2024-07-20");
        cancelled.is_active = false;

        let subs = vec![
            subscription("s1", "Netflix", "Entertainment", 12.0, "monthly", "2024-07-01"),
            cancelled,
        ];
        let calendar_view = payment_calendar(&subs, d(2024, 6, 15), 2);

        let july = calendar_view
            .months
            .iter()
            .find(|m| m.month_key == "2024-07")
            .unwrap();
        let old = july
            .events
            .iter()
            .find(|e| e.subscription_id == "s2")
            .unwrap();
        assert!(!old.is_active);
        // Informational entries never repeat
        let old_events: usize = calendar_view
            .months
            .iter()
            .flat_map(|m| &m.events)
            .filter(|e| e.subscription_id == "s2")
            .count();
        assert_eq!(old_events, 1);
    }

    #[test]
    fn test_upcoming_window_excludes_trial_from_total() {
        let subs = vec![
            subscription("s1", "Netflix", "Entertainment", 12.0, "monthly", "2024-06-18"),
            trial(
                subscription("s2", "Disney+", "Entertainment", 11.0, "monthly", "2024-06-19"),
                14,
            ),
            subscription("s3", "Later", "Other", 50.0, "monthly", "2024-07-15"),
        ];
        let upcoming = upcoming_renewals(&subs, d(2024, 6, 15), 7);

        assert_eq!(upcoming.items.len(), 2);
        assert!((upcoming.total_due - 12.0).abs() < 1e-9);
    }
}
