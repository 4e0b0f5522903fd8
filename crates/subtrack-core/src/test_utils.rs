//! Test utilities for subtrack-core
//!
//! Fixture builders for subscriptions and history entries, shared by unit
//! tests and the integration suite.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{HistoryAction, HistoryEntry, Subscription};

/// Build a subscription fixture. Dates are `YYYY-MM-DD`; panics on bad
/// input since this is test-only plumbing.
pub fn subscription(
    id: &str,
    name: &str,
    category: &str,
    cost: f64,
    cycle: &str,
    next_billing: &str,
) -> Subscription {
    Subscription {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        cost,
        billing_cycle: cycle.into(),
        next_billing_date: NaiveDate::parse_from_str(next_billing, "%Y-%m-%d")
            .expect("fixture date must be YYYY-MM-DD"),
        is_active: true,
        is_trial: false,
        trial_days: None,
        created_at: DateTime::parse_from_rfc3339("2023-01-01T00:00:00Z")
            .expect("fixed fixture timestamp")
            .with_timezone(&Utc),
    }
}

/// Mark a subscription fixture inactive.
pub fn inactive(mut sub: Subscription) -> Subscription {
    sub.is_active = false;
    sub
}

/// Mark a subscription fixture as a trial.
pub fn trial(mut sub: Subscription, trial_days: u32) -> Subscription {
    sub.is_trial = true;
    sub.trial_days = Some(trial_days);
    sub
}

/// Build a history entry fixture.
pub fn history_entry(
    id: &str,
    subscription_id: &str,
    subscription_name: &str,
    action: &str,
    created_at: DateTime<Utc>,
) -> HistoryEntry {
    HistoryEntry {
        id: id.to_string(),
        subscription_id: subscription_id.to_string(),
        subscription_name: subscription_name.to_string(),
        action: HistoryAction::from(action),
        old_value: None,
        new_value: None,
        created_at,
    }
}

/// Attach old/new values to a history entry fixture.
pub fn with_values(
    mut entry: HistoryEntry,
    old_value: Option<&str>,
    new_value: Option<&str>,
) -> HistoryEntry {
    entry.old_value = old_value.map(|v| v.to_string());
    entry.new_value = new_value.map(|v| v.to_string());
    entry
}

/// Fixed timestamp helper for deterministic tests.
pub fn ts(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .expect("fixture timestamp must be RFC 3339")
        .with_timezone(&Utc)
}
