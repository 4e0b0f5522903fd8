//! Occurrence generation
//!
//! Expands one subscription into its bounded sequence of future billing
//! occurrences: start at the stored anchor date and step by the billing
//! cycle until the horizon is exceeded. An overdue anchor still counts once
//! — expansion never back-fills missed cycles, which would generate a
//! pathological backlog for long-untouched records.

use chrono::{Datelike, NaiveDate};

use crate::calendar;
use crate::error::{Error, Result};
use crate::models::{BillingCycle, Occurrence, Subscription};

fn occurrence_for(sub: &Subscription, date: NaiveDate) -> Occurrence {
    Occurrence {
        subscription_id: sub.id.clone(),
        subscription_name: sub.name.clone(),
        date,
        amount: sub.cost,
        is_trial: sub.is_trial,
    }
}

/// Expand an active subscription into dated occurrences within
/// `horizon_months` of `today`.
///
/// Inactive subscriptions yield no occurrences here; calendar display of
/// inactive records goes through [`informational`] instead. Trial
/// subscriptions emit at most the single trial-end marker.
pub fn generate(
    sub: &Subscription,
    today: NaiveDate,
    horizon_months: u32,
) -> Result<Vec<Occurrence>> {
    if !sub.is_active {
        return Ok(Vec::new());
    }

    let end = calendar::horizon_end(today, horizon_months);
    let anchor = sub.next_billing_date;

    if sub.is_trial {
        // The anchor marks trial-end, not a recurring paid charge
        if anchor <= end {
            return Ok(vec![occurrence_for(sub, anchor)]);
        }
        return Ok(Vec::new());
    }

    if let BillingCycle::Other(cycle) = &sub.billing_cycle {
        return Err(Error::UnrecognizedCycle {
            subscription_id: sub.id.clone(),
            cycle: cycle.clone(),
        });
    }

    let anchor_day = anchor.day();
    let mut occurrences = Vec::new();
    let mut date = anchor;
    while date <= end {
        occurrences.push(occurrence_for(sub, date));
        date = match calendar::advance(date, anchor_day, &sub.billing_cycle) {
            Some(next) => next,
            None => break, // unreachable for known cycles
        };
    }

    Ok(occurrences)
}

/// Single informational occurrence at the stored anchor date, regardless of
/// active status.
///
/// This is the distinct calendar-display request mode: it lets inactive
/// subscriptions show up on the payment calendar without ever being counted
/// in spend projections.
pub fn informational(sub: &Subscription) -> Occurrence {
    occurrence_for(sub, sub.next_billing_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{inactive, subscription, trial};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_monthly_expansion_clamps_february_only() {
        let sub = subscription("s1", "Netflix", "Entertainment", 15.99, "monthly", "2024-01-31");
        let occurrences = generate(&sub, d(2024, 1, 15), 3).unwrap();

        let dates: Vec<NaiveDate> = occurrences.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31)]);
    }

    #[test]
    fn test_overdue_anchor_counts_once() {
        // Anchor is months in the past; it appears once, with no catch-up
        // repeats between the anchor and today
        let sub = subscription("s1", "Gym", "Health", 30.0, "monthly", "2024-01-10");
        let occurrences = generate(&sub, d(2024, 4, 1), 1).unwrap();

        let dates: Vec<NaiveDate> = occurrences.iter().map(|o| o.date).collect();
        assert_eq!(
            dates,
            vec![d(2024, 1, 10), d(2024, 2, 10), d(2024, 3, 10), d(2024, 4, 10)]
        );
        // Exactly one occurrence per cycle step from the anchor, not one per
        // elapsed period re-seeded at "now"
        assert_eq!(occurrences.len(), 4);
    }

    #[test]
    fn test_weekly_expansion_count() {
        let sub = subscription("s1", "Paper", "News", 5.0, "weekly", "2024-06-01");
        let occurrences = generate(&sub, d(2024, 6, 1), 1).unwrap();
        // Jun 1 through Jul 1 inclusive: 1, 8, 15, 22, 29
        assert_eq!(occurrences.len(), 5);
    }

    #[test]
    fn test_inactive_yields_nothing() {
        let sub = inactive(subscription("s1", "Old", "Other", 9.0, "monthly", "2024-06-15"));
        assert!(generate(&sub, d(2024, 6, 1), 12).unwrap().is_empty());
    }

    #[test]
    fn test_trial_emits_single_marker() {
        let sub = trial(
            subscription("s1", "Disney+", "Entertainment", 0.0, "monthly", "2024-06-20"),
            14,
        );
        let occurrences = generate(&sub, d(2024, 6, 1), 12).unwrap();
        assert_eq!(occurrences.len(), 1);
        assert!(occurrences[0].is_trial);
        assert_eq!(occurrences[0].date, d(2024, 6, 20));
    }

    #[test]
    fn test_anchor_beyond_horizon_yields_nothing() {
        let sub = subscription("s1", "Prime", "Other", 120.0, "yearly", "2025-09-01");
        assert!(generate(&sub, d(2024, 6, 1), 12).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_cycle_is_a_configuration_error() {
        let sub = subscription("s7", "Odd", "Other", 5.0, "biweekly", "2024-06-15");
        let err = generate(&sub, d(2024, 6, 1), 12).unwrap_err();
        assert!(err.to_string().contains("s7"));
    }

    #[test]
    fn test_informational_ignores_active_flag() {
        let sub = inactive(subscription("s1", "Old", "Other", 9.0, "monthly", "2024-06-15"));
        let occ = informational(&sub);
        assert_eq!(occ.date, d(2024, 6, 15));
        assert_eq!(occ.subscription_id, "s1");
    }
}
