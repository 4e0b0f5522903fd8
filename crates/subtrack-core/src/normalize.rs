//! Cost normalization across billing cadences
//!
//! Converts a cost + cycle into comparable monthly and yearly figures so
//! subscriptions on different cadences can be summed and ranked together.

use crate::error::{Error, Result};
use crate::models::{BillingCycle, Subscription};

/// Average weeks per month used for weekly-to-monthly conversion.
///
/// This is a documented approximation (the exact figure is 365.25/12/7 ≈
/// 4.348), kept at 4.33 for parity with historical report output. Rounding
/// in tests depends on this constant.
pub const WEEKS_PER_MONTH: f64 = 4.33;

/// Multiplier from a cycle's cost to its monthly equivalent, if the cycle
/// is a known cadence.
fn monthly_factor(cycle: &BillingCycle) -> Option<f64> {
    match cycle {
        BillingCycle::Weekly => Some(WEEKS_PER_MONTH),
        BillingCycle::Monthly => Some(1.0),
        BillingCycle::Quarterly => Some(1.0 / 3.0),
        BillingCycle::Yearly => Some(1.0 / 12.0),
        BillingCycle::Other(_) => None,
    }
}

/// Monthly-equivalent cost for a subscription.
///
/// Fails with a configuration error naming the subscription when the cycle
/// is unrecognized; no cadence is ever silently assumed.
pub fn monthly_equivalent(sub: &Subscription) -> Result<f64> {
    monthly_factor(&sub.billing_cycle)
        .map(|factor| sub.cost * factor)
        .ok_or_else(|| Error::UnrecognizedCycle {
            subscription_id: sub.id.clone(),
            cycle: sub.billing_cycle.as_str().to_string(),
        })
}

/// Yearly-equivalent cost: twelve times the monthly equivalent.
pub fn yearly_equivalent(sub: &Subscription) -> Result<f64> {
    monthly_equivalent(sub).map(|monthly| monthly * 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::subscription;

    #[test]
    fn test_monthly_passes_through() {
        let sub = subscription("s1", "Netflix", "Entertainment", 15.99, "monthly", "2024-06-15");
        assert!((monthly_equivalent(&sub).unwrap() - 15.99).abs() < 1e-9);
    }

    #[test]
    fn test_yearly_divides_by_twelve() {
        let sub = subscription("s1", "Prime", "Other", 120.0, "yearly", "2024-06-15");
        assert!((monthly_equivalent(&sub).unwrap() - 10.0).abs() < 1e-9);
        assert!((yearly_equivalent(&sub).unwrap() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_quarterly_divides_by_three() {
        let sub = subscription("s1", "Gym", "Health", 90.0, "quarterly", "2024-06-15");
        assert!((monthly_equivalent(&sub).unwrap() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_weekly_uses_documented_constant() {
        let sub = subscription("s1", "Paper", "News", 10.0, "weekly", "2024-06-15");
        assert!((monthly_equivalent(&sub).unwrap() - 43.3).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_cycle_errors_with_subscription_id() {
        let sub = subscription("s9", "Odd", "Other", 5.0, "fortnightly", "2024-06-15");
        let err = monthly_equivalent(&sub).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("s9"), "error should name the subscription: {}", msg);
        assert!(msg.contains("fortnightly"));
    }
}
