//! Calendar arithmetic for billing cadences
//!
//! Cycle stepping is always derived from the original anchor day-of-month,
//! not from the previously clamped result: a Jan-31 monthly anchor yields
//! Feb-28/29, then Mar-31 again. All functions are pure and operate on
//! immutable date values.

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::BillingCycle;

/// Number of days in the given calendar month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    // First of the following month minus one day; months 1-12 always resolve
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// Add calendar months to a date, clamping the day to `anchor_day` or the
/// last valid day of the target month, whichever is smaller.
pub fn add_months(date: NaiveDate, months: u32, anchor_day: u32) -> NaiveDate {
    let zero_based = date.year() * 12 + date.month0() as i32 + months as i32;
    let year = zero_based.div_euclid(12);
    let month = zero_based.rem_euclid(12) as u32 + 1;
    let day = anchor_day.min(days_in_month(year, month));
    // Day is clamped into the valid range above
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Next occurrence date for a single cycle step.
///
/// Returns `None` for an unrecognized cycle; callers attach the offending
/// subscription id and surface a typed configuration error instead of
/// silently defaulting.
pub fn advance(date: NaiveDate, anchor_day: u32, cycle: &BillingCycle) -> Option<NaiveDate> {
    match cycle {
        BillingCycle::Weekly => Some(date + Duration::days(7)),
        BillingCycle::Monthly => Some(add_months(date, 1, anchor_day)),
        BillingCycle::Quarterly => Some(add_months(date, 3, anchor_day)),
        BillingCycle::Yearly => Some(add_months(date, 12, anchor_day)),
        BillingCycle::Other(_) => None,
    }
}

/// Last date inside a projection horizon of `horizon_months` from `today`.
pub fn horizon_end(today: NaiveDate, horizon_months: u32) -> NaiveDate {
    add_months(today, horizon_months, today.day())
}

/// Sortable year+month key, e.g. "2024-06".
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Human month label, e.g. "June 2024".
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    // Day 1 always exists
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap()
}
