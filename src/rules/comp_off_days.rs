//! Grading extra hours into comp-off days.

use rust_decimal::Decimal;

use crate::config::CompOffPolicy;

/// Converts extra hours into comp-off days.
///
/// More than `full_day_threshold` hours earns a full day, more than
/// `half_day_threshold` earns half a day, anything else earns nothing. Both
/// thresholds are exclusive.
///
/// # Example
///
/// ```
/// use compoff_engine::config::CompOffPolicy;
/// use compoff_engine::rules::comp_off_days;
/// use rust_decimal::Decimal;
///
/// let policy = CompOffPolicy::default();
/// assert_eq!(comp_off_days(Decimal::new(70, 1), &policy), Decimal::ONE);
/// assert_eq!(comp_off_days(Decimal::new(45, 1), &policy), Decimal::new(5, 1));
/// assert_eq!(comp_off_days(Decimal::new(30, 1), &policy), Decimal::ZERO);
/// ```
pub fn comp_off_days(extra_hours: Decimal, policy: &CompOffPolicy) -> Decimal {
    if extra_hours > policy.full_day_threshold {
        Decimal::ONE
    } else if extra_hours > policy.half_day_threshold {
        Decimal::new(5, 1)
    } else {
        Decimal::ZERO
    }
}
