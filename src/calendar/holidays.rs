//! Holiday lookup seam.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::models::HolidaySet;

/// Read-only view of the organisation holiday list.
///
/// The engine only ever asks whether a date is a holiday; the master data
/// behind it belongs to the surrounding system.
pub trait HolidayCalendar: Send + Sync {
    /// Returns true if `date` is an organisation holiday.
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

impl HolidayCalendar for HolidaySet {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.contains(date)
    }
}

impl HolidayCalendar for BTreeSet<NaiveDate> {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.contains(&date)
    }
}
