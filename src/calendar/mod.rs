//! Calendar classification for comp-off eligibility.
//!
//! This module decides whether a date is a working day for the organisation:
//! Sundays, the configured off-Saturdays (2nd and 4th by default) and listed
//! holidays are non-working. The same classifier is shared by the live hooks
//! and the backfill so the two can never disagree.

mod holidays;
mod working_day;

pub use holidays::HolidayCalendar;
pub use working_day::{
    CalendarRules, DayClassification, DayType, NonWorkingReason, WorkingDayClassifier, classify,
    week_of_month,
};
