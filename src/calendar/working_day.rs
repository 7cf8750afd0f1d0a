//! Working-day classification.
//!
//! Classification is calendar-only: it depends on the weekday, the position of
//! a Saturday within its month, and the holiday list. It never looks at the
//! employee.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::HolidayCalendar;

/// Whether a calendar day is a working day.
///
/// Serialized as `working` / `non_working`, which is also the `day_type`
/// stored on overtime records.
///
/// # Example
///
/// ```
/// use compoff_engine::calendar::DayType;
///
/// assert!(DayType::Working.is_working());
/// assert_eq!(DayType::NonWorking.to_string(), "non_working");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    /// A regular working day.
    Working,
    /// Sunday, an off-Saturday, or a holiday.
    NonWorking,
}

impl DayType {
    /// Returns true for [`DayType::Working`].
    pub fn is_working(self) -> bool {
        self == DayType::Working
    }
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayType::Working => write!(f, "working"),
            DayType::NonWorking => write!(f, "non_working"),
        }
    }
}

/// Why a day was classified as non-working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonWorkingReason {
    /// Every Sunday is off.
    Sunday,
    /// A Saturday in one of the configured off weeks.
    OffSaturday {
        /// The week of the month the Saturday falls in (1-based).
        week: u32,
    },
    /// The date is on the holiday list.
    Holiday,
}

/// The classification of a single date together with its reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayClassification {
    /// The classified date.
    pub date: NaiveDate,
    /// The resulting day type.
    pub day_type: DayType,
    /// Set when `day_type` is [`DayType::NonWorking`].
    pub reason: Option<NonWorkingReason>,
}

/// Weekly rules for the organisation calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarRules {
    /// Weeks of the month (1-based) whose Saturday is a day off.
    pub off_saturday_weeks: Vec<u32>,
}

impl Default for CalendarRules {
    fn default() -> Self {
        Self {
            off_saturday_weeks: vec![2, 4],
        }
    }
}

/// Returns the 1-based week of the month a date falls in.
///
/// Days 1-7 are week 1, days 8-14 week 2, and so on; day 29 onwards is week 5.
///
/// # Example
///
/// ```
/// use compoff_engine::calendar::week_of_month;
/// use chrono::NaiveDate;
///
/// assert_eq!(week_of_month(NaiveDate::from_ymd_opt(2026, 1, 7).unwrap()), 1);
/// assert_eq!(week_of_month(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()), 2);
/// assert_eq!(week_of_month(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()), 5);
/// ```
pub fn week_of_month(date: NaiveDate) -> u32 {
    (date.day() - 1) / 7 + 1
}

/// Classifies dates as working or non-working.
///
/// Rules are applied in order:
/// 1. Sunday is non-working.
/// 2. A Saturday in one of the off weeks is non-working.
/// 3. A listed holiday is non-working.
/// 4. Everything else is a working day.
///
/// # Example
///
/// ```
/// use compoff_engine::calendar::{DayType, WorkingDayClassifier};
/// use chrono::NaiveDate;
/// use std::collections::BTreeSet;
///
/// let classifier = WorkingDayClassifier::default();
/// let holidays: BTreeSet<NaiveDate> = BTreeSet::new();
///
/// // 2026-01-10 is the second Saturday of January
/// let second_saturday = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
/// assert_eq!(classifier.classify(second_saturday, &holidays), DayType::NonWorking);
///
/// // 2026-01-17 is the third Saturday
/// let third_saturday = NaiveDate::from_ymd_opt(2026, 1, 17).unwrap();
/// assert_eq!(classifier.classify(third_saturday, &holidays), DayType::Working);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingDayClassifier {
    rules: CalendarRules,
}

impl WorkingDayClassifier {
    /// Creates a classifier using the given weekly rules.
    pub fn new(rules: CalendarRules) -> Self {
        Self { rules }
    }

    /// Returns the weekly rules in use.
    pub fn rules(&self) -> &CalendarRules {
        &self.rules
    }

    /// Classifies `date` against the weekly rules and the holiday list.
    pub fn classify<H>(&self, date: NaiveDate, holidays: &H) -> DayType
    where
        H: HolidayCalendar + ?Sized,
    {
        self.explain(date, holidays).day_type
    }

    /// Classifies `date` and reports which rule decided it.
    pub fn explain<H>(&self, date: NaiveDate, holidays: &H) -> DayClassification
    where
        H: HolidayCalendar + ?Sized,
    {
        let reason = match date.weekday() {
            Weekday::Sun => Some(NonWorkingReason::Sunday),
            Weekday::Sat if self.is_off_saturday(date) => Some(NonWorkingReason::OffSaturday {
                week: week_of_month(date),
            }),
            _ if holidays.is_holiday(date) => Some(NonWorkingReason::Holiday),
            _ => None,
        };

        DayClassification {
            date,
            day_type: if reason.is_some() {
                DayType::NonWorking
            } else {
                DayType::Working
            },
            reason,
        }
    }

    fn is_off_saturday(&self, date: NaiveDate) -> bool {
        self.rules.off_saturday_weeks.contains(&week_of_month(date))
    }
}

/// Classifies `date` with the default weekly rules (2nd and 4th Saturday off).
///
/// # Example
///
/// ```
/// use compoff_engine::calendar::{classify, DayType};
/// use chrono::NaiveDate;
/// use std::collections::BTreeSet;
///
/// let holidays: BTreeSet<NaiveDate> = BTreeSet::new();
/// // 2026-01-18 is a Sunday
/// let sunday = NaiveDate::from_ymd_opt(2026, 1, 18).unwrap();
/// assert_eq!(classify(sunday, &holidays), DayType::NonWorking);
/// ```
pub fn classify<H>(date: NaiveDate, holidays: &H) -> DayType
where
    H: HolidayCalendar + ?Sized,
{
    WorkingDayClassifier::default().classify(date, holidays)
}
