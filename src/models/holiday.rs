//! Organisation holiday models.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single organisation holiday.
///
/// # Example
///
/// ```
/// use compoff_engine::models::Holiday;
/// use chrono::NaiveDate;
///
/// let holiday = Holiday {
///     date: NaiveDate::from_ymd_opt(2026, 1, 26).unwrap(),
///     name: "Republic Day".to_string(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The date of the holiday.
    pub date: NaiveDate,
    /// The holiday's name.
    pub name: String,
}

/// The organisation holiday list, keyed by date.
///
/// # Example
///
/// ```
/// use compoff_engine::models::{Holiday, HolidaySet};
/// use chrono::NaiveDate;
///
/// let republic_day = NaiveDate::from_ymd_opt(2026, 1, 26).unwrap();
/// let set: HolidaySet = vec![Holiday { date: republic_day, name: "Republic Day".to_string() }]
///     .into_iter()
///     .collect();
///
/// assert!(set.contains(republic_day));
/// assert_eq!(set.name_of(republic_day), Some("Republic Day"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidaySet {
    dates: BTreeMap<NaiveDate, String>,
}

impl HolidaySet {
    /// Creates an empty holiday list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a holiday. A later entry for the same date replaces the name.
    pub fn insert(&mut self, holiday: Holiday) {
        self.dates.insert(holiday.date, holiday.name);
    }

    /// Returns true if `date` is on the list.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains_key(&date)
    }

    /// Returns the name of the holiday on `date`, if any.
    pub fn name_of(&self, date: NaiveDate) -> Option<&str> {
        self.dates.get(&date).map(String::as_str)
    }

    /// Number of holidays on the list.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns true if there are no holidays.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl FromIterator<Holiday> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = Holiday>>(iter: I) -> Self {
        let mut set = Self::new();
        for holiday in iter {
            set.insert(holiday);
        }
        set
    }
}
