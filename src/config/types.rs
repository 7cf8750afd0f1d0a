//! Configuration types for the comp-off engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarRules;
use crate::models::{Holiday, HolidaySet};
use crate::rules::MultiSessionPolicy;

/// Comp-off rules, loaded from `policy.yaml`.
///
/// Every field has a default, so a partial file only overrides what it names.
///
/// # Example
///
/// ```
/// use compoff_engine::config::CompOffPolicy;
/// use rust_decimal::Decimal;
///
/// let policy = CompOffPolicy::default();
/// assert_eq!(policy.standard_hours, Decimal::new(80, 1));
/// assert_eq!(policy.recording_window_days, 30);
/// assert_eq!(policy.expiry_days, 90);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompOffPolicy {
    /// Hours expected on a working day when the employee has no shift length.
    pub standard_hours: Decimal,
    /// Days after the work date during which the comp-off must be recorded.
    pub recording_window_days: u32,
    /// Days after the work date after which the comp-off expires.
    pub expiry_days: u32,
    /// Extra hours above which half a comp-off day is earned.
    pub half_day_threshold: Decimal,
    /// Extra hours above which a full comp-off day is earned.
    pub full_day_threshold: Decimal,
    /// Weekly calendar rules.
    pub calendar: CalendarRules,
    /// Which sessions of a multi-session working day earn comp-off.
    pub multi_session: MultiSessionPolicy,
}

impl Default for CompOffPolicy {
    fn default() -> Self {
        Self {
            standard_hours: Decimal::new(80, 1),
            recording_window_days: 30,
            expiry_days: 90,
            half_day_threshold: Decimal::new(30, 1),
            full_day_threshold: Decimal::new(60, 1),
            calendar: CalendarRules::default(),
            multi_session: MultiSessionPolicy::default(),
        }
    }
}

/// Holidays configuration file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HolidaysConfig {
    /// The organisation holidays.
    #[serde(default)]
    pub holidays: Vec<Holiday>,
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// The comp-off policy.
    policy: CompOffPolicy,
    /// The organisation holiday list.
    holidays: HolidaySet,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(policy: CompOffPolicy, holidays: HolidaySet) -> Self {
        Self { policy, holidays }
    }

    /// Returns the comp-off policy.
    pub fn policy(&self) -> &CompOffPolicy {
        &self.policy
    }

    /// Returns the holiday list.
    pub fn holidays(&self) -> &HolidaySet {
        &self.holidays
    }
}
