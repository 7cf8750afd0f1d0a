//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the comp-off
//! policy and holiday list from YAML files.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::HolidaySet;

use super::types::{CompOffPolicy, EngineConfig, HolidaysConfig};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/compoff/
/// ├── policy.yaml    # Hours, thresholds, windows and calendar rules
/// └── holidays.yaml  # Organisation holidays
/// ```
///
/// # Example
///
/// ```no_run
/// use compoff_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/compoff").unwrap();
///
/// let republic_day = NaiveDate::from_ymd_opt(2026, 1, 26).unwrap();
/// assert!(loader.holidays().contains(republic_day));
/// println!("Expiry: {} days", loader.policy().expiry_days);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The policy fails validation
    ///
    /// # Example
    ///
    /// ```no_run
    /// use compoff_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/compoff")?;
    /// # Ok::<(), compoff_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let policy = Self::load_yaml::<CompOffPolicy>(&path.join("policy.yaml"))?;
        Self::validate(&policy)?;

        let holidays_config = Self::load_yaml::<HolidaysConfig>(&path.join("holidays.yaml"))?;
        let holidays: HolidaySet = holidays_config.holidays.into_iter().collect();

        tracing::debug!(
            path = %path.display(),
            holidays = holidays.len(),
            multi_session = ?policy.multi_session,
            "Loaded comp-off configuration"
        );

        Ok(Self {
            config: EngineConfig::new(policy, holidays),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Checks the policy for values the rules cannot work with.
    pub fn validate(policy: &CompOffPolicy) -> EngineResult<()> {
        if policy.standard_hours <= Decimal::ZERO {
            return Err(invalid("standard_hours", "must be greater than zero"));
        }
        if policy.half_day_threshold < Decimal::ZERO {
            return Err(invalid("half_day_threshold", "must not be negative"));
        }
        if policy.half_day_threshold >= policy.full_day_threshold {
            return Err(invalid(
                "full_day_threshold",
                "must be greater than half_day_threshold",
            ));
        }
        if policy.recording_window_days == 0 {
            return Err(invalid("recording_window_days", "must be greater than zero"));
        }
        if policy.expiry_days == 0 {
            return Err(invalid("expiry_days", "must be greater than zero"));
        }
        if policy.recording_window_days > policy.expiry_days {
            return Err(invalid(
                "recording_window_days",
                "must not exceed expiry_days",
            ));
        }
        if let Some(week) = policy
            .calendar
            .off_saturday_weeks
            .iter()
            .find(|w| !(1..=5).contains(*w))
        {
            return Err(invalid(
                "calendar.off_saturday_weeks",
                &format!("week {} is outside 1..=5", week),
            ));
        }
        Ok(())
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the comp-off policy.
    pub fn policy(&self) -> &CompOffPolicy {
        self.config.policy()
    }

    /// Returns the organisation holiday list.
    pub fn holidays(&self) -> &HolidaySet {
        self.config.holidays()
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }
}

fn invalid(field: &str, message: &str) -> EngineError {
    EngineError::InvalidConfig {
        field: field.to_string(),
        message: message.to_string(),
    }
}
