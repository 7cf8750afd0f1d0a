//! Engine counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Running counters of what the engine has done since it was created.
#[derive(Debug, Default)]
pub struct EngineStats {
    sessions_flagged: AtomicU64,
    unknown_employees: AtomicU64,
    records_created: AtomicU64,
    duplicates_prevented: AtomicU64,
    missing_working_hours: AtomicU64,
}

/// A point-in-time copy of [`EngineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Sessions whose comp-off flag the engine set.
    pub sessions_flagged: u64,
    /// Writes and clock-outs skipped because no employee matched.
    pub unknown_employees: u64,
    /// Overtime records created.
    pub records_created: u64,
    /// Clock-outs that found a record already present.
    pub duplicates_prevented: u64,
    /// Eligible clock-outs skipped for lack of working hours.
    pub missing_working_hours: u64,
}

impl EngineStats {
    pub(crate) fn add_flagged(&self, count: u64) {
        self.sessions_flagged.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn unknown_employee(&self) {
        self.unknown_employees.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_created(&self) {
        self.records_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn duplicate_prevented(&self) {
        self.duplicates_prevented.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn missing_working_hours(&self) {
        self.missing_working_hours.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            sessions_flagged: self.sessions_flagged.load(Ordering::Relaxed),
            unknown_employees: self.unknown_employees.load(Ordering::Relaxed),
            records_created: self.records_created.load(Ordering::Relaxed),
            duplicates_prevented: self.duplicates_prevented.load(Ordering::Relaxed),
            missing_working_hours: self.missing_working_hours.load(Ordering::Relaxed),
        }
    }
}
