//! Storage contracts consumed by the engine.
//!
//! The engine never owns the attendance, employee or overtime tables; the
//! attendance service supplies implementations of these traits. The
//! [`memory`] module provides thread-safe in-memory implementations used in
//! tests and benchmarks.

pub mod memory;

use chrono::NaiveDate;

use crate::error::EngineResult;
use crate::models::{AttendanceId, AttendanceSession, Employee, OvertimeRecord};

pub use memory::{InMemoryAttendanceStore, InMemoryEmployeeDirectory, InMemoryOvertimeStore};

/// Read-only employee master data.
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up an employee by email. `None` is a normal outcome.
    fn lookup_employee(&self, email: &str) -> Option<Employee>;
}

/// Attendance session persistence.
pub trait AttendanceStore: Send + Sync {
    /// Fetches a session by id.
    fn get(&self, id: AttendanceId) -> EngineResult<Option<AttendanceSession>>;

    /// Persists a new session, assigning and returning its id.
    ///
    /// The returned session carries the assigned id.
    fn insert(&self, session: AttendanceSession) -> EngineResult<AttendanceSession>;

    /// Replaces a persisted session.
    ///
    /// Returns `SessionNotFound` if no session has the session's id.
    fn update(&self, session: &AttendanceSession) -> EngineResult<()>;

    /// Every persisted session of `employee_email` on `date`.
    fn sessions_on(&self, employee_email: &str, date: NaiveDate)
    -> EngineResult<Vec<AttendanceSession>>;

    /// Every persisted session.
    fn all_sessions(&self) -> EngineResult<Vec<AttendanceSession>>;

    /// Sets `is_compoff_session` on the given sessions, returning how many
    /// changed. Sessions already flagged are left alone.
    fn mark_compoff(&self, ids: &[AttendanceId]) -> EngineResult<usize>;
}

/// Overtime record persistence.
///
/// Implementations must enforce at most one record per `attendance_id`.
pub trait OvertimeStore: Send + Sync {
    /// The record derived from a session, if any.
    fn find_by_attendance(&self, attendance_id: AttendanceId)
    -> EngineResult<Option<OvertimeRecord>>;

    /// Stores a new record.
    ///
    /// Returns `DuplicateOvertimeRecord` if the session already has one.
    fn insert(&self, record: OvertimeRecord) -> EngineResult<()>;

    /// Every record of an employee, by employee code.
    fn for_employee(&self, emp_code: &str) -> EngineResult<Vec<OvertimeRecord>>;

    /// Every stored record.
    fn all_records(&self) -> EngineResult<Vec<OvertimeRecord>>;
}
