//! Error types for the comp-off engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the engine can surface to the attendance-write path.
//! Outcomes that are expected in normal operation (an employee missing from
//! master data, a clock-out without computed hours) are not errors; they are
//! reported through the rule outcome types instead.

use thiserror::Error;

use crate::models::AttendanceId;

/// The main error type for the comp-off engine.
///
/// # Example
///
/// ```
/// use compoff_engine::error::EngineError;
///
/// let error = EngineError::DuplicateOvertimeRecord { attendance_id: 42 };
/// assert_eq!(
///     error.to_string(),
///     "Overtime record already exists for attendance 42"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds a value the engine cannot work with.
    #[error("Invalid configuration field '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// An attendance session referenced by id does not exist.
    #[error("Attendance session not found: {id}")]
    SessionNotFound {
        /// The id that was looked up.
        id: AttendanceId,
    },

    /// A session handed to the engine violates the caller contract.
    #[error("Invalid session '{id}': {message}")]
    InvalidSession {
        /// The session id, or `unsaved` for a session not yet persisted.
        id: String,
        /// What made the session invalid.
        message: String,
    },

    /// A second overtime record was about to be stored for one session.
    ///
    /// This is a uniqueness violation and must be investigated, never retried.
    #[error("Overtime record already exists for attendance {attendance_id}")]
    DuplicateOvertimeRecord {
        /// The attendance session that already has a record.
        attendance_id: AttendanceId,
    },

    /// The backing store failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
