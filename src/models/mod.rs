//! Core data models for the comp-off engine.
//!
//! This module contains the attendance, employee, holiday and overtime record
//! types that flow through the engine.

mod attendance;
mod employee;
mod evaluation;
mod holiday;
mod overtime_record;

pub use attendance::{AttendanceId, AttendanceSession, DayKey};
pub use employee::Employee;
pub use evaluation::EvaluationStep;
pub use holiday::{Holiday, HolidaySet};
pub use overtime_record::{CompOffSummary, OvertimeRecord, OvertimeStatus};
