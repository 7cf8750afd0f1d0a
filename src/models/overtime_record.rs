//! Overtime entitlement records.
//!
//! An [`OvertimeRecord`] is derived once per attendance session on its first
//! clock-out. After creation the engine never modifies it; its status is
//! advanced by the comp-off request workflow that lives outside this crate.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AttendanceId;
use crate::calendar::DayType;

/// Lifecycle state of an overtime record.
///
/// The engine only ever creates records as [`OvertimeStatus::Eligible`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvertimeStatus {
    /// Earned and available to request.
    Eligible,
    /// Included in a pending comp-off request.
    Requested,
    /// Approved as comp-off.
    Approved,
    /// Request rejected.
    Rejected,
    /// Passed its expiry date without being used.
    Expired,
    /// Comp-off taken.
    Utilized,
    /// Request withdrawn by the employee.
    Cancelled,
}

/// The persisted entitlement derived from one attendance session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeRecord {
    /// Unique identifier of the record.
    pub id: Uuid,
    /// Employee code.
    pub emp_code: String,
    /// Employee email.
    pub emp_email: String,
    /// Employee full name.
    pub emp_name: String,
    /// The session this record was derived from; unique across records.
    pub attendance_id: AttendanceId,
    /// The date the work was performed.
    pub work_date: NaiveDate,
    /// English weekday name of `work_date` (e.g. "Sunday").
    pub day_of_week: String,
    /// Classification of `work_date`.
    pub day_type: DayType,
    /// Hours expected on that day (zero on non-working days).
    pub standard_hours: Decimal,
    /// Hours actually worked in the session.
    pub actual_hours: Decimal,
    /// Hours beyond `standard_hours`.
    pub extra_hours: Decimal,
    /// Comp-off days the extra hours are worth (0, 0.5 or 1).
    pub comp_off_days: Decimal,
    /// Lifecycle state.
    pub status: OvertimeStatus,
    /// Last date the entitlement can be used.
    pub expires_at: NaiveDate,
    /// Last date the entitlement can be recorded in a request.
    pub recording_deadline: NaiveDate,
    /// When the engine created the record.
    pub created_at: DateTime<Utc>,
}

impl OvertimeRecord {
    /// Returns true if the record is still eligible but past its expiry date.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.status == OvertimeStatus::Eligible && self.expires_at < today
    }

    /// Returns true if the record is still eligible but past its recording deadline.
    pub fn recording_overdue(&self, today: NaiveDate) -> bool {
        self.status == OvertimeStatus::Eligible && self.recording_deadline < today
    }
}

/// Aggregate view of an employee's overtime records.
///
/// # Example
///
/// ```
/// use compoff_engine::models::CompOffSummary;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let summary = CompOffSummary::from_records(&[], NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
/// assert_eq!(summary.total_records, 0);
/// assert_eq!(summary.total_eligible_comp_days, Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompOffSummary {
    /// Number of records of any status.
    pub total_records: usize,
    /// Records that are eligible and not expired.
    pub eligible_records: usize,
    /// Sum of comp-off days over eligible records.
    pub total_eligible_comp_days: Decimal,
    /// Sum of extra hours over eligible records.
    pub total_eligible_extra_hours: Decimal,
}

impl CompOffSummary {
    /// Builds the summary as of `today`.
    pub fn from_records(records: &[OvertimeRecord], today: NaiveDate) -> Self {
        let eligible: Vec<&OvertimeRecord> = records
            .iter()
            .filter(|r| r.status == OvertimeStatus::Eligible && !r.is_expired(today))
            .collect();

        Self {
            total_records: records.len(),
            eligible_records: eligible.len(),
            total_eligible_comp_days: eligible.iter().map(|r| r.comp_off_days).sum(),
            total_eligible_extra_hours: eligible.iter().map(|r| r.extra_hours).sum(),
        }
    }
}
