//! Overtime record derivation at clock-out.
//!
//! Runs once per session, when its logout time goes from unset to set. A
//! session on a non-working day, or one already marked as a comp-off session,
//! yields exactly one [`OvertimeRecord`].

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::calendar::DayType;
use crate::config::CompOffPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceSession, Employee, EvaluationStep, OvertimeRecord, OvertimeStatus};

use super::comp_off_days;

/// What the generator did for one clock-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockOutOutcome {
    /// A new record was derived.
    Created(OvertimeRecord),
    /// No employee matches the session's email.
    UnknownEmployee,
    /// Working-day session not marked as a comp-off session.
    NotEligible,
    /// A record already exists for this session.
    AlreadyRecorded,
    /// Clock-out recorded without computed working hours.
    MissingWorkingHours,
}

impl ClockOutOutcome {
    /// Returns the created record, if any.
    pub fn record(&self) -> Option<&OvertimeRecord> {
        match self {
            ClockOutOutcome::Created(record) => Some(record),
            _ => None,
        }
    }
}

/// A clock-out decision together with its trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockOutEvaluation {
    /// The decision.
    pub outcome: ClockOutOutcome,
    /// Trace of the decision.
    pub evaluation: EvaluationStep,
}

/// Returns true if a clocked-out session earns an overtime record.
///
/// # Example
///
/// ```
/// use compoff_engine::calendar::DayType;
/// use compoff_engine::models::AttendanceSession;
/// use compoff_engine::rules::is_eligible;
/// use chrono::NaiveDateTime;
///
/// let login = NaiveDateTime::parse_from_str("2026-01-14 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let mut session = AttendanceSession::clock_in("asha@example.com", login);
///
/// assert!(is_eligible(DayType::NonWorking, &session));
/// assert!(!is_eligible(DayType::Working, &session));
///
/// session.is_compoff_session = true;
/// assert!(is_eligible(DayType::Working, &session));
/// ```
pub fn is_eligible(day_type: DayType, session: &AttendanceSession) -> bool {
    !day_type.is_working() || session.is_compoff_session
}

/// Builds the overtime record for an eligible session.
///
/// Returns `Ok(None)` when the session has no working hours.
///
/// - Working day: standard hours are the employee's shift length, or the
///   policy default; extra hours are worked minus standard.
/// - Non-working day: standard hours are zero and every worked hour is extra.
///
/// # Errors
///
/// Returns [`EngineError::InvalidSession`] if the session has not been
/// persisted, or if the expiry or recording deadline is not a valid date.
pub fn build_overtime_record(
    session: &AttendanceSession,
    employee: &Employee,
    day_type: DayType,
    policy: &CompOffPolicy,
    created_at: DateTime<Utc>,
) -> EngineResult<Option<OvertimeRecord>> {
    let attendance_id = session.id.ok_or_else(|| EngineError::InvalidSession {
        id: session.display_id(),
        message: "session must be persisted before an overtime record is derived".to_string(),
    })?;

    let Some(working_hours) = session.working_hours else {
        return Ok(None);
    };

    let (standard_hours, extra_hours) = if day_type.is_working() {
        let standard = employee.standard_hours.unwrap_or(policy.standard_hours);
        (standard, working_hours - standard)
    } else {
        (Decimal::ZERO, working_hours)
    };

    Ok(Some(OvertimeRecord {
        id: Uuid::new_v4(),
        emp_code: employee.emp_code.clone(),
        emp_email: employee.emp_email.clone(),
        emp_name: employee.full_name.clone(),
        attendance_id,
        work_date: session.date,
        day_of_week: session.date.format("%A").to_string(),
        day_type,
        standard_hours,
        actual_hours: working_hours,
        extra_hours,
        comp_off_days: comp_off_days(extra_hours, policy),
        status: OvertimeStatus::Eligible,
        expires_at: add_days(session, policy.expiry_days)?,
        recording_deadline: add_days(session, policy.recording_window_days)?,
        created_at,
    }))
}

fn add_days(session: &AttendanceSession, days: u32) -> EngineResult<NaiveDate> {
    session
        .date
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| EngineError::InvalidSession {
            id: session.display_id(),
            message: format!("{} + {} days is out of range", session.date, days),
        })
}

/// Decides what a first clock-out produces.
///
/// Checks run in order: employee resolved, eligibility, existing record,
/// working hours present. `already_recorded` must be read under the same
/// critical section that will insert the record.
///
/// # Errors
///
/// Returns [`EngineError::InvalidSession`] if the session has no logout time
/// or has not been persisted.
pub fn evaluate_clock_out(
    session: &AttendanceSession,
    employee: Option<&Employee>,
    day_type: DayType,
    already_recorded: bool,
    policy: &CompOffPolicy,
    created_at: DateTime<Utc>,
) -> EngineResult<ClockOutEvaluation> {
    if !session.is_clocked_out() {
        return Err(EngineError::InvalidSession {
            id: session.display_id(),
            message: "session has not clocked out".to_string(),
        });
    }

    let eligible = is_eligible(day_type, session);
    let (outcome, reasoning) = match employee {
        None => (
            ClockOutOutcome::UnknownEmployee,
            format!("No employee found for {}", session.employee_email),
        ),
        Some(_) if !eligible => (
            ClockOutOutcome::NotEligible,
            "Working day session not marked as comp-off session".to_string(),
        ),
        Some(_) if already_recorded => (
            ClockOutOutcome::AlreadyRecorded,
            "Overtime record already exists for this session".to_string(),
        ),
        Some(employee) => match build_overtime_record(session, employee, day_type, policy, created_at)? {
            Some(record) => {
                let reasoning = format!(
                    "{} hours on {} day {}: {} extra hours, {} comp-off days",
                    record.actual_hours.normalize(),
                    day_type,
                    record.work_date,
                    record.extra_hours.normalize(),
                    record.comp_off_days.normalize()
                );
                (ClockOutOutcome::Created(record), reasoning)
            }
            None => (
                ClockOutOutcome::MissingWorkingHours,
                "Clock-out has no working hours, nothing to record".to_string(),
            ),
        },
    };

    let evaluation = EvaluationStep {
        rule_id: "overtime_record_generator".to_string(),
        rule_name: "Overtime Record Generator".to_string(),
        input: serde_json::json!({
            "attendance_id": session.id,
            "employee_email": session.employee_email,
            "date": session.date.to_string(),
            "day_type": day_type,
            "is_compoff_session": session.is_compoff_session,
            "working_hours": session.working_hours.map(|h| h.normalize().to_string()),
            "already_recorded": already_recorded,
        }),
        output: serde_json::json!({
            "eligible": eligible,
            "record_created": outcome.record().is_some(),
            "extra_hours": outcome.record().map(|r| r.extra_hours.normalize().to_string()),
        }),
        reasoning,
    };

    Ok(ClockOutEvaluation {
        outcome,
        evaluation,
    })
}
