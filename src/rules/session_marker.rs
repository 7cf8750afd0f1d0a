//! Comp-off session marking.
//!
//! Runs on every session insert and update before the write is persisted.
//! Work on a non-working day always earns comp-off; on a working day only the
//! additional sessions of a multi-session day do. The flag is sticky: once a
//! session is marked, no later write clears it.

use serde::{Deserialize, Serialize};

use crate::calendar::DayType;
use crate::models::{AttendanceId, AttendanceSession, Employee, EvaluationStep};

/// Which sessions of a multi-session working day earn comp-off.
///
/// The same policy is applied by the live marker and by the backfill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiSessionPolicy {
    /// Every session after the first of the day, ordered by clock-in time.
    #[default]
    FromSecondSession,
    /// Every session of a day that has more than one session.
    WholeGroup,
}

/// Why the marker decided what it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkReason {
    /// No employee matches the session's email; the session is left as is.
    UnknownEmployee,
    /// The session falls on a non-working day.
    NonWorkingDay,
    /// The session is an additional session of a working day.
    MultiSession {
        /// How many sibling sessions counted towards the decision.
        siblings: usize,
    },
    /// The first (or only) session of a working day.
    FirstSession,
}

/// The result of marking one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkOutcome {
    /// The session, with `is_compoff_session` possibly set.
    pub session: AttendanceSession,
    /// Persisted siblings that must also be flagged ([`MultiSessionPolicy::WholeGroup`] only).
    pub siblings_to_flag: Vec<AttendanceId>,
    /// The rule that decided the outcome.
    pub reason: MarkReason,
    /// Trace of the decision.
    pub evaluation: EvaluationStep,
}

/// Marks a session that is about to be written.
///
/// `siblings` are the persisted sessions for the same employee and date; the
/// session itself may be among them on update and is skipped by id. Under
/// [`MultiSessionPolicy::FromSecondSession`] only siblings ordered before the
/// session by `(login_time, id)` count, on insert and update alike; an unsaved
/// session sorts after saved ones with the same login time. A backdated
/// insert is therefore the first session of its day, and the first session
/// never becomes a comp-off session because a later one was added.
///
/// The flag is never reset: a session supplied with `is_compoff_session = true`
/// keeps it whatever the rules say.
///
/// # Example
///
/// ```
/// use compoff_engine::calendar::DayType;
/// use compoff_engine::models::{AttendanceSession, Employee};
/// use compoff_engine::rules::{mark_session, MarkReason, MultiSessionPolicy};
/// use chrono::NaiveDateTime;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let employee = Employee::new("EMP001", "asha@example.com", "Asha Rao");
///
/// let mut first = AttendanceSession::clock_in("asha@example.com", at("2026-01-14 09:00:00"));
/// first.id = Some(1);
/// let second = AttendanceSession::clock_in("asha@example.com", at("2026-01-14 18:00:00"));
///
/// let outcome = mark_session(
///     second,
///     Some(&employee),
///     DayType::Working,
///     &[first],
///     MultiSessionPolicy::FromSecondSession,
/// );
/// assert!(outcome.session.is_compoff_session);
/// assert_eq!(outcome.reason, MarkReason::MultiSession { siblings: 1 });
/// ```
pub fn mark_session(
    mut session: AttendanceSession,
    employee: Option<&Employee>,
    day_type: DayType,
    siblings: &[AttendanceSession],
    policy: MultiSessionPolicy,
) -> MarkOutcome {
    let supplied = session.is_compoff_session;
    let others: Vec<&AttendanceSession> = siblings
        .iter()
        .filter(|s| session.id.is_none() || s.id != session.id)
        .collect();

    let counted = match policy {
        MultiSessionPolicy::FromSecondSession => {
            let own_key = session.ordering_key();
            others
                .iter()
                .filter(|s| s.ordering_key() < own_key)
                .count()
        }
        MultiSessionPolicy::WholeGroup => others.len(),
    };

    let mut siblings_to_flag = Vec::new();
    let (reason, reasoning) = match employee {
        None => (
            MarkReason::UnknownEmployee,
            format!(
                "No employee found for {}, session left unchanged",
                session.employee_email
            ),
        ),
        Some(_) if !day_type.is_working() => {
            session.is_compoff_session = true;
            (
                MarkReason::NonWorkingDay,
                format!("{} is a non-working day, work earns comp-off", session.date),
            )
        }
        Some(_) if counted >= 1 => {
            session.is_compoff_session = true;
            if policy == MultiSessionPolicy::WholeGroup {
                siblings_to_flag = others
                    .iter()
                    .filter(|s| !s.is_compoff_session)
                    .filter_map(|s| s.id)
                    .collect();
            }
            (
                MarkReason::MultiSession { siblings: counted },
                format!(
                    "{} other session(s) on working day {}, additional session earns comp-off",
                    counted, session.date
                ),
            )
        }
        Some(_) => (
            MarkReason::FirstSession,
            format!(
                "First session on working day {}, flag left as supplied",
                session.date
            ),
        ),
    };

    let evaluation = EvaluationStep {
        rule_id: "compoff_session_marker".to_string(),
        rule_name: "Comp-off Session Marker".to_string(),
        input: serde_json::json!({
            "attendance_id": session.id,
            "employee_email": session.employee_email,
            "employee_code": employee.map(|e| e.emp_code.as_str()),
            "date": session.date.to_string(),
            "day_type": day_type,
            "siblings": others.len(),
            "counted_siblings": counted,
            "policy": policy,
            "supplied_flag": supplied,
        }),
        output: serde_json::json!({
            "is_compoff_session": session.is_compoff_session,
            "siblings_to_flag": siblings_to_flag,
        }),
        reasoning,
    };

    MarkOutcome {
        session,
        siblings_to_flag,
        reason,
        evaluation,
    }
}
