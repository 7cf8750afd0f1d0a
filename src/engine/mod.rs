//! The comp-off engine: the hooks the attendance service calls.
//!
//! [`CompOffEngine`] owns the collaborators and serializes every
//! read-decide-write sequence:
//!
//! - [`CompOffEngine::write_session`] is the full write path. It marks the
//!   session, persists it, and on the first clock-out derives the overtime
//!   record, all under the lock for the session's employee and date. A failed
//!   derivation rolls the clock-out back.
//! - [`CompOffEngine::on_attendance_write`] and [`CompOffEngine::on_clock_out`]
//!   expose the two steps separately for services that persist sessions
//!   themselves.
//! - [`CompOffEngine::run_backfill`] reconciles historical sessions.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use compoff_engine::config::CompOffPolicy;
//! use compoff_engine::engine::CompOffEngine;
//! use compoff_engine::models::{AttendanceSession, Employee, HolidaySet};
//! use compoff_engine::store::{
//!     InMemoryAttendanceStore, InMemoryEmployeeDirectory, InMemoryOvertimeStore,
//! };
//! use chrono::NaiveDateTime;
//! use rust_decimal::Decimal;
//!
//! let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
//! let employees = InMemoryEmployeeDirectory::new()
//!     .with_employee(Employee::new("EMP001", "asha@example.com", "Asha Rao"));
//! let engine = CompOffEngine::new(
//!     CompOffPolicy::default(),
//!     Arc::new(HolidaySet::new()),
//!     Arc::new(employees),
//!     Arc::new(InMemoryAttendanceStore::new()),
//!     Arc::new(InMemoryOvertimeStore::new()),
//! )
//! .unwrap();
//!
//! // 2026-01-18 is a Sunday
//! let written = engine
//!     .write_session(AttendanceSession::clock_in("asha@example.com", at("2026-01-18 10:00:00")))
//!     .unwrap();
//! assert!(written.session.is_compoff_session);
//!
//! let mut session = written.session;
//! session.clock_out(at("2026-01-18 14:00:00")).unwrap();
//! let written = engine.write_session(session).unwrap();
//! let record = written.clock_out.unwrap().record().cloned().unwrap();
//! assert_eq!(record.extra_hours, Decimal::new(4, 0));
//! ```

mod key_lock;
mod stats;

pub use key_lock::KeyedLocks;
pub use stats::{EngineStats, StatsSnapshot};

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::calendar::{DayType, HolidayCalendar, WorkingDayClassifier};
use crate::config::{CompOffPolicy, ConfigLoader, EngineConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceId, AttendanceSession, CompOffSummary, DayKey};
use crate::rules::{
    ClockOutOutcome, MarkReason, evaluate_clock_out, is_eligible, mark_session, plan_backfill,
};
use crate::store::{AttendanceStore, EmployeeDirectory, OvertimeStore};

/// The result of [`CompOffEngine::write_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// The session as persisted, with its id and comp-off flag.
    pub session: AttendanceSession,
    /// What the overtime generator did, if this write was the first clock-out.
    pub clock_out: Option<ClockOutOutcome>,
}

/// Counts from one backfill run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    /// Clocked-out sessions examined.
    pub scanned: usize,
    /// Sessions flagged because they fall on a non-working day.
    pub flagged_non_working: usize,
    /// Sessions flagged as additional sessions of a working day.
    pub flagged_multi_session: usize,
    /// Clocked-out sessions that were already flagged.
    pub already_flagged: usize,
    /// Overtime records derived for eligible sessions that had none.
    pub records_created: usize,
    /// Eligible sessions skipped because no employee matched.
    pub skipped_unknown_employee: usize,
    /// Eligible sessions skipped because they have no working hours.
    pub skipped_missing_hours: usize,
}

/// Hosts the comp-off hooks over the attendance service's stores.
pub struct CompOffEngine {
    policy: CompOffPolicy,
    classifier: WorkingDayClassifier,
    holidays: Arc<dyn HolidayCalendar>,
    employees: Arc<dyn EmployeeDirectory>,
    attendance: Arc<dyn AttendanceStore>,
    overtime: Arc<dyn OvertimeStore>,
    day_locks: KeyedLocks<DayKey>,
    record_locks: KeyedLocks<AttendanceId>,
    stats: EngineStats,
}

impl std::fmt::Debug for CompOffEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompOffEngine")
            .field("policy", &self.policy)
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}

impl CompOffEngine {
    /// Creates an engine over the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if the policy fails validation.
    pub fn new(
        policy: CompOffPolicy,
        holidays: Arc<dyn HolidayCalendar>,
        employees: Arc<dyn EmployeeDirectory>,
        attendance: Arc<dyn AttendanceStore>,
        overtime: Arc<dyn OvertimeStore>,
    ) -> EngineResult<Self> {
        ConfigLoader::validate(&policy)?;

        Ok(Self {
            classifier: WorkingDayClassifier::new(policy.calendar.clone()),
            policy,
            holidays,
            employees,
            attendance,
            overtime,
            day_locks: KeyedLocks::new(),
            record_locks: KeyedLocks::new(),
            stats: EngineStats::default(),
        })
    }

    /// Creates an engine from loaded configuration, using its holiday list.
    pub fn from_config(
        config: EngineConfig,
        employees: Arc<dyn EmployeeDirectory>,
        attendance: Arc<dyn AttendanceStore>,
        overtime: Arc<dyn OvertimeStore>,
    ) -> EngineResult<Self> {
        let holidays = Arc::new(config.holidays().clone());
        Self::new(
            config.policy().clone(),
            holidays,
            employees,
            attendance,
            overtime,
        )
    }

    /// Returns the policy in use.
    pub fn policy(&self) -> &CompOffPolicy {
        &self.policy
    }

    /// Returns the engine counters.
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Classifies `date` against the configured calendar and holidays.
    pub fn classify(&self, date: NaiveDate) -> DayType {
        self.classifier.classify(date, self.holidays.as_ref())
    }

    /// Marks a session that is about to be written.
    ///
    /// Call before persisting every insert and update. The returned session
    /// is the one to persist. Under [`crate::rules::MultiSessionPolicy::WholeGroup`]
    /// earlier siblings are flagged in the store as well.
    ///
    /// The day lock is released on return, before the caller persists the
    /// session, so two callers writing the same employee and date can both
    /// see the same siblings. Sibling counting and persistence are serialized
    /// only through [`CompOffEngine::write_session`]; callers of this hook
    /// must serialize their own writes per employee and date, or run
    /// [`CompOffEngine::run_backfill`] afterwards.
    pub fn on_attendance_write(&self, session: AttendanceSession) -> EngineResult<AttendanceSession> {
        let key = session.day_key();
        self.day_locks.with_lock(&key, || self.apply_marker(session))
    }

    /// Derives the overtime record for a session that has just clocked out.
    ///
    /// Call once, after persisting the write that first set the logout time.
    /// Returns what the generator did; a created record has been stored.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSession`] if the session is unsaved or
    /// not clocked out, and [`EngineError::DuplicateOvertimeRecord`] if the
    /// store reports a record inserted behind the engine's back.
    pub fn on_clock_out(&self, session: &AttendanceSession) -> EngineResult<ClockOutOutcome> {
        let attendance_id = session.id.ok_or_else(|| EngineError::InvalidSession {
            id: session.display_id(),
            message: "session must be persisted before clock-out processing".to_string(),
        })?;

        self.record_locks
            .with_lock(&attendance_id, || self.derive_record(attendance_id, session))
    }

    /// Marks, persists and, on the first clock-out, derives the overtime record
    /// for one session write.
    ///
    /// A session without an id is inserted; a session with an id replaces the
    /// stored one. The employee and date of a stored session cannot change.
    /// A flag already set on the stored session is kept.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionNotFound`] if the id is unknown and
    /// [`EngineError::InvalidSession`] if the update moves the session to
    /// another employee or date. If deriving the record fails on the first
    /// clock-out, the stored session is restored to its previous state
    /// before the error is returned, so the write can be retried. A
    /// [`EngineError::DuplicateOvertimeRecord`] leaves the clock-out in place.
    pub fn write_session(&self, mut session: AttendanceSession) -> EngineResult<WriteOutcome> {
        let key = session.day_key();
        self.day_locks.with_lock(&key, || {
            let previous = match session.id {
                Some(id) => {
                    let stored = self
                        .attendance
                        .get(id)?
                        .ok_or(EngineError::SessionNotFound { id })?;
                    if stored.day_key() != key {
                        return Err(EngineError::InvalidSession {
                            id: id.to_string(),
                            message: "employee and date cannot change on update".to_string(),
                        });
                    }
                    Some(stored)
                }
                None => None,
            };

            if previous.as_ref().is_some_and(|p| p.is_compoff_session) {
                session.is_compoff_session = true;
            }

            let marked = self.apply_marker(session)?;
            let stored = match &previous {
                Some(_) => {
                    self.attendance.update(&marked)?;
                    marked
                }
                None => self.attendance.insert(marked)?,
            };

            let first_clock_out = stored.is_clocked_out()
                && previous.as_ref().is_some_and(|p| !p.is_clocked_out());
            let clock_out = match (&previous, first_clock_out) {
                (Some(previous), true) => match self.on_clock_out(&stored) {
                    Ok(outcome) => Some(outcome),
                    // The record exists, so the clock-out stands
                    Err(err @ EngineError::DuplicateOvertimeRecord { .. }) => return Err(err),
                    Err(err) => {
                        self.attendance.update(previous)?;
                        warn!(
                            attendance_id = %stored.display_id(),
                            error = %err,
                            "Overtime derivation failed, clock-out rolled back"
                        );
                        return Err(err);
                    }
                },
                _ => None,
            };

            Ok(WriteOutcome {
                session: stored,
                clock_out,
            })
        })
    }

    /// Reconciles every clocked-out session with the marking rules and
    /// derives any missing overtime records.
    ///
    /// Flags are only ever added and records are only created when absent,
    /// so running it again leaves the stores unchanged.
    pub fn run_backfill(&self) -> EngineResult<BackfillReport> {
        let sessions = self.attendance.all_sessions()?;
        let plan = plan_backfill(&sessions, |date| self.classify(date), self.policy.multi_session);

        let mut report = BackfillReport {
            scanned: plan.scanned,
            already_flagged: plan.already_flagged,
            flagged_non_working: self.flag_days(&plan.non_working)?,
            flagged_multi_session: self.flag_days(&plan.multi_session)?,
            ..BackfillReport::default()
        };

        for session in self.attendance.all_sessions()? {
            if !session.is_clocked_out() || !is_eligible(self.classify(session.date), &session) {
                continue;
            }
            match self.on_clock_out(&session)? {
                ClockOutOutcome::Created(_) => report.records_created += 1,
                ClockOutOutcome::UnknownEmployee => report.skipped_unknown_employee += 1,
                ClockOutOutcome::MissingWorkingHours => report.skipped_missing_hours += 1,
                ClockOutOutcome::AlreadyRecorded | ClockOutOutcome::NotEligible => {}
            }
        }

        info!(
            scanned = report.scanned,
            flagged_non_working = report.flagged_non_working,
            flagged_multi_session = report.flagged_multi_session,
            already_flagged = report.already_flagged,
            records_created = report.records_created,
            skipped_unknown_employee = report.skipped_unknown_employee,
            "Backfill completed"
        );

        Ok(report)
    }

    /// Comp-off totals for an employee as of `today`.
    pub fn summary_for(&self, emp_code: &str, today: NaiveDate) -> EngineResult<CompOffSummary> {
        let records = self.overtime.for_employee(emp_code)?;
        Ok(CompOffSummary::from_records(&records, today))
    }

    /// Runs the marker. The caller holds the day lock.
    fn apply_marker(&self, session: AttendanceSession) -> EngineResult<AttendanceSession> {
        let day_type = self.classify(session.date);
        let employee = self.employees.lookup_employee(&session.employee_email);
        let siblings = self
            .attendance
            .sessions_on(&session.employee_email, session.date)?;
        let was_flagged = session.is_compoff_session;

        let outcome = mark_session(
            session,
            employee.as_ref(),
            day_type,
            &siblings,
            self.policy.multi_session,
        );

        if outcome.reason == MarkReason::UnknownEmployee {
            self.stats.unknown_employee();
            warn!(
                attendance_id = %outcome.session.display_id(),
                employee_email = %outcome.session.employee_email,
                "No employee found, session not marked"
            );
        }

        if outcome.session.is_compoff_session && !was_flagged {
            self.stats.add_flagged(1);
            info!(
                attendance_id = %outcome.session.display_id(),
                employee_email = %outcome.session.employee_email,
                date = %outcome.session.date,
                reason = ?outcome.reason,
                "Session marked as comp-off session"
            );
        }

        if !outcome.siblings_to_flag.is_empty() {
            let flagged = self.attendance.mark_compoff(&outcome.siblings_to_flag)?;
            self.stats.add_flagged(flagged as u64);
            info!(
                employee_email = %outcome.session.employee_email,
                date = %outcome.session.date,
                siblings = flagged,
                "Sibling sessions marked as comp-off sessions"
            );
        }

        debug!(
            rule_id = %outcome.evaluation.rule_id,
            reasoning = %outcome.evaluation.reasoning,
            "Marker evaluated"
        );

        Ok(outcome.session)
    }

    /// Runs the generator. The caller holds the record lock.
    fn derive_record(
        &self,
        attendance_id: AttendanceId,
        session: &AttendanceSession,
    ) -> EngineResult<ClockOutOutcome> {
        let employee = self.employees.lookup_employee(&session.employee_email);
        let day_type = self.classify(session.date);
        let already_recorded = self.overtime.find_by_attendance(attendance_id)?.is_some();

        let evaluation = evaluate_clock_out(
            session,
            employee.as_ref(),
            day_type,
            already_recorded,
            &self.policy,
            Utc::now(),
        )?;

        match &evaluation.outcome {
            ClockOutOutcome::Created(record) => match self.overtime.insert(record.clone()) {
                Ok(()) => {
                    self.stats.record_created();
                    info!(
                        attendance_id,
                        emp_code = %record.emp_code,
                        work_date = %record.work_date,
                        day_type = %record.day_type,
                        extra_hours = %record.extra_hours,
                        comp_off_days = %record.comp_off_days,
                        "Overtime record created"
                    );
                }
                Err(err @ EngineError::DuplicateOvertimeRecord { .. }) => {
                    warn!(attendance_id, error = %err, "Overtime record conflict");
                    return Err(err);
                }
                Err(err) => return Err(err),
            },
            ClockOutOutcome::UnknownEmployee => {
                self.stats.unknown_employee();
                warn!(
                    attendance_id,
                    employee_email = %session.employee_email,
                    "No employee found, overtime record skipped"
                );
            }
            ClockOutOutcome::AlreadyRecorded => {
                self.stats.duplicate_prevented();
                debug!(attendance_id, "Overtime record already exists");
            }
            ClockOutOutcome::MissingWorkingHours => {
                self.stats.missing_working_hours();
                warn!(attendance_id, "Clock-out without working hours, overtime record skipped");
            }
            ClockOutOutcome::NotEligible => {
                debug!(attendance_id, reasoning = %evaluation.evaluation.reasoning, "Not eligible");
            }
        }

        Ok(evaluation.outcome)
    }

    /// Flags planned sessions day by day under each day's lock.
    fn flag_days(&self, days: &BTreeMap<DayKey, Vec<AttendanceId>>) -> EngineResult<usize> {
        let mut flagged = 0;
        for (key, ids) in days {
            let changed = self
                .day_locks
                .with_lock(key, || self.attendance.mark_compoff(ids))?;
            if changed > 0 {
                info!(
                    employee_email = %key.employee_email,
                    date = %key.date,
                    sessions = changed,
                    "Backfill marked sessions as comp-off sessions"
                );
            }
            flagged += changed;
        }
        self.stats.add_flagged(flagged as u64);
        Ok(flagged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, Holiday, HolidaySet};
    use crate::rules::MultiSessionPolicy;
    use crate::store::{InMemoryAttendanceStore, InMemoryEmployeeDirectory, InMemoryOvertimeStore};
    use crate::models::OvertimeRecord;
    use chrono::NaiveDateTime;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    struct Fixture {
        engine: CompOffEngine,
        attendance: Arc<InMemoryAttendanceStore>,
        overtime: Arc<InMemoryOvertimeStore>,
    }

    fn fixture(policy: CompOffPolicy) -> Fixture {
        let holidays: HolidaySet = vec![Holiday {
            date: make_date("2026-01-26"),
            name: "Republic Day".to_string(),
        }]
        .into_iter()
        .collect();
        let employees = InMemoryEmployeeDirectory::new()
            .with_employee(Employee::new("EMP001", "asha@example.com", "Asha Rao"));
        let attendance = Arc::new(InMemoryAttendanceStore::new());
        let overtime = Arc::new(InMemoryOvertimeStore::new());

        let engine = CompOffEngine::new(
            policy,
            Arc::new(holidays),
            Arc::new(employees),
            attendance.clone(),
            overtime.clone(),
        )
        .unwrap();

        Fixture {
            engine,
            attendance,
            overtime,
        }
    }

    /// Overtime store whose first `failures` inserts fail with a storage error.
    struct FlakyOvertimeStore {
        inner: InMemoryOvertimeStore,
        failures: AtomicUsize,
    }

    impl OvertimeStore for FlakyOvertimeStore {
        fn find_by_attendance(
            &self,
            attendance_id: AttendanceId,
        ) -> EngineResult<Option<OvertimeRecord>> {
            self.inner.find_by_attendance(attendance_id)
        }

        fn insert(&self, record: OvertimeRecord) -> EngineResult<()> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(EngineError::Storage {
                    message: "overtime table unavailable".to_string(),
                });
            }
            self.inner.insert(record)
        }

        fn for_employee(&self, emp_code: &str) -> EngineResult<Vec<OvertimeRecord>> {
            self.inner.for_employee(emp_code)
        }

        fn all_records(&self) -> EngineResult<Vec<OvertimeRecord>> {
            self.inner.all_records()
        }
    }

    /// Overtime store that never finds a record but rejects every insert as
    /// a duplicate, as when another writer got there first.
    #[derive(Default)]
    struct ConflictingOvertimeStore {
        inserts: AtomicUsize,
    }

    impl OvertimeStore for ConflictingOvertimeStore {
        fn find_by_attendance(&self, _: AttendanceId) -> EngineResult<Option<OvertimeRecord>> {
            Ok(None)
        }

        fn insert(&self, record: OvertimeRecord) -> EngineResult<()> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            Err(EngineError::DuplicateOvertimeRecord {
                attendance_id: record.attendance_id,
            })
        }

        fn for_employee(&self, _: &str) -> EngineResult<Vec<OvertimeRecord>> {
            Ok(Vec::new())
        }

        fn all_records(&self) -> EngineResult<Vec<OvertimeRecord>> {
            Ok(Vec::new())
        }
    }

    fn engine_with_overtime(
        overtime: Arc<dyn OvertimeStore>,
    ) -> (CompOffEngine, Arc<InMemoryAttendanceStore>) {
        let employees = InMemoryEmployeeDirectory::new()
            .with_employee(Employee::new("EMP001", "asha@example.com", "Asha Rao"));
        let attendance = Arc::new(InMemoryAttendanceStore::new());
        let engine = CompOffEngine::new(
            CompOffPolicy::default(),
            Arc::new(HolidaySet::new()),
            Arc::new(employees),
            attendance.clone(),
            overtime,
        )
        .unwrap();
        (engine, attendance)
    }

    fn clock_in(engine: &CompOffEngine, email: &str, date: &str, time: &str) -> AttendanceSession {
        engine
            .write_session(AttendanceSession::clock_in(email, make_datetime(date, time)))
            .unwrap()
            .session
    }

    fn clock_out(engine: &CompOffEngine, mut session: AttendanceSession, time: &str) -> WriteOutcome {
        let date = session.date.format("%Y-%m-%d").to_string();
        session.clock_out(make_datetime(&date, time)).unwrap();
        engine.write_session(session).unwrap()
    }

    // ==========================================================================
    // write_session
    // ==========================================================================

    #[test]
    fn test_holiday_session_creates_record_on_clock_out() {
        let f = fixture(CompOffPolicy::default());

        let session = clock_in(&f.engine, "asha@example.com", "2026-01-26", "10:00:00");
        assert!(session.is_compoff_session);

        let outcome = clock_out(&f.engine, session, "17:00:00");
        let record = outcome.clock_out.unwrap().record().cloned().unwrap();
        assert_eq!(record.day_type, DayType::NonWorking);
        assert_eq!(record.extra_hours, dec("7.00"));
        assert_eq!(record.comp_off_days, dec("1"));
        assert_eq!(f.overtime.len().unwrap(), 1);
    }

    #[test]
    fn test_single_working_day_session_creates_nothing() {
        let f = fixture(CompOffPolicy::default());

        let session = clock_in(&f.engine, "asha@example.com", "2026-01-14", "09:00:00");
        assert!(!session.is_compoff_session);

        let outcome = clock_out(&f.engine, session, "19:00:00");
        assert_eq!(outcome.clock_out, Some(ClockOutOutcome::NotEligible));
        assert!(f.overtime.is_empty().unwrap());
    }

    #[test]
    fn test_second_session_is_flagged_first_is_not() {
        let f = fixture(CompOffPolicy::default());

        let first = clock_in(&f.engine, "asha@example.com", "2026-01-14", "09:00:00");
        let first = clock_out(&f.engine, first, "17:00:00").session;
        let second = clock_in(&f.engine, "asha@example.com", "2026-01-14", "18:00:00");
        assert!(second.is_compoff_session);

        // Re-saving the first session does not flag it
        let resaved = f.engine.write_session(first.clone()).unwrap();
        assert!(!resaved.session.is_compoff_session);
        assert!(resaved.clock_out.is_none());

        let outcome = clock_out(&f.engine, second, "20:00:00");
        let record = outcome.clock_out.unwrap().record().cloned().unwrap();
        assert_eq!(record.standard_hours, dec("8.0"));
        assert_eq!(record.extra_hours, dec("-6.00"));
        assert_eq!(record.comp_off_days, Decimal::ZERO);
    }

    #[test]
    fn test_whole_group_flags_earlier_sibling() {
        let f = fixture(CompOffPolicy {
            multi_session: MultiSessionPolicy::WholeGroup,
            ..CompOffPolicy::default()
        });

        let first = clock_in(&f.engine, "asha@example.com", "2026-01-14", "09:00:00");
        clock_in(&f.engine, "asha@example.com", "2026-01-14", "18:00:00");

        let stored_first = f.attendance.get(first.id.unwrap()).unwrap().unwrap();
        assert!(stored_first.is_compoff_session);
    }

    #[test]
    fn test_stored_flag_survives_stale_update() {
        let f = fixture(CompOffPolicy::default());

        let session = clock_in(&f.engine, "asha@example.com", "2026-01-18", "10:00:00");
        let mut stale = session.clone();
        stale.is_compoff_session = false;

        let written = f.engine.write_session(stale).unwrap();
        assert!(written.session.is_compoff_session);
    }

    #[test]
    fn test_second_clock_out_does_not_rerun_generator() {
        let f = fixture(CompOffPolicy::default());

        let session = clock_in(&f.engine, "asha@example.com", "2026-01-18", "10:00:00");
        let closed = clock_out(&f.engine, session, "14:00:00").session;

        let mut corrected = closed;
        corrected
            .clock_out(make_datetime("2026-01-18", "15:00:00"))
            .unwrap();
        let outcome = f.engine.write_session(corrected).unwrap();

        assert!(outcome.clock_out.is_none());
        let records = f.overtime.all_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].actual_hours, dec("4.00"));
    }

    #[test]
    fn test_update_unknown_id_returns_error() {
        let f = fixture(CompOffPolicy::default());
        let mut session = AttendanceSession::clock_in(
            "asha@example.com",
            make_datetime("2026-01-14", "09:00:00"),
        );
        session.id = Some(41);

        match f.engine.write_session(session) {
            Err(EngineError::SessionNotFound { id }) => assert_eq!(id, 41),
            other => panic!("Expected SessionNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_update_cannot_move_session_to_another_day() {
        let f = fixture(CompOffPolicy::default());
        let mut session = clock_in(&f.engine, "asha@example.com", "2026-01-14", "09:00:00");
        session.date = make_date("2026-01-15");

        assert!(matches!(
            f.engine.write_session(session),
            Err(EngineError::InvalidSession { .. })
        ));
    }

    #[test]
    fn test_unknown_employee_is_left_alone() {
        let f = fixture(CompOffPolicy::default());

        let session = clock_in(&f.engine, "ghost@example.com", "2026-01-18", "10:00:00");
        assert!(!session.is_compoff_session);

        let outcome = clock_out(&f.engine, session, "14:00:00");
        assert_eq!(outcome.clock_out, Some(ClockOutOutcome::UnknownEmployee));
        assert!(f.overtime.is_empty().unwrap());
        // Two marker passes and one generator pass
        assert_eq!(f.engine.stats().snapshot().unknown_employees, 3);
    }

    #[test]
    fn test_backdated_insert_yields_one_record_per_day() {
        let f = fixture(CompOffPolicy::default());

        let late = clock_in(&f.engine, "asha@example.com", "2026-01-14", "18:00:00");
        let early = clock_in(&f.engine, "asha@example.com", "2026-01-14", "09:00:00");
        assert!(!late.is_compoff_session);
        assert!(!early.is_compoff_session);

        let late = clock_out(&f.engine, late, "20:00:00");
        let early = clock_out(&f.engine, early, "17:00:00");
        assert!(late.session.is_compoff_session);
        assert!(!early.session.is_compoff_session);
        assert_eq!(early.clock_out, Some(ClockOutOutcome::NotEligible));

        let records = f.overtime.all_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].attendance_id, late.session.id.unwrap());
    }

    #[test]
    fn test_failed_derivation_rolls_back_clock_out() {
        let overtime = Arc::new(FlakyOvertimeStore {
            inner: InMemoryOvertimeStore::new(),
            failures: AtomicUsize::new(1),
        });
        let (engine, attendance) = engine_with_overtime(overtime.clone());

        let mut session = clock_in(&engine, "asha@example.com", "2026-01-18", "10:00:00");
        session
            .clock_out(make_datetime("2026-01-18", "15:00:00"))
            .unwrap();

        let result = engine.write_session(session.clone());
        assert!(matches!(result, Err(EngineError::Storage { .. })));
        let stored = attendance.get(session.id.unwrap()).unwrap().unwrap();
        assert!(stored.logout_time.is_none());
        assert!(stored.working_hours.is_none());

        // Retrying the same write derives the record
        let retried = engine.write_session(session).unwrap();
        let record = retried.clock_out.unwrap().record().cloned().unwrap();
        assert_eq!(record.extra_hours, dec("5.00"));
        assert_eq!(overtime.inner.len().unwrap(), 1);
        assert_eq!(engine.stats().snapshot().records_created, 1);
    }

    #[test]
    fn test_duplicate_conflict_is_surfaced_without_retry() {
        let overtime = Arc::new(ConflictingOvertimeStore::default());
        let (engine, attendance) = engine_with_overtime(overtime.clone());

        let mut session = AttendanceSession::clock_in(
            "asha@example.com",
            make_datetime("2026-01-18", "10:00:00"),
        );
        session
            .clock_out(make_datetime("2026-01-18", "14:00:00"))
            .unwrap();
        let session = attendance.insert(session).unwrap();

        match engine.on_clock_out(&session) {
            Err(EngineError::DuplicateOvertimeRecord { attendance_id }) => {
                assert_eq!(Some(attendance_id), session.id)
            }
            other => panic!("Expected DuplicateOvertimeRecord error, got {:?}", other),
        }
        assert_eq!(overtime.inserts.load(Ordering::SeqCst), 1);
        assert_eq!(engine.stats().snapshot().records_created, 0);
    }

    #[test]
    fn test_duplicate_conflict_keeps_clock_out() {
        let overtime = Arc::new(ConflictingOvertimeStore::default());
        let (engine, attendance) = engine_with_overtime(overtime.clone());

        let mut session = clock_in(&engine, "asha@example.com", "2026-01-18", "10:00:00");
        session
            .clock_out(make_datetime("2026-01-18", "14:00:00"))
            .unwrap();

        assert!(matches!(
            engine.write_session(session.clone()),
            Err(EngineError::DuplicateOvertimeRecord { .. })
        ));
        let stored = attendance.get(session.id.unwrap()).unwrap().unwrap();
        assert!(stored.is_clocked_out());
        assert_eq!(overtime.inserts.load(Ordering::SeqCst), 1);
    }

    // ==========================================================================
    // on_clock_out
    // ==========================================================================

    #[test]
    fn test_on_clock_out_is_idempotent() {
        let f = fixture(CompOffPolicy::default());
        let session = clock_in(&f.engine, "asha@example.com", "2026-01-18", "10:00:00");
        let closed = clock_out(&f.engine, session, "14:00:00").session;

        let again = f.engine.on_clock_out(&closed).unwrap();
        assert_eq!(again, ClockOutOutcome::AlreadyRecorded);
        assert_eq!(f.overtime.len().unwrap(), 1);
        assert_eq!(f.engine.stats().snapshot().duplicates_prevented, 1);
    }

    #[test]
    fn test_on_clock_out_requires_persisted_session() {
        let f = fixture(CompOffPolicy::default());
        let mut session = AttendanceSession::clock_in(
            "asha@example.com",
            make_datetime("2026-01-18", "10:00:00"),
        );
        session
            .clock_out(make_datetime("2026-01-18", "12:00:00"))
            .unwrap();

        assert!(matches!(
            f.engine.on_clock_out(&session),
            Err(EngineError::InvalidSession { .. })
        ));
    }

    #[test]
    fn test_missing_working_hours_skips_record() {
        let f = fixture(CompOffPolicy::default());
        let mut session = clock_in(&f.engine, "asha@example.com", "2026-01-18", "10:00:00");
        session.logout_time = Some(make_datetime("2026-01-18", "14:00:00"));

        let outcome = f.engine.write_session(session).unwrap();
        assert_eq!(outcome.clock_out, Some(ClockOutOutcome::MissingWorkingHours));
        assert!(f.overtime.is_empty().unwrap());
    }

    // ==========================================================================
    // Backfill and summary
    // ==========================================================================

    #[test]
    fn test_backfill_flags_and_derives_missing_records() {
        let f = fixture(CompOffPolicy::default());

        // Written directly, bypassing the hooks
        let mut sunday = AttendanceSession::clock_in(
            "asha@example.com",
            make_datetime("2026-01-18", "10:00:00"),
        );
        sunday
            .clock_out(make_datetime("2026-01-18", "16:30:00"))
            .unwrap();
        f.attendance.insert(sunday).unwrap();

        let report = f.engine.run_backfill().unwrap();
        assert_eq!(report.scanned, 1);
        assert_eq!(report.flagged_non_working, 1);
        assert_eq!(report.records_created, 1);

        let records = f.overtime.all_records().unwrap();
        assert_eq!(records[0].extra_hours, dec("6.50"));
        assert_eq!(records[0].comp_off_days, dec("1"));
    }

    #[test]
    fn test_summary_for_employee() {
        let f = fixture(CompOffPolicy::default());
        let session = clock_in(&f.engine, "asha@example.com", "2026-01-18", "10:00:00");
        clock_out(&f.engine, session, "14:00:00");

        let summary = f
            .engine
            .summary_for("EMP001", make_date("2026-02-01"))
            .unwrap();
        assert_eq!(summary.total_records, 1);
        assert_eq!(summary.eligible_records, 1);
        assert_eq!(summary.total_eligible_comp_days, dec("0.5"));
        assert_eq!(summary.total_eligible_extra_hours, dec("4.00"));

        // Past expiry (2026-04-18)
        let later = f
            .engine
            .summary_for("EMP001", make_date("2026-05-01"))
            .unwrap();
        assert_eq!(later.eligible_records, 0);
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let holidays: Arc<dyn HolidayCalendar> = Arc::new(HolidaySet::new());
        let result = CompOffEngine::new(
            CompOffPolicy {
                expiry_days: 0,
                ..CompOffPolicy::default()
            },
            holidays,
            Arc::new(InMemoryEmployeeDirectory::new()),
            Arc::new(InMemoryAttendanceStore::new()),
            Arc::new(InMemoryOvertimeStore::new()),
        );

        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }
}
