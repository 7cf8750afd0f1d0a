//! In-memory store implementations.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceId, AttendanceSession, Employee, OvertimeRecord};

use super::{AttendanceStore, EmployeeDirectory, OvertimeStore};

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> EngineResult<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| EngineError::Storage {
        message: format!("{} lock poisoned", what),
    })
}

/// Employee directory backed by a map keyed by email.
#[derive(Debug, Default)]
pub struct InMemoryEmployeeDirectory {
    employees: HashMap<String, Employee>,
}

impl InMemoryEmployeeDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an employee.
    pub fn with_employee(mut self, employee: Employee) -> Self {
        self.employees.insert(employee.emp_email.clone(), employee);
        self
    }
}

impl FromIterator<Employee> for InMemoryEmployeeDirectory {
    fn from_iter<I: IntoIterator<Item = Employee>>(iter: I) -> Self {
        Self {
            employees: iter
                .into_iter()
                .map(|e| (e.emp_email.clone(), e))
                .collect(),
        }
    }
}

impl EmployeeDirectory for InMemoryEmployeeDirectory {
    fn lookup_employee(&self, email: &str) -> Option<Employee> {
        self.employees.get(email).cloned()
    }
}

#[derive(Debug, Default)]
struct AttendanceTable {
    next_id: AttendanceId,
    sessions: BTreeMap<AttendanceId, AttendanceSession>,
}

/// Attendance store backed by a mutex-guarded map. Ids start at 1.
#[derive(Debug, Default)]
pub struct InMemoryAttendanceStore {
    table: Mutex<AttendanceTable>,
}

impl InMemoryAttendanceStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttendanceStore for InMemoryAttendanceStore {
    fn get(&self, id: AttendanceId) -> EngineResult<Option<AttendanceSession>> {
        Ok(lock(&self.table, "attendance")?.sessions.get(&id).cloned())
    }

    fn insert(&self, mut session: AttendanceSession) -> EngineResult<AttendanceSession> {
        let mut table = lock(&self.table, "attendance")?;
        table.next_id += 1;
        let id = table.next_id;
        session.id = Some(id);
        table.sessions.insert(id, session.clone());
        Ok(session)
    }

    fn update(&self, session: &AttendanceSession) -> EngineResult<()> {
        let id = session.id.ok_or_else(|| EngineError::InvalidSession {
            id: session.display_id(),
            message: "cannot update a session that was never inserted".to_string(),
        })?;

        let mut table = lock(&self.table, "attendance")?;
        match table.sessions.get_mut(&id) {
            Some(stored) => {
                *stored = session.clone();
                Ok(())
            }
            None => Err(EngineError::SessionNotFound { id }),
        }
    }

    fn sessions_on(
        &self,
        employee_email: &str,
        date: NaiveDate,
    ) -> EngineResult<Vec<AttendanceSession>> {
        Ok(lock(&self.table, "attendance")?
            .sessions
            .values()
            .filter(|s| s.employee_email == employee_email && s.date == date)
            .cloned()
            .collect())
    }

    fn all_sessions(&self) -> EngineResult<Vec<AttendanceSession>> {
        Ok(lock(&self.table, "attendance")?
            .sessions
            .values()
            .cloned()
            .collect())
    }

    fn mark_compoff(&self, ids: &[AttendanceId]) -> EngineResult<usize> {
        let mut table = lock(&self.table, "attendance")?;
        let mut changed = 0;
        for id in ids {
            let session = table
                .sessions
                .get_mut(id)
                .ok_or(EngineError::SessionNotFound { id: *id })?;
            if !session.is_compoff_session {
                session.is_compoff_session = true;
                changed += 1;
            }
        }
        Ok(changed)
    }
}

/// Overtime store backed by a mutex-guarded map keyed by attendance id.
#[derive(Debug, Default)]
pub struct InMemoryOvertimeStore {
    records: Mutex<BTreeMap<AttendanceId, OvertimeRecord>>,
}

impl InMemoryOvertimeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> EngineResult<usize> {
        Ok(lock(&self.records, "overtime")?.len())
    }

    /// Returns true if no record is stored.
    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl OvertimeStore for InMemoryOvertimeStore {
    fn find_by_attendance(
        &self,
        attendance_id: AttendanceId,
    ) -> EngineResult<Option<OvertimeRecord>> {
        Ok(lock(&self.records, "overtime")?.get(&attendance_id).cloned())
    }

    fn insert(&self, record: OvertimeRecord) -> EngineResult<()> {
        let mut records = lock(&self.records, "overtime")?;
        if records.contains_key(&record.attendance_id) {
            return Err(EngineError::DuplicateOvertimeRecord {
                attendance_id: record.attendance_id,
            });
        }
        records.insert(record.attendance_id, record);
        Ok(())
    }

    fn for_employee(&self, emp_code: &str) -> EngineResult<Vec<OvertimeRecord>> {
        Ok(lock(&self.records, "overtime")?
            .values()
            .filter(|r| r.emp_code == emp_code)
            .cloned()
            .collect())
    }

    fn all_records(&self) -> EngineResult<Vec<OvertimeRecord>> {
        Ok(lock(&self.records, "overtime")?.values().cloned().collect())
    }
}
