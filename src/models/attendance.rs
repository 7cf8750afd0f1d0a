//! Attendance session model.
//!
//! A session is created on clock-in and updated on clock-out by the
//! attendance service. The engine only ever augments `is_compoff_session`.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Identifier assigned to a session when it is first persisted.
pub type AttendanceId = u64;

/// The `(employee_email, date)` key that groups sibling sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayKey {
    /// The employee's email.
    pub employee_email: String,
    /// The calendar date of the sessions.
    pub date: NaiveDate,
}

/// One clock-in/clock-out session of an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSession {
    /// Persisted id; `None` until the session is first stored.
    pub id: Option<AttendanceId>,
    /// Email of the employee who clocked in.
    pub employee_email: String,
    /// The calendar date the session belongs to.
    pub date: NaiveDate,
    /// Clock-in time.
    pub login_time: NaiveDateTime,
    /// Clock-out time, once the employee has clocked out.
    pub logout_time: Option<NaiveDateTime>,
    /// Worked hours computed at clock-out.
    pub working_hours: Option<Decimal>,
    /// Whether this session earns comp-off.
    #[serde(default)]
    pub is_compoff_session: bool,
}

impl AttendanceSession {
    /// Creates an unsaved session for a clock-in at `login_time`.
    ///
    /// The session date is the date of `login_time`.
    ///
    /// # Examples
    ///
    /// ```
    /// use compoff_engine::models::AttendanceSession;
    /// use chrono::NaiveDateTime;
    ///
    /// let login = NaiveDateTime::parse_from_str("2026-01-14 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    /// let session = AttendanceSession::clock_in("asha@example.com", login);
    /// assert!(session.id.is_none());
    /// assert!(!session.is_clocked_out());
    /// assert!(!session.is_compoff_session);
    /// ```
    pub fn clock_in(employee_email: impl Into<String>, login_time: NaiveDateTime) -> Self {
        Self {
            id: None,
            employee_email: employee_email.into(),
            date: login_time.date(),
            login_time,
            logout_time: None,
            working_hours: None,
            is_compoff_session: false,
        }
    }

    /// Records a clock-out and computes the worked hours.
    ///
    /// Hours are the login/logout difference in whole minutes, rounded to two
    /// decimal places.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSession`] if `logout_time` is before the
    /// login time.
    ///
    /// # Examples
    ///
    /// ```
    /// use compoff_engine::models::AttendanceSession;
    /// use chrono::NaiveDateTime;
    /// use rust_decimal::Decimal;
    ///
    /// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
    /// let mut session = AttendanceSession::clock_in("asha@example.com", at("2026-01-14 09:00:00"));
    /// session.clock_out(at("2026-01-14 17:30:00")).unwrap();
    /// assert_eq!(session.working_hours, Some(Decimal::new(85, 1))); // 8.5 hours
    /// ```
    pub fn clock_out(&mut self, logout_time: NaiveDateTime) -> EngineResult<()> {
        let minutes = (logout_time - self.login_time).num_minutes();
        if minutes < 0 {
            return Err(EngineError::InvalidSession {
                id: self.display_id(),
                message: format!(
                    "logout time {} is before login time {}",
                    logout_time, self.login_time
                ),
            });
        }

        self.logout_time = Some(logout_time);
        self.working_hours = Some((Decimal::new(minutes, 0) / Decimal::new(60, 0)).round_dp(2));
        Ok(())
    }

    /// Returns true once a logout time has been recorded.
    pub fn is_clocked_out(&self) -> bool {
        self.logout_time.is_some()
    }

    /// Returns the key shared with this session's siblings.
    pub fn day_key(&self) -> DayKey {
        DayKey {
            employee_email: self.employee_email.clone(),
            date: self.date,
        }
    }

    /// Ordering of sessions within a day: clock-in time, then id.
    ///
    /// Unsaved sessions sort after every persisted session with the same
    /// login time.
    pub fn ordering_key(&self) -> (NaiveDateTime, AttendanceId) {
        (self.login_time, self.id.unwrap_or(AttendanceId::MAX))
    }

    /// The id as used in messages: the number, or `unsaved`.
    pub fn display_id(&self) -> String {
        self.id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unsaved".to_string())
    }
}
