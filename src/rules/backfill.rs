//! Backfill planning for historical sessions.
//!
//! Computes which clocked-out sessions must be flagged so that history agrees
//! with the live marker. The plan only ever adds flags, so applying it twice
//! leaves the data unchanged.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::calendar::DayType;
use crate::models::{AttendanceId, AttendanceSession, DayKey};

use super::MultiSessionPolicy;

/// Sessions the backfill will flag, grouped by the rule that applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillPlan {
    /// Clocked-out sessions examined.
    pub scanned: usize,
    /// Clocked-out sessions that were already flagged.
    pub already_flagged: usize,
    /// Sessions on non-working days, by day.
    pub non_working: BTreeMap<DayKey, Vec<AttendanceId>>,
    /// Additional sessions of multi-session working days, by day.
    pub multi_session: BTreeMap<DayKey, Vec<AttendanceId>>,
}

impl BackfillPlan {
    /// Returns true if nothing needs flagging.
    pub fn is_empty(&self) -> bool {
        self.non_working.is_empty() && self.multi_session.is_empty()
    }

    /// Number of sessions flagged because of a non-working day.
    pub fn non_working_count(&self) -> usize {
        self.non_working.values().map(Vec::len).sum()
    }

    /// Number of sessions flagged as additional same-day sessions.
    pub fn multi_session_count(&self) -> usize {
        self.multi_session.values().map(Vec::len).sum()
    }

    /// Every session to flag, grouped by day.
    pub fn by_day(&self) -> BTreeMap<DayKey, Vec<AttendanceId>> {
        let mut merged = self.non_working.clone();
        for (key, ids) in &self.multi_session {
            merged.entry(key.clone()).or_default().extend(ids);
        }
        merged
    }
}

/// Plans the backfill over `sessions`.
///
/// `sessions` should be every persisted session; open sessions count as
/// siblings but are never flagged. Within a day, sessions are ordered by
/// clock-in time then id, the same order the live marker uses.
///
/// # Example
///
/// ```
/// use compoff_engine::calendar::{classify, DayType};
/// use compoff_engine::models::AttendanceSession;
/// use compoff_engine::rules::{plan_backfill, MultiSessionPolicy};
/// use chrono::{NaiveDate, NaiveDateTime};
/// use std::collections::BTreeSet;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// // 2026-01-18 is a Sunday
/// let mut sunday = AttendanceSession::clock_in("asha@example.com", at("2026-01-18 10:00:00"));
/// sunday.id = Some(1);
/// sunday.clock_out(at("2026-01-18 14:00:00")).unwrap();
///
/// let holidays: BTreeSet<NaiveDate> = BTreeSet::new();
/// let plan = plan_backfill(&[sunday], |d| classify(d, &holidays), MultiSessionPolicy::default());
/// assert_eq!(plan.non_working_count(), 1);
/// ```
pub fn plan_backfill<F>(
    sessions: &[AttendanceSession],
    classify: F,
    policy: MultiSessionPolicy,
) -> BackfillPlan
where
    F: Fn(NaiveDate) -> DayType,
{
    let mut days: BTreeMap<DayKey, Vec<&AttendanceSession>> = BTreeMap::new();
    for session in sessions.iter().filter(|s| s.id.is_some()) {
        days.entry(session.day_key()).or_default().push(session);
    }

    let mut plan = BackfillPlan::default();
    for (key, mut group) in days {
        group.sort_by_key(|s| s.ordering_key());
        let day_type = classify(key.date);
        let multi = group.len() > 1;

        for (rank, session) in group.iter().enumerate() {
            if !session.is_clocked_out() {
                continue;
            }
            plan.scanned += 1;

            let Some(id) = session.id else { continue };
            if session.is_compoff_session {
                plan.already_flagged += 1;
                continue;
            }

            if !day_type.is_working() {
                plan.non_working.entry(key.clone()).or_default().push(id);
            } else if multi && (policy == MultiSessionPolicy::WholeGroup || rank >= 1) {
                plan.multi_session.entry(key.clone()).or_default().push(id);
            }
        }
    }

    plan
}
