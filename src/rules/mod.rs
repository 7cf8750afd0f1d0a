//! Comp-off eligibility rules.
//!
//! This module contains the pure rule logic: marking sessions as comp-off
//! sessions, deriving overtime records at clock-out, grading extra hours into
//! comp-off days, and planning the historical backfill. None of these
//! functions touch storage; the [`crate::engine`] module wires them to the
//! stores and serializes their read-decide-write sequences.

mod backfill;
mod comp_off_days;
mod overtime_generator;
mod session_marker;

pub use backfill::{BackfillPlan, plan_backfill};
pub use comp_off_days::comp_off_days;
pub use overtime_generator::{
    ClockOutEvaluation, ClockOutOutcome, build_overtime_record, evaluate_clock_out, is_eligible,
};
pub use session_marker::{MarkOutcome, MarkReason, MultiSessionPolicy, mark_session};
