//! Comp-off and overtime eligibility engine.
//!
//! This crate classifies calendar days, marks attendance sessions that earn
//! compensatory off, and derives exactly one overtime entitlement record per
//! session on its first clock-out. The attendance service drives it through
//! the hooks on [`engine::CompOffEngine`].

#![warn(missing_docs)]

pub mod calendar;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod rules;
pub mod store;
