//! Configuration loading and management for the comp-off engine.
//!
//! This module loads the comp-off policy and the organisation holiday list
//! from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use compoff_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/compoff").unwrap();
//! println!("Standard hours: {}", config.policy().standard_hours);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{CompOffPolicy, EngineConfig, HolidaysConfig};
