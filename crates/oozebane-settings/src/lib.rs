//! Oozebane Settings Crate
//!
//! Handles the user-configurable oozebane parameters and their persistence.

pub mod config;
pub mod error;

pub use config::{OozebaneSettings, MAX_RAMP_STEPS};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
