//! # Oozebane Core
//!
//! Core types and error handling shared by the oozebane crates.
//! Provides the `Location` value used by the command model and the
//! error taxonomy used by the filter and its settings.

pub mod error;
pub mod location;

pub use error::{Error, FilterError, GcodeError, Result};
pub use location::Location;
