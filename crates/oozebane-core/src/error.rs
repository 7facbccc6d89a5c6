//! Error handling for oozebane
//!
//! Provides error types for the layers of the filter:
//! - G-Code errors (malformed lines, missing header parameters)
//! - Filter errors (chaining, upstream procedures)
//!
//! All error types use `thiserror` for ergonomic error handling.
//! G-Code errors are diagnostics: the skein degrades the offending line
//! instead of aborting, and reports the error through logging.

use thiserror::Error;

/// G-Code error type
///
/// Represents problems found while classifying a G-Code job.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcodeError {
    /// A numeric word of a recognized command could not be parsed
    #[error("Invalid number '{word}' at line {line_number}")]
    InvalidNumber {
        /// The line number (1-based) where the word was found.
        line_number: usize,
        /// The offending word, e.g. `X1.2.3`.
        word: String,
    },

    /// The header carries no `(<extrusionWidth> ...)` parameter
    #[error("Extrusion width missing from the header")]
    MissingExtrusionWidth,

    /// The job has no `(<extrusionStart> )` line
    #[error("Extrusion start missing, the job has no body")]
    MissingExtrusionStart,

    /// Generic G-Code error
    #[error("G-Code error: {message}")]
    Other {
        /// The error message.
        message: String,
    },
}

/// Filter error type
///
/// Represents errors raised while running a filter or a chain of filters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// A required upstream procedure failed
    #[error("Upstream procedure '{procedure}' failed: {reason}")]
    Upstream {
        /// The upstream procedure name.
        procedure: String,
        /// The reason given by the upstream filter.
        reason: String,
    },

    /// Generic filter error
    #[error("Filter error: {message}")]
    Other {
        /// The error message.
        message: String,
    },
}

/// Main error type for oozebane
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Filter error
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a G-Code error
    pub fn is_gcode_error(&self) -> bool {
        matches!(self, Error::Gcode(_))
    }

    /// Check if this is a filter error
    pub fn is_filter_error(&self) -> bool {
        matches!(self, Error::Filter(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
