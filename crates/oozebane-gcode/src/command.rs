//! G-Code command model
//!
//! One [`GcodeLine`] per input line: the original text, its 1-based line
//! number and the classified [`Command`].

use oozebane_core::Location;
use serde::{Deserialize, Serialize};

/// Header parameters carried by `(<name> value )` comments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HeaderParameter {
    /// `(<extrusionWidth> W )`
    ExtrusionWidth(f64),
    /// `(<decimalPlacesCarried> N )`
    DecimalPlaces(usize),
    /// `(<extrusionStart> )`, the end of the header region
    ExtrusionStart,
}

/// Extruder state transitions that bound a thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Boundary {
    /// M101
    ExtruderOn,
    /// M103
    ExtruderOff,
}

impl Boundary {
    /// Opcode text of this boundary
    pub fn opcode(&self) -> &'static str {
        match self {
            Self::ExtruderOn => "M101",
            Self::ExtruderOff => "M103",
        }
    }
}

impl std::fmt::Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.opcode())
    }
}

/// A classified line of the command stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// G1 with its resolved target and optional feedrate (units per minute)
    LinearMove {
        location: Location,
        feedrate: Option<f64>,
    },
    /// M101
    ExtruderOn,
    /// M103
    ExtruderOff,
    /// A recognized header comment
    InitParameter(HeaderParameter),
    /// `(<procedureDone> NAME )`
    CompletionMarker(String),
    /// Anything else, passed through verbatim
    Opaque(String),
}

impl Command {
    /// The boundary this command represents, if any
    pub fn boundary(&self) -> Option<Boundary> {
        match self {
            Self::ExtruderOn => Some(Boundary::ExtruderOn),
            Self::ExtruderOff => Some(Boundary::ExtruderOff),
            _ => None,
        }
    }
}

/// One line of the job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcodeLine {
    /// Line number in the input (1-based)
    pub number: usize,
    /// Original text, without the line terminator
    pub text: String,
    /// Classified command
    pub command: Command,
}

impl GcodeLine {
    /// Create a line from its parts
    pub fn new(number: usize, text: impl Into<String>, command: Command) -> Self {
        Self {
            number,
            text: text.into(),
            command,
        }
    }
}
