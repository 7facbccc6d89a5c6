//! # Oozebane G-Code
//!
//! Turns the extruder off before the end of each thread and on before the
//! beginning of the next one, stepping the feedrate down and up around
//! those transitions so the deposited line keeps its width.
//!
//! The job is classified into an indexable array of [`GcodeLine`]s, then
//! the [`Skein`] walks it line by line, querying the [`BoundaryScanner`]
//! for distances to the nearest extruder on/off commands and inserting the
//! ramp waypoints described by the [`RampProfile`].

pub mod command;
pub mod filter;
pub mod parser;
pub mod profile;
pub mod scanner;
pub mod skein;
pub mod writer;

pub use command::{Boundary, Command, GcodeLine, HeaderParameter};
pub use filter::{
    chain_gcode, FilterChain, FilterHandle, GcodeFilter, OozebaneFilter, UPSTREAM_PROCEDURE,
};
pub use parser::{is_procedure_done, GcodeParser, JobHeader, PROCEDURE_NAME};
pub use profile::RampProfile;
pub use scanner::BoundaryScanner;
pub use skein::{oozebane_gcode, RampState, Skein, SkeinPhase, SkeinReport, SkeinState};
pub use writer::GcodeWriter;
