//! # Oozebane
//!
//! G-code filter that turns the extruder off before the end of each thread
//! and on before the beginning of the next one, ramping the feedrate around
//! both transitions so the deposited line keeps its width.
//!
//! ## Architecture
//!
//! Oozebane is organized as a workspace with multiple crates:
//!
//! 1. **oozebane-core** - Locations and the error taxonomy
//! 2. **oozebane-settings** - User parameters and their persistence
//! 3. **oozebane-gcode** - Classifier, boundary scanner, ramps, skein driver
//! 4. **oozebane** - Command-line front end that integrates all crates

pub mod cli;

pub use oozebane_core::{Error, FilterError, GcodeError, Location, Result};
pub use oozebane_gcode::{
    chain_gcode, is_procedure_done, oozebane_gcode, FilterChain, GcodeFilter, OozebaneFilter,
    Skein, SkeinReport, PROCEDURE_NAME, UPSTREAM_PROCEDURE,
};
pub use oozebane_settings::{OozebaneSettings, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging on stderr, so filtered G-code can go to
/// stdout, honouring the RUST_LOG environment variable. The default level
/// is INFO, or DEBUG when `verbose` is set.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_level(true)
        .with_line_number(verbose);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
