//! Command-line front end
//!
//! Usage:
//!   oozebane <input.gcode> [-o <output.gcode>] [-c <settings.toml>]
//!   oozebane <input.gcode> --stdout
//!   oozebane --write-default-config [-c <settings.toml>]

use anyhow::{Context, Result};
use clap::Parser;
use oozebane_gcode::{is_procedure_done, OozebaneFilter, SkeinReport, UPSTREAM_PROCEDURE};
use oozebane_settings::OozebaneSettings;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Suffix appended to the input stem for the default output file
const OUTPUT_SUFFIX: &str = "_oozebane.gcode";

/// Turn the extruder off early and on early, ramping the feedrate around both
#[derive(Parser, Debug)]
#[command(name = "oozebane")]
#[command(author, version = env!("OOZEBANE_LONG_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Input G-code file
    #[arg(value_name = "INPUT", required_unless_present = "write_default_config")]
    pub input: Option<PathBuf>,

    /// Output G-code file (default: <input stem>_oozebane.gcode)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Settings file, JSON or TOML (default: the platform config directory)
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Write the result to stdout instead of a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,

    /// Save the default settings to the settings path and exit
    #[arg(long)]
    pub write_default_config: bool,

    /// Write a JSON summary of the changes to this file
    #[arg(long, value_name = "REPORT")]
    pub report: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Default output path: `<input stem>_oozebane.gcode` next to the input
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}{}", stem, OUTPUT_SUFFIX))
}

fn settings_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => OozebaneSettings::default_path().context("Failed to locate the settings file"),
    }
}

fn load_settings(cli: &Cli) -> Result<OozebaneSettings> {
    match &cli.config {
        Some(path) => OozebaneSettings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(OozebaneSettings::load_or_default(&settings_path(cli)?)),
    }
}

/// Run the command line
///
/// Returns the job report, or `None` when only the settings were written.
pub fn run(cli: &Cli) -> Result<Option<SkeinReport>> {
    if cli.write_default_config {
        let path = settings_path(cli)?;
        OozebaneSettings::default()
            .save_to_file(&path)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        println!("Wrote default settings to {}", path.display());
        return Ok(None);
    }

    let input = cli.input.as_deref().context("No input file given")?;
    let settings = load_settings(cli)?;
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    if !is_procedure_done(&text, UPSTREAM_PROCEDURE) {
        tracing::debug!(
            "{} carries no {} marker, filtering it as is",
            input.display(),
            UPSTREAM_PROCEDURE
        );
    }

    let start = Instant::now();
    let (output, report) = OozebaneFilter::new(settings).apply_with_report(&text);
    tracing::info!(
        "{} oozebaned in {} ms",
        input.display(),
        start.elapsed().as_millis()
    );

    if cli.stdout {
        std::io::stdout()
            .write_all(output.as_bytes())
            .context("Failed to write to stdout")?;
    } else {
        let path = cli
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(input));
        fs::write(&path, &output)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Wrote {}", path.display());
    }

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/tmp/parts/cube.gcode")),
            PathBuf::from("/tmp/parts/cube_oozebane.gcode")
        );
        assert_eq!(
            default_output_path(Path::new("cube")),
            PathBuf::from("cube_oozebane.gcode")
        );
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::parse_from(["oozebane", "cube.gcode", "-o", "out.gcode", "-v"]);
        assert_eq!(cli.input, Some(PathBuf::from("cube.gcode")));
        assert_eq!(cli.output, Some(PathBuf::from("out.gcode")));
        assert!(cli.verbose);
        assert!(!cli.stdout);
    }

    #[test]
    fn test_input_required() {
        assert!(Cli::try_parse_from(["oozebane"]).is_err());
        assert!(Cli::try_parse_from(["oozebane", "--write-default-config"]).is_ok());
        assert!(Cli::try_parse_from(["oozebane", "a.gcode", "--stdout", "-o", "b"]).is_err());
    }
}
