//! Skein driver
//!
//! Walks the job body line by line. Each move is routed to the handler of
//! the current [`SkeinPhase`]; extruder on/off lines update the cursor and
//! are suppressed when a ramp has already emitted them earlier.

mod shutdown;
mod startup;
mod state;

pub use state::{RampState, SkeinPhase, SkeinState};

use crate::command::{Boundary, Command, GcodeLine};
use crate::parser::{GcodeParser, JobHeader, PROCEDURE_NAME};
use crate::profile::RampProfile;
use crate::scanner::BoundaryScanner;
use crate::writer::GcodeWriter;
use oozebane_core::{GcodeError, Location};
use oozebane_settings::OozebaneSettings;
use serde::Serialize;

/// Summary of one processed job
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SkeinReport {
    /// Lines read
    pub input_lines: usize,
    /// Lines written
    pub output_lines: usize,
    /// Interpolated waypoints inserted
    pub waypoints: usize,
    /// Extruder offs emitted before the thread end
    pub early_offs: usize,
    /// Extruder ons emitted before the thread start
    pub early_ons: usize,
    /// Startup ramps armed
    pub startup_ramps: usize,
    /// Malformed lines passed through unchanged
    pub degraded_lines: usize,
    /// Whether the job already carried the completion marker
    pub already_processed: bool,
    /// Extrusion width declared by the header
    pub extrusion_width: Option<f64>,
}

/// The oozebane transform
#[derive(Debug, Clone, Default)]
pub struct Skein {
    settings: OozebaneSettings,
}

impl Skein {
    /// Create a skein with the given settings
    pub fn new(settings: OozebaneSettings) -> Self {
        Self { settings }
    }

    /// Settings in use
    pub fn settings(&self) -> &OozebaneSettings {
        &self.settings
    }

    /// Transform a job
    pub fn process(&self, text: &str) -> String {
        self.process_with_report(text).0
    }

    /// Transform a job and report what was changed
    pub fn process_with_report(&self, text: &str) -> (String, SkeinReport) {
        let mut report = SkeinReport::default();
        if text.is_empty() {
            return (String::new(), report);
        }

        let mut parser = GcodeParser::new();
        let lines = parser.parse_all(text);
        report.input_lines = lines.len();
        report.degraded_lines = parser.diagnostics().len();

        let header = JobHeader::scan(&lines);
        report.extrusion_width = header.extrusion_width;

        if header.is_done(PROCEDURE_NAME) {
            tracing::info!("Job already carries the oozebane marker, leaving it unchanged");
            report.already_processed = true;
            report.output_lines = report.input_lines;
            return (text.to_string(), report);
        }
        if !self.settings.activate {
            tracing::debug!("Oozebane is deactivated, leaving the job unchanged");
            report.output_lines = report.input_lines;
            return (text.to_string(), report);
        }
        let Some(extrusion_start) = header.extrusion_start else {
            tracing::warn!("{}; leaving the job unchanged", GcodeError::MissingExtrusionStart);
            report.output_lines = report.input_lines;
            return (text.to_string(), report);
        };

        let mut output = Output::default();
        for line in &lines[..extrusion_start] {
            output.push(&line.text);
        }
        output.push(&GcodeWriter::procedure_done(PROCEDURE_NAME));
        output.push(&lines[extrusion_start].text);

        match header.extrusion_width {
            Some(width) => {
                let mut job = SkeinJob::new(
                    &lines,
                    extrusion_start,
                    RampProfile::new(&self.settings, width),
                    GcodeWriter::new(header.decimal_places),
                    output,
                );
                for index in extrusion_start + 1..lines.len() {
                    job.process_line(index);
                }
                output = job.finish(&mut report);
            }
            None => {
                tracing::warn!("{}; passing the body through", GcodeError::MissingExtrusionWidth);
                for line in &lines[extrusion_start + 1..] {
                    output.push(&line.text);
                }
            }
        }

        report.output_lines = output.lines;
        tracing::info!(
            input_lines = report.input_lines,
            output_lines = report.output_lines,
            waypoints = report.waypoints,
            early_offs = report.early_offs,
            early_ons = report.early_ons,
            startup_ramps = report.startup_ramps,
            degraded_lines = report.degraded_lines,
            extrusion_width = report.extrusion_width,
            "Oozebane finished"
        );
        (output.text, report)
    }
}

/// Transform a job with the given settings
pub fn oozebane_gcode(text: &str, settings: &OozebaneSettings) -> String {
    Skein::new(settings.clone()).process(text)
}

/// Output text under construction
#[derive(Debug, Default)]
struct Output {
    text: String,
    lines: usize,
}

impl Output {
    fn push(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
        self.lines += 1;
    }
}

/// One job body being transformed
struct SkeinJob<'a> {
    lines: &'a [GcodeLine],
    scanner: BoundaryScanner<'a>,
    profile: RampProfile,
    writer: GcodeWriter,
    state: SkeinState,
    output: Output,
    counts: SkeinReport,
}

impl<'a> SkeinJob<'a> {
    fn new(
        lines: &'a [GcodeLine],
        extrusion_start: usize,
        profile: RampProfile,
        writer: GcodeWriter,
        output: Output,
    ) -> Self {
        let feedrate = profile.default_feedrate;
        Self {
            lines,
            scanner: BoundaryScanner::new(lines, extrusion_start),
            profile,
            writer,
            state: SkeinState::new(extrusion_start, feedrate),
            output,
            counts: SkeinReport::default(),
        }
    }

    fn finish(self, report: &mut SkeinReport) -> Output {
        report.waypoints = self.counts.waypoints;
        report.early_offs = self.counts.early_offs;
        report.early_ons = self.counts.early_ons;
        report.startup_ramps = self.counts.startup_ramps;
        self.output
    }

    fn process_line(&mut self, index: usize) {
        self.state.line_index = index;
        let lines = self.lines;
        let line = &lines[index];

        match &line.command {
            Command::LinearMove { location, feedrate } => {
                if let Some(feedrate) = feedrate {
                    self.state.feedrate = *feedrate;
                }
                self.set_early_startup_distance(*location);
                let text = self.oozebane_move(line, *location);
                self.output.push(&text);
                self.state.old_location = Some(*location);
            }
            Command::ExtruderOn => self.extruder_on(line),
            Command::ExtruderOff => self.extruder_off(line),
            _ => self.output.push(&line.text),
        }
    }

    fn oozebane_move(&mut self, line: &GcodeLine, location: Location) -> String {
        let Some(old) = self.state.old_location else {
            return line.text.clone();
        };
        match self.state.phase() {
            SkeinPhase::StartupRampActive => self.after_startup_lines(line, old, location),
            SkeinPhase::PreStartupPending => self.before_startup_lines(line, old, location),
            SkeinPhase::ShutdownRampActive => self.shutdown_slowdown_lines(line, old, location),
            SkeinPhase::PreShutdownCheck => self.just_before_start_line(line, location),
            SkeinPhase::Passthrough => line.text.clone(),
        }
    }

    fn extruder_on(&mut self, line: &GcodeLine) {
        self.state.extruder_active = true;
        self.state.inactive_long_enough = false;

        let location = self.state.old_location.unwrap_or_default();
        if self.distance_thread_end(location).is_none() {
            tracing::debug!("Line {}: shutdown tracking armed", line.number);
            self.state.ramp.arm_shutdown();
            self.state.shutdown_needed = true;
        }

        if self.state.startup_early {
            self.state.startup_early = false;
            return;
        }
        self.output.push(&line.text);
    }

    fn extruder_off(&mut self, line: &GcodeLine) {
        self.state.extruder_active = false;
        self.state.ramp.reset_shutdown();

        let location = self.state.old_location.unwrap_or_default();
        let upcoming_on = self.state.early_startup_distance.and_then(|distance| {
            self.scanner.distance_to_opcode(
                self.state.line_index,
                location,
                Boundary::ExtruderOn,
                distance,
            )
        });
        if upcoming_on.is_none() {
            self.state.inactive_long_enough = true;
        }
        self.state.early_startup_distance = None;

        if self.state.shutdown_early {
            self.state.shutdown_early = false;
            return;
        }
        self.output.push(&line.text);
    }

    /// Evaluate the early startup distance once per idle gap
    fn set_early_startup_distance(&mut self, location: Location) {
        if self.state.early_startup_distance.is_some() {
            return;
        }
        if self.state.extruder_active {
            self.state.early_startup_distance = Some(0.0);
            return;
        }

        let initial = self
            .state
            .old_location
            .map_or(0.0, |old| old.distance(&location));
        let saturation = self.profile.idle_saturation_distance();
        let idle = initial
            + self.scanner.idle_distance_to_on(
                self.state.line_index,
                location,
                (saturation - initial).max(0.0),
            );
        let distance = self.profile.early_startup_distance(idle.min(saturation));
        tracing::debug!(
            "Line {}: idle distance {:.3}, early startup distance {:.3}",
            self.lines[self.state.line_index].number,
            idle,
            distance
        );
        self.state.early_startup_distance = Some(distance);
    }

    fn emit_move(&mut self, location: &Location, flow_rate: f64) {
        let text = self
            .writer
            .linear_move(location, self.state.feedrate * flow_rate);
        self.output.push(&text);
    }
}
