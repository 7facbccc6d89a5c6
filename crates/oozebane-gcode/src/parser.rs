//! Line classifier and job header scanning
//!
//! Classification is total: every line becomes exactly one [`Command`].
//! A recognized opcode carrying a malformed numeric word degrades to
//! [`Command::Opaque`] and is recorded as a [`GcodeError::InvalidNumber`]
//! diagnostic instead of failing the job.

use crate::command::{Command, GcodeLine, HeaderParameter};
use crate::writer::DEFAULT_DECIMAL_PLACES;
use oozebane_core::{GcodeError, Location};
use regex::Regex;
use std::sync::OnceLock;

/// Identity of this filter in completion markers
pub const PROCEDURE_NAME: &str = "oozebane";

const EXTRUSION_WIDTH: &str = "extrusionWidth";
const DECIMAL_PLACES: &str = "decimalPlacesCarried";
const EXTRUSION_START: &str = "extrusionStart";
const PROCEDURE_DONE: &str = "procedureDone";

fn header_regex() -> &'static Regex {
    static HEADER_REGEX: OnceLock<Regex> = OnceLock::new();
    HEADER_REGEX.get_or_init(|| {
        Regex::new(r"^\s*\(<(\w+)>\s*([^\s)]*)").expect("invalid regex pattern")
    })
}

/// Stateful line classifier
///
/// Tracks the current location so that moves omitting an axis resolve to
/// absolute targets, and collects diagnostics for degraded lines.
#[derive(Debug, Default)]
pub struct GcodeParser {
    location: Location,
    line_number: usize,
    diagnostics: Vec<GcodeError>,
}

impl GcodeParser {
    /// Create a parser positioned at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify every line of `text`
    pub fn parse_all(&mut self, text: &str) -> Vec<GcodeLine> {
        text.lines().map(|line| self.parse_line(line)).collect()
    }

    /// Classify one line
    pub fn parse_line(&mut self, text: &str) -> GcodeLine {
        self.line_number += 1;
        let command = self.classify(text);
        GcodeLine::new(self.line_number, text, command)
    }

    /// Diagnostics collected so far
    pub fn diagnostics(&self) -> &[GcodeError] {
        &self.diagnostics
    }

    fn classify(&mut self, text: &str) -> Command {
        let mut words = text.split_whitespace();
        let Some(first) = words.next() else {
            return Command::Opaque(text.to_string());
        };

        match first {
            "G1" => self.classify_move(text, words),
            "M101" => Command::ExtruderOn,
            "M103" => Command::ExtruderOff,
            _ if first.starts_with("(<") => classify_comment(text),
            _ => Command::Opaque(text.to_string()),
        }
    }

    fn classify_move<'a>(
        &mut self,
        text: &str,
        words: impl Iterator<Item = &'a str>,
    ) -> Command {
        let (mut x, mut y, mut z, mut feedrate) = (None, None, None, None);

        for word in words {
            if word.starts_with('(') || word.starts_with(';') {
                break;
            }
            let mut chars = word.chars();
            let slot = match chars.next() {
                Some('X') => &mut x,
                Some('Y') => &mut y,
                Some('Z') => &mut z,
                Some('F') => &mut feedrate,
                _ => continue,
            };
            match chars.as_str().parse::<f64>() {
                Ok(value) if value.is_finite() => *slot = Some(value),
                _ => {
                    let error = GcodeError::InvalidNumber {
                        line_number: self.line_number,
                        word: word.to_string(),
                    };
                    tracing::warn!("{}; passing the line through unchanged", error);
                    self.diagnostics.push(error);
                    return Command::Opaque(text.to_string());
                }
            }
        }

        self.location = self.location.with_axes(x, y, z);
        Command::LinearMove {
            location: self.location,
            feedrate,
        }
    }
}

fn classify_comment(text: &str) -> Command {
    let opaque = || Command::Opaque(text.to_string());
    let Some(captures) = header_regex().captures(text) else {
        return opaque();
    };
    let value = captures.get(2).map_or("", |m| m.as_str());

    match captures.get(1).map_or("", |m| m.as_str()) {
        EXTRUSION_WIDTH => match value.parse::<f64>() {
            Ok(width) if width.is_finite() && width > 0.0 => {
                Command::InitParameter(HeaderParameter::ExtrusionWidth(width))
            }
            _ => opaque(),
        },
        DECIMAL_PLACES => value
            .parse::<usize>()
            .map(|places| Command::InitParameter(HeaderParameter::DecimalPlaces(places)))
            .unwrap_or_else(|_| opaque()),
        EXTRUSION_START => Command::InitParameter(HeaderParameter::ExtrusionStart),
        PROCEDURE_DONE if !value.is_empty() => Command::CompletionMarker(value.to_string()),
        _ => opaque(),
    }
}

/// Job-level parameters collected from the header region
#[derive(Debug, Clone, PartialEq)]
pub struct JobHeader {
    /// Extrusion width, if the header declares one
    pub extrusion_width: Option<f64>,
    /// Decimal places carried on output
    pub decimal_places: usize,
    /// Index of the `(<extrusionStart> )` line
    pub extrusion_start: Option<usize>,
    /// Procedures whose completion markers appear in the header
    pub procedures_done: Vec<String>,
}

impl Default for JobHeader {
    fn default() -> Self {
        Self {
            extrusion_width: None,
            decimal_places: DEFAULT_DECIMAL_PLACES,
            extrusion_start: None,
            procedures_done: Vec::new(),
        }
    }
}

impl JobHeader {
    /// Scan the header region, up to and including the extrusion start line
    pub fn scan(lines: &[GcodeLine]) -> Self {
        let mut header = Self::default();
        for (index, line) in lines.iter().enumerate() {
            match &line.command {
                Command::InitParameter(HeaderParameter::ExtrusionWidth(width)) => {
                    header.extrusion_width = Some(*width);
                }
                Command::InitParameter(HeaderParameter::DecimalPlaces(places)) => {
                    header.decimal_places = *places;
                }
                Command::InitParameter(HeaderParameter::ExtrusionStart) => {
                    header.extrusion_start = Some(index);
                    break;
                }
                Command::CompletionMarker(procedure) => {
                    header.procedures_done.push(procedure.clone());
                }
                _ => {}
            }
        }
        header
    }

    /// Check whether `procedure` has already been applied
    pub fn is_done(&self, procedure: &str) -> bool {
        self.procedures_done.iter().any(|done| done == procedure)
    }
}

/// Check the header of `text` for the completion marker of `procedure`
///
/// Only the header region is searched, so markers quoted in the body do not
/// count.
pub fn is_procedure_done(text: &str, procedure: &str) -> bool {
    for line in text.lines() {
        match classify_comment(line) {
            Command::CompletionMarker(done) if done == procedure => return true,
            Command::InitParameter(HeaderParameter::ExtrusionStart) => return false,
            _ => {}
        }
    }
    false
}
