//! G-Code output rendering

use oozebane_core::Location;

/// Default number of decimal places carried by a job
pub const DEFAULT_DECIMAL_PLACES: usize = 3;

/// Renders generated commands at the job precision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcodeWriter {
    precision: usize,
}

impl GcodeWriter {
    /// Create a writer carrying `precision` decimal places
    pub fn new(precision: usize) -> Self {
        Self { precision }
    }

    /// Round a value to the configured precision
    pub fn round(&self, value: f64) -> f64 {
        let multiplier = 10_f64.powi(self.precision.min(15) as i32);
        let rounded = (value * multiplier).round() / multiplier;
        // -0 renders as "-0"
        if rounded == 0.0 {
            0.0
        } else {
            rounded
        }
    }

    /// Render a number at the configured precision, without trailing zeros
    pub fn format_number(&self, value: f64) -> String {
        format!("{}", self.round(value))
    }

    /// Render a linear move to `location` at `feedrate`
    pub fn linear_move(&self, location: &Location, feedrate: f64) -> String {
        format!(
            "G1 X{} Y{} Z{} F{}",
            self.format_number(location.x),
            self.format_number(location.y),
            self.format_number(location.z),
            self.format_number(feedrate)
        )
    }

    /// Render the completion marker of `procedure`
    pub fn procedure_done(procedure: &str) -> String {
        format!("(<procedureDone> {} )", procedure)
    }
}

impl Default for GcodeWriter {
    fn default() -> Self {
        Self::new(DEFAULT_DECIMAL_PLACES)
    }
}
