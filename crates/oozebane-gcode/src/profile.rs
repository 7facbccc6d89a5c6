//! Ramp profile built once per job
//!
//! All distances scale with the extrusion width of the job. The shutdown
//! thresholds decrease towards the thread end and the startup thresholds
//! increase away from the thread start; each threshold carries the flow
//! multiplier applied to the feedrate of the waypoint emitted there.

use oozebane_core::Location;
use oozebane_settings::OozebaneSettings;

/// Number of distance constants past which the early startup distance is
/// indistinguishable from its maximum
pub const IDLE_SATURATION_CONSTANTS: f64 = 40.0;

/// Precomputed thresholds and flow multipliers for one job
#[derive(Debug, Clone, PartialEq)]
pub struct RampProfile {
    /// Distance over which flow ramps up after a thread starts
    pub after_startup_distance: f64,
    /// Distance before a thread end at which the extruder is turned off
    pub early_shutdown_distance: f64,
    /// Upper bound of the early startup distance
    pub early_startup_maximum_distance: f64,
    /// Idle distance scale of the early startup model
    pub early_startup_distance_constant: f64,
    /// Squared tolerance under which two locations coincide
    pub close_squared: f64,
    /// Number of steps per ramp, at least one
    pub steps: usize,
    /// Feedrate before the job sets one
    pub default_feedrate: f64,
    /// Shutdown distance threshold per step, decreasing
    pub shutdown_distances: Vec<f64>,
    /// Shutdown flow multiplier per step, decreasing
    pub shutdown_flow_rates: Vec<f64>,
    /// Startup distance threshold per step, increasing
    pub startup_distances: Vec<f64>,
    /// Startup flow multiplier per step, increasing and ending at 1.0
    pub startup_flow_rates: Vec<f64>,
    /// Flow multiplier of the move right before an extruder on
    pub after_startup_flow_rate: f64,
}

impl RampProfile {
    /// Build the profile for a job of the given extrusion width
    pub fn new(settings: &OozebaneSettings, extrusion_width: f64) -> Self {
        let steps = settings.effective_steps();
        let mut profile = Self {
            after_startup_distance: extrusion_width
                * settings.after_startup_distance_over_extrusion_width,
            early_shutdown_distance: extrusion_width
                * settings.early_shutdown_distance_over_extrusion_width,
            early_startup_maximum_distance: extrusion_width
                * settings.early_startup_maximum_distance_over_extrusion_width,
            early_startup_distance_constant: extrusion_width
                * settings.early_startup_distance_constant_over_extrusion_width,
            close_squared: 0.01 * extrusion_width * extrusion_width,
            steps,
            default_feedrate: settings.default_feedrate_per_minute,
            shutdown_distances: Vec::with_capacity(steps),
            shutdown_flow_rates: Vec::with_capacity(steps),
            startup_distances: Vec::with_capacity(steps),
            startup_flow_rates: Vec::with_capacity(steps),
            after_startup_flow_rate: 0.0,
        };

        let steps_f = steps as f64;
        for step in 0..steps {
            let along = step as f64 / steps_f;
            profile
                .shutdown_distances
                .push((1.0 - along) * profile.early_shutdown_distance);
            profile
                .shutdown_flow_rates
                .push(profile.shutdown_multiplier(along));
            profile
                .startup_distances
                .push((step + 1) as f64 / steps_f * profile.after_startup_distance);
            if step == 0 {
                profile.after_startup_flow_rate = profile.startup_multiplier(along);
            } else {
                profile
                    .startup_flow_rates
                    .push(profile.startup_multiplier(along));
            }
        }
        profile.startup_flow_rates.push(1.0);

        profile
    }

    /// Flow multiplier at fraction `along` of the shutdown ramp
    pub fn shutdown_multiplier(&self, along: f64) -> f64 {
        let steps = self.steps as f64;
        1.0 - 0.5 / steps - along.min((steps - 1.0) / steps)
    }

    /// Flow multiplier at fraction `along` of the startup ramp
    pub fn startup_multiplier(&self, along: f64) -> f64 {
        (0.5 / self.steps as f64 + along).min(1.0)
    }

    /// How early the extruder is turned back on after `idle_distance` of travel
    pub fn early_startup_distance(&self, idle_distance: f64) -> f64 {
        if idle_distance <= 0.0 {
            return 0.0;
        }
        let maximum = self.early_startup_maximum_distance;
        let fraction = if self.early_startup_distance_constant > 0.0 {
            -(-idle_distance / self.early_startup_distance_constant).exp_m1()
        } else {
            1.0
        };
        // 1 - e^-k rounds to 1.0 long before the saturation cap
        if maximum > 0.0 {
            (maximum * fraction).min(maximum.next_down())
        } else {
            maximum * fraction
        }
    }

    /// Idle distance past which [`Self::early_startup_distance`] saturates
    pub fn idle_saturation_distance(&self) -> f64 {
        IDLE_SATURATION_CONSTANTS * self.early_startup_distance_constant
    }

    /// Check if two locations coincide within tolerance
    pub fn is_close(&self, first: &Location, second: &Location) -> bool {
        first.distance_squared(second) < self.close_squared
    }

    /// Waypoint `distance_back` before `to` on the segment `from -> to`
    ///
    /// Returns `None` when the segment is degenerate, when the point would
    /// fall outside the segment, or when it coincides with either endpoint.
    pub fn waypoint(&self, from: &Location, to: &Location, distance_back: f64) -> Option<Location> {
        let segment_length = from.distance(to);
        if segment_length <= 0.0 || distance_back < 0.0 || distance_back > segment_length {
            return None;
        }
        let location = to.back_towards(from, distance_back)?;
        if self.is_close(&location, from) || self.is_close(&location, to) {
            return None;
        }
        Some(location)
    }
}
