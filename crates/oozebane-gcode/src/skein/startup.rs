//! Startup ramp generation

use super::{RampState, SkeinJob};
use crate::command::{Boundary, GcodeLine};
use oozebane_core::Location;

impl SkeinJob<'_> {
    /// Step the flow up along the first moves of a thread
    pub(super) fn after_startup_lines(
        &mut self,
        line: &GcodeLine,
        old: Location,
        location: Location,
    ) -> String {
        let ceiling = old.distance(&location) + self.profile.after_startup_distance;
        let Some(distance) =
            self.scanner
                .distance_after_last_on(self.state.line_index, location, ceiling)
        else {
            self.state.ramp.finish_startup();
            return line.text.clone();
        };

        while let Some(step) = self.state.ramp.startup_step() {
            let threshold = self.profile.startup_distances[step];
            if distance <= threshold {
                break;
            }
            if let Some(waypoint) = self.profile.waypoint(&old, &location, distance - threshold) {
                let flow_rate = self.profile.startup_flow_rates[step];
                self.emit_move(&waypoint, flow_rate);
                self.counts.waypoints += 1;
            }
            self.state.ramp.advance(self.profile.steps);
        }

        if self.state.ramp.startup_step().is_none() {
            return line.text.clone();
        }
        let along = if self.profile.after_startup_distance > 0.0 {
            distance / self.profile.after_startup_distance
        } else {
            1.0
        };
        self.writer.linear_move(
            &location,
            self.state.feedrate * self.profile.startup_multiplier(along),
        )
    }

    /// Turn the extruder on ahead of the thread start
    pub(super) fn before_startup_lines(
        &mut self,
        line: &GcodeLine,
        old: Location,
        location: Location,
    ) -> String {
        let early_startup_distance = self.state.early_startup_distance.unwrap_or(0.0);
        let distance = if early_startup_distance > 0.0 {
            self.scanner.distance_to_opcode(
                self.state.line_index,
                location,
                Boundary::ExtruderOn,
                early_startup_distance,
            )
        } else {
            None
        };
        let distance_back = match distance {
            Some(distance) => early_startup_distance - distance,
            None => return self.just_before_start_line(line, location),
        };
        // Already at the early startup point, the next move relocates it
        if distance_back * distance_back < self.profile.close_squared {
            return self.just_before_start_line(line, location);
        }

        self.state.inactive_long_enough = false;
        self.state.startup_early = true;
        if let Some(waypoint) = self.profile.waypoint(&old, &location, distance_back) {
            self.emit_move(&waypoint, 1.0);
            self.counts.waypoints += 1;
        }
        self.output.push(Boundary::ExtruderOn.opcode());
        self.counts.early_ons += 1;
        tracing::debug!(
            "Line {}: extruder on emitted {:.3} early",
            line.number,
            early_startup_distance
        );

        self.just_before_start_line(line, location)
    }

    /// Reduce the flow of the move right before an extruder on
    pub(super) fn just_before_start_line(&mut self, line: &GcodeLine, location: Location) -> String {
        if !self.is_just_before_start(location) {
            return line.text.clone();
        }
        self.writer.linear_move(
            &location,
            self.state.feedrate * self.profile.after_startup_flow_rate,
        )
    }

    /// Arm the startup ramp if the extruder turns on after the current move
    ///
    /// Only considered while the extruder is off. Threads too short for both
    /// ramps are left alone.
    fn is_just_before_start(&mut self, location: Location) -> bool {
        if self.state.extruder_active {
            return false;
        }
        let Some(on_index) = self.scanner.next_extruder_on(self.state.line_index) else {
            return false;
        };

        let minimum_thread =
            1.03 * (self.profile.early_shutdown_distance + self.profile.after_startup_distance);
        if self
            .scanner
            .distance_to_opcode(on_index, location, Boundary::ExtruderOff, minimum_thread)
            .is_some()
        {
            tracing::debug!(
                "Line {}: thread shorter than {:.3}, no startup ramp",
                self.lines[on_index].number,
                minimum_thread
            );
            return false;
        }

        self.state.ramp = RampState::Startup {
            step: 0,
            shutdown_armed: false,
        };
        self.counts.startup_ramps += 1;
        true
    }
}
