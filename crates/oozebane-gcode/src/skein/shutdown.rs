//! Shutdown ramp generation

use super::SkeinJob;
use crate::command::{Boundary, GcodeLine};
use oozebane_core::Location;

impl SkeinJob<'_> {
    /// Distance from `location` to the thread end, within the current shutdown threshold
    pub(super) fn distance_thread_end(&self, location: Location) -> Option<f64> {
        let step = self.state.ramp.shutdown_step()?;
        self.scanner.distance_to_opcode(
            self.state.line_index,
            location,
            Boundary::ExtruderOff,
            self.profile.shutdown_distances[step],
        )
    }

    /// Step the flow down along the last moves of a thread
    pub(super) fn shutdown_slowdown_lines(
        &mut self,
        line: &GcodeLine,
        old: Location,
        location: Location,
    ) -> String {
        let first = self.distance_thread_end(location);
        while let Some(distance) = self.distance_thread_end(location) {
            let Some(step) = self.state.ramp.shutdown_step() else {
                break;
            };
            self.add_shutdown_slowdown_line(step, distance, old, location);
            self.state.ramp.advance(self.profile.steps);
        }

        match first {
            Some(distance) if distance > 0.0 => {
                let along = 1.0 - distance / self.profile.early_shutdown_distance;
                let text = self.writer.linear_move(
                    &location,
                    self.state.feedrate * self.profile.shutdown_multiplier(along),
                );
                if self.state.shutdown_needed {
                    self.output.push(&text);
                    self.set_shutdown_emitted(line.number);
                    return Boundary::ExtruderOff.opcode().to_string();
                }
                text
            }
            _ => line.text.clone(),
        }
    }

    fn add_shutdown_slowdown_line(
        &mut self,
        step: usize,
        distance: f64,
        old: Location,
        location: Location,
    ) {
        let distance_back = self.profile.shutdown_distances[step] - distance;
        if step == 0 {
            self.state.shutdown_needed = true;
        }
        let Some(waypoint) = self.profile.waypoint(&old, &location, distance_back) else {
            return;
        };

        self.emit_move(&waypoint, self.profile.shutdown_flow_rates[step]);
        self.counts.waypoints += 1;
        if self.state.shutdown_needed {
            self.output.push(Boundary::ExtruderOff.opcode());
            self.set_shutdown_emitted(self.lines[self.state.line_index].number);
        }
    }

    fn set_shutdown_emitted(&mut self, line_number: usize) {
        self.state.shutdown_needed = false;
        self.state.shutdown_early = true;
        self.counts.early_offs += 1;
        tracing::debug!("Line {}: extruder off emitted early", line_number);
    }
}
