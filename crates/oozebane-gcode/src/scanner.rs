//! Boundary scanner
//!
//! Read-only distance queries over the classified job. Every scan is
//! bounded: it stops at the first disqualifying event, either an explicit
//! distance ceiling, the other boundary opcode, or the end of the job.

use crate::command::{Boundary, Command, GcodeLine};
use oozebane_core::Location;

/// Distance queries around a line of the job
#[derive(Debug, Clone, Copy)]
pub struct BoundaryScanner<'a> {
    lines: &'a [GcodeLine],
    floor: usize,
}

impl<'a> BoundaryScanner<'a> {
    /// Scanner over `lines`; backward scans never go below `floor`
    pub fn new(lines: &'a [GcodeLine], floor: usize) -> Self {
        Self {
            lines,
            floor: floor.min(lines.len()),
        }
    }

    /// Distance travelled from `start` until `target` appears after line `from`
    ///
    /// Returns `None` if the travelled distance reaches `ceiling` first, if
    /// the other boundary appears first, or if the job ends first.
    pub fn distance_to_opcode(
        &self,
        from: usize,
        start: Location,
        target: Boundary,
        ceiling: f64,
    ) -> Option<f64> {
        let mut total = 0.0;
        let mut last = start;
        for line in self.lines.iter().skip(from + 1) {
            match &line.command {
                Command::LinearMove { location, .. } => {
                    total += last.distance(location);
                    last = *location;
                    if total >= ceiling {
                        return None;
                    }
                }
                command => match command.boundary() {
                    Some(boundary) if boundary == target => return Some(total),
                    Some(_) => return None,
                    None => {}
                },
            }
        }
        None
    }

    /// Distance travelled since the extruder was last turned on
    ///
    /// Scans backward from `to_location`, the target of line `to_index`,
    /// up to the location where the last extruder on took effect. Returns
    /// `None` if `ceiling` is exceeded first or no extruder on precedes.
    pub fn distance_after_last_on(
        &self,
        to_index: usize,
        to_location: Location,
        ceiling: f64,
    ) -> Option<f64> {
        let mut total = 0.0;
        let mut last = to_location;
        let mut on_reached = false;
        let end = to_index.clamp(self.floor, self.lines.len());
        for line in self.lines[self.floor..end].iter().rev() {
            match &line.command {
                Command::LinearMove { location, .. } => {
                    total += last.distance(location);
                    last = *location;
                    if total > ceiling {
                        return None;
                    }
                    if on_reached {
                        return Some(total);
                    }
                }
                Command::ExtruderOn => on_reached = true,
                _ => {}
            }
        }
        None
    }

    /// Index of the extruder on following line `from` before any move or off
    pub fn next_extruder_on(&self, from: usize) -> Option<usize> {
        for (index, line) in self.lines.iter().enumerate().skip(from + 1) {
            match line.command {
                Command::ExtruderOn => return Some(index),
                Command::LinearMove { .. } | Command::ExtruderOff => return None,
                _ => {}
            }
        }
        None
    }

    /// Check if an extruder on comes before the next move after line `from`
    pub fn is_extruder_on_before_next_move(&self, from: usize) -> bool {
        self.next_extruder_on(from).is_some()
    }

    /// Idle distance from `start` to the next extruder on after line `from`
    ///
    /// Saturates at `ceiling`; when the job ends first the distance travelled
    /// up to the end is returned.
    pub fn idle_distance_to_on(&self, from: usize, start: Location, ceiling: f64) -> f64 {
        let mut total = 0.0;
        let mut last = start;
        for line in self.lines.iter().skip(from + 1) {
            match &line.command {
                Command::LinearMove { location, .. } => {
                    total += last.distance(location);
                    last = *location;
                    if total >= ceiling {
                        return ceiling;
                    }
                }
                Command::ExtruderOn => return total,
                _ => {}
            }
        }
        total
    }
}
