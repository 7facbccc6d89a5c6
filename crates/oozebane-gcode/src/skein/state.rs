//! Per-job cursor state of the skein driver

use oozebane_core::Location;

/// Progress of the ramps
///
/// At most one ramp is active. A shutdown armed while the startup ramp is
/// still running takes over at step zero once the startup ramp completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RampState {
    /// No ramp in progress
    #[default]
    Idle,
    /// Ramping flow up after an extruder on
    Startup { step: usize, shutdown_armed: bool },
    /// Ramping flow down before an extruder off
    Shutdown { step: usize },
}

impl RampState {
    /// Current shutdown step, counting an armed shutdown as step zero
    pub fn shutdown_step(&self) -> Option<usize> {
        match *self {
            Self::Shutdown { step } => Some(step),
            Self::Startup {
                shutdown_armed: true,
                ..
            } => Some(0),
            _ => None,
        }
    }

    /// Current startup step
    pub fn startup_step(&self) -> Option<usize> {
        match *self {
            Self::Startup { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Arm shutdown tracking for the thread just started
    pub fn arm_shutdown(&mut self) {
        *self = match *self {
            Self::Startup { step, .. } => Self::Startup {
                step,
                shutdown_armed: true,
            },
            _ => Self::Shutdown { step: 0 },
        };
    }

    /// Drop shutdown tracking, keeping a running startup ramp
    pub fn reset_shutdown(&mut self) {
        *self = match *self {
            Self::Startup { step, .. } => Self::Startup {
                step,
                shutdown_armed: false,
            },
            _ => Self::Idle,
        };
    }

    /// Finish the startup ramp, handing over to an armed shutdown
    pub fn finish_startup(&mut self) {
        if let Self::Startup { shutdown_armed, .. } = *self {
            *self = if shutdown_armed {
                Self::Shutdown { step: 0 }
            } else {
                Self::Idle
            };
        }
    }

    /// Move the active ramp to its next step, completing it after `steps`
    pub fn advance(&mut self, steps: usize) {
        match *self {
            Self::Startup {
                step,
                shutdown_armed,
            } => {
                if step + 1 >= steps {
                    self.finish_startup();
                } else {
                    *self = Self::Startup {
                        step: step + 1,
                        shutdown_armed,
                    };
                }
            }
            Self::Shutdown { step } => {
                *self = if step + 1 >= steps {
                    Self::Idle
                } else {
                    Self::Shutdown { step: step + 1 }
                };
            }
            Self::Idle => {}
        }
    }
}

/// Which handler a move line is routed to, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkeinPhase {
    StartupRampActive,
    PreStartupPending,
    ShutdownRampActive,
    PreShutdownCheck,
    Passthrough,
}

/// Mutable cursor over one job, owned by the driver
#[derive(Debug, Clone, PartialEq)]
pub struct SkeinState {
    /// Index of the line being processed
    pub line_index: usize,
    /// Target of the last move, `None` before the first move
    pub old_location: Option<Location>,
    /// Feedrate in units per minute
    pub feedrate: f64,
    /// Whether the extruder is on
    pub extruder_active: bool,
    /// Whether the extruder has been off long enough to start early
    pub inactive_long_enough: bool,
    /// Ramp progress
    pub ramp: RampState,
    /// Early startup distance of the current idle gap
    pub early_startup_distance: Option<f64>,
    /// Whether the next early off still has to be emitted
    pub shutdown_needed: bool,
    /// Whether the upcoming extruder off was already emitted
    pub shutdown_early: bool,
    /// Whether the upcoming extruder on was already emitted
    pub startup_early: bool,
}

impl SkeinState {
    /// Fresh state at the start of a job body
    pub fn new(line_index: usize, feedrate: f64) -> Self {
        Self {
            line_index,
            old_location: None,
            feedrate,
            extruder_active: false,
            inactive_long_enough: false,
            ramp: RampState::Idle,
            early_startup_distance: None,
            shutdown_needed: false,
            shutdown_early: false,
            startup_early: false,
        }
    }

    /// Handler for the current move
    pub fn phase(&self) -> SkeinPhase {
        match self.ramp {
            RampState::Startup { .. } => SkeinPhase::StartupRampActive,
            _ if self.inactive_long_enough => SkeinPhase::PreStartupPending,
            RampState::Shutdown { .. } => SkeinPhase::ShutdownRampActive,
            _ if !self.extruder_active => SkeinPhase::PreShutdownCheck,
            _ => SkeinPhase::Passthrough,
        }
    }
}
