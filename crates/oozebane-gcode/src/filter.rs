//! Text filters and filter chains
//!
//! A filter turns one whole job into another and leaves its completion
//! marker in the header. Filters run in a [`FilterChain`] are skipped when
//! their marker is already present, which makes re-running a chain a no-op.

use crate::parser::{is_procedure_done, PROCEDURE_NAME};
use crate::skein::{Skein, SkeinReport};
use oozebane_core::{FilterError, Result};
use oozebane_settings::OozebaneSettings;
use std::sync::Arc;

/// Procedure that must run before oozebane
pub const UPSTREAM_PROCEDURE: &str = "nozzle_wipe";

/// Whole-job G-Code transform
pub trait GcodeFilter: Send + Sync {
    /// Procedure name written in the completion marker
    fn procedure(&self) -> &str;

    /// Get a description of what this filter does
    fn description(&self) -> &str;

    /// Check if this filter is enabled
    fn is_enabled(&self) -> bool {
        true
    }

    /// Transform a job
    fn apply(&self, text: &str) -> Result<String>;
}

/// Shared handle to a filter
pub type FilterHandle = Arc<dyn GcodeFilter>;

/// The oozebane transform as a filter
#[derive(Debug, Clone, Default)]
pub struct OozebaneFilter {
    skein: Skein,
}

impl OozebaneFilter {
    /// Create the filter with the given settings
    pub fn new(settings: OozebaneSettings) -> Self {
        Self {
            skein: Skein::new(settings),
        }
    }

    /// Transform a job and report what was changed
    pub fn apply_with_report(&self, text: &str) -> (String, SkeinReport) {
        self.skein.process_with_report(text)
    }
}

impl GcodeFilter for OozebaneFilter {
    fn procedure(&self) -> &str {
        PROCEDURE_NAME
    }

    fn description(&self) -> &str {
        "Turns the extruder off and on early and ramps the feedrate around thread boundaries"
    }

    fn is_enabled(&self) -> bool {
        self.skein.settings().activate
    }

    fn apply(&self, text: &str) -> Result<String> {
        Ok(self.skein.process(text))
    }
}

/// Ordered list of filters applied one after another
#[derive(Default, Clone)]
pub struct FilterChain {
    filters: Vec<FilterHandle>,
}

impl FilterChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter; filters run in registration order
    pub fn register(&mut self, filter: FilterHandle) -> &mut Self {
        self.filters.push(filter);
        self
    }

    /// Number of registered filters
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// List the registered filters as (procedure, description, enabled)
    pub fn list_filters(&self) -> Vec<(&str, &str, bool)> {
        self.filters
            .iter()
            .map(|f| (f.procedure(), f.description(), f.is_enabled()))
            .collect()
    }

    /// Run every filter whose marker is not already present
    pub fn apply(&self, text: &str) -> Result<String> {
        let mut current = text.to_string();
        for filter in &self.filters {
            if !filter.is_enabled() {
                tracing::debug!("Skipping disabled filter '{}'", filter.procedure());
                continue;
            }
            if is_procedure_done(&current, filter.procedure()) {
                tracing::debug!("Skipping '{}', already applied", filter.procedure());
                continue;
            }
            current = filter.apply(&current).map_err(|e| {
                tracing::warn!("Filter '{}' failed: {}", filter.procedure(), e);
                e
            })?;
        }
        Ok(current)
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field(
                "filters",
                &self.filters.iter().map(|f| f.procedure()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Apply `filter` to `text`, running `upstream` first unless its marker is present
///
/// Upstream failures are reported as [`FilterError::Upstream`].
pub fn chain_gcode(text: &str, upstream: &dyn GcodeFilter, filter: &dyn GcodeFilter) -> Result<String> {
    let text = if is_procedure_done(text, upstream.procedure()) {
        text.to_string()
    } else {
        tracing::info!("Running upstream procedure '{}' first", upstream.procedure());
        upstream.apply(text).map_err(|e| FilterError::Upstream {
            procedure: upstream.procedure().to_string(),
            reason: e.to_string(),
        })?
    };
    filter.apply(&text)
}
