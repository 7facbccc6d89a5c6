//! Oozebane settings and their persistence
//!
//! All distances are expressed as ratios over the extrusion width of the
//! job, so one settings file suits every nozzle size. Settings are stored
//! as JSON or TOML in the platform configuration directory.

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name under the platform configuration directory
const CONFIG_DIR_NAME: &str = "oozebane";

/// Default settings file name
const CONFIG_FILE_NAME: &str = "oozebane.toml";

/// Largest accepted number of ramp steps
pub const MAX_RAMP_STEPS: i64 = 1000;

/// User-configurable oozebane parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OozebaneSettings {
    /// Whether the filter runs at all
    pub activate: bool,
    /// Distance over which flow ramps up after the thread starts
    pub after_startup_distance_over_extrusion_width: f64,
    /// Distance before the thread end at which the extruder is turned off
    pub early_shutdown_distance_over_extrusion_width: f64,
    /// Upper bound of how early the extruder is turned back on
    pub early_startup_maximum_distance_over_extrusion_width: f64,
    /// Idle distance scale of the exponential early-startup model
    pub early_startup_distance_constant_over_extrusion_width: f64,
    /// Number of feedrate steps in each ramp, clamped to `1..=MAX_RAMP_STEPS`
    pub slowdown_startup_steps: i64,
    /// Feedrate in units per minute before the job sets one
    pub default_feedrate_per_minute: f64,
}

impl Default for OozebaneSettings {
    fn default() -> Self {
        Self {
            activate: true,
            after_startup_distance_over_extrusion_width: 2.0,
            early_shutdown_distance_over_extrusion_width: 2.0,
            early_startup_maximum_distance_over_extrusion_width: 2.0,
            early_startup_distance_constant_over_extrusion_width: 30.0,
            slowdown_startup_steps: 5,
            default_feedrate_per_minute: 960.0,
        }
    }
}

impl OozebaneSettings {
    /// Create new settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: enable or disable the filter
    pub fn with_activate(mut self, activate: bool) -> Self {
        self.activate = activate;
        self
    }

    /// Builder: set the number of ramp steps
    pub fn with_steps(mut self, steps: i64) -> Self {
        self.slowdown_startup_steps = steps;
        self
    }

    /// Builder: set the early shutdown ratio
    pub fn with_early_shutdown_ratio(mut self, ratio: f64) -> Self {
        self.early_shutdown_distance_over_extrusion_width = ratio;
        self
    }

    /// Builder: set the after startup ratio
    pub fn with_after_startup_ratio(mut self, ratio: f64) -> Self {
        self.after_startup_distance_over_extrusion_width = ratio;
        self
    }

    /// Number of ramp steps actually used
    pub fn effective_steps(&self) -> usize {
        self.slowdown_startup_steps.clamp(1, MAX_RAMP_STEPS) as usize
    }

    /// Validate settings
    pub fn validate(&self) -> ConfigResult<()> {
        let ratios = [
            (
                "after_startup_distance_over_extrusion_width",
                self.after_startup_distance_over_extrusion_width,
            ),
            (
                "early_shutdown_distance_over_extrusion_width",
                self.early_shutdown_distance_over_extrusion_width,
            ),
            (
                "early_startup_maximum_distance_over_extrusion_width",
                self.early_startup_maximum_distance_over_extrusion_width,
            ),
        ];
        for (key, value) in ratios {
            if !value.is_finite() || value < 0.0 {
                return Err(out_of_range(key, value));
            }
        }

        let constant = self.early_startup_distance_constant_over_extrusion_width;
        if !constant.is_finite() || constant <= 0.0 {
            return Err(out_of_range(
                "early_startup_distance_constant_over_extrusion_width",
                constant,
            ));
        }

        if self.slowdown_startup_steps > MAX_RAMP_STEPS {
            return Err(out_of_range(
                "slowdown_startup_steps",
                self.slowdown_startup_steps as f64,
            ));
        }

        if !self.default_feedrate_per_minute.is_finite() || self.default_feedrate_per_minute <= 0.0
        {
            return Err(out_of_range(
                "default_feedrate_per_minute",
                self.default_feedrate_per_minute,
            ));
        }

        Ok(())
    }

    /// Default settings path: `<config dir>/oozebane/oozebane.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(SettingsError::NoConfigDirectory)
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let settings: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from file, falling back to defaults when missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from_file(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    "Ignoring settings file {}: {}; using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save settings to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        std::fs::write(path, content).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Saved oozebane settings to {}", path.display());

        Ok(())
    }
}

fn out_of_range(key: &'static str, value: f64) -> ConfigError {
    ConfigError::ValueOutOfRange { key, value }
}

/// Settings file formats, chosen by extension
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = OozebaneSettings::default();
        assert!(settings.validate().is_ok());
        assert!(settings.activate);
        assert_eq!(settings.effective_steps(), 5);
    }

    #[test]
    fn test_steps_clamped_to_one() {
        assert_eq!(OozebaneSettings::new().with_steps(0).effective_steps(), 1);
        assert_eq!(OozebaneSettings::new().with_steps(-3).effective_steps(), 1);
        assert_eq!(
            OozebaneSettings::new().with_steps(i64::MAX).effective_steps(),
            MAX_RAMP_STEPS as usize
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = OozebaneSettings::default();
        settings.early_startup_distance_constant_over_extrusion_width = 0.0;
        assert!(settings.validate().is_err());

        let settings = OozebaneSettings::default().with_early_shutdown_ratio(-1.0);
        assert_eq!(
            settings.validate(),
            Err(ConfigError::ValueOutOfRange {
                key: "early_shutdown_distance_over_extrusion_width",
                value: -1.0,
            })
        );

        assert!(OozebaneSettings::default().with_steps(MAX_RAMP_STEPS).validate().is_ok());
        assert_eq!(
            OozebaneSettings::default()
                .with_steps(MAX_RAMP_STEPS + 1)
                .validate(),
            Err(ConfigError::ValueOutOfRange {
                key: "slowdown_startup_steps",
                value: (MAX_RAMP_STEPS + 1) as f64,
            })
        );

        let mut settings = OozebaneSettings::default();
        settings.default_feedrate_per_minute = f64::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: OozebaneSettings = toml::from_str("slowdown_startup_steps = 3").unwrap();
        assert_eq!(settings.slowdown_startup_steps, 3);
        assert_eq!(settings.early_shutdown_distance_over_extrusion_width, 2.0);
    }
}
