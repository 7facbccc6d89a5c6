//! Error types for loading, saving and validating settings

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing a settings file
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The platform has no configuration directory
    #[error("No configuration directory on this platform")]
    NoConfigDirectory,

    /// The settings file could not be read
    #[error("Cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The settings file or its directory could not be written
    #[error("Cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// The settings were read but are not usable
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Settings values or file names that cannot be used
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// Only `.json` and `.toml` files are understood
    #[error("Unsupported settings format '{0}', expected json or toml")]
    UnsupportedFormat(String),

    #[error("Value out of range for '{key}': {value}")]
    ValueOutOfRange { key: &'static str, value: f64 },
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub type ConfigResult<T> = Result<T, ConfigError>;
