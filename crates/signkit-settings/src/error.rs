//! Error types for the settings crate.

use std::io;
use thiserror::Error;

/// Errors that can occur while loading or saving settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The configuration file could not be read.
    #[error("Failed to load settings from {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The configuration file could not be written.
    #[error("Failed to save settings to {path}: {source}")]
    Save {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The file extension is neither `.toml` nor `.json`.
    #[error("Unsupported config format: {0} (use .toml or .json)")]
    UnsupportedFormat(String),

    /// A configuration value is invalid.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// No platform configuration directory is available.
    #[error("Config directory error: {0}")]
    ConfigDirectory(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error.
    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl SettingsError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        SettingsError::InvalidSetting {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;
