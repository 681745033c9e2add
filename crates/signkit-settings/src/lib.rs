//! SignKit Settings Crate
//!
//! Loads, validates and persists client configuration.

pub mod config;
pub mod error;
pub mod persistence;

pub use config::{Config, ServerSettings, SignerSettings};
pub use error::{SettingsError, SettingsResult};
pub use persistence::{default_config_path, SettingsPersistence};
