//! Where the config file lives and how it is loaded at startup.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{SettingsError, SettingsResult};

const APP_DIR: &str = "signkit";
const FILE_NAME: &str = "config.toml";

/// Platform config path, e.g. `~/.config/signkit/config.toml` on Linux.
pub fn default_config_path() -> SettingsResult<PathBuf> {
    let base = dirs::config_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| SettingsError::ConfigDirectory("no config or home directory".to_string()))?;
    Ok(base.join(APP_DIR).join(FILE_NAME))
}

#[derive(Debug, Clone)]
pub struct SettingsPersistence {
    path: PathBuf,
}

impl SettingsPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Persistence at the platform default path.
    pub fn at_default_path() -> SettingsResult<Self> {
        Ok(Self::new(default_config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads the file, or returns defaults when it does not exist yet.
    ///
    /// A file that exists but fails to parse or validate is an error.
    pub fn load_or_default(&self) -> SettingsResult<Config> {
        if !self.exists() {
            tracing::debug!(
                "No config at {}, using defaults",
                self.path.display()
            );
            return Ok(Config::default());
        }
        let config = Config::load_from_file(&self.path)?;
        tracing::info!("Loaded config from {}", self.path.display());
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> SettingsResult<()> {
        config.save_to_file(&self.path)?;
        tracing::info!("Saved config to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_shape() {
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with("signkit/config.toml"));
        }
    }
}
