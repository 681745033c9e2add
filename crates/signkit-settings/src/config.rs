//! Configuration for the signing client
//!
//! Sections:
//! - Server connection (base URL, timeout, bearer token)
//! - Signer identity used to prefill text fields
//! - Editor geometry (text defaults, signature footprint, zoom range)
//! - Signature capture limits (upload ceilings, drawing pad)
//!
//! Files may be TOML or JSON, chosen by extension. Missing keys take their
//! defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use signkit_editor::{CaptureConfig, EditorConfig};
use signkit_sync::HttpSettings;

use crate::error::{SettingsError, SettingsResult};

/// Signing API connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL all endpoint paths are joined to
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Bearer token; `SIGNKIT_TOKEN` overrides it at startup
    pub token: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 30,
            token: None,
        }
    }
}

/// Who is signing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerSettings {
    /// Prefilled into new text fields
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub signer: SignerSettings,
    pub editor: EditorConfig,
    pub capture: CaptureConfig,
}

#[derive(Clone, Copy)]
enum Format {
    Toml,
    Json,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        other => Err(SettingsError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from a `.toml` or `.json` file
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let config: Self = match format {
            Format::Toml => toml::from_str(&content)?,
            Format::Json => serde_json::from_str(&content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to a `.toml` or `.json` file
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let content = match format_of(path)? {
            Format::Toml => toml::to_string_pretty(self)?,
            Format::Json => serde_json::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Save {
                path: parent.display().to_string(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| SettingsError::Save {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> SettingsResult<()> {
        let server = &self.server;
        if !(server.base_url.starts_with("http://") || server.base_url.starts_with("https://")) {
            return Err(SettingsError::invalid(
                "server.base_url",
                "must start with http:// or https://",
            ));
        }
        if server.timeout_secs == 0 {
            return Err(SettingsError::invalid("server.timeout_secs", "must be > 0"));
        }

        let editor = &self.editor;
        if !editor.signature_footprint.is_valid() {
            return Err(SettingsError::invalid(
                "editor.signature_footprint",
                "minimums must be > 0 and not exceed maximums",
            ));
        }
        if editor.min_scale <= 0.0 || editor.min_scale > editor.max_scale {
            return Err(SettingsError::invalid(
                "editor.min_scale",
                "must be > 0 and not exceed max_scale",
            ));
        }
        if editor.zoom_step <= 1.0 {
            return Err(SettingsError::invalid("editor.zoom_step", "must be > 1"));
        }
        if editor.default_font_size <= 0.0 {
            return Err(SettingsError::invalid("editor.default_font_size", "must be > 0"));
        }
        if editor.min_text_width <= 0.0 || editor.min_text_height <= 0.0 {
            return Err(SettingsError::invalid("editor.min_text_width", "must be > 0"));
        }

        let capture = &self.capture;
        if capture.max_file_bytes == 0 {
            return Err(SettingsError::invalid("capture.max_file_bytes", "must be > 0"));
        }
        if capture.max_image_width == 0 || capture.max_image_height == 0 {
            return Err(SettingsError::invalid("capture.max_image_width", "must be > 0"));
        }
        if capture.pad_width == 0 || capture.pad_height == 0 {
            return Err(SettingsError::invalid("capture.pad_width", "must be > 0"));
        }
        if capture.stroke_width <= 0.0 {
            return Err(SettingsError::invalid("capture.stroke_width", "must be > 0"));
        }

        Ok(())
    }

    /// Connection settings for the HTTP backend.
    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            base_url: self.server.base_url.clone(),
            timeout: Duration::from_secs(self.server.timeout_secs),
            token: self.server.token.clone().filter(|t| !t.is_empty()),
        }
    }

    /// Applies `SIGNKIT_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SIGNKIT_BASE_URL").filter(|v| !v.is_empty()) {
            self.server.base_url = url;
        }
        if let Some(token) = lookup("SIGNKIT_TOKEN").filter(|v| !v.is_empty()) {
            self.server.token = Some(token);
        }
        if let Some(name) = lookup("SIGNKIT_FULL_NAME") {
            self.signer.full_name = name;
        }
    }
}
