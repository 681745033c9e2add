//! Tunable limits for the editor.
//!
//! Defaults match the signing UI: 200x30 text boxes at 14pt, an 80-250 by
//! 30-100 signature footprint and a 0.5-2.0 zoom range.

use serde::{Deserialize, Serialize};

/// Minimum and maximum signature size in document space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Footprint {
    pub min_width: f64,
    pub max_width: f64,
    pub min_height: f64,
    pub max_height: f64,
}

impl Default for Footprint {
    fn default() -> Self {
        Self {
            min_width: 80.0,
            max_width: 250.0,
            min_height: 30.0,
            max_height: 100.0,
        }
    }
}

impl Footprint {
    pub fn is_valid(&self) -> bool {
        self.min_width > 0.0
            && self.min_height > 0.0
            && self.min_width <= self.max_width
            && self.min_height <= self.max_height
    }

    pub fn contains(&self, width: f64, height: f64) -> bool {
        const EPS: f64 = 1e-6;
        width >= self.min_width - EPS
            && width <= self.max_width + EPS
            && height >= self.min_height - EPS
            && height <= self.max_height + EPS
    }
}

/// Geometry defaults for text fields, signatures and zoom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub default_text_width: f64,
    pub default_text_height: f64,
    pub default_font_size: f64,
    /// Width added per character when a text field auto-grows.
    pub per_char_width: f64,
    pub min_text_width: f64,
    pub min_text_height: f64,
    pub signature_footprint: Footprint,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Multiplicative zoom step.
    pub zoom_step: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_text_width: 200.0,
            default_text_height: 30.0,
            default_font_size: 14.0,
            per_char_width: 8.0,
            min_text_width: 50.0,
            min_text_height: 20.0,
            signature_footprint: Footprint::default(),
            min_scale: 0.5,
            max_scale: 2.0,
            zoom_step: 1.2,
        }
    }
}

/// Limits for signature capture and upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub max_file_bytes: u64,
    pub max_image_width: u32,
    pub max_image_height: u32,
    pub pad_width: u32,
    pub pad_height: u32,
    pub stroke_width: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 5 * 1024 * 1024,
            max_image_width: 2000,
            max_image_height: 2000,
            pad_width: 500,
            pad_height: 200,
            stroke_width: 2.5,
        }
    }
}
