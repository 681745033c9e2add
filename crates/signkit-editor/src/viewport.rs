//! Viewport and coordinate transformation for page rendering.
//!
//! Annotation geometry is stored in document space, which does not change
//! when the user zooms. Pointer events arrive in viewport space (pixels on
//! the rendered page) and are converted before they reach the model.
//!
//! ```text
//! viewport = document * scale
//! document = viewport / scale
//! ```

use crate::config::EditorConfig;
use crate::geometry::{Point, Rect, Size};

/// Scales a document-space value into viewport space.
pub fn to_viewport(value: f64, scale: f64) -> f64 {
    value * scale
}

/// Scales a viewport-space value back into document space.
pub fn to_document(value: f64, scale: f64) -> f64 {
    value / scale
}

/// Current zoom factor and its bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    scale: f64,
    min_scale: f64,
    max_scale: f64,
    zoom_step: f64,
}

impl Viewport {
    /// Creates a viewport at 100% with the default 0.5-2.0 range.
    pub fn new() -> Self {
        Self::from_config(&EditorConfig::default())
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            scale: 1.0_f64.clamp(config.min_scale, config.max_scale),
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            zoom_step: config.zoom_step,
        }
    }

    /// Gets the current scale (1.0 = 100%).
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min_scale, self.max_scale)
    }

    /// Sets the scale, clamped to the bounds.
    ///
    /// Non-finite and non-positive values are ignored. Returns whether the
    /// scale changed.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        if !scale.is_finite() || scale <= 0.0 {
            tracing::debug!("Ignoring invalid scale {}", scale);
            return false;
        }
        let clamped = scale.clamp(self.min_scale, self.max_scale);
        let changed = (clamped - self.scale).abs() > f64::EPSILON;
        self.scale = clamped;
        changed
    }

    /// Zooms in by one step.
    pub fn zoom_in(&mut self) -> bool {
        self.set_scale(self.scale * self.zoom_step)
    }

    /// Zooms out by one step.
    pub fn zoom_out(&mut self) -> bool {
        self.set_scale(self.scale / self.zoom_step)
    }

    /// Resets zoom to 1.0 (100%), or the nearest bound.
    pub fn reset_zoom(&mut self) {
        self.set_scale(1.0);
    }

    pub fn point_to_viewport(&self, point: Point) -> Point {
        Point::new(
            to_viewport(point.x, self.scale),
            to_viewport(point.y, self.scale),
        )
    }

    pub fn point_to_document(&self, point: Point) -> Point {
        Point::new(
            to_document(point.x, self.scale),
            to_document(point.y, self.scale),
        )
    }

    pub fn size_to_viewport(&self, size: Size) -> Size {
        Size::new(
            to_viewport(size.width, self.scale),
            to_viewport(size.height, self.scale),
        )
    }

    pub fn size_to_document(&self, size: Size) -> Size {
        Size::new(
            to_document(size.width, self.scale),
            to_document(size.height, self.scale),
        )
    }

    /// Projects a document-space rectangle for rendering.
    pub fn rect_to_viewport(&self, rect: Rect) -> Rect {
        let origin = self.point_to_viewport(rect.origin());
        let size = self.size_to_viewport(rect.size());
        Rect::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn rect_to_document(&self, rect: Rect) -> Rect {
        let origin = self.point_to_document(rect.origin());
        let size = self.size_to_document(rect.size());
        Rect::new(origin.x, origin.y, size.width, size.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}
