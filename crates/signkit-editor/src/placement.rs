//! Placement mode and the annotations a page click creates.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::annotation::{Signature, TextField};
use crate::capture::SignatureArtifact;
use crate::config::EditorConfig;
use crate::geometry::{Point, Rect};
use crate::sizing::fit_to_footprint;

/// What a click on the page creates. At most one mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlacementMode {
    #[default]
    None,
    PlacingText,
    PlacingSignature,
}

impl PlacementMode {
    pub fn is_active(&self) -> bool {
        !matches!(self, PlacementMode::None)
    }

    /// Selecting the active mode again turns placement off.
    pub fn toggled(self, requested: PlacementMode) -> PlacementMode {
        if self == requested {
            PlacementMode::None
        } else {
            requested
        }
    }
}

impl fmt::Display for PlacementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementMode::None => write!(f, "none"),
            PlacementMode::PlacingText => write!(f, "text"),
            PlacementMode::PlacingSignature => write!(f, "signature"),
        }
    }
}

/// Text field at a document-space point, prefilled with `content`.
pub fn text_field_at(page_number: u32, at: Point, content: &str, config: &EditorConfig) -> TextField {
    TextField::new(
        page_number,
        Rect::new(
            at.x,
            at.y,
            config.default_text_width,
            config.default_text_height,
        ),
        config.default_font_size,
        content.to_string(),
    )
}

/// Signature at a document-space point, sized from the artifact.
pub fn signature_at(
    page_number: u32,
    at: Point,
    artifact: &SignatureArtifact,
    config: &EditorConfig,
) -> Signature {
    let size = fit_to_footprint(artifact.intrinsic, &config.signature_footprint);
    Signature::new(
        page_number,
        Rect::new(at.x, at.y, size.width, size.height),
        artifact.path.clone(),
        artifact.intrinsic.aspect_ratio(),
    )
    .with_image(artifact.preview.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::SignatureSource;
    use crate::geometry::Size;

    #[test]
    fn test_toggle() {
        let mode = PlacementMode::None.toggled(PlacementMode::PlacingText);
        assert_eq!(mode, PlacementMode::PlacingText);
        assert_eq!(
            mode.toggled(PlacementMode::PlacingSignature),
            PlacementMode::PlacingSignature
        );
        assert_eq!(mode.toggled(PlacementMode::PlacingText), PlacementMode::None);
    }

    #[test]
    fn test_text_defaults() {
        let field = text_field_at(1, Point::new(50.0, 60.0), "Ada Lovelace", &EditorConfig::default());
        assert_eq!(field.rect, Rect::new(50.0, 60.0, 200.0, 30.0));
        assert_eq!(field.font_size, 14.0);
        assert_eq!(field.text_content, "Ada Lovelace");
    }

    #[test]
    fn test_signature_ratio() {
        let artifact = SignatureArtifact {
            source: SignatureSource::Uploaded,
            path: "signatures/s.png".to_string(),
            intrinsic: Size::new(300.0, 150.0),
            preview: None,
        };
        let signature = signature_at(2, Point::new(0.0, 0.0), &artifact, &EditorConfig::default());
        assert!((signature.rect.width / signature.rect.height - 2.0).abs() < 0.01);
        assert_eq!(signature.aspect_ratio, 2.0);
        assert_eq!(signature.page_number, 2);
    }
}
