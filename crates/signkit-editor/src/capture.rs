//! Signature capture: freehand drawing pad and upload validation.
//!
//! Two sources can provide the signature image; the one completed last is the
//! active one. The drawing pad is rendered with tiny-skia and exported as PNG.
//! Uploaded files are sniffed with `image` before anything is sent.

use image::{ImageFormat, ImageReader};
use signkit_core::ValidationError;
use std::io::Cursor;
use tiny_skia::{Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::asset::ImageHandle;
use crate::config::CaptureConfig;
use crate::geometry::{Point, Size};

/// Where the active signature image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureSource {
    Drawn,
    Uploaded,
}

/// A stored signature image ready for placement.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureArtifact {
    pub source: SignatureSource,
    /// Path returned by the upload endpoint.
    pub path: String,
    /// Intrinsic pixel size of the image.
    pub intrinsic: Size,
    pub preview: Option<ImageHandle>,
}

/// Freehand drawing surface.
pub struct SignaturePad {
    pixmap: Pixmap,
    stroke_width: f32,
    ink: Color,
}

impl std::fmt::Debug for SignaturePad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignaturePad")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("has_content", &self.has_content())
            .finish()
    }
}

impl SignaturePad {
    /// Creates a transparent pad.
    pub fn new(width: u32, height: u32, stroke_width: f32) -> Result<Self, ValidationError> {
        let pixmap =
            Pixmap::new(width, height).ok_or(ValidationError::InvalidPadSize { width, height })?;
        Ok(Self {
            pixmap,
            stroke_width: stroke_width.max(0.5),
            ink: Color::from_rgba8(17, 24, 39, 255),
        })
    }

    pub fn from_config(config: &CaptureConfig) -> Result<Self, ValidationError> {
        Self::new(config.pad_width, config.pad_height, config.stroke_width)
    }

    pub fn size(&self) -> Size {
        Size::new(self.pixmap.width() as f64, self.pixmap.height() as f64)
    }

    /// Draws one stroke through `points` (pad pixel coordinates).
    ///
    /// A single point leaves a dot.
    pub fn stroke(&mut self, points: &[Point]) {
        let mut paint = Paint::default();
        paint.set_color(self.ink);
        paint.anti_alias = true;

        match points {
            [] => {}
            [dot] => {
                if let Some(path) =
                    PathBuilder::from_circle(dot.x as f32, dot.y as f32, self.stroke_width / 2.0)
                {
                    self.pixmap.fill_path(
                        &path,
                        &paint,
                        FillRule::Winding,
                        Transform::identity(),
                        None,
                    );
                }
            }
            [first, rest @ ..] => {
                let mut pb = PathBuilder::new();
                pb.move_to(first.x as f32, first.y as f32);
                for point in rest {
                    pb.line_to(point.x as f32, point.y as f32);
                }
                if let Some(path) = pb.finish() {
                    let stroke = Stroke {
                        width: self.stroke_width,
                        line_cap: LineCap::Round,
                        line_join: LineJoin::Round,
                        ..Default::default()
                    };
                    self.pixmap
                        .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
                }
            }
        }
    }

    /// True iff any pixel has non-zero alpha.
    pub fn has_content(&self) -> bool {
        self.pixmap.pixels().iter().any(|p| p.alpha() > 0)
    }

    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    /// Rasterizes the pad to PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, ValidationError> {
        if !self.has_content() {
            return Err(ValidationError::EmptySignature);
        }
        self.pixmap
            .encode_png()
            .map_err(|e| ValidationError::UnreadableImage {
                reason: e.to_string(),
            })
    }
}

/// An upload that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedImage {
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl ValidatedImage {
    pub fn intrinsic(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    pub fn file_name(&self) -> &'static str {
        match self.mime_type {
            "image/jpeg" => "signature.jpg",
            _ => "signature.png",
        }
    }
}

fn normalize_mime(mime_type: &str) -> Option<ImageFormat> {
    match mime_type.trim().to_ascii_lowercase().as_str() {
        "image/png" | "png" => Some(ImageFormat::Png),
        "image/jpeg" | "image/jpg" | "jpeg" | "jpg" => Some(ImageFormat::Jpeg),
        _ => None,
    }
}

/// Validates an uploaded signature image.
///
/// Checks run in order: declared type, byte size, sniffed format, pixel size.
pub fn validate_upload(
    bytes: &[u8],
    declared_mime: &str,
    config: &CaptureConfig,
) -> Result<ValidatedImage, ValidationError> {
    let declared = normalize_mime(declared_mime).ok_or_else(|| ValidationError::InvalidImageType {
        mime_type: declared_mime.to_string(),
    })?;

    let size = bytes.len() as u64;
    if size > config.max_file_bytes {
        return Err(ValidationError::FileTooLarge {
            size,
            max: config.max_file_bytes,
        });
    }

    let sniffed = image::guess_format(bytes).map_err(|e| ValidationError::UnreadableImage {
        reason: e.to_string(),
    })?;
    if sniffed != declared {
        return Err(ValidationError::InvalidImageType {
            mime_type: sniffed.to_mime_type().to_string(),
        });
    }

    let (width, height) = ImageReader::with_format(Cursor::new(bytes), sniffed)
        .into_dimensions()
        .map_err(|e| ValidationError::UnreadableImage {
            reason: e.to_string(),
        })?;
    if width > config.max_image_width || height > config.max_image_height {
        return Err(ValidationError::ImageTooLarge {
            width,
            height,
            max_width: config.max_image_width,
            max_height: config.max_image_height,
        });
    }

    Ok(ValidatedImage {
        mime_type: if sniffed == ImageFormat::Jpeg {
            "image/jpeg"
        } else {
            "image/png"
        },
        width,
        height,
        bytes: bytes.to_vec(),
    })
}

/// Pad plus the currently active artifact.
#[derive(Debug)]
pub struct SignatureCapture {
    pad: SignaturePad,
    artifact: Option<SignatureArtifact>,
}

impl SignatureCapture {
    pub fn new(config: &CaptureConfig) -> Result<Self, ValidationError> {
        Ok(Self {
            pad: SignaturePad::from_config(config)?,
            artifact: None,
        })
    }

    pub fn pad(&self) -> &SignaturePad {
        &self.pad
    }

    /// Adds a stroke. Once the pad has ink the drawing is the newest capture,
    /// so any active artifact, drawn or uploaded, is dropped and the pad
    /// must be uploaded before the next placement.
    pub fn draw(&mut self, points: &[Point]) {
        self.pad.stroke(points);
        if self.pad.has_content() {
            self.artifact = None;
        }
    }

    /// Resets the pad and discards any active artifact.
    pub fn clear(&mut self) {
        self.pad.clear();
        self.artifact = None;
    }

    pub fn artifact(&self) -> Option<&SignatureArtifact> {
        self.artifact.as_ref()
    }

    /// Whether a placement can proceed, possibly after uploading the pad.
    pub fn is_ready(&self) -> bool {
        self.artifact.is_some() || self.pad.has_content()
    }

    /// Whether the pad must be rasterized and uploaded before placement.
    pub fn needs_upload(&self) -> bool {
        self.artifact.is_none() && self.pad.has_content()
    }

    /// Installs a freshly stored artifact, replacing the previous one.
    ///
    /// An uploaded image supersedes any drawn content, so the pad is cleared.
    pub fn set_artifact(&mut self, artifact: SignatureArtifact) {
        if artifact.source == SignatureSource::Uploaded {
            self.pad.clear();
        }
        self.artifact = Some(artifact);
    }

    /// Called after a successful placement; a drawn signature is consumed.
    pub fn placed(&mut self) {
        if matches!(&self.artifact, Some(a) if a.source == SignatureSource::Drawn) {
            self.clear();
        }
    }
}
