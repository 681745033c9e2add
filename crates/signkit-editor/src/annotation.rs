//! Annotation model: text fields and signatures placed on a page.
//!
//! All geometry is in document space with the origin at the top-left corner
//! of the page. `page_number` is 1-based and fixed at creation.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::asset::ImageHandle;
use crate::geometry::{Point, Rect, Size};

/// Annotation identity
///
/// Client-created annotations carry a local id until a draft read returns the
/// server-assigned one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationId {
    Local(Uuid),
    Persisted(String),
}

impl AnnotationId {
    pub fn new_local() -> Self {
        AnnotationId::Local(Uuid::new_v4())
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, AnnotationId::Persisted(_))
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationId::Local(id) => write!(f, "local-{}", &id.to_string()[..8]),
            AnnotationId::Persisted(id) => write!(f, "{}", id),
        }
    }
}

/// Free text placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextField {
    pub id: AnnotationId,
    pub page_number: u32,
    pub rect: Rect,
    pub font_size: f64,
    pub text_content: String,
}

impl TextField {
    pub fn new(page_number: u32, rect: Rect, font_size: f64, text_content: String) -> Self {
        Self {
            id: AnnotationId::new_local(),
            page_number,
            rect,
            font_size,
            text_content,
        }
    }
}

/// A raster signature placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub id: AnnotationId,
    pub page_number: u32,
    pub rect: Rect,
    /// Stored path of the raster asset, as returned by the upload endpoint.
    pub signature_image_path: String,
    /// Width over height of the source image; kept through resizes.
    pub aspect_ratio: f64,
    /// Preview handle, if the image could be resolved. Never persisted.
    pub image: Option<ImageHandle>,
}

impl Signature {
    pub fn new(page_number: u32, rect: Rect, signature_image_path: String, aspect_ratio: f64) -> Self {
        Self {
            id: AnnotationId::new_local(),
            page_number,
            rect,
            signature_image_path,
            aspect_ratio,
            image: None,
        }
    }

    pub fn with_image(mut self, image: Option<ImageHandle>) -> Self {
        self.image = image;
        self
    }
}

/// One annotation on the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    TextField(TextField),
    Signature(Signature),
}

impl Annotation {
    pub fn id(&self) -> &AnnotationId {
        match self {
            Annotation::TextField(t) => &t.id,
            Annotation::Signature(s) => &s.id,
        }
    }

    pub fn page_number(&self) -> u32 {
        match self {
            Annotation::TextField(t) => t.page_number,
            Annotation::Signature(s) => s.page_number,
        }
    }

    pub fn rect(&self) -> Rect {
        match self {
            Annotation::TextField(t) => t.rect,
            Annotation::Signature(s) => s.rect,
        }
    }

    pub fn position(&self) -> Point {
        self.rect().origin()
    }

    pub fn size(&self) -> Size {
        self.rect().size()
    }

    pub(crate) fn rect_mut(&mut self) -> &mut Rect {
        match self {
            Annotation::TextField(t) => &mut t.rect,
            Annotation::Signature(s) => &mut s.rect,
        }
    }

    pub fn as_text_field(&self) -> Option<&TextField> {
        match self {
            Annotation::TextField(t) => Some(t),
            Annotation::Signature(_) => None,
        }
    }

    pub fn as_signature(&self) -> Option<&Signature> {
        match self {
            Annotation::Signature(s) => Some(s),
            Annotation::TextField(_) => None,
        }
    }

    pub fn kind(&self) -> signkit_core::event_bus::AnnotationKind {
        match self {
            Annotation::TextField(_) => signkit_core::event_bus::AnnotationKind::TextField,
            Annotation::Signature(_) => signkit_core::event_bus::AnnotationKind::Signature,
        }
    }
}

impl From<TextField> for Annotation {
    fn from(value: TextField) -> Self {
        Annotation::TextField(value)
    }
}

impl From<Signature> for Annotation {
    fn from(value: Signature) -> Self {
        Annotation::Signature(value)
    }
}
