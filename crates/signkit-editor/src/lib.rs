//! # SignKit Editor
//!
//! Interactive annotation placement for signing PDF documents.
//!
//! - Viewport scale and document/viewport coordinate conversion
//! - Text field and signature annotations kept in one store
//! - Placement modes, drag and aspect-locked resize
//! - Freehand signature pad and upload validation
//!
//! All persisted geometry is in document space and does not change with zoom.

pub mod annotation;
pub mod asset;
pub mod capture;
pub mod config;
pub mod geometry;
pub mod interaction;
pub mod placement;
pub mod session;
pub mod sizing;
pub mod store;
pub mod viewport;

pub use annotation::{Annotation, AnnotationId, Signature, TextField};
pub use asset::{HandleRelease, ImageHandle};
pub use capture::{
    validate_upload, SignatureArtifact, SignatureCapture, SignaturePad, SignatureSource,
    ValidatedImage,
};
pub use config::{CaptureConfig, EditorConfig, Footprint};
pub use geometry::{Point, Rect, Size};
pub use interaction::InteractionState;
pub use placement::PlacementMode;
pub use session::{EditorSession, Snapshot};
pub use sizing::{fit_to_footprint, resize_locked};
pub use store::{AnnotationStore, EditorAction};
pub use viewport::{to_document, to_viewport, Viewport};
