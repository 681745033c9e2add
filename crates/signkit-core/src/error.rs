//! Error handling for SignKit
//!
//! Provides the error taxonomy shared by every layer of the signing client:
//! - Validation errors (bad uploads, empty signatures, missing notes)
//! - Network errors (draft, submit and asset transport)
//! - Asset resolution errors (signature previews that could not be fetched)
//! - Document errors (empty or invalid PDF payloads)
//! - Lifecycle errors (illegal status transitions)
//! - Editor errors (placement and interaction refusals)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Validation error type
///
/// Reported inline next to the offending control. The operation that raised
/// it is aborted and leaves no partial state behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Uploaded file is not a PNG or JPEG image
    #[error("Invalid image type: {mime_type} (only PNG and JPEG are accepted)")]
    InvalidImageType {
        /// The declared or detected MIME type.
        mime_type: String,
    },

    /// Uploaded file exceeds the byte ceiling
    #[error("File too large: {size} bytes (maximum {max} bytes)")]
    FileTooLarge {
        /// Size of the rejected file in bytes.
        size: u64,
        /// Configured maximum in bytes.
        max: u64,
    },

    /// Uploaded image exceeds the pixel ceiling
    #[error("Image too large: {width}x{height} pixels (maximum {max_width}x{max_height})")]
    ImageTooLarge {
        /// Intrinsic width of the rejected image.
        width: u32,
        /// Intrinsic height of the rejected image.
        height: u32,
        /// Maximum accepted width.
        max_width: u32,
        /// Maximum accepted height.
        max_height: u32,
    },

    /// Image bytes could not be decoded
    #[error("Unreadable image: {reason}")]
    UnreadableImage {
        /// Decoder message.
        reason: String,
    },

    /// The drawing surface cannot be allocated at this size
    #[error("Invalid signature pad size: {width}x{height}")]
    InvalidPadSize {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// The drawing surface holds no visible pixels
    #[error("Signature is empty")]
    EmptySignature,

    /// A revision note is required but missing
    #[error("Revision note is required")]
    MissingNote,

    /// An imported annotation box is not finite or has no area
    #[error("Invalid annotation box: ({x}, {y}) {width}x{height}")]
    InvalidGeometry {
        /// Left edge in document space.
        x: f64,
        /// Top edge in document space.
        y: f64,
        /// Width in document space.
        width: f64,
        /// Height in document space.
        height: f64,
    },
}

/// Network error type
///
/// Raised by draft load/save, submit and asset transport. Never retried
/// automatically.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// The request could not be delivered
    #[error("Request to {endpoint} failed: {reason}")]
    RequestFailed {
        /// Endpoint path that was called.
        endpoint: String,
        /// Transport-level reason.
        reason: String,
    },

    /// The server answered with a non-success status
    #[error("Server returned {status} for {endpoint}: {message}")]
    Status {
        /// Endpoint path that was called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Body or status text returned by the server.
        message: String,
    },

    /// The response body did not match the expected shape
    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse {
        /// Endpoint path that was called.
        endpoint: String,
        /// Parser message.
        reason: String,
    },
}

impl NetworkError {
    /// Returns the HTTP status if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the server reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Asset resolution error type
///
/// Degrades a single signature preview; never aborts a whole draft load.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Failed to resolve signature image {path}: {reason}")]
pub struct AssetResolutionError {
    /// Stored path of the signature image.
    pub path: String,
    /// Why the image could not be resolved.
    pub reason: String,
}

/// Document error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The downloaded document is empty or is not a PDF. Fatal for the session.
    #[error("Document {document_id} is empty or not a valid PDF: {reason}")]
    EmptyOrInvalidDocument {
        /// Identifier of the document.
        document_id: String,
        /// Why the payload was rejected.
        reason: String,
    },

    /// The PDF engine could not be initialised
    #[error("PDF engine unavailable: {reason}")]
    EngineUnavailable {
        /// Initialisation failure reason.
        reason: String,
    },
}

/// Lifecycle error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    /// The requested event is not legal from the current status
    #[error("Invalid transition from {current} on {event}")]
    InvalidTransition {
        /// Current status wire name.
        current: String,
        /// Event name.
        event: String,
    },

    /// A status string from the server is not recognised
    #[error("Unknown document status: {status}")]
    UnknownStatus {
        /// The unrecognised status.
        status: String,
    },
}

/// Editor error type
///
/// Raised by the annotation editor when an intent cannot be applied. The
/// model is left exactly as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    /// Signature placement was attempted without a prepared artifact
    #[error("No signature available: draw or upload a signature first")]
    NoSignatureArtifact,

    /// The session is read-only
    #[error("Document is read-only: {operation} is not allowed")]
    ReadOnly {
        /// The refused operation.
        operation: String,
    },

    /// No annotation with the given id exists
    #[error("Annotation not found: {id}")]
    AnnotationNotFound {
        /// The missing annotation id.
        id: String,
    },

    /// Page number outside `1..=page_count`
    #[error("Page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange {
        /// Requested page.
        page: u32,
        /// Pages in the document.
        page_count: u32,
    },

    /// The PDF has not reported its page count yet
    #[error("Document is not loaded")]
    DocumentNotLoaded,

    /// The intent does not apply to this kind of annotation
    #[error("Operation {operation} does not apply to annotation {id}")]
    WrongAnnotationKind {
        /// Annotation id.
        id: String,
        /// The refused operation.
        operation: String,
    },
}

/// Main error type for SignKit
///
/// A unified error type that can represent any error from the shared layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Network error
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Asset resolution error
    #[error(transparent)]
    AssetResolution(#[from] AssetResolutionError),

    /// Document error
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Lifecycle error
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Editor error
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this is a network error
    pub fn is_network_error(&self) -> bool {
        matches!(self, Error::Network(_))
    }

    /// Check if the operation was refused because the session is read-only
    pub fn is_read_only(&self) -> bool {
        matches!(self, Error::Editor(EditorError::ReadOnly { .. }))
    }

    /// Check if this error ends the editing session
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Document(DocumentError::EmptyOrInvalidDocument { .. })
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::FileTooLarge {
            size: 6 * 1024 * 1024,
            max: 5 * 1024 * 1024,
        };
        assert_eq!(
            err.to_string(),
            "File too large: 6291456 bytes (maximum 5242880 bytes)"
        );

        let err = ValidationError::InvalidImageType {
            mime_type: "image/gif".to_string(),
        };
        assert!(err.to_string().contains("image/gif"));
    }

    #[test]
    fn test_network_not_found() {
        let err = NetworkError::Status {
            endpoint: "/signing/7/draft".to_string(),
            status: 404,
            message: "Not Found".to_string(),
        };
        assert!(err.is_not_found());

        let err = NetworkError::RequestFailed {
            endpoint: "/signing/7/draft".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(!err.is_not_found());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ValidationError::EmptySignature.into();
        assert!(err.is_validation_error());
        assert!(!err.is_fatal());

        let err: Error = DocumentError::EmptyOrInvalidDocument {
            document_id: "42".to_string(),
            reason: "zero bytes".to_string(),
        }
        .into();
        assert!(err.is_fatal());

        let err: Error = EditorError::ReadOnly {
            operation: "delete".to_string(),
        }
        .into();
        assert!(err.is_read_only());
        assert_eq!(
            err.to_string(),
            "Document is read-only: delete is not allowed"
        );
    }
}
