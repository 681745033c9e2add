//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so a host can log or replay them.

use serde::{Deserialize, Serialize};

use crate::lifecycle::DocumentStatus;

/// Root event enum
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// Draft load/save
    Draft(DraftEvent),
    /// Terminal submit
    Submission(SubmissionEvent),
    /// Document status and read-only changes
    Lifecycle(LifecycleChange),
    /// Placement, selection and deletion
    Editor(EditorEvent),
    /// Signature capture
    Capture(CaptureEvent),
    /// Error and diagnostic events
    Error(ErrorEvent),
}

impl AppEvent {
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Draft(_) => EventCategory::Draft,
            AppEvent::Submission(_) => EventCategory::Submission,
            AppEvent::Lifecycle(_) => EventCategory::Lifecycle,
            AppEvent::Editor(_) => EventCategory::Editor,
            AppEvent::Capture(_) => EventCategory::Capture,
            AppEvent::Error(_) => EventCategory::Error,
        }
    }

    /// Short description for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Draft(e) => e.description(),
            AppEvent::Submission(e) => e.description(),
            AppEvent::Lifecycle(e) => e.description(),
            AppEvent::Editor(e) => e.description(),
            AppEvent::Capture(e) => e.description(),
            AppEvent::Error(e) => e.description(),
        }
    }

    /// Document the event concerns, if any
    pub fn document_id(&self) -> Option<&str> {
        match self {
            AppEvent::Draft(DraftEvent::Loaded { document_id, .. })
            | AppEvent::Draft(DraftEvent::Saved { document_id, .. })
            | AppEvent::Draft(DraftEvent::SaveFailed { document_id, .. })
            | AppEvent::Submission(SubmissionEvent::Started { document_id })
            | AppEvent::Submission(SubmissionEvent::Submitted { document_id, .. })
            | AppEvent::Submission(SubmissionEvent::Failed { document_id, .. })
            | AppEvent::Lifecycle(LifecycleChange::StatusChanged { document_id, .. })
            | AppEvent::Lifecycle(LifecycleChange::ReadOnly { document_id, .. }) => {
                Some(document_id.as_str())
            }
            _ => None,
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Draft,
    Submission,
    Lifecycle,
    Editor,
    Capture,
    Error,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Draft => write!(f, "Draft"),
            EventCategory::Submission => write!(f, "Submission"),
            EventCategory::Lifecycle => write!(f, "Lifecycle"),
            EventCategory::Editor => write!(f, "Editor"),
            EventCategory::Capture => write!(f, "Capture"),
            EventCategory::Error => write!(f, "Error"),
        }
    }
}

/// Draft store events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DraftEvent {
    /// A draft was read (possibly empty).
    Loaded {
        /// Document the draft belongs to.
        document_id: String,
        /// Number of text fields restored.
        text_fields: usize,
        /// Number of signatures restored.
        signatures: usize,
        /// Signature previews that could not be resolved.
        unresolved_assets: usize,
    },
    /// A draft snapshot was stored.
    Saved {
        /// Document the draft belongs to.
        document_id: String,
        /// Number of text fields stored.
        text_fields: usize,
        /// Number of signatures stored.
        signatures: usize,
    },
    /// Saving a draft failed; the model is untouched.
    SaveFailed {
        /// Document the draft belongs to.
        document_id: String,
        /// Error message.
        error: String,
    },
}

impl DraftEvent {
    fn description(&self) -> String {
        match self {
            DraftEvent::Loaded {
                document_id,
                text_fields,
                signatures,
                unresolved_assets,
            } => format!(
                "Draft loaded for {}: {} text, {} signatures ({} unresolved)",
                document_id, text_fields, signatures, unresolved_assets
            ),
            DraftEvent::Saved {
                document_id,
                text_fields,
                signatures,
            } => format!(
                "Draft saved for {}: {} text, {} signatures",
                document_id, text_fields, signatures
            ),
            DraftEvent::SaveFailed { document_id, error } => {
                format!("Draft save failed for {}: {}", document_id, error)
            }
        }
    }
}

/// Submit events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SubmissionEvent {
    /// Confirmed by the user, request in flight.
    Started {
        /// Document being submitted.
        document_id: String,
    },
    /// Submit accepted; the session is now locked.
    Submitted {
        /// Document that was submitted.
        document_id: String,
        /// Total annotations sent.
        annotations: usize,
    },
    /// Submit failed; the document stays editable.
    Failed {
        /// Document that failed to submit.
        document_id: String,
        /// Error message.
        error: String,
    },
}

impl SubmissionEvent {
    fn description(&self) -> String {
        match self {
            SubmissionEvent::Started { document_id } => {
                format!("Submitting {}", document_id)
            }
            SubmissionEvent::Submitted {
                document_id,
                annotations,
            } => format!("Submitted {} ({} annotations)", document_id, annotations),
            SubmissionEvent::Failed { document_id, error } => {
                format!("Submit failed for {}: {}", document_id, error)
            }
        }
    }
}

/// Lifecycle observations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LifecycleChange {
    /// The document moved to a new status.
    StatusChanged {
        /// Document whose status changed.
        document_id: String,
        /// Previous status.
        from: DocumentStatus,
        /// New status.
        to: DocumentStatus,
    },
    /// The read-only flag was derived or changed.
    ReadOnly {
        /// Document concerned.
        document_id: String,
        /// Whether the editor is now read-only.
        read_only: bool,
    },
}

impl LifecycleChange {
    fn description(&self) -> String {
        match self {
            LifecycleChange::StatusChanged {
                document_id,
                from,
                to,
            } => format!("{}: {} -> {}", document_id, from, to),
            LifecycleChange::ReadOnly {
                document_id,
                read_only,
            } => format!(
                "{} is {}",
                document_id,
                if *read_only { "read-only" } else { "editable" }
            ),
        }
    }
}

/// Kind of annotation referenced by editor events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationKind {
    TextField,
    Signature,
}

/// Editor events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EditorEvent {
    /// Placement mode changed.
    ModeChanged {
        /// New mode name (`none`, `text` or `signature`).
        mode: String,
    },
    /// An annotation was created by a page click.
    AnnotationPlaced {
        /// Annotation id.
        id: String,
        /// Annotation kind.
        kind: AnnotationKind,
        /// 1-based page number.
        page: u32,
    },
    /// An annotation was removed.
    AnnotationDeleted {
        /// Annotation id.
        id: String,
    },
    /// Selection moved to an annotation.
    Selected {
        /// Annotation id.
        id: String,
    },
    /// Selection cleared.
    SelectionCleared,
}

impl EditorEvent {
    fn description(&self) -> String {
        match self {
            EditorEvent::ModeChanged { mode } => format!("Placement mode: {}", mode),
            EditorEvent::AnnotationPlaced { id, kind, page } => {
                format!("Placed {:?} {} on page {}", kind, id, page)
            }
            EditorEvent::AnnotationDeleted { id } => format!("Deleted {}", id),
            EditorEvent::Selected { id } => format!("Selected {}", id),
            EditorEvent::SelectionCleared => "Selection cleared".to_string(),
        }
    }
}

/// Signature capture events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CaptureEvent {
    /// The drawing surface was cleared.
    Cleared,
    /// An artifact was uploaded and is now the active source.
    ArtifactReady {
        /// Stored server path.
        path: String,
        /// Intrinsic width in pixels.
        width: u32,
        /// Intrinsic height in pixels.
        height: u32,
    },
    /// An upload was rejected before any state changed.
    Rejected {
        /// Validation message.
        reason: String,
    },
}

impl CaptureEvent {
    fn description(&self) -> String {
        match self {
            CaptureEvent::Cleared => "Signature pad cleared".to_string(),
            CaptureEvent::ArtifactReady {
                path,
                width,
                height,
            } => format!("Signature ready: {} ({}x{})", path, width, height),
            CaptureEvent::Rejected { reason } => format!("Signature rejected: {}", reason),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorSeverity {
    Warning,
    Error,
    Critical,
}

/// Error and diagnostic events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ErrorEvent {
    /// Degraded but usable (for example a missing signature preview).
    Warning {
        /// Error code identifier.
        code: String,
        /// Human-readable message.
        message: String,
    },
    /// Operation failed, session continues.
    Error {
        /// Error code identifier.
        code: String,
        /// Human-readable message.
        message: String,
    },
    /// Session cannot continue.
    Critical {
        /// Error code identifier.
        code: String,
        /// Human-readable message.
        message: String,
    },
}

impl ErrorEvent {
    fn description(&self) -> String {
        match self {
            ErrorEvent::Warning { code, message } => format!("Warning [{}]: {}", code, message),
            ErrorEvent::Error { code, message } => format!("Error [{}]: {}", code, message),
            ErrorEvent::Critical { code, message } => {
                format!("Critical [{}]: {}", code, message)
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorEvent::Warning { .. } => ErrorSeverity::Warning,
            ErrorEvent::Error { .. } => ErrorSeverity::Error,
            ErrorEvent::Critical { .. } => ErrorSeverity::Critical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_category() {
        let event = AppEvent::Submission(SubmissionEvent::Started {
            document_id: "9".to_string(),
        });
        assert_eq!(event.category(), EventCategory::Submission);
        assert_eq!(event.document_id(), Some("9"));

        let event = AppEvent::Capture(CaptureEvent::Cleared);
        assert_eq!(event.category(), EventCategory::Capture);
        assert_eq!(event.document_id(), None);
    }

    #[test]
    fn test_event_serialization() {
        let event = AppEvent::Lifecycle(LifecycleChange::StatusChanged {
            document_id: "3".to_string(),
            from: DocumentStatus::Pending,
            to: DocumentStatus::Signed,
        });
        let json = serde_json::to_string(&event).expect("Should serialize");
        assert!(json.contains("\"signed\""));

        let parsed: AppEvent = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(parsed.description(), "3: pending -> signed");
    }

    #[test]
    fn test_error_severity() {
        let warning = ErrorEvent::Warning {
            code: "asset".to_string(),
            message: "preview missing".to_string(),
        };
        assert_eq!(warning.severity(), ErrorSeverity::Warning);

        let critical = ErrorEvent::Critical {
            code: "document".to_string(),
            message: "empty".to_string(),
        };
        assert_eq!(critical.severity(), ErrorSeverity::Critical);
        assert!(critical.description().starts_with("Critical [document]"));
    }
}
