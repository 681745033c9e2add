//! Document lifecycle state machine.
//!
//! The signing client observes these states to decide whether the annotation
//! surface is editable. The only transition it ever triggers itself is
//! [`LifecycleEvent::Submit`]; every other edge is driven by external
//! collaborators (assignment, confirmation, send-back).
//!
//! ```text
//! draft ──Assign──▶ pending ──Submit──▶ signed ──RequestConfirmation──▶ waiting_confirmation ──Confirm──▶ confirmed
//!                      ▲                  ▲  │                                   │
//!                      │               Submit SendBack                        SendBack
//!                   Reassign              │  ▼                                   │
//!                      └─────────── sent_back_for_signing ◀──────────────────────┘
//! ```
//!
//! `Submit` is also accepted from `draft`. `confirmed` is terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LifecycleError, ValidationError};

/// Lifecycle status of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Uploaded, not yet assigned to a signer
    Draft,
    /// Assigned and awaiting the signer
    Pending,
    /// Annotations submitted by the signer
    Signed,
    /// Signed, awaiting owner confirmation
    WaitingConfirmation,
    /// Confirmed by the owner (terminal)
    Confirmed,
    /// Returned to the signer with a revision note
    SentBackForSigning,
}

impl DocumentStatus {
    /// All statuses in lifecycle order
    pub const ALL: [DocumentStatus; 6] = [
        DocumentStatus::Draft,
        DocumentStatus::Pending,
        DocumentStatus::Signed,
        DocumentStatus::WaitingConfirmation,
        DocumentStatus::Confirmed,
        DocumentStatus::SentBackForSigning,
    ];

    /// Wire name used by the document API
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Pending => "pending",
            DocumentStatus::Signed => "signed",
            DocumentStatus::WaitingConfirmation => "waiting_confirmation",
            DocumentStatus::Confirmed => "confirmed",
            DocumentStatus::SentBackForSigning => "sent_back_for_signing",
        }
    }

    /// Whether annotations can no longer change in this status
    pub fn is_locked(&self) -> bool {
        matches!(
            self,
            DocumentStatus::Signed | DocumentStatus::WaitingConfirmation | DocumentStatus::Confirmed
        )
    }

    /// Whether the signer may still edit and submit
    pub fn is_editable(&self) -> bool {
        !self.is_locked()
    }

    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Confirmed)
    }

    /// Applies an event, returning the next status
    pub fn transition(&self, event: &LifecycleEvent) -> Result<DocumentStatus, LifecycleError> {
        use DocumentStatus::*;

        let next = match (self, event) {
            (Draft, LifecycleEvent::Assign) => Some(Pending),
            (Draft | Pending | SentBackForSigning, LifecycleEvent::Submit) => Some(Signed),
            (Signed, LifecycleEvent::RequestConfirmation) => Some(WaitingConfirmation),
            (WaitingConfirmation, LifecycleEvent::Confirm) => Some(Confirmed),
            (Signed | WaitingConfirmation, LifecycleEvent::SendBack { note }) => {
                if note.trim().is_empty() {
                    None
                } else {
                    Some(SentBackForSigning)
                }
            }
            (SentBackForSigning, LifecycleEvent::Reassign) => Some(Pending),
            _ => None,
        };

        next.ok_or_else(|| LifecycleError::InvalidTransition {
            current: self.as_str().to_string(),
            event: event.name().to_string(),
        })
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| LifecycleError::UnknownStatus {
                status: s.to_string(),
            })
    }
}

/// Events that move a document between statuses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// Owner assigns the document to a signer
    Assign,
    /// Signer submits the annotation layout
    Submit,
    /// Signed document is forwarded for confirmation
    RequestConfirmation,
    /// Owner confirms the signed document
    Confirm,
    /// Owner sends the document back with a revision note
    SendBack {
        /// Note shown to the signer.
        note: String,
    },
    /// Sent-back document is re-opened for the same signer
    Reassign,
}

impl LifecycleEvent {
    /// Send-back event; the note is required.
    pub fn send_back(note: impl Into<String>) -> Result<Self, ValidationError> {
        let note = note.into();
        if note.trim().is_empty() {
            return Err(ValidationError::MissingNote);
        }
        Ok(LifecycleEvent::SendBack { note })
    }

    /// Short event name for logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Assign => "assign",
            LifecycleEvent::Submit => "submit",
            LifecycleEvent::RequestConfirmation => "request_confirmation",
            LifecycleEvent::Confirm => "confirm",
            LifecycleEvent::SendBack { .. } => "send_back",
            LifecycleEvent::Reassign => "reassign",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_back_constructor() {
        assert_eq!(
            LifecycleEvent::send_back("   "),
            Err(ValidationError::MissingNote)
        );
        let event = LifecycleEvent::send_back("Initial page 3").unwrap();
        assert_eq!(
            DocumentStatus::Signed.transition(&event).unwrap(),
            DocumentStatus::SentBackForSigning
        );
    }

    #[test]
    fn test_happy_path() {
        let status = DocumentStatus::Draft;
        let status = status.transition(&LifecycleEvent::Assign).unwrap();
        assert_eq!(status, DocumentStatus::Pending);
        let status = status.transition(&LifecycleEvent::Submit).unwrap();
        assert_eq!(status, DocumentStatus::Signed);
        let status = status
            .transition(&LifecycleEvent::RequestConfirmation)
            .unwrap();
        assert_eq!(status, DocumentStatus::WaitingConfirmation);
        let status = status.transition(&LifecycleEvent::Confirm).unwrap();
        assert_eq!(status, DocumentStatus::Confirmed);
        assert!(status.is_terminal());
    }

    #[test]
    fn test_send_back_round_trip() {
        let status = DocumentStatus::WaitingConfirmation
            .transition(&LifecycleEvent::SendBack {
                note: "Initial page 3".to_string(),
            })
            .unwrap();
        assert_eq!(status, DocumentStatus::SentBackForSigning);
        assert!(status.is_editable());

        let status = status.transition(&LifecycleEvent::Reassign).unwrap();
        assert_eq!(status, DocumentStatus::Pending);
    }

    #[test]
    fn test_send_back_requires_note() {
        let result = DocumentStatus::Signed.transition(&LifecycleEvent::SendBack {
            note: "   ".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(DocumentStatus::Signed
            .transition(&LifecycleEvent::Submit)
            .is_err());
        assert!(DocumentStatus::Confirmed
            .transition(&LifecycleEvent::SendBack {
                note: "late".to_string()
            })
            .is_err());
        assert!(DocumentStatus::Pending
            .transition(&LifecycleEvent::Confirm)
            .is_err());
    }

    #[test]
    fn test_locked_statuses() {
        assert!(!DocumentStatus::Draft.is_locked());
        assert!(!DocumentStatus::Pending.is_locked());
        assert!(DocumentStatus::Signed.is_locked());
        assert!(DocumentStatus::WaitingConfirmation.is_locked());
        assert!(DocumentStatus::Confirmed.is_locked());
        assert!(!DocumentStatus::SentBackForSigning.is_locked());
    }

    #[test]
    fn test_wire_names() {
        for status in DocumentStatus::ALL {
            let parsed: DocumentStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert!("archived".parse::<DocumentStatus>().is_err());
    }
}
