//! Document metadata as reported by the document service.
//!
//! Owned by an external collaborator; the signing client only reads it and
//! derives the read-only flag from it once per load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::lifecycle::DocumentStatus;

/// Opaque document identifier
///
/// The service sends ids as either JSON numbers or strings; both are kept as
/// their decimal/string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for DocumentId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => DocumentId::from(n),
            Raw::Text(s) => DocumentId(s),
        })
    }
}

/// Metadata returned by `GET /documents/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub id: DocumentId,
    #[serde(default)]
    pub title: Option<String>,
    /// Document-level lifecycle status.
    pub status: DocumentStatus,
    /// Status of the current recipient, when the service tracks one separately.
    #[serde(default)]
    pub recipient_status: Option<DocumentStatus>,
    /// Note attached when the document was sent back for signing.
    #[serde(default)]
    pub revision_note: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DocumentMetadata {
    pub fn new(id: impl Into<DocumentId>, status: DocumentStatus) -> Self {
        Self {
            id: id.into(),
            title: None,
            status,
            recipient_status: None,
            revision_note: None,
            updated_at: None,
        }
    }

    /// Whether the editor must be read-only for this document
    ///
    /// Locked when either the document or the recipient has reached a locked
    /// status.
    pub fn is_read_only(&self) -> bool {
        self.status.is_locked() || self.recipient_status.is_some_and(|s| s.is_locked())
    }

    /// Revision note to surface in the editor, if the document was sent back
    pub fn revision_note(&self) -> Option<&str> {
        let sent_back = self.status == DocumentStatus::SentBackForSigning
            || self.recipient_status == Some(DocumentStatus::SentBackForSigning)
            || self.status == DocumentStatus::Pending;

        self.revision_note
            .as_deref()
            .map(str::trim)
            .filter(|note| sent_back && !note.is_empty())
    }
}
