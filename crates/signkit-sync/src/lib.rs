//! # SignKit Sync
//!
//! Connects an editor session to the signing API.
//!
//! - [`SigningBackend`] trait with HTTP and in-memory implementations
//! - Draft load/save and terminal submit ([`DraftSynchronizer`])
//! - PDF inspection with a one-time engine warm-up ([`PdfEngine`])
//! - Preview handles for signature images ([`AssetRegistry`])
//! - [`SigningWorkspace`], one document opened for signing

pub mod assets;
pub mod backend;
pub mod engine;
pub mod error;
pub mod http;
pub mod synchronizer;
pub mod wire;
pub mod workspace;

pub use assets::AssetRegistry;
pub use backend::{BackendCall, BackendResult, InMemoryBackend, SigningBackend};
pub use engine::{DocumentInfo, PdfEngine, DEFAULT_PAGE_SIZE};
pub use error::{Result, SyncError};
pub use http::{HttpBackend, HttpSettings};
pub use synchronizer::{AlwaysConfirm, DraftSynchronizer, LoadedDraft, SubmitConfirmation};
pub use wire::{DraftPayload, SignatureRecord, TextFieldRecord, UploadResponse};
pub use workspace::{SigningWorkspace, WorkspaceContext};
