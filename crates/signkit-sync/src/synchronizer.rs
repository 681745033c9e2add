//! Draft and submit synchronization.
//!
//! Drafts are full snapshots: every save replaces the stored draft with the
//! current annotation list (last write wins). Submit is terminal; once it
//! succeeds the synchronizer refuses every further write without touching the
//! network. Nothing is retried automatically.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signkit_core::event_bus::{AppEvent, DraftEvent, ErrorEvent, SubmissionEvent};
use signkit_core::{emit, AssetResolutionError, DataCallback, DocumentId, EditorError};
use signkit_editor::{Annotation, Signature, Snapshot, TextField};

use crate::assets::AssetRegistry;
use crate::backend::SigningBackend;
use crate::error::{Result, SyncError};
use crate::wire::DraftPayload;

/// Asks the user to confirm a submit.
pub trait SubmitConfirmation: Send + Sync {
    fn confirm(&self, document_id: &DocumentId, annotations: usize) -> bool;
}

impl<F> SubmitConfirmation for F
where
    F: Fn(&DocumentId, usize) -> bool + Send + Sync,
{
    fn confirm(&self, document_id: &DocumentId, annotations: usize) -> bool {
        self(document_id, annotations)
    }
}

/// Confirms every submit, for non-interactive callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl SubmitConfirmation for AlwaysConfirm {
    fn confirm(&self, _document_id: &DocumentId, _annotations: usize) -> bool {
        true
    }
}

/// Annotations restored from a stored draft.
#[derive(Debug, Default)]
pub struct LoadedDraft {
    pub annotations: Vec<Annotation>,
    /// Signatures whose preview could not be fetched. They are still placed
    /// and persisted; only the preview is missing.
    pub unresolved: Vec<AssetResolutionError>,
}

/// Resets the in-flight flag when a submit ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct DraftSynchronizer {
    backend: Arc<dyn SigningBackend>,
    assets: Arc<AssetRegistry>,
    read_only: AtomicBool,
    locked: AtomicBool,
    submitting: AtomicBool,
    on_save_draft: Option<DataCallback<DocumentId>>,
    on_submit: Option<DataCallback<DocumentId>>,
}

impl DraftSynchronizer {
    pub fn new(backend: Arc<dyn SigningBackend>, assets: Arc<AssetRegistry>) -> Self {
        Self {
            backend,
            assets,
            read_only: AtomicBool::new(false),
            locked: AtomicBool::new(false),
            submitting: AtomicBool::new(false),
            on_save_draft: None,
            on_submit: None,
        }
    }

    /// Called after each successful draft save.
    pub fn on_save_draft(mut self, callback: DataCallback<DocumentId>) -> Self {
        self.on_save_draft = Some(callback);
        self
    }

    /// Called once after a successful submit.
    pub fn on_submit(mut self, callback: DataCallback<DocumentId>) -> Self {
        self.on_submit = Some(callback);
        self
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::SeqCst) || self.is_locked()
    }

    /// Whether a submit has succeeded.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    fn guard(&self, operation: &str) -> Result<()> {
        if self.is_read_only() {
            tracing::debug!("Refusing {} for read-only document", operation);
            return Err(EditorError::ReadOnly {
                operation: operation.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Reads the stored draft and resolves signature previews.
    ///
    /// A missing draft yields an empty list. A preview that cannot be fetched
    /// is reported and skipped without failing the load.
    pub async fn load_draft(&self, document_id: &DocumentId) -> Result<LoadedDraft> {
        let Some(payload) = self.backend.load_draft(document_id).await? else {
            tracing::debug!("No draft stored for {}", document_id);
            emit!(AppEvent::Draft(DraftEvent::Loaded {
                document_id: document_id.to_string(),
                text_fields: 0,
                signatures: 0,
                unresolved_assets: 0,
            }))
            .ok();
            return Ok(LoadedDraft::default());
        };

        let text_fields = payload.text_fields.len();
        let signatures = payload.signatures.len();
        let mut loaded = LoadedDraft::default();

        loaded.annotations.extend(
            payload
                .text_fields
                .into_iter()
                .map(|record| Annotation::from(TextField::from(record))),
        );

        for record in payload.signatures {
            let signature = Signature::from(record);
            let image = match self.backend.fetch_signature(&signature.signature_image_path).await {
                Ok(bytes) => Some(self.assets.register(bytes)),
                Err(e) => {
                    let error = AssetResolutionError {
                        path: signature.signature_image_path.clone(),
                        reason: e.to_string(),
                    };
                    tracing::warn!("{}", error);
                    emit!(AppEvent::Error(ErrorEvent::Warning {
                        code: "asset_unresolved".to_string(),
                        message: error.to_string(),
                    }))
                    .ok();
                    loaded.unresolved.push(error);
                    None
                }
            };
            loaded.annotations.push(signature.with_image(image).into());
        }

        tracing::info!(
            "Draft loaded for {}: {} text field(s), {} signature(s)",
            document_id,
            text_fields,
            signatures
        );
        emit!(AppEvent::Draft(DraftEvent::Loaded {
            document_id: document_id.to_string(),
            text_fields,
            signatures,
            unresolved_assets: loaded.unresolved.len(),
        }))
        .ok();
        Ok(loaded)
    }

    /// Replaces the stored draft with `snapshot`.
    pub async fn save_draft(&self, document_id: &DocumentId, snapshot: &Snapshot) -> Result<()> {
        self.guard("save")?;
        let payload = DraftPayload::from_annotations(&snapshot.annotations);

        if let Err(e) = self.backend.save_draft(document_id, &payload).await {
            tracing::error!("Draft save failed for {}: {}", document_id, e);
            emit!(AppEvent::Draft(DraftEvent::SaveFailed {
                document_id: document_id.to_string(),
                error: e.to_string(),
            }))
            .ok();
            return Err(e.into());
        }

        tracing::info!(
            "Draft saved for {} at revision {}",
            document_id,
            snapshot.revision
        );
        emit!(AppEvent::Draft(DraftEvent::Saved {
            document_id: document_id.to_string(),
            text_fields: payload.text_fields.len(),
            signatures: payload.signatures.len(),
        }))
        .ok();
        if let Some(callback) = &self.on_save_draft {
            callback(document_id.clone());
        }
        Ok(())
    }

    /// Sends the final annotation set.
    ///
    /// At most one submit runs at a time. The user must confirm first. On
    /// failure the synchronizer stays writable so the user can retry.
    pub async fn submit(
        &self,
        document_id: &DocumentId,
        snapshot: &Snapshot,
        confirmation: &dyn SubmitConfirmation,
    ) -> Result<()> {
        self.guard("submit")?;
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Submit already in flight for {}", document_id);
            return Err(SyncError::SubmitInProgress);
        }
        let _in_flight = InFlight(&self.submitting);

        if !confirmation.confirm(document_id, snapshot.annotations.len()) {
            tracing::debug!("Submit of {} cancelled", document_id);
            return Err(SyncError::NotConfirmed);
        }

        let payload = DraftPayload::from_annotations(&snapshot.annotations);
        emit!(AppEvent::Submission(SubmissionEvent::Started {
            document_id: document_id.to_string(),
        }))
        .ok();

        if let Err(e) = self.backend.submit(document_id, &payload).await {
            tracing::error!("Submit failed for {}: {}", document_id, e);
            emit!(AppEvent::Submission(SubmissionEvent::Failed {
                document_id: document_id.to_string(),
                error: e.to_string(),
            }))
            .ok();
            return Err(e.into());
        }

        self.locked.store(true, Ordering::SeqCst);
        tracing::info!(
            "Submitted {} with {} annotation(s)",
            document_id,
            payload.len()
        );
        emit!(AppEvent::Submission(SubmissionEvent::Submitted {
            document_id: document_id.to_string(),
            annotations: payload.len(),
        }))
        .ok();
        if let Some(callback) = &self.on_submit {
            callback(document_id.clone());
        }
        Ok(())
    }
}

impl std::fmt::Debug for DraftSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftSynchronizer")
            .field("read_only", &self.read_only)
            .field("locked", &self.locked)
            .field("submitting", &self.submitting)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCall, InMemoryBackend};
    use signkit_editor::Rect;
    use std::sync::atomic::AtomicUsize;

    fn snapshot() -> Snapshot {
        Snapshot {
            revision: 1,
            annotations: vec![TextField::new(
                1,
                Rect::new(10.0, 10.0, 200.0, 30.0),
                14.0,
                "Ada".to_string(),
            )
            .into()],
        }
    }

    fn synchronizer(backend: &Arc<InMemoryBackend>) -> DraftSynchronizer {
        let backend: Arc<dyn SigningBackend> = backend.clone();
        DraftSynchronizer::new(backend, AssetRegistry::new())
    }

    #[tokio::test]
    async fn test_declined_confirmation_sends_nothing() {
        let backend = Arc::new(InMemoryBackend::new());
        let sync = synchronizer(&backend);
        let declined = |_: &DocumentId, _: usize| false;

        let err = sync
            .submit(&DocumentId::from("1"), &snapshot(), &declined)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::NotConfirmed));
        assert_eq!(backend.total_calls(), 0);
        assert!(!sync.is_submitting());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_state() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.fail_with_status(BackendCall::SaveDraft, 500);
        let saves = Arc::new(AtomicUsize::new(0));
        let counter = saves.clone();
        let sync = synchronizer(&backend).on_save_draft(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let err = sync
            .save_draft(&DocumentId::from("1"), &snapshot())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(saves.load(Ordering::SeqCst), 0);
        assert!(!sync.is_locked());
    }

    #[tokio::test]
    async fn test_read_only_makes_no_calls() {
        let backend = Arc::new(InMemoryBackend::new());
        let sync = synchronizer(&backend);
        sync.set_read_only(true);

        assert!(sync
            .save_draft(&DocumentId::from("1"), &snapshot())
            .await
            .unwrap_err()
            .is_read_only());
        assert!(sync
            .submit(&DocumentId::from("1"), &snapshot(), &AlwaysConfirm)
            .await
            .unwrap_err()
            .is_read_only());
        assert_eq!(backend.total_calls(), 0);
    }
}
