//! A document opened for signing.
//!
//! [`SigningWorkspace`] owns the editor session for one document and the
//! synchronizer that persists it. Opening runs in a fixed order: metadata,
//! read-only derivation, PDF download and inspection, then the draft.
//! Draft records that do not fit the document are dropped with a warning.

use std::sync::Arc;

use signkit_core::event_bus::{AppEvent, CaptureEvent, ErrorEvent, LifecycleChange};
use signkit_core::{
    emit, AssetResolutionError, DocumentId, DocumentMetadata, DocumentStatus, EditorError,
    LifecycleEvent,
};
use signkit_editor::{
    AnnotationId, CaptureConfig, EditorConfig, EditorSession, PlacementMode, Point,
    SignatureArtifact, SignatureSource,
};

use crate::assets::AssetRegistry;
use crate::backend::SigningBackend;
use crate::engine::{DocumentInfo, PdfEngine};
use crate::error::Result;
use crate::synchronizer::{DraftSynchronizer, SubmitConfirmation};
use crate::wire::DraftPayload;

const DRAWN_FILE_NAME: &str = "signature.png";

/// Everything needed to open a workspace besides the document id.
#[derive(Clone)]
pub struct WorkspaceContext {
    pub backend: Arc<dyn SigningBackend>,
    pub engine: Arc<PdfEngine>,
    pub assets: Arc<AssetRegistry>,
    pub editor: EditorConfig,
    pub capture: CaptureConfig,
    /// Prefill for new text fields.
    pub full_name: String,
}

impl WorkspaceContext {
    pub fn new(backend: Arc<dyn SigningBackend>) -> Self {
        Self {
            backend,
            engine: Arc::new(PdfEngine::new()),
            assets: AssetRegistry::new(),
            editor: EditorConfig::default(),
            capture: CaptureConfig::default(),
            full_name: String::new(),
        }
    }
}

pub struct SigningWorkspace {
    document_id: DocumentId,
    metadata: DocumentMetadata,
    status: DocumentStatus,
    info: DocumentInfo,
    session: EditorSession,
    synchronizer: DraftSynchronizer,
    backend: Arc<dyn SigningBackend>,
    assets: Arc<AssetRegistry>,
    unresolved: Vec<AssetResolutionError>,
}

impl SigningWorkspace {
    /// Opens `document_id` for signing.
    ///
    /// Fails when the metadata or the PDF cannot be fetched, or when the PDF
    /// is empty or invalid. A draft that cannot be read also fails the open;
    /// a signature preview that cannot be fetched does not.
    pub async fn open(context: WorkspaceContext, document_id: DocumentId) -> Result<Self> {
        let WorkspaceContext {
            backend,
            engine,
            assets,
            editor,
            capture,
            full_name,
        } = context;

        let metadata = backend.fetch_metadata(&document_id).await?;
        let read_only = metadata.is_read_only();
        tracing::info!(
            "Opening {} (status {}, read-only: {})",
            document_id,
            metadata.status,
            read_only
        );

        let mut session = EditorSession::new(editor, capture)?;
        session.set_read_only(read_only);
        session.set_full_name(full_name);
        emit!(AppEvent::Lifecycle(LifecycleChange::ReadOnly {
            document_id: document_id.to_string(),
            read_only,
        }))
        .ok();

        let pdf = backend.download_document(&document_id).await?;
        let info = engine.inspect(&document_id, pdf).await?;
        session.set_page_count(info.page_count);
        for (page_number, size) in (1u32..).zip(info.page_sizes.iter()) {
            session.set_page_size(page_number, *size);
        }

        let synchronizer = DraftSynchronizer::new(backend.clone(), assets.clone());
        synchronizer.set_read_only(read_only);
        let loaded = synchronizer.load_draft(&document_id).await?;
        let annotations = loaded
            .annotations
            .into_iter()
            .filter_map(|annotation| match session.normalize_annotation(annotation) {
                Ok(annotation) => Some(annotation),
                Err(e) => {
                    tracing::warn!("Dropping draft record for {}: {}", document_id, e);
                    emit!(AppEvent::Error(ErrorEvent::Warning {
                        code: "draft_record_rejected".to_string(),
                        message: e.to_string(),
                    }))
                    .ok();
                    None
                }
            })
            .collect();
        session.load_annotations(annotations);
        let revision = session.revision();
        session.mark_saved(revision);

        Ok(Self {
            document_id,
            status: metadata.status,
            metadata,
            info,
            session,
            synchronizer,
            backend,
            assets,
            unresolved: loaded.unresolved,
        })
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// Current status, updated locally after a successful submit.
    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    pub fn synchronizer(&self) -> &DraftSynchronizer {
        &self.synchronizer
    }

    pub fn assets(&self) -> &Arc<AssetRegistry> {
        &self.assets
    }

    pub fn is_read_only(&self) -> bool {
        self.session.is_read_only()
    }

    /// Note to show when the document came back for another signature.
    pub fn revision_note(&self) -> Option<&str> {
        self.metadata.revision_note()
    }

    /// Draft signatures whose preview is missing.
    pub fn unresolved_assets(&self) -> &[AssetResolutionError] {
        &self.unresolved
    }

    /// Click handler that uploads a pending drawing before placing it.
    pub async fn click_page(&mut self, page_number: u32, pointer: Point) -> Result<Option<AnnotationId>> {
        if self.session.mode() == PlacementMode::PlacingSignature
            && self.session.accepts_click(page_number)
            && self.session.capture().needs_upload()
        {
            self.upload_drawn().await?;
        }
        Ok(self.session.click_page(page_number, pointer)?)
    }

    /// Rasterizes the pad and stores it as the active artifact.
    pub async fn upload_drawn(&mut self) -> Result<()> {
        let png = self.session.drawn_png()?;
        let intrinsic = self.session.capture().pad().size();
        let path = self
            .backend
            .upload_signature(DRAWN_FILE_NAME, "image/png", png.clone())
            .await?;

        let preview = self.assets.register(png);
        self.session.install_artifact(SignatureArtifact {
            source: SignatureSource::Drawn,
            path: path.clone(),
            intrinsic,
            preview: Some(preview),
        })?;
        tracing::info!("Drawn signature stored at {}", path);
        emit!(AppEvent::Capture(CaptureEvent::ArtifactReady {
            path,
            width: intrinsic.width as u32,
            height: intrinsic.height as u32,
        }))
        .ok();
        Ok(())
    }

    /// Validates and stores an uploaded image as the active artifact.
    ///
    /// A rejected file leaves the previous artifact in place.
    pub async fn upload_signature(&mut self, bytes: &[u8], mime_type: &str) -> Result<()> {
        let image = match self.session.validate_upload(bytes, mime_type) {
            Ok(image) => image,
            Err(e) => {
                if e.is_validation_error() {
                    tracing::warn!("Signature upload rejected: {}", e);
                    emit!(AppEvent::Capture(CaptureEvent::Rejected {
                        reason: e.to_string()
                    }))
                    .ok();
                }
                return Err(e.into());
            }
        };

        let path = self
            .backend
            .upload_signature(image.file_name(), image.mime_type, image.bytes.clone())
            .await?;
        let preview = self.assets.register(image.bytes.clone());
        self.session.install_artifact(SignatureArtifact {
            source: SignatureSource::Uploaded,
            path: path.clone(),
            intrinsic: image.intrinsic(),
            preview: Some(preview),
        })?;
        tracing::info!(
            "Uploaded signature stored at {} ({}x{})",
            path,
            image.width,
            image.height
        );
        emit!(AppEvent::Capture(CaptureEvent::ArtifactReady {
            path,
            width: image.width,
            height: image.height,
        }))
        .ok();
        Ok(())
    }

    /// Replaces every annotation with a prepared layout.
    ///
    /// Records on pages the document does not have, or with an empty or
    /// non-finite box, reject the whole layout.
    pub fn apply_layout(&mut self, layout: DraftPayload) -> Result<()> {
        if self.is_read_only() {
            return Err(EditorError::ReadOnly {
                operation: "apply layout".to_string(),
            }
            .into());
        }
        let annotations = layout.into_annotations();
        tracing::debug!("Applying layout with {} annotation(s)", annotations.len());
        if let Err(e) = self.session.import_annotations(annotations) {
            tracing::warn!("Layout rejected for {}: {}", self.document_id, e);
            return Err(e.into());
        }
        Ok(())
    }

    /// Persists the current annotations as the draft.
    pub async fn save_draft(&mut self) -> Result<()> {
        let snapshot = self.session.snapshot();
        self.synchronizer
            .save_draft(&self.document_id, &snapshot)
            .await?;
        self.session.mark_saved(snapshot.revision);
        Ok(())
    }

    /// Submits the current annotations and locks the session.
    pub async fn submit(&mut self, confirmation: &dyn SubmitConfirmation) -> Result<()> {
        let snapshot = self.session.snapshot();
        self.synchronizer
            .submit(&self.document_id, &snapshot, confirmation)
            .await?;

        self.session.lock();
        self.session.mark_saved(snapshot.revision);

        let from = self.status;
        self.status = match from.transition(&LifecycleEvent::Submit) {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("{}; recording {} as signed", e, self.document_id);
                DocumentStatus::Signed
            }
        };
        emit!(AppEvent::Lifecycle(LifecycleChange::StatusChanged {
            document_id: self.document_id.to_string(),
            from,
            to: self.status,
        }))
        .ok();
        emit!(AppEvent::Lifecycle(LifecycleChange::ReadOnly {
            document_id: self.document_id.to_string(),
            read_only: true,
        }))
        .ok();
        Ok(())
    }
}

impl std::fmt::Debug for SigningWorkspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningWorkspace")
            .field("document_id", &self.document_id)
            .field("status", &self.status)
            .field("pages", &self.info.page_count)
            .field("annotations", &self.session.annotations().len())
            .finish_non_exhaustive()
    }
}

