//! Signing API abstraction.
//!
//! [`SigningBackend`] is the seam between the synchronizer and the server.
//! [`HttpBackend`](crate::http::HttpBackend) talks to the real API;
//! [`InMemoryBackend`] keeps everything in process for tests and offline use.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use signkit_core::{DocumentId, DocumentMetadata, DocumentStatus, NetworkError};

use crate::wire::DraftPayload;

/// Result type for backend calls
pub type BackendResult<T> = std::result::Result<T, NetworkError>;

/// Server operations used by a signing session.
#[async_trait]
pub trait SigningBackend: Send + Sync {
    async fn fetch_metadata(&self, document_id: &DocumentId) -> BackendResult<DocumentMetadata>;

    /// Raw PDF bytes.
    async fn download_document(&self, document_id: &DocumentId) -> BackendResult<Vec<u8>>;

    /// Latest draft, or `None` when none was ever saved.
    async fn load_draft(&self, document_id: &DocumentId) -> BackendResult<Option<DraftPayload>>;

    /// Replaces the stored draft with `payload`.
    async fn save_draft(&self, document_id: &DocumentId, payload: &DraftPayload) -> BackendResult<()>;

    /// Stores a signature image and returns its path.
    async fn upload_signature(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> BackendResult<String>;

    /// Fetches a stored signature image by path.
    async fn fetch_signature(&self, path: &str) -> BackendResult<Vec<u8>>;

    /// Terminal submit. Supersedes any draft.
    async fn submit(&self, document_id: &DocumentId, payload: &DraftPayload) -> BackendResult<()>;
}

/// Which call an injected failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendCall {
    FetchMetadata,
    Download,
    LoadDraft,
    SaveDraft,
    Upload,
    FetchSignature,
    Submit,
}

impl BackendCall {
    fn endpoint(&self) -> &'static str {
        match self {
            BackendCall::FetchMetadata => "/documents/{id}",
            BackendCall::Download => "/documents/{id}/download",
            BackendCall::LoadDraft | BackendCall::SaveDraft => "/signing/{id}/draft",
            BackendCall::Upload => "/signing/signature/upload",
            BackendCall::FetchSignature => "/signing/signatures/{filename}",
            BackendCall::Submit => "/signing/{id}/submit",
        }
    }
}

#[derive(Default)]
struct CallCounters {
    calls: Mutex<HashMap<BackendCall, usize>>,
    total: AtomicUsize,
}

impl CallCounters {
    fn record(&self, call: BackendCall) {
        *self.calls.lock().entry(call).or_insert(0) += 1;
        self.total.fetch_add(1, Ordering::SeqCst);
    }
}

/// Server double holding documents, drafts and signature images in memory.
///
/// Drafts are kept as serialized JSON so a read returns exactly what the
/// last write sent.
#[derive(Default)]
pub struct InMemoryBackend {
    documents: RwLock<HashMap<DocumentId, (DocumentMetadata, Vec<u8>)>>,
    drafts: RwLock<HashMap<DocumentId, Vec<u8>>>,
    submissions: RwLock<HashMap<DocumentId, Vec<u8>>>,
    signatures: RwLock<HashMap<String, Vec<u8>>>,
    failures: Mutex<HashMap<BackendCall, NetworkError>>,
    counters: CallCounters,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_document(&self, metadata: DocumentMetadata, pdf: Vec<u8>) {
        self.documents
            .write()
            .insert(metadata.id.clone(), (metadata, pdf));
    }

    pub fn insert_signature(&self, path: impl Into<String>, bytes: Vec<u8>) {
        self.signatures.write().insert(path.into(), bytes);
    }

    /// Seeds a stored draft, as if saved by an earlier session.
    pub fn insert_draft(&self, document_id: &DocumentId, payload: &DraftPayload) -> BackendResult<()> {
        let bytes = encode(BackendCall::SaveDraft, payload)?;
        self.drafts.write().insert(document_id.clone(), bytes);
        Ok(())
    }

    /// Makes every later `call` fail with `error` until cleared.
    pub fn fail(&self, call: BackendCall, error: NetworkError) {
        self.failures.lock().insert(call, error);
    }

    pub fn fail_with_status(&self, call: BackendCall, status: u16) {
        self.fail(
            call,
            NetworkError::Status {
                endpoint: call.endpoint().to_string(),
                status,
                message: "injected failure".to_string(),
            },
        );
    }

    pub fn clear_failure(&self, call: BackendCall) {
        self.failures.lock().remove(&call);
    }

    /// Stored draft bytes, exactly as last written.
    pub fn raw_draft(&self, document_id: &DocumentId) -> Option<Vec<u8>> {
        self.drafts.read().get(document_id).cloned()
    }

    pub fn submission(&self, document_id: &DocumentId) -> Option<DraftPayload> {
        self.submissions
            .read()
            .get(document_id)
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
    }

    pub fn metadata(&self, document_id: &DocumentId) -> Option<DocumentMetadata> {
        self.documents
            .read()
            .get(document_id)
            .map(|(metadata, _)| metadata.clone())
    }

    pub fn call_count(&self, call: BackendCall) -> usize {
        self.counters.calls.lock().get(&call).copied().unwrap_or(0)
    }

    /// Every call made so far, failed ones included.
    pub fn total_calls(&self) -> usize {
        self.counters.total.load(Ordering::SeqCst)
    }

    fn enter(&self, call: BackendCall) -> BackendResult<()> {
        self.counters.record(call);
        match self.failures.lock().get(&call) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn encode(call: BackendCall, payload: &DraftPayload) -> BackendResult<Vec<u8>> {
    serde_json::to_vec(payload).map_err(|e| NetworkError::InvalidResponse {
        endpoint: call.endpoint().to_string(),
        reason: e.to_string(),
    })
}

fn not_found(call: BackendCall, what: &str) -> NetworkError {
    NetworkError::Status {
        endpoint: call.endpoint().to_string(),
        status: 404,
        message: format!("{} not found", what),
    }
}

#[async_trait]
impl SigningBackend for InMemoryBackend {
    async fn fetch_metadata(&self, document_id: &DocumentId) -> BackendResult<DocumentMetadata> {
        self.enter(BackendCall::FetchMetadata)?;
        self.metadata(document_id)
            .ok_or_else(|| not_found(BackendCall::FetchMetadata, document_id.as_str()))
    }

    async fn download_document(&self, document_id: &DocumentId) -> BackendResult<Vec<u8>> {
        self.enter(BackendCall::Download)?;
        self.documents
            .read()
            .get(document_id)
            .map(|(_, pdf)| pdf.clone())
            .ok_or_else(|| not_found(BackendCall::Download, document_id.as_str()))
    }

    async fn load_draft(&self, document_id: &DocumentId) -> BackendResult<Option<DraftPayload>> {
        self.enter(BackendCall::LoadDraft)?;
        let Some(bytes) = self.raw_draft(document_id) else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| NetworkError::InvalidResponse {
                endpoint: BackendCall::LoadDraft.endpoint().to_string(),
                reason: e.to_string(),
            })
    }

    async fn save_draft(&self, document_id: &DocumentId, payload: &DraftPayload) -> BackendResult<()> {
        self.enter(BackendCall::SaveDraft)?;
        let bytes = encode(BackendCall::SaveDraft, payload)?;
        self.drafts.write().insert(document_id.clone(), bytes);
        Ok(())
    }

    async fn upload_signature(
        &self,
        file_name: &str,
        _mime_type: &str,
        bytes: Vec<u8>,
    ) -> BackendResult<String> {
        self.enter(BackendCall::Upload)?;
        let path = format!("signatures/{}-{}", uuid::Uuid::new_v4(), file_name);
        self.signatures.write().insert(path.clone(), bytes);
        Ok(path)
    }

    async fn fetch_signature(&self, path: &str) -> BackendResult<Vec<u8>> {
        self.enter(BackendCall::FetchSignature)?;
        self.signatures
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(BackendCall::FetchSignature, path))
    }

    async fn submit(&self, document_id: &DocumentId, payload: &DraftPayload) -> BackendResult<()> {
        self.enter(BackendCall::Submit)?;
        let bytes = encode(BackendCall::Submit, payload)?;
        {
            let mut documents = self.documents.write();
            let (metadata, _) = documents
                .get_mut(document_id)
                .ok_or_else(|| not_found(BackendCall::Submit, document_id.as_str()))?;
            metadata.status = DocumentStatus::Signed;
            metadata.recipient_status = Some(DocumentStatus::Signed);
        }
        self.submissions.write().insert(document_id.clone(), bytes);
        self.drafts.write().remove(document_id);
        Ok(())
    }
}
