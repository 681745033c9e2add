//! HTTP implementation of [`SigningBackend`] over a blocking `ureq` agent.
//!
//! Every request runs on the blocking pool so callers stay async. No call is
//! retried; a failure is returned to the synchronizer as is.

use async_trait::async_trait;
use std::io::Read;
use std::time::Duration;
use uuid::Uuid;

use signkit_core::{DocumentId, DocumentMetadata, NetworkError};

use crate::backend::{BackendResult, SigningBackend};
use crate::wire::{DraftPayload, UploadResponse};

const USER_AGENT: &str = concat!("signkit/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`HttpBackend`].
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub base_url: String,
    pub timeout: Duration,
    /// Bearer token sent on every request, if any.
    pub token: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout: Duration::from_secs(30),
            token: None,
        }
    }
}

#[derive(Clone)]
pub struct HttpBackend {
    agent: ureq::Agent,
    settings: HttpSettings,
}

impl HttpBackend {
    pub fn new(settings: HttpSettings) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build();
        Self { agent, settings }
    }

    pub fn settings(&self) -> &HttpSettings {
        &self.settings
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.settings.base_url, path)
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let request = self.agent.request(method, &self.url(path));
        match &self.settings.token {
            Some(token) => request.set("Authorization", &format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Runs a blocking request on the blocking pool.
    async fn blocking<T, F>(&self, endpoint: &str, f: F) -> BackendResult<T>
    where
        T: Send + 'static,
        F: FnOnce(HttpBackend) -> BackendResult<T> + Send + 'static,
    {
        let this = self.clone();
        tokio::task::spawn_blocking(move || f(this))
            .await
            .map_err(|e| NetworkError::RequestFailed {
                endpoint: endpoint.to_string(),
                reason: format!("request task failed: {}", e),
            })?
    }
}

/// Joins the base URL and an endpoint path with exactly one slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn map_error(endpoint: &str, error: ureq::Error) -> NetworkError {
    match error {
        ureq::Error::Status(status, response) => {
            let message = response
                .into_string()
                .ok()
                .filter(|body| !body.trim().is_empty())
                .unwrap_or_else(|| format!("HTTP {}", status));
            NetworkError::Status {
                endpoint: endpoint.to_string(),
                status,
                message,
            }
        }
        ureq::Error::Transport(transport) => NetworkError::RequestFailed {
            endpoint: endpoint.to_string(),
            reason: transport.to_string(),
        },
    }
}

fn invalid(endpoint: &str, reason: impl ToString) -> NetworkError {
    NetworkError::InvalidResponse {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(
    endpoint: &str,
    response: ureq::Response,
) -> BackendResult<T> {
    let body = response.into_string().map_err(|e| invalid(endpoint, e))?;
    serde_json::from_str(&body).map_err(|e| invalid(endpoint, e))
}

fn read_bytes(endpoint: &str, response: ureq::Response) -> BackendResult<Vec<u8>> {
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| invalid(endpoint, e))?;
    Ok(bytes)
}

/// Builds a single-part `multipart/form-data` body.
///
/// Returns the content type header value and the body.
pub fn multipart_body(field: &str, file_name: &str, mime_type: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = format!("signkit-{}", Uuid::new_v4().simple());
    let mut body = Vec::with_capacity(bytes.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    (format!("multipart/form-data; boundary={}", boundary), body)
}

/// File name part of a stored signature path.
pub fn signature_file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[async_trait]
impl SigningBackend for HttpBackend {
    async fn fetch_metadata(&self, document_id: &DocumentId) -> BackendResult<DocumentMetadata> {
        let endpoint = format!("/documents/{}", document_id);
        self.blocking(&endpoint.clone(), move |this| {
            let response = this
                .request("GET", &endpoint)
                .call()
                .map_err(|e| map_error(&endpoint, e))?;
            read_json(&endpoint, response)
        })
        .await
    }

    async fn download_document(&self, document_id: &DocumentId) -> BackendResult<Vec<u8>> {
        let endpoint = format!("/documents/{}/download", document_id);
        self.blocking(&endpoint.clone(), move |this| {
            let response = this
                .request("GET", &endpoint)
                .set("Accept", "application/pdf")
                .call()
                .map_err(|e| map_error(&endpoint, e))?;
            read_bytes(&endpoint, response)
        })
        .await
    }

    async fn load_draft(&self, document_id: &DocumentId) -> BackendResult<Option<DraftPayload>> {
        let endpoint = format!("/signing/{}/draft", document_id);
        self.blocking(&endpoint.clone(), move |this| {
            let response = match this.request("GET", &endpoint).call() {
                Ok(response) => response,
                Err(ureq::Error::Status(404, _)) => return Ok(None),
                Err(e) => return Err(map_error(&endpoint, e)),
            };
            let body = response.into_string().map_err(|e| invalid(&endpoint, e))?;
            if body.trim().is_empty() || body.trim() == "null" {
                return Ok(None);
            }
            serde_json::from_str(&body)
                .map(Some)
                .map_err(|e| invalid(&endpoint, e))
        })
        .await
    }

    async fn save_draft(&self, document_id: &DocumentId, payload: &DraftPayload) -> BackendResult<()> {
        let endpoint = format!("/signing/{}/draft", document_id);
        let body = serde_json::to_string(payload).map_err(|e| invalid(&endpoint, e))?;
        self.blocking(&endpoint.clone(), move |this| {
            this.request("POST", &endpoint)
                .set("Content-Type", "application/json")
                .send_string(&body)
                .map_err(|e| map_error(&endpoint, e))?;
            Ok(())
        })
        .await
    }

    async fn upload_signature(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> BackendResult<String> {
        let endpoint = "/signing/signature/upload".to_string();
        let (content_type, body) = multipart_body("file", file_name, mime_type, &bytes);
        self.blocking(&endpoint.clone(), move |this| {
            let response = this
                .request("POST", &endpoint)
                .set("Content-Type", &content_type)
                .send_bytes(&body)
                .map_err(|e| map_error(&endpoint, e))?;
            let uploaded: UploadResponse = read_json(&endpoint, response)?;
            Ok(uploaded.signature_path)
        })
        .await
    }

    async fn fetch_signature(&self, path: &str) -> BackendResult<Vec<u8>> {
        let endpoint = format!("/signing/signatures/{}", signature_file_name(path));
        self.blocking(&endpoint.clone(), move |this| {
            let response = this
                .request("GET", &endpoint)
                .call()
                .map_err(|e| map_error(&endpoint, e))?;
            read_bytes(&endpoint, response)
        })
        .await
    }

    async fn submit(&self, document_id: &DocumentId, payload: &DraftPayload) -> BackendResult<()> {
        let endpoint = format!("/signing/{}/submit", document_id);
        let body = serde_json::to_string(payload).map_err(|e| invalid(&endpoint, e))?;
        self.blocking(&endpoint.clone(), move |this| {
            this.request("POST", &endpoint)
                .set("Content-Type", "application/json")
                .send_string(&body)
                .map_err(|e| map_error(&endpoint, e))?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://example.com/api/", "/signing/7/draft"),
            "https://example.com/api/signing/7/draft"
        );
        assert_eq!(join_url("http://h", "documents/1"), "http://h/documents/1");
    }

    #[test]
    fn test_multipart_body() {
        let (content_type, body) = multipart_body("file", "signature.png", "image/png", b"PNGDATA");
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        let text = String::from_utf8(body).unwrap();

        assert!(text.starts_with(&format!("--{}\r\n", boundary)));
        assert!(text.contains("name=\"file\"; filename=\"signature.png\""));
        assert!(text.contains("Content-Type: image/png\r\n\r\nPNGDATA\r\n"));
        assert!(text.ends_with(&format!("--{}--\r\n", boundary)));
    }

    #[test]
    fn test_signature_file_name() {
        assert_eq!(signature_file_name("signatures/abc.png"), "abc.png");
        assert_eq!(signature_file_name("abc.png"), "abc.png");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let backend = HttpBackend::new(HttpSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_millis(500),
            token: None,
        });
        let err = backend
            .load_draft(&DocumentId::from("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::RequestFailed { .. }));
    }
}
