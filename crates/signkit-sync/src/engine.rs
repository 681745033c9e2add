//! PDF engine: page count and page sizes for a downloaded document.
//!
//! Parsing is done with `lopdf` on the blocking pool. The engine performs a
//! one-time warm-up before its first use; concurrent callers share it.

use lopdf::{dictionary, Document, Object, ObjectId};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::OnceCell;

use signkit_core::{DocumentError, DocumentId};
use signkit_editor::Size;

/// US Letter, used when a page carries no usable MediaBox.
pub const DEFAULT_PAGE_SIZE: Size = Size {
    width: 612.0,
    height: 792.0,
};

/// What the editor needs to know about a loaded document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub page_count: u32,
    /// Page sizes in points, first page first.
    pub page_sizes: Vec<Size>,
}

impl DocumentInfo {
    /// Size of a 1-based page.
    pub fn page_size(&self, page_number: u32) -> Option<Size> {
        let index = usize::try_from(page_number.checked_sub(1)?).ok()?;
        self.page_sizes.get(index).copied()
    }
}

#[derive(Debug, Default)]
pub struct PdfEngine {
    ready: OnceCell<()>,
    init_runs: AtomicUsize,
}

impl PdfEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the warm-up once. Later and concurrent calls wait for the first.
    pub async fn ensure_ready(&self) -> Result<(), DocumentError> {
        self.ready
            .get_or_try_init(|| async {
                self.init_runs.fetch_add(1, Ordering::SeqCst);
                tracing::debug!("Initialising PDF engine");
                let result = tokio::task::spawn_blocking(warm_up)
                    .await
                    .map_err(|e| e.to_string())
                    .and_then(|r| r);
                result.map_err(|reason| {
                    tracing::error!("PDF engine failed to start: {}", reason);
                    DocumentError::EngineUnavailable { reason }
                })
            })
            .await
            .map(|_| ())
    }

    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    /// How many times the warm-up has started.
    pub fn init_runs(&self) -> usize {
        self.init_runs.load(Ordering::SeqCst)
    }

    /// Parses `bytes` and reports its pages.
    ///
    /// Empty input and input that is not a PDF are rejected with
    /// [`DocumentError::EmptyOrInvalidDocument`], which ends the session.
    pub async fn inspect(
        &self,
        document_id: &DocumentId,
        bytes: Vec<u8>,
    ) -> Result<DocumentInfo, DocumentError> {
        let invalid = |reason: String| DocumentError::EmptyOrInvalidDocument {
            document_id: document_id.to_string(),
            reason,
        };

        if bytes.is_empty() {
            return Err(invalid("document is empty".to_string()));
        }
        if !has_pdf_header(&bytes) {
            return Err(invalid("missing %PDF header".to_string()));
        }

        self.ensure_ready().await?;

        let info = tokio::task::spawn_blocking(move || read_document(&bytes))
            .await
            .map_err(|e| invalid(e.to_string()))?
            .map_err(invalid)?;

        tracing::info!(
            "Document {} loaded: {} page(s)",
            document_id,
            info.page_count
        );
        Ok(info)
    }
}

fn has_pdf_header(bytes: &[u8]) -> bool {
    bytes
        .windows(5)
        .take(1024)
        .any(|window| window == b"%PDF-")
}

fn read_document(bytes: &[u8]) -> Result<DocumentInfo, String> {
    let doc = Document::load_mem(bytes).map_err(|e| e.to_string())?;
    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err("document has no pages".to_string());
    }

    let page_sizes: Vec<Size> = pages
        .values()
        .map(|&page_id| page_size(&doc, page_id))
        .collect();
    let page_count = u32::try_from(page_sizes.len()).map_err(|e| e.to_string())?;

    Ok(DocumentInfo {
        page_count,
        page_sizes,
    })
}

/// Walks up the page tree until a MediaBox is found.
fn page_size(doc: &Document, page_id: ObjectId) -> Size {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let Ok(dict) = doc.get_object(id).and_then(|o| o.as_dict()) else {
            break;
        };
        if let Some((width, height)) = media_box(doc, dict) {
            return Size::new(width, height);
        }
        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }
    DEFAULT_PAGE_SIZE
}

fn media_box(doc: &Document, dict: &lopdf::Dictionary) -> Option<(f64, f64)> {
    let raw = dict.get(b"MediaBox").ok()?;
    let resolved = match raw {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let arr = resolved.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let llx = number(&arr[0])?;
    let lly = number(&arr[1])?;
    let urx = number(&arr[2])?;
    let ury = number(&arr[3])?;
    let (width, height) = ((urx - llx).abs(), (ury - lly).abs());
    (width > 0.0 && height > 0.0).then_some((width, height))
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some((*f).into()),
        _ => None,
    }
}

/// Builds and re-parses a one-page document to check the parser works.
fn warm_up() -> Result<(), String> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).map_err(|e| e.to_string())?;
    let info = read_document(&buffer)?;
    if info.page_count != 1 {
        return Err(format!("warm-up document reported {} pages", info.page_count));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_detection() {
        assert!(has_pdf_header(b"%PDF-1.7\n..."));
        assert!(has_pdf_header(b"\xEF\xBB\xBF%PDF-1.4"));
        assert!(!has_pdf_header(b"<html>"));
    }

    #[test]
    fn test_warm_up() {
        assert!(warm_up().is_ok());
    }

    #[test]
    fn test_page_size_lookup() {
        let info = DocumentInfo {
            page_count: 2,
            page_sizes: vec![DEFAULT_PAGE_SIZE, Size::new(595.0, 842.0)],
        };
        assert_eq!(info.page_size(2), Some(Size::new(595.0, 842.0)));
        assert_eq!(info.page_size(0), None);
        assert_eq!(info.page_size(3), None);
    }

    #[tokio::test]
    async fn test_empty_document_rejected_before_init() {
        let engine = PdfEngine::new();
        let err = engine
            .inspect(&DocumentId::from("9"), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::EmptyOrInvalidDocument { .. }));
        assert_eq!(engine.init_runs(), 0);
    }
}
