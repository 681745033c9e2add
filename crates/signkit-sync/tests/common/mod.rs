//! Shared fixtures for the signing flow tests.

#![allow(dead_code)]

use image::{ImageBuffer, ImageFormat, Rgba};
use lopdf::{dictionary, Document, Object};
use std::io::Cursor;
use std::sync::Arc;

use signkit_core::{DocumentId, DocumentMetadata, DocumentStatus};
use signkit_sync::{InMemoryBackend, SigningBackend, WorkspaceContext};

pub const DOC: &str = "42";

/// A PDF with `pages` empty US Letter pages.
pub fn minimal_pdf(pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            })
            .into()
        })
        .collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("write test pdf");
    out
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_pixel(width, height, Rgba([20, 20, 20, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode png");
    out.into_inner()
}

pub fn doc_id() -> DocumentId {
    DocumentId::from(DOC)
}

/// Backend holding one two-page document in `status`.
pub fn backend_with(status: DocumentStatus) -> Arc<InMemoryBackend> {
    let backend = Arc::new(InMemoryBackend::new());
    let mut metadata = DocumentMetadata::new(DOC, status);
    metadata.title = Some("Lease agreement".to_string());
    backend.insert_document(metadata, minimal_pdf(2));
    backend
}

pub fn context(backend: &Arc<InMemoryBackend>) -> WorkspaceContext {
    let backend: Arc<dyn SigningBackend> = backend.clone();
    let mut context = WorkspaceContext::new(backend);
    context.full_name = "Grace Hopper".to_string();
    context
}
