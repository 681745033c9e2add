//! Central annotation store.
//!
//! Every geometry or content change goes through [`AnnotationStore::dispatch`].
//! The store also tracks the single active selection and a revision counter
//! used to report unsaved changes.

use std::collections::HashMap;

use signkit_core::EditorError;

use crate::annotation::{Annotation, AnnotationId};
use crate::config::EditorConfig;
use crate::geometry::Size;
use crate::sizing::resize_locked;

/// Intent applied by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    /// Append a new annotation.
    Add(Annotation),
    /// Translate by a document-space delta.
    Move { id: AnnotationId, dx: f64, dy: f64 },
    /// Move the top-left corner to a document-space position.
    MoveTo { id: AnnotationId, x: f64, y: f64 },
    /// Request a new document-space size.
    Resize {
        id: AnnotationId,
        width: f64,
        height: f64,
    },
    /// Replace text content; the field auto-grows.
    SetText { id: AnnotationId, text: String },
    Delete { id: AnnotationId },
    /// Select one annotation, or clear the selection with `None`.
    Select(Option<AnnotationId>),
}

impl EditorAction {
    pub fn name(&self) -> &'static str {
        match self {
            EditorAction::Add(_) => "add",
            EditorAction::Move { .. } => "move",
            EditorAction::MoveTo { .. } => "move",
            EditorAction::Resize { .. } => "resize",
            EditorAction::SetText { .. } => "set_text",
            EditorAction::Delete { .. } => "delete",
            EditorAction::Select(_) => "select",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    selected: Option<AnnotationId>,
    page_sizes: HashMap<u32, Size>,
    config: EditorConfig,
    revision: u64,
    saved_revision: u64,
}

impl AnnotationStore {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }

    pub fn on_page(&self, page_number: u32) -> impl Iterator<Item = &Annotation> {
        self.annotations
            .iter()
            .filter(move |a| a.page_number() == page_number)
    }

    pub fn selected_id(&self) -> Option<&AnnotationId> {
        self.selected.as_ref()
    }

    pub fn selected(&self) -> Option<&Annotation> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    /// Records a page size reported by the PDF engine (document space).
    pub fn set_page_size(&mut self, page_number: u32, size: Size) {
        self.page_sizes.insert(page_number, size);
    }

    pub fn page_size(&self, page_number: u32) -> Option<Size> {
        self.page_sizes.get(&page_number).copied()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the model changed since the last successful save or load.
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    /// Marks `revision` as persisted.
    ///
    /// Takes the revision that was snapshotted rather than the current one,
    /// so edits made while a save was in flight stay dirty.
    pub fn mark_saved(&mut self, revision: u64) {
        self.saved_revision = revision.min(self.revision);
    }

    /// Replaces the whole model with a loaded draft.
    pub fn replace_all(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
        self.selected = None;
        self.revision += 1;
        self.saved_revision = self.revision;
    }

    /// Applies one intent.
    ///
    /// Errors leave the store untouched.
    pub fn dispatch(&mut self, action: EditorAction) -> Result<(), EditorError> {
        tracing::trace!("dispatch {:?}", action);

        match action {
            EditorAction::Add(annotation) => {
                self.selected = Some(annotation.id().clone());
                self.annotations.push(annotation);
            }
            EditorAction::Move { id, dx, dy } => {
                let origin = self.require(&id)?.position();
                self.move_to(&id, origin.x + dx, origin.y + dy)?;
            }
            EditorAction::MoveTo { id, x, y } => self.move_to(&id, x, y)?,
            EditorAction::Resize { id, width, height } => {
                if !width.is_finite() || !height.is_finite() {
                    self.require(&id)?;
                    return Ok(());
                }
                self.resize(&id, width, height)?
            }
            EditorAction::SetText { id, text } => self.set_text(&id, text)?,
            EditorAction::Delete { id } => {
                let index = self.index_of(&id)?;
                self.annotations.remove(index);
                if self.selected.as_ref() == Some(&id) {
                    self.selected = None;
                }
            }
            EditorAction::Select(id) => {
                if let Some(id) = &id {
                    self.require(id)?;
                }
                self.selected = id;
                return Ok(());
            }
        }

        self.revision += 1;
        Ok(())
    }

    fn index_of(&self, id: &AnnotationId) -> Result<usize, EditorError> {
        self.annotations
            .iter()
            .position(|a| a.id() == id)
            .ok_or_else(|| EditorError::AnnotationNotFound { id: id.to_string() })
    }

    fn require(&self, id: &AnnotationId) -> Result<&Annotation, EditorError> {
        self.get(id)
            .ok_or_else(|| EditorError::AnnotationNotFound { id: id.to_string() })
    }

    fn move_to(&mut self, id: &AnnotationId, x: f64, y: f64) -> Result<(), EditorError> {
        let index = self.index_of(id)?;
        let annotation = &self.annotations[index];
        let size = annotation.size();
        let (x, y) = match self.page_sizes.get(&annotation.page_number()) {
            Some(page) => (
                x.clamp(0.0, (page.width - size.width).max(0.0)),
                y.clamp(0.0, (page.height - size.height).max(0.0)),
            ),
            None => (x, y),
        };

        let rect = self.annotations[index].rect_mut();
        rect.x = x;
        rect.y = y;
        Ok(())
    }

    fn resize(&mut self, id: &AnnotationId, width: f64, height: f64) -> Result<(), EditorError> {
        let index = self.index_of(id)?;

        match &mut self.annotations[index] {
            Annotation::TextField(field) => {
                field.rect.width = width.max(self.config.min_text_width);
                field.rect.height = height.max(self.config.min_text_height);
            }
            Annotation::Signature(signature) => {
                let size = resize_locked(
                    signature.rect.size(),
                    Size::new(width, height),
                    signature.aspect_ratio,
                    &self.config.signature_footprint,
                );
                signature.rect.width = size.width;
                signature.rect.height = size.height;
            }
        }
        Ok(())
    }

    fn set_text(&mut self, id: &AnnotationId, text: String) -> Result<(), EditorError> {
        let index = self.index_of(id)?;
        let grown = self.grown_width(&text);

        match &mut self.annotations[index] {
            Annotation::TextField(field) => {
                field.rect.width = grown;
                field.text_content = text;
                Ok(())
            }
            Annotation::Signature(_) => Err(EditorError::WrongAnnotationKind {
                id: id.to_string(),
                operation: "set_text".to_string(),
            }),
        }
    }

    /// Auto-grow width for a text field holding `text`.
    pub fn grown_width(&self, text: &str) -> f64 {
        let needed = text.chars().count() as f64 * self.config.per_char_width;
        needed.max(self.config.default_text_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Signature, TextField};
    use crate::geometry::Rect;

    fn store_with_text() -> (AnnotationStore, AnnotationId) {
        let mut store = AnnotationStore::new(EditorConfig::default());
        let field = TextField::new(1, Rect::new(10.0, 10.0, 200.0, 30.0), 14.0, String::new());
        let id = field.id.clone();
        store.dispatch(EditorAction::Add(field.into())).unwrap();
        (store, id)
    }

    #[test]
    fn test_add_selects_and_bumps_revision() {
        let (store, id) = store_with_text();
        assert_eq!(store.selected_id(), Some(&id));
        assert_eq!(store.revision(), 1);
        assert!(store.is_dirty());
    }

    #[test]
    fn test_move_and_page_clamp() {
        let (mut store, id) = store_with_text();
        store
            .dispatch(EditorAction::Move {
                id: id.clone(),
                dx: 5.0,
                dy: -2.0,
            })
            .unwrap();
        assert_eq!(store.get(&id).unwrap().position().x, 15.0);
        assert_eq!(store.get(&id).unwrap().position().y, 8.0);

        store.set_page_size(1, Size::new(612.0, 792.0));
        store
            .dispatch(EditorAction::MoveTo {
                id: id.clone(),
                x: 1000.0,
                y: -50.0,
            })
            .unwrap();
        let position = store.get(&id).unwrap().position();
        assert_eq!(position.x, 412.0);
        assert_eq!(position.y, 0.0);
    }

    #[test]
    fn test_text_resize_minimum() {
        let (mut store, id) = store_with_text();
        store
            .dispatch(EditorAction::Resize {
                id: id.clone(),
                width: 10.0,
                height: 5.0,
            })
            .unwrap();
        let size = store.get(&id).unwrap().size();
        assert_eq!(size, Size::new(50.0, 20.0));
    }

    #[test]
    fn test_non_finite_resize_is_ignored() {
        let (mut store, id) = store_with_text();
        store.mark_saved(store.revision());
        let revision = store.revision();

        store
            .dispatch(EditorAction::Resize {
                id: id.clone(),
                width: f64::NAN,
                height: 40.0,
            })
            .unwrap();

        assert_eq!(store.revision(), revision);
        assert!(!store.is_dirty());
        assert_eq!(store.get(&id).unwrap().size(), Size::new(200.0, 30.0));
    }

    #[test]
    fn test_text_auto_grow() {
        let (mut store, id) = store_with_text();
        store
            .dispatch(EditorAction::SetText {
                id: id.clone(),
                text: "x".repeat(30),
            })
            .unwrap();
        assert_eq!(store.get(&id).unwrap().size().width, 240.0);

        store
            .dispatch(EditorAction::SetText {
                id: id.clone(),
                text: "Jo".to_string(),
            })
            .unwrap();
        assert_eq!(store.get(&id).unwrap().size().width, 200.0);
    }

    #[test]
    fn test_set_text_on_signature_rejected() {
        let mut store = AnnotationStore::new(EditorConfig::default());
        let signature = Signature::new(
            1,
            Rect::new(0.0, 0.0, 200.0, 100.0),
            "sig.png".to_string(),
            2.0,
        );
        let id = signature.id.clone();
        store.dispatch(EditorAction::Add(signature.into())).unwrap();
        let revision = store.revision();

        let result = store.dispatch(EditorAction::SetText {
            id,
            text: "nope".to_string(),
        });
        assert!(matches!(
            result,
            Err(EditorError::WrongAnnotationKind { .. })
        ));
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_delete_clears_selection() {
        let (mut store, id) = store_with_text();
        store.dispatch(EditorAction::Delete { id: id.clone() }).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.selected_id(), None);
        assert!(store
            .dispatch(EditorAction::Delete { id })
            .is_err());
    }

    #[test]
    fn test_select_does_not_dirty() {
        let (mut store, id) = store_with_text();
        store.mark_saved(store.revision());
        store.dispatch(EditorAction::Select(None)).unwrap();
        store.dispatch(EditorAction::Select(Some(id))).unwrap();
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_mark_saved_with_stale_revision() {
        let (mut store, id) = store_with_text();
        let snapshot_revision = store.revision();
        store
            .dispatch(EditorAction::Move { id, dx: 1.0, dy: 1.0 })
            .unwrap();
        store.mark_saved(snapshot_revision);
        assert!(store.is_dirty());
    }
}
