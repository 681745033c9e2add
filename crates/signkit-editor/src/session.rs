//! Editor session: one document open for annotation.
//!
//! Ties the store, viewport, placement mode, pointer gestures and signature
//! capture together and enforces read-only mode in one place. Everything
//! here is synchronous; network work happens in the sync crate against
//! snapshots taken from [`EditorSession::snapshot`].

use signkit_core::event_bus::{AppEvent, EditorEvent};
use signkit_core::{emit, EditorError, ValidationError};

use crate::annotation::{Annotation, AnnotationId};
use crate::capture::{validate_upload, SignatureArtifact, SignatureCapture, ValidatedImage};
use crate::config::{CaptureConfig, EditorConfig};
use crate::geometry::{Point, Size};
use crate::interaction::InteractionState;
use crate::placement::{signature_at, text_field_at, PlacementMode};
use crate::sizing::fit_to_footprint;
use crate::store::{AnnotationStore, EditorAction};
use crate::viewport::Viewport;

/// Copy of the model handed to the synchronizer.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub revision: u64,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug)]
pub struct EditorSession {
    store: AnnotationStore,
    viewport: Viewport,
    mode: PlacementMode,
    interaction: InteractionState,
    capture: SignatureCapture,
    capture_config: CaptureConfig,
    read_only: bool,
    locked: bool,
    page_count: Option<u32>,
    full_name: String,
}

impl EditorSession {
    pub fn new(config: EditorConfig, capture_config: CaptureConfig) -> Result<Self, ValidationError> {
        Ok(Self {
            viewport: Viewport::from_config(&config),
            store: AnnotationStore::new(config),
            mode: PlacementMode::None,
            interaction: InteractionState::Idle,
            capture: SignatureCapture::new(&capture_config)?,
            capture_config,
            read_only: false,
            locked: false,
            page_count: None,
            full_name: String::new(),
        })
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.store.annotations()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Zoom stays available in read-only mode.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn capture(&self) -> &SignatureCapture {
        &self.capture
    }

    pub fn mode(&self) -> PlacementMode {
        self.mode
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn page_count(&self) -> Option<u32> {
        self.page_count
    }

    /// Called once the PDF engine reports the page count.
    pub fn set_page_count(&mut self, page_count: u32) {
        self.page_count = Some(page_count);
    }

    /// Page size in document space, used to keep drags on the page.
    pub fn set_page_size(&mut self, page_number: u32, size: Size) {
        self.store.set_page_size(page_number, size);
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Prefill for new text fields.
    pub fn set_full_name(&mut self, name: impl Into<String>) {
        self.full_name = name.into();
    }

    /// Read-only as derived from the document status on load.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        if self.is_read_only() {
            self.mode = PlacementMode::None;
            self.interaction = InteractionState::Idle;
        }
    }

    /// Locks the session for the rest of its lifetime after a submit.
    pub fn lock(&mut self) {
        self.locked = true;
        self.mode = PlacementMode::None;
        self.interaction = InteractionState::Idle;
        tracing::info!("Editor session locked");
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only || self.locked
    }

    fn guard(&self, operation: &str) -> Result<(), EditorError> {
        if self.is_read_only() {
            tracing::debug!("Refusing {} in read-only session", operation);
            return Err(EditorError::ReadOnly {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    pub fn mark_saved(&mut self, revision: u64) {
        self.store.mark_saved(revision);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.store.revision(),
            annotations: self.store.annotations().to_vec(),
        }
    }

    /// Replaces the model with annotations read from a draft.
    ///
    /// Callers pass annotations already checked by
    /// [`EditorSession::normalize_annotation`].
    pub fn load_annotations(&mut self, annotations: Vec<Annotation>) {
        self.interaction = InteractionState::Idle;
        self.store.replace_all(annotations);
    }

    /// Checks an annotation that did not come from a gesture here, such as a
    /// draft record or an imported layout.
    ///
    /// The page must exist and the box must be finite with a positive size.
    /// The size is then brought within the editor limits: text grows to its
    /// minimum, signatures are fitted into the footprint. The position is
    /// kept on the page when its size is known.
    pub fn normalize_annotation(&self, mut annotation: Annotation) -> signkit_core::Result<Annotation> {
        let page_count = self.page_count.ok_or(EditorError::DocumentNotLoaded)?;
        let page = annotation.page_number();
        if page == 0 || page > page_count {
            return Err(EditorError::PageOutOfRange { page, page_count }.into());
        }

        let rect = annotation.rect();
        let finite = [rect.x, rect.y, rect.width, rect.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite || rect.width <= 0.0 || rect.height <= 0.0 {
            return Err(ValidationError::InvalidGeometry {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
            }
            .into());
        }

        let config = self.store.config();
        match &mut annotation {
            Annotation::TextField(field) => {
                field.rect.width = field.rect.width.max(config.min_text_width);
                field.rect.height = field.rect.height.max(config.min_text_height);
            }
            Annotation::Signature(signature) => {
                let footprint = &config.signature_footprint;
                if !footprint.contains(signature.rect.width, signature.rect.height) {
                    let size = fit_to_footprint(signature.rect.size(), footprint);
                    tracing::debug!(
                        "Signature on page {} refitted from {}x{} to {}x{}",
                        page,
                        signature.rect.width,
                        signature.rect.height,
                        size.width,
                        size.height
                    );
                    signature.rect.width = size.width;
                    signature.rect.height = size.height;
                    signature.aspect_ratio = size.aspect_ratio();
                }
            }
        }

        if let Some(page_size) = self.store.page_size(page) {
            let rect = annotation.rect_mut();
            rect.x = rect.x.clamp(0.0, (page_size.width - rect.width).max(0.0));
            rect.y = rect.y.clamp(0.0, (page_size.height - rect.height).max(0.0));
        }
        Ok(annotation)
    }

    /// Replaces the model with an imported layout.
    ///
    /// Every annotation is checked first; one bad record rejects the whole
    /// layout and leaves the model unchanged.
    pub fn import_annotations(&mut self, annotations: Vec<Annotation>) -> signkit_core::Result<()> {
        self.guard("import layout")?;
        let checked = annotations
            .into_iter()
            .map(|annotation| self.normalize_annotation(annotation))
            .collect::<signkit_core::Result<Vec<_>>>()?;
        tracing::debug!("Importing {} annotation(s)", checked.len());
        self.load_annotations(checked);
        Ok(())
    }

    // ---- placement -------------------------------------------------------

    pub fn set_mode(&mut self, mode: PlacementMode) -> Result<(), EditorError> {
        self.guard("placement")?;
        if self.mode != mode {
            self.mode = mode;
            tracing::debug!("Placement mode: {}", mode);
            emit!(AppEvent::Editor(EditorEvent::ModeChanged {
                mode: mode.to_string()
            }))
            .ok();
        }
        Ok(())
    }

    /// Toolbar behaviour: pressing the active mode again turns it off.
    pub fn toggle_mode(&mut self, mode: PlacementMode) -> Result<PlacementMode, EditorError> {
        let next = self.mode.toggled(mode);
        self.set_mode(next)?;
        Ok(next)
    }

    /// Whether a click on `page_number` would be handled at all.
    ///
    /// Clicks are ignored while a gesture is in progress, in read-only mode,
    /// before the PDF reports its page count and on pages outside the
    /// document.
    pub fn accepts_click(&self, page_number: u32) -> bool {
        if self.interaction.is_active() || self.is_read_only() {
            return false;
        }
        match self.page_count {
            Some(page_count) => page_number >= 1 && page_number <= page_count,
            None => false,
        }
    }

    /// Handles a click on `page_number` at a viewport-space point.
    ///
    /// Returns the id of the created annotation, or `None` when the click is
    /// ignored (see [`EditorSession::accepts_click`]) or only clears the
    /// selection.
    pub fn click_page(
        &mut self,
        page_number: u32,
        pointer: Point,
    ) -> Result<Option<AnnotationId>, EditorError> {
        if !self.accepts_click(page_number) {
            tracing::debug!("Ignoring click on page {}", page_number);
            return Ok(None);
        }

        let at = self.viewport.point_to_document(pointer);
        let annotation: Annotation = match self.mode {
            PlacementMode::None => {
                if self.store.selected_id().is_some() {
                    self.store.dispatch(EditorAction::Select(None))?;
                    emit!(AppEvent::Editor(EditorEvent::SelectionCleared)).ok();
                }
                return Ok(None);
            }
            PlacementMode::PlacingText => {
                text_field_at(page_number, at, &self.full_name, self.store.config()).into()
            }
            PlacementMode::PlacingSignature => {
                let artifact = self
                    .capture
                    .artifact()
                    .ok_or(EditorError::NoSignatureArtifact)?;
                signature_at(page_number, at, artifact, self.store.config()).into()
            }
        };

        let id = annotation.id().clone();
        let kind = annotation.kind();
        self.store.dispatch(EditorAction::Add(annotation))?;
        if self.mode == PlacementMode::PlacingSignature {
            self.capture.placed();
        }
        self.mode = PlacementMode::None;

        tracing::debug!("Placed {} on page {} at ({:.1}, {:.1})", id, page_number, at.x, at.y);
        emit!(AppEvent::Editor(EditorEvent::AnnotationPlaced {
            id: id.to_string(),
            kind,
            page: page_number,
        }))
        .ok();
        Ok(Some(id))
    }

    // ---- drag ------------------------------------------------------------

    /// Starts dragging `id` from a viewport-space pointer position.
    pub fn pointer_down(&mut self, id: &AnnotationId, pointer: Point) -> Result<(), EditorError> {
        self.guard("drag")?;
        let position = self
            .store
            .get(id)
            .ok_or_else(|| EditorError::AnnotationNotFound { id: id.to_string() })?
            .position();

        self.store.dispatch(EditorAction::Select(Some(id.clone())))?;
        self.interaction = InteractionState::Dragging {
            id: id.clone(),
            start_pointer: pointer,
            start_position: self.viewport.point_to_viewport(position),
        };
        Ok(())
    }

    pub fn pointer_move(&mut self, pointer: Point) -> Result<(), EditorError> {
        self.apply_drag(pointer)
    }

    /// Commits the final position and ends the drag.
    pub fn pointer_up(&mut self, pointer: Point) -> Result<(), EditorError> {
        let result = self.apply_drag(pointer);
        if matches!(self.interaction, InteractionState::Dragging { .. }) {
            self.interaction = InteractionState::Idle;
        }
        result
    }

    fn apply_drag(&mut self, pointer: Point) -> Result<(), EditorError> {
        let Some(position) = self.interaction.drag_position(pointer, &self.viewport) else {
            return Ok(());
        };
        if let Err(e) = self.guard("drag") {
            self.interaction = InteractionState::Idle;
            return Err(e);
        }
        let Some(id) = self.interaction.target().cloned() else {
            return Ok(());
        };
        self.store.dispatch(EditorAction::MoveTo {
            id,
            x: position.x,
            y: position.y,
        })
    }

    // ---- resize ----------------------------------------------------------

    pub fn begin_resize(&mut self, id: &AnnotationId) -> Result<(), EditorError> {
        self.guard("resize")?;
        if self.store.get(id).is_none() {
            return Err(EditorError::AnnotationNotFound { id: id.to_string() });
        }
        self.store.dispatch(EditorAction::Select(Some(id.clone())))?;
        self.interaction = InteractionState::Resizing { id: id.clone() };
        Ok(())
    }

    /// Applies the resize handle's viewport-space size.
    pub fn resize_to(&mut self, size: Size) -> Result<(), EditorError> {
        let InteractionState::Resizing { id } = &self.interaction else {
            return Ok(());
        };
        let id = id.clone();
        if let Err(e) = self.guard("resize") {
            self.interaction = InteractionState::Idle;
            return Err(e);
        }
        let size = self.viewport.size_to_document(size);
        self.store.dispatch(EditorAction::Resize {
            id,
            width: size.width,
            height: size.height,
        })
    }

    pub fn end_resize(&mut self) {
        if matches!(self.interaction, InteractionState::Resizing { .. }) {
            self.interaction = InteractionState::Idle;
        }
    }

    /// One-shot resize outside a gesture, viewport-space size.
    pub fn resize(&mut self, id: &AnnotationId, size: Size) -> Result<(), EditorError> {
        self.begin_resize(id)?;
        let result = self.resize_to(size);
        self.end_resize();
        result
    }

    // ---- content and selection ------------------------------------------

    pub fn set_text(&mut self, id: &AnnotationId, text: impl Into<String>) -> Result<(), EditorError> {
        self.guard("edit")?;
        self.store.dispatch(EditorAction::SetText {
            id: id.clone(),
            text: text.into(),
        })
    }

    pub fn delete(&mut self, id: &AnnotationId) -> Result<(), EditorError> {
        self.guard("delete")?;
        self.store.dispatch(EditorAction::Delete { id: id.clone() })?;
        if self.interaction.target() == Some(id) {
            self.interaction = InteractionState::Idle;
        }
        emit!(AppEvent::Editor(EditorEvent::AnnotationDeleted {
            id: id.to_string()
        }))
        .ok();
        Ok(())
    }

    /// Selection is view state and works in read-only mode.
    pub fn select(&mut self, id: Option<&AnnotationId>) -> Result<(), EditorError> {
        self.store.dispatch(EditorAction::Select(id.cloned()))?;
        let event = match id {
            Some(id) => EditorEvent::Selected { id: id.to_string() },
            None => EditorEvent::SelectionCleared,
        };
        emit!(AppEvent::Editor(event)).ok();
        Ok(())
    }

    // ---- signature capture ----------------------------------------------

    pub fn draw_stroke(&mut self, points: &[Point]) -> Result<(), EditorError> {
        self.guard("draw")?;
        self.capture.draw(points);
        Ok(())
    }

    pub fn clear_signature(&mut self) -> Result<(), EditorError> {
        self.guard("draw")?;
        self.capture.clear();
        Ok(())
    }

    /// Validates an upload. Nothing changes until the stored artifact is
    /// installed with [`EditorSession::install_artifact`].
    pub fn validate_upload(&self, bytes: &[u8], mime_type: &str) -> signkit_core::Result<ValidatedImage> {
        self.guard("upload")?;
        Ok(validate_upload(bytes, mime_type, &self.capture_config)?)
    }

    /// Rasterizes the drawing pad for upload.
    pub fn drawn_png(&self) -> signkit_core::Result<Vec<u8>> {
        self.guard("draw")?;
        Ok(self.capture.pad().to_png()?)
    }

    pub fn install_artifact(&mut self, artifact: SignatureArtifact) -> Result<(), EditorError> {
        self.guard("upload")?;
        self.capture.set_artifact(artifact);
        Ok(())
    }
}
