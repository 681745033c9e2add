//! Pointer gesture state for drag and resize.
//!
//! A drag remembers where the pointer and the annotation were (both in
//! viewport space) when it started, so every move is computed from the same
//! origin and rounding never accumulates.

use crate::annotation::AnnotationId;
use crate::geometry::Point;
use crate::viewport::Viewport;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging {
        id: AnnotationId,
        /// Pointer position at pointer-down, viewport space.
        start_pointer: Point,
        /// Annotation top-left at pointer-down, viewport space.
        start_position: Point,
    },
    Resizing {
        id: AnnotationId,
    },
}

impl InteractionState {
    pub fn is_active(&self) -> bool {
        !matches!(self, InteractionState::Idle)
    }

    pub fn target(&self) -> Option<&AnnotationId> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Dragging { id, .. } | InteractionState::Resizing { id } => Some(id),
        }
    }

    /// Document-space position for the current pointer during a drag.
    pub fn drag_position(&self, pointer: Point, viewport: &Viewport) -> Option<Point> {
        match self {
            InteractionState::Dragging {
                start_pointer,
                start_position,
                ..
            } => {
                let moved = start_position.offset(pointer.x - start_pointer.x, pointer.y - start_pointer.y);
                Some(viewport.point_to_document(moved))
            }
            _ => None,
        }
    }
}
