//! Editor session behaviour: placement, gestures and read-only enforcement.

use signkit_core::EditorError;
use signkit_editor::{
    Annotation, CaptureConfig, EditorConfig, EditorSession, InteractionState, PlacementMode,
    Point, SignatureArtifact, SignatureSource, Size,
};

fn session() -> EditorSession {
    let mut session = EditorSession::new(EditorConfig::default(), CaptureConfig::default())
        .expect("default pad size is valid");
    session.set_page_count(3);
    session.set_full_name("Grace Hopper");
    session
}

fn uploaded(width: f64, height: f64) -> SignatureArtifact {
    SignatureArtifact {
        source: SignatureSource::Uploaded,
        path: "signatures/upload.png".to_string(),
        intrinsic: Size::new(width, height),
        preview: None,
    }
}

#[test]
fn test_text_placement_resets_mode() {
    let mut session = session();
    session.viewport_mut().set_scale(2.0);
    session.set_mode(PlacementMode::PlacingText).unwrap();

    let id = session
        .click_page(1, Point::new(200.0, 100.0))
        .unwrap()
        .expect("text field placed");

    assert_eq!(session.mode(), PlacementMode::None);
    assert_eq!(session.store().selected_id(), Some(&id));

    let field = session.annotations()[0].as_text_field().unwrap();
    assert_eq!(field.text_content, "Grace Hopper");
    assert!((field.rect.x - 100.0).abs() < 0.01);
    assert!((field.rect.y - 50.0).abs() < 0.01);
    assert_eq!(field.rect.width, 200.0);
    assert_eq!(field.rect.height, 30.0);
    assert_eq!(field.font_size, 14.0);

    // Second click with mode none creates nothing.
    assert_eq!(session.click_page(1, Point::new(10.0, 10.0)).unwrap(), None);
    assert_eq!(session.annotations().len(), 1);
    assert_eq!(session.store().selected_id(), None);
}

#[test]
fn test_signature_without_artifact() {
    let mut session = session();
    session.set_mode(PlacementMode::PlacingSignature).unwrap();

    let result = session.click_page(1, Point::new(10.0, 10.0));
    assert_eq!(result, Err(EditorError::NoSignatureArtifact));
    assert!(session.annotations().is_empty());
    assert_eq!(session.mode(), PlacementMode::PlacingSignature);
}

#[test]
fn test_signature_placement_ratio() {
    let mut session = session();
    session.install_artifact(uploaded(300.0, 150.0)).unwrap();
    session.set_mode(PlacementMode::PlacingSignature).unwrap();

    session.click_page(2, Point::new(40.0, 40.0)).unwrap().unwrap();
    let signature = session.annotations()[0].as_signature().unwrap();
    assert_eq!(signature.page_number, 2);
    assert!((signature.rect.width / signature.rect.height - 2.0).abs() < 0.01);
    assert_eq!(session.mode(), PlacementMode::None);

    // An uploaded artifact can be placed again.
    assert!(session.capture().artifact().is_some());
}

#[test]
fn test_drawn_signature_consumed_after_placement() {
    let mut session = session();
    session
        .draw_stroke(&[Point::new(10.0, 10.0), Point::new(120.0, 60.0)])
        .unwrap();
    assert!(session.capture().needs_upload());
    assert!(session.drawn_png().is_ok());

    session
        .install_artifact(SignatureArtifact {
            source: SignatureSource::Drawn,
            path: "signatures/drawn.png".to_string(),
            intrinsic: session.capture().pad().size(),
            preview: None,
        })
        .unwrap();
    session.set_mode(PlacementMode::PlacingSignature).unwrap();
    session.click_page(1, Point::new(0.0, 0.0)).unwrap();

    assert!(session.capture().artifact().is_none());
    assert!(!session.capture().pad().has_content());
}

#[test]
fn test_clicks_ignored_before_load_and_off_document() {
    let mut session = EditorSession::new(EditorConfig::default(), CaptureConfig::default()).unwrap();
    session.set_mode(PlacementMode::PlacingText).unwrap();
    assert_eq!(session.click_page(1, Point::new(5.0, 5.0)).unwrap(), None);

    session.set_page_count(2);
    assert_eq!(session.click_page(3, Point::new(5.0, 5.0)).unwrap(), None);
    assert_eq!(session.click_page(0, Point::new(5.0, 5.0)).unwrap(), None);
    assert!(session.annotations().is_empty());
    assert_eq!(session.mode(), PlacementMode::PlacingText);
}

#[test]
fn test_drag_converts_to_document_space() {
    let mut session = session();
    session.viewport_mut().set_scale(2.0);
    session.set_mode(PlacementMode::PlacingText).unwrap();
    let id = session.click_page(1, Point::new(100.0, 100.0)).unwrap().unwrap();

    session.pointer_down(&id, Point::new(110.0, 110.0)).unwrap();
    assert!(matches!(session.interaction(), InteractionState::Dragging { .. }));

    // Placement is suppressed mid-gesture.
    session.set_mode(PlacementMode::PlacingText).unwrap();
    assert_eq!(session.click_page(1, Point::new(300.0, 300.0)).unwrap(), None);
    session.set_mode(PlacementMode::None).unwrap();

    session.pointer_move(Point::new(150.0, 130.0)).unwrap();
    let position = session.store().get(&id).unwrap().position();
    assert!((position.x - 70.0).abs() < 0.01);
    assert!((position.y - 60.0).abs() < 0.01);

    session.pointer_up(Point::new(170.0, 150.0)).unwrap();
    let position = session.store().get(&id).unwrap().position();
    assert!((position.x - 80.0).abs() < 0.01);
    assert!((position.y - 70.0).abs() < 0.01);
    assert_eq!(session.interaction(), &InteractionState::Idle);
}

#[test]
fn test_document_space_invariant_under_zoom() {
    let mut session = session();
    session.set_mode(PlacementMode::PlacingText).unwrap();
    let id = session.click_page(1, Point::new(60.0, 90.0)).unwrap().unwrap();

    let before = session.store().get(&id).unwrap().rect();
    session.viewport_mut().zoom_in();
    session.viewport_mut().zoom_in();
    assert_eq!(session.store().get(&id).unwrap().rect(), before);

    let rendered = session.viewport().rect_to_viewport(before);
    assert!((rendered.x - 60.0 * session.viewport().scale()).abs() < 0.01);
}

#[test]
fn test_signature_resize_keeps_ratio() {
    let mut session = session();
    session.viewport_mut().set_scale(0.5);
    session.install_artifact(uploaded(300.0, 150.0)).unwrap();
    session.set_mode(PlacementMode::PlacingSignature).unwrap();
    let id = session.click_page(1, Point::new(0.0, 0.0)).unwrap().unwrap();

    // 80x45 viewport px at 0.5 = 160x90 document; width moved further.
    session.resize(&id, Size::new(80.0, 45.0)).unwrap();
    let size = session.store().get(&id).unwrap().size();
    assert!((size.width - 160.0).abs() < 0.01);
    assert!((size.height - 80.0).abs() < 0.01);
}

#[test]
fn test_text_resize_and_auto_grow() {
    let mut session = session();
    session.set_mode(PlacementMode::PlacingText).unwrap();
    let id = session.click_page(1, Point::new(0.0, 0.0)).unwrap().unwrap();

    session.resize(&id, Size::new(300.0, 10.0)).unwrap();
    assert_eq!(session.store().get(&id).unwrap().size(), Size::new(300.0, 20.0));

    session.set_text(&id, "a".repeat(40)).unwrap();
    assert_eq!(session.store().get(&id).unwrap().size().width, 320.0);
}

#[test]
fn test_read_only_has_no_effect() {
    let mut session = session();
    session.set_mode(PlacementMode::PlacingText).unwrap();
    let id = session.click_page(1, Point::new(0.0, 0.0)).unwrap().unwrap();
    let before: Vec<Annotation> = session.annotations().to_vec();
    let revision = session.revision();

    session.set_read_only(true);

    assert!(matches!(
        session.set_mode(PlacementMode::PlacingText),
        Err(EditorError::ReadOnly { .. })
    ));
    assert!(session.pointer_down(&id, Point::new(1.0, 1.0)).is_err());
    assert!(session.pointer_move(Point::new(50.0, 50.0)).is_ok());
    assert!(session.resize(&id, Size::new(400.0, 60.0)).is_err());
    assert!(session.set_text(&id, "changed").is_err());
    assert!(session.delete(&id).is_err());
    assert!(session.draw_stroke(&[Point::new(1.0, 1.0)]).is_err());
    assert!(session
        .validate_upload(&[0x89, b'P', b'N', b'G'], "image/png")
        .unwrap_err()
        .is_read_only());
    assert_eq!(session.click_page(1, Point::new(10.0, 10.0)).unwrap(), None);

    assert_eq!(session.annotations(), before.as_slice());
    assert_eq!(session.revision(), revision);

    // Viewing stays available.
    assert!(session.viewport_mut().zoom_in());
    assert!(session.select(Some(&id)).is_ok());
}

#[test]
fn test_lock_is_permanent() {
    let mut session = session();
    session.lock();
    session.set_read_only(false);
    assert!(session.is_read_only());
    assert!(session.set_mode(PlacementMode::PlacingText).is_err());
}

#[test]
fn test_delete_active_clears_selection() {
    let mut session = session();
    session.set_mode(PlacementMode::PlacingText).unwrap();
    let first = session.click_page(1, Point::new(0.0, 0.0)).unwrap().unwrap();
    session.set_mode(PlacementMode::PlacingText).unwrap();
    let second = session.click_page(1, Point::new(0.0, 50.0)).unwrap().unwrap();
    assert_eq!(session.store().selected_id(), Some(&second));

    session.select(Some(&first)).unwrap();
    session.delete(&first).unwrap();
    assert_eq!(session.store().selected_id(), None);
    assert_eq!(session.annotations().len(), 1);
}
