//! Integration tests for the editing session: history laws, selection,
//! duplication, media rejection and free-draw strokes.

use kurbo::Point;
use netfie_core::{
    Drawable, EditorSession, MediaError, MediaFile, MediaKind, MediaSlot, MemoryUrlStore,
    NullSurface, ObjectSpec, SerializableColor, SessionConfig, ShapePreset, ToolKind,
};
use std::io::Cursor;

fn session() -> EditorSession<NullSurface> {
    EditorSession::new(SessionConfig::default(), NullSurface::new())
}

fn png_file(width: u32, height: u32) -> MediaFile {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 128, 255, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).expect("encode png");
    MediaFile::new("photo.png", "image/png", out.into_inner())
}

/// Apply a mix of structural mutations, returning how many were applied.
fn apply_mutations(session: &mut EditorSession<NullSurface>) -> usize {
    let rect = session.add_rectangle();
    session.add_circle();
    session.add_preset(ShapePreset::Heart).expect("heart parses");
    session.duplicate_object(rect);
    session.remove_object(rect);
    session.add_object(ObjectSpec::Triangle {
        position: Point::new(300.0, 40.0),
        width: 60.0,
        height: 30.0,
        style: None,
    });
    6
}

// ==========================================================================
// History
// ==========================================================================

#[test]
fn test_undo_redo_inverse_law() {
    let mut session = session();
    let initial = session.scene().clone();

    let n = apply_mutations(&mut session);
    let final_state = session.scene().clone();

    for _ in 0..n {
        assert!(session.undo());
    }
    assert_eq!(session.scene(), &initial);
    assert!(!session.undo(), "undo must stop at the initial state");

    for _ in 0..n {
        assert!(session.redo());
    }
    assert_eq!(session.scene(), &final_state);
    assert!(!session.redo());
}

#[test]
fn test_new_mutation_invalidates_redo() {
    let mut session = session();
    session.add_rectangle();
    session.add_circle();
    assert!(session.undo());
    assert!(session.can_redo());

    session.add_triangle();
    assert!(!session.can_redo());
    assert!(!session.redo());
    assert_eq!(session.scene().len(), 2);
}

#[test]
fn test_undo_clears_dangling_selection() {
    let mut session = session();
    let id = session.add_rectangle();
    assert_eq!(session.selection(), Some(id));
    assert!(session.undo());
    assert!(session.scene().is_empty());
    assert_eq!(session.selection(), None);
}

// ==========================================================================
// Selection and duplication
// ==========================================================================

#[test]
fn test_removing_selected_clears_selection() {
    let mut session = session();
    let first = session.add_rectangle();
    let second = session.add_circle();
    assert_eq!(session.selection(), Some(second));

    assert!(session.remove_object(first));
    assert_eq!(session.selection(), Some(second));

    assert!(session.remove_selected());
    assert_eq!(session.selection(), None);
    assert!(session.scene().is_empty());
}

#[test]
fn test_duplicate_offsets_and_selects_copy() {
    let mut session = session();
    let original = session.add_rectangle();
    let before = session.scene().get(original).cloned().expect("original");

    let copy = session.duplicate_selected().expect("duplicate");
    assert_ne!(copy, original);
    assert_eq!(session.selection(), Some(copy));
    assert_eq!(session.scene().objects().last().map(Drawable::id), Some(copy));

    let copied = session.scene().get(copy).expect("copy");
    assert_eq!(copied.position(), Point::new(110.0, 110.0));
    assert_eq!(copied.style(), before.style());
    assert_eq!(session.scene().get(original), Some(&before));
}

#[test]
fn test_shape_lifecycle() {
    let mut session = session();
    let id = session.add_rectangle();
    assert_eq!(session.scene().len(), 1);
    assert_eq!(session.history().undo_len(), 2);

    assert!(session.remove_object(id));
    assert!(session.scene().is_empty());
    assert_eq!(session.history().undo_len(), 3);

    assert!(session.undo());
    assert_eq!(session.scene().len(), 1);
    assert!(session.scene().contains(id));
}

#[test]
fn test_panel_opacity_clamped_before_reaching_object() {
    let mut session = session();
    let id = session.add_rectangle();
    session.edit_panel(|panel| panel.set_opacity(40));
    assert_eq!(session.scene().get(id).map(|o| o.style().opacity()), Some(40));

    session.edit_panel(|panel| panel.set_opacity(150));
    assert_eq!(session.panel().opacity(), 100);
    assert_eq!(session.scene().get(id).map(|o| o.style().opacity()), Some(100));
}

#[test]
fn test_font_controls_only_touch_text() {
    let mut session = session();
    let rect = session.add_rectangle();
    let before = session.scene().get(rect).cloned();
    session.edit_panel(|panel| panel.set_font_size(72.0));
    assert_eq!(session.scene().get(rect).cloned(), before);

    let text = session.add_text();
    session.edit_panel(|panel| panel.set_font_size(72.0));
    session.edit_panel(|panel| panel.set_font_size(36.0));
    let font_size = session
        .scene()
        .get(text)
        .and_then(Drawable::as_text)
        .map(|t| t.font_size);
    assert_eq!(font_size, Some(36.0));
}

// ==========================================================================
// Media intake
// ==========================================================================

#[test]
fn test_text_plain_rejected_by_every_kind() {
    let file = MediaFile::new("notes.txt", "text/plain", b"hello".to_vec());
    let mut store = MemoryUrlStore::new();
    for kind in MediaKind::ALL {
        let mut slot = MediaSlot::new(kind, &mut store);
        let result = slot.replace(&file);
        assert!(matches!(result, Err(MediaError::UnsupportedType { .. })));
        assert!(slot.url().is_none());
    }
    assert_eq!(store.created_count(), 0);

    let mut session = session();
    let before = session.scene().clone();
    let entries = session.history().undo_len();
    assert!(session.add_image(&file).is_err());
    assert_eq!(session.scene(), &before);
    assert_eq!(session.history().undo_len(), entries);
}

#[test]
fn test_image_upload_is_scaled_and_centred() {
    let mut session = session();
    let id = session.add_image(&png_file(1000, 250)).expect("valid png");
    let bounds = session.scene().get(id).expect("image").bounds();
    assert!((bounds.width() - 500.0).abs() < 1e-6);
    assert!((bounds.height() - 125.0).abs() < 1e-6);
    assert!((bounds.center().x - 400.0).abs() < 1e-6);
    assert!((bounds.center().y - 300.0).abs() < 1e-6);
    assert_eq!(session.selection(), Some(id));
}

#[test]
fn test_corrupt_image_rejected_without_change() {
    let mut session = session();
    let file = MediaFile::new("broken.png", "image/png", vec![0x89, 0x50, 0x4E, 0x47, 0, 0]);
    assert!(matches!(session.add_image(&file), Err(MediaError::Decode(_))));
    assert!(session.scene().is_empty());
    assert!(!session.can_undo());
}

// ==========================================================================
// Free draw
// ==========================================================================

fn stroke(session: &mut EditorSession<NullSurface>) -> Option<netfie_core::ObjectId> {
    session.pointer_down(Point::new(10.0, 10.0));
    for i in 1..20 {
        let t = f64::from(i);
        session.pointer_move(Point::new(10.0 + t * 5.0, 10.0 + (t * 0.7).sin() * 20.0));
    }
    session.pointer_up(Point::new(120.0, 40.0))
}

#[test]
fn test_free_draw_commits_one_entry() {
    let mut session = session();
    session.edit_panel(|panel| panel.set_stroke_width(3.0));
    session.set_active_tool(ToolKind::FreeDraw);

    let entries = session.history().undo_len();
    let id = stroke(&mut session).expect("stroke committed");
    assert_eq!(session.history().undo_len(), entries + 1);

    let path = session.scene().get(id).expect("stroke");
    assert_eq!(path.kind_name(), "path");
    assert_eq!(path.style().stroke_color, session.panel().fill_color());
    assert_eq!(path.style().stroke_width(), 3.0);
    assert_eq!(path.style().fill_color, None);
    assert_eq!(session.selection(), None);

    assert!(session.undo());
    assert!(session.scene().is_empty());
}

#[test]
fn test_erase_paints_background_at_double_width() {
    let config = SessionConfig::default().with_background(SerializableColor::rgb(250, 240, 230));
    let mut session = EditorSession::new(config, NullSurface::new());
    session.edit_panel(|panel| panel.set_stroke_width(5.0));
    session.set_active_tool(ToolKind::Erase);

    let id = stroke(&mut session).expect("erase stroke");
    let path = session.scene().get(id).expect("stroke");
    assert_eq!(path.style().stroke_color, SerializableColor::rgb(250, 240, 230));
    assert_eq!(path.style().stroke_width(), 10.0);
}

#[test]
fn test_select_tool_does_not_draw() {
    let mut session = session();
    assert_eq!(session.active_tool(), ToolKind::Select);
    assert_eq!(stroke(&mut session), None);
    assert!(session.scene().is_empty());
    assert!(!session.can_undo());
}
