//! Integration tests: selection, move/resize and external updates (sm-editor).

use pretty_assertions::assert_eq;
use sm_core::{Annotation, AnnotationId, CoordinateMapper, EditorConfig, Point, Shape, ShapeKind, Vec2, ViewTransform};
use sm_editor::{AnnotationEditor, Cursor, DrawOptions, EditorEvent, EditorMode, InputEvent, TransformViewer};
use sm_render::RecordingSurface;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn rect(id: &str, x: f64, y: f64, w: f64, h: f64) -> Annotation {
    Annotation::new(
        AnnotationId::intern(id),
        "#ff0000",
        Shape::Rect {
            x,
            y,
            width: w,
            height: h,
        },
    )
}

fn editor_with(annotations: Vec<Annotation>, view: ViewTransform) -> AnnotationEditor<TransformViewer> {
    init_logging();
    let mut editor = AnnotationEditor::new(TransformViewer::new(view), EditorConfig::default());
    editor.set_annotations(annotations);
    editor
}

fn to_screen(editor: &AnnotationEditor<TransformViewer>, p: Point) -> Point {
    editor.viewer().image_to_screen(p)
}

fn press(editor: &mut AnnotationEditor<TransformViewer>, p: Point) {
    let s = to_screen(editor, p);
    editor.handle_input(&InputEvent::pointer_down(s.x, s.y));
}

fn move_to(editor: &mut AnnotationEditor<TransformViewer>, p: Point) {
    let s = to_screen(editor, p);
    editor.handle_input(&InputEvent::pointer_move(s.x, s.y));
}

fn release(editor: &mut AnnotationEditor<TransformViewer>, p: Point) {
    let s = to_screen(editor, p);
    editor.handle_input(&InputEvent::pointer_up(s.x, s.y));
}

// ─── Resize ─────────────────────────────────────────────────────────────

#[test]
fn rect_top_left_resize_and_min_size_rejection() {
    let id = AnnotationId::intern("box");
    let mut editor = editor_with(vec![rect("box", 0.0, 0.0, 100.0, 100.0)], ViewTransform::new(3.0, Vec2::new(12.0, 7.0)));
    assert!(editor.start_move(id));

    press(&mut editor, Point::new(0.0, 0.0));
    move_to(&mut editor, Point::new(20.0, 20.0));
    assert_eq!(
        editor.annotation(id).map(|a| a.shape.clone()),
        Some(Shape::Rect {
            x: 20.0,
            y: 20.0,
            width: 80.0,
            height: 80.0
        })
    );

    move_to(&mut editor, Point::new(95.0, 95.0));
    assert_eq!(
        editor.annotation(id).map(|a| a.shape.clone()),
        Some(Shape::Rect {
            x: 20.0,
            y: 20.0,
            width: 80.0,
            height: 80.0
        })
    );

    release(&mut editor, Point::new(95.0, 95.0));
    assert_eq!(editor.mode(), EditorMode::Editing(id));
}

#[test]
fn fresh_rect_rejects_shrinking_below_minimum() {
    let id = AnnotationId::intern("box2");
    let mut editor = editor_with(vec![rect("box2", 0.0, 0.0, 100.0, 100.0)], ViewTransform::IDENTITY);
    editor.start_move(id);
    press(&mut editor, Point::new(0.0, 0.0));
    move_to(&mut editor, Point::new(95.0, 95.0));
    assert_eq!(editor.annotation(id).map(|a| a.shape.clone()), Some(rect("box2", 0.0, 0.0, 100.0, 100.0).shape));
}

// ─── Move ───────────────────────────────────────────────────────────────

#[test]
fn move_then_cancel_restores_exact_params() {
    let poly = Annotation::new(
        AnnotationId::intern("poly"),
        "#0000ff",
        Shape::Polygon {
            points: vec![Point::new(10.5, 10.25), Point::new(90.0, 12.0), Point::new(50.0, 80.125)],
        },
    );
    let original = poly.clone();
    let mut editor = editor_with(vec![poly], ViewTransform::new(0.7, Vec2::new(-13.0, 4.0)));
    assert!(editor.start_move(original.id));
    assert_eq!(editor.take_events(), vec![EditorEvent::Selected(Some(original.clone()))]);

    press(&mut editor, Point::new(50.0, 30.0));
    move_to(&mut editor, Point::new(63.0, 21.0));
    move_to(&mut editor, Point::new(71.0, 45.0));
    release(&mut editor, Point::new(71.0, 45.0));
    assert_ne!(editor.annotations()[0], original);

    assert!(editor.handle_input(&InputEvent::key("Escape")).captured);
    assert_eq!(editor.annotations()[0], original);
    assert_eq!(editor.mode(), EditorMode::Idle);
    assert!(editor.viewer().pan_enabled);
    assert!(editor.take_events().is_empty());
}

#[test]
fn save_move_reports_edited_list() {
    let id = AnnotationId::intern("mv");
    let mut editor = editor_with(vec![rect("mv", 0.0, 0.0, 50.0, 50.0)], ViewTransform::IDENTITY);
    editor.start_move(id);
    editor.take_events();
    press(&mut editor, Point::new(25.0, 25.0));
    move_to(&mut editor, Point::new(30.0, 35.0));
    release(&mut editor, Point::new(30.0, 35.0));
    assert!(editor.save_move());

    let events = editor.take_events();
    match events.as_slice() {
        [EditorEvent::Edited(list)] => assert_eq!(list[0].shape, rect("mv", 5.0, 10.0, 50.0, 50.0).shape),
        other => panic!("unexpected events {other:?}"),
    }
    assert_eq!(editor.mode(), EditorMode::Idle);
}

#[test]
fn read_only_and_unknown_ids_cannot_be_edited() {
    let mut locked = rect("ai", 0.0, 0.0, 10.0, 10.0);
    locked.read_only = true;
    let mut editor = editor_with(vec![locked], ViewTransform::IDENTITY);
    assert!(!editor.start_move(AnnotationId::intern("ai")));
    assert!(!editor.start_move(AnnotationId::intern("missing")));
    assert_eq!(editor.mode(), EditorMode::Idle);
    assert!(!editor.save_move());
    assert!(!editor.cancel_move());
}

#[test]
fn hover_cursor_while_editing() {
    let id = AnnotationId::intern("hov");
    let mut editor = editor_with(vec![rect("hov", 0.0, 0.0, 100.0, 100.0)], ViewTransform::IDENTITY);
    editor.start_move(id);
    move_to(&mut editor, Point::new(100.0, 0.0));
    assert_eq!(editor.cursor(), Cursor::NeswResize);
    move_to(&mut editor, Point::new(50.0, 50.0));
    assert_eq!(editor.cursor(), Cursor::Move);
    move_to(&mut editor, Point::new(300.0, 300.0));
    assert_eq!(editor.cursor(), Cursor::Default);
    assert_eq!(editor.control_points().len(), 4);
}

// ─── Selection ──────────────────────────────────────────────────────────

#[test]
fn click_in_overlap_selects_most_recent() {
    let mut editor = editor_with(
        vec![rect("under", 0.0, 0.0, 100.0, 100.0), rect("over", 50.0, 50.0, 100.0, 100.0)],
        ViewTransform::new(2.0, Vec2::ZERO),
    );
    press(&mut editor, Point::new(75.0, 75.0));
    let response = {
        let s = to_screen(&editor, Point::new(75.0, 75.0));
        editor.handle_input(&InputEvent::pointer_up(s.x, s.y))
    };
    assert!(response.captured);
    assert_eq!(editor.selected().map(|a| a.id), Some(AnnotationId::intern("over")));

    let events = editor.take_events();
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], EditorEvent::Selected(Some(a)) if a.id == AnnotationId::intern("over")));
    match &events[1] {
        EditorEvent::ShowPopup(popup) => {
            assert_eq!(popup.metrics.area, Some(10_000.0));
            // Centroid x = 100 → 200 on screen; bottom edge y = 150 → 300.
            assert_eq!(popup.anchor, Point::new(200.0, 300.0));
        }
        other => panic!("expected popup, got {other:?}"),
    }
}

#[test]
fn click_on_empty_space_clears_selection() {
    let mut editor = editor_with(vec![rect("a", 0.0, 0.0, 10.0, 10.0)], ViewTransform::IDENTITY);
    editor.select_and_show_details(AnnotationId::intern("a"));
    editor.take_events();

    press(&mut editor, Point::new(500.0, 500.0));
    release(&mut editor, Point::new(500.0, 500.0));
    assert!(editor.selected().is_none());
    assert_eq!(editor.take_events(), vec![EditorEvent::Selected(None)]);
}

#[test]
fn drag_in_idle_is_left_to_the_viewer() {
    let mut editor = editor_with(vec![rect("a", 0.0, 0.0, 10.0, 10.0)], ViewTransform::IDENTITY);
    let down = editor.handle_input(&InputEvent::pointer_down(5.0, 5.0));
    assert!(!down.captured);
    editor.handle_input(&InputEvent::pointer_move(60.0, 60.0));
    let up = editor.handle_input(&InputEvent::pointer_up(60.0, 60.0));
    assert!(!up.captured);
    assert!(editor.selected().is_none());
}

#[test]
fn idle_hover_shows_pointer_over_annotations() {
    let mut editor = editor_with(vec![rect("a", 0.0, 0.0, 10.0, 10.0)], ViewTransform::IDENTITY);
    move_to(&mut editor, Point::new(5.0, 5.0));
    assert_eq!(editor.cursor(), Cursor::Pointer);
    move_to(&mut editor, Point::new(50.0, 5.0));
    assert_eq!(editor.cursor(), Cursor::Default);
}

// ─── External updates ───────────────────────────────────────────────────

#[test]
fn external_delete_of_edited_target_ends_session() {
    let id = AnnotationId::intern("gone");
    let mut editor = editor_with(vec![rect("gone", 0.0, 0.0, 10.0, 10.0)], ViewTransform::IDENTITY);
    editor.start_move(id);
    editor.take_events();
    assert!(editor.delete_annotation(id));
    assert_eq!(editor.mode(), EditorMode::Idle);
    assert!(editor.selected().is_none());
    match editor.take_events().as_slice() {
        [EditorEvent::Selected(None), EditorEvent::Edited(list)] => assert!(list.is_empty()),
        other => panic!("unexpected events {other:?}"),
    }
    assert!(!editor.delete_annotation(id));
}

#[test]
fn entering_draw_mode_deselects_and_tells_the_host() {
    let mut editor = editor_with(vec![rect("sel", 0.0, 0.0, 10.0, 10.0)], ViewTransform::IDENTITY);
    editor.select_and_show_details(AnnotationId::intern("sel"));
    editor.take_events();

    editor.set_draw_type(ShapeKind::Rect, DrawOptions::default());
    assert!(editor.selected().is_none());
    assert_eq!(editor.take_events(), vec![EditorEvent::Selected(None)]);

    // Nothing selected: no repeat notification.
    editor.set_draw_type(ShapeKind::Line, DrawOptions::default());
    assert!(editor.take_events().is_empty());
}

#[test]
fn external_update_becomes_the_cancel_point() {
    let id = AnnotationId::intern("upd");
    let mut editor = editor_with(vec![rect("upd", 0.0, 0.0, 10.0, 10.0)], ViewTransform::IDENTITY);
    editor.start_move(id);
    let updated = rect("upd", 5.0, 5.0, 20.0, 20.0);
    assert!(editor.update_annotation(updated.clone()));
    press(&mut editor, Point::new(10.0, 10.0));
    move_to(&mut editor, Point::new(15.0, 10.0));
    editor.cancel_move();
    assert_eq!(editor.annotation(id), Some(&updated));
}

#[test]
fn invalid_snapshot_entries_are_dropped() {
    let bad = Annotation::new(
        AnnotationId::intern("bad"),
        "#ff0000",
        Shape::Polygon {
            points: vec![Point::ZERO],
        },
    );
    let editor = editor_with(vec![bad, rect("ok", 0.0, 0.0, 1.0, 1.0)], ViewTransform::IDENTITY);
    assert_eq!(editor.annotations().len(), 1);
    assert_eq!(editor.annotations()[0].id, AnnotationId::intern("ok"));
}

#[test]
fn add_annotation_validates_and_rejects_duplicates() {
    let mut editor = editor_with(vec![rect("dup", 0.0, 0.0, 1.0, 1.0)], ViewTransform::IDENTITY);
    assert!(editor.add_annotation(rect("dup", 5.0, 5.0, 1.0, 1.0)).is_err());
    assert!(editor.add_annotation(rect("neg", 0.0, 0.0, -1.0, 1.0)).is_err());
    assert!(editor.add_annotation(rect("fresh", 0.0, 0.0, 1.0, 1.0)).is_ok());
    assert_eq!(editor.annotations().len(), 2);
}

// ─── Viewport and rendering ─────────────────────────────────────────────

#[test]
fn wheel_zooms_the_viewer_about_the_cursor() {
    let mut editor = editor_with(Vec::new(), ViewTransform::IDENTITY);
    let anchor = Point::new(200.0, 100.0);
    let before = editor.viewer().screen_to_image(anchor);

    editor.handle_input(&InputEvent::Wheel {
        x: anchor.x,
        y: anchor.y,
        delta_y: -120.0,
    });
    assert!((editor.viewer().view.zoom() - 1.1).abs() < 1e-12);
    editor.handle_input(&InputEvent::Wheel {
        x: anchor.x,
        y: anchor.y,
        delta_y: 120.0,
    });
    assert!((editor.viewer().view.zoom() - 0.99).abs() < 1e-12);
    assert!((editor.viewer().screen_to_image(anchor) - before).hypot() < 1e-9);
}

#[test]
fn wheel_is_held_back_while_a_shape_is_being_dragged_out() {
    let mut editor = editor_with(Vec::new(), ViewTransform::IDENTITY);
    editor.set_draw_type(ShapeKind::Rect, DrawOptions::default());
    press(&mut editor, Point::new(10.0, 10.0));
    move_to(&mut editor, Point::new(50.0, 50.0));

    let wheel = InputEvent::Wheel {
        x: 50.0,
        y: 50.0,
        delta_y: -120.0,
    };
    let response = editor.handle_input(&wheel);
    assert!(response.captured);
    assert_eq!(editor.viewer().view.zoom(), 1.0);

    release(&mut editor, Point::new(50.0, 50.0));
    editor.handle_input(&wheel);
    assert!((editor.viewer().view.zoom() - 1.1).abs() < 1e-12);
}

#[test]
fn wheel_is_held_back_during_an_edit_drag() {
    let id = AnnotationId::intern("wz");
    let mut editor = editor_with(vec![rect("wz", 0.0, 0.0, 100.0, 100.0)], ViewTransform::IDENTITY);
    editor.start_move(id);
    let wheel = InputEvent::Wheel {
        x: 50.0,
        y: 50.0,
        delta_y: 120.0,
    };

    press(&mut editor, Point::new(50.0, 50.0));
    move_to(&mut editor, Point::new(60.0, 50.0));
    editor.handle_input(&wheel);
    assert_eq!(editor.viewer().view.zoom(), 1.0);

    release(&mut editor, Point::new(60.0, 50.0));
    editor.handle_input(&wheel);
    assert!((editor.viewer().view.zoom() - 0.9).abs() < 1e-12);
}

#[test]
fn render_only_when_dirty() {
    let mut editor = editor_with(vec![rect("r", 0.0, 0.0, 10.0, 10.0)], ViewTransform::IDENTITY);
    let mut surface = RecordingSurface::new();
    assert!(editor.render_if_needed(&mut surface));
    assert!(!editor.render_if_needed(&mut surface));

    editor.on_viewport_changed();
    assert!(editor.render_if_needed(&mut surface));

    move_to(&mut editor, Point::new(5.0, 5.0));
    assert!(!editor.render_if_needed(&mut surface));
}
