//! Integration tests: paint order and view independence of the renderer.

use pretty_assertions::assert_eq;
use sm_core::{Annotation, AnnotationId, Color, Point, Shape, Vec2, ViewTransform};
use sm_render::{Frame, Preview, RecordingSurface, RenderStyle, render_frame};

fn circle(id: &str, color: &str, cx: f64) -> Annotation {
    Annotation::new(AnnotationId::intern(id), color, Shape::Circle { cx, cy: 0.0, r: 10.0 })
}

#[test]
fn annotations_paint_in_list_order() {
    let style = RenderStyle::default();
    let list = [
        circle("first", "#ff0000", 0.0),
        circle("second", "#00ff00", 5.0),
        circle("third", "#0000ff", 10.0),
    ];
    let mut surface = RecordingSurface::new();
    render_frame(&mut surface, &Frame::new(&list, style.fallback_color), &ViewTransform::IDENTITY, &style);

    let stroke_colors: Vec<[u8; 4]> = surface.strokes().map(|(_, s)| s.color.to_rgba8()).collect();
    assert_eq!(
        stroke_colors,
        vec![[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]]
    );
}

#[test]
fn preview_is_dashed_and_drawn_last() {
    let style = RenderStyle::default();
    let list = [circle("base", "#ff0000", 0.0)];
    let preview = Preview::Shape(Shape::Line {
        x1: 0.0,
        y1: 0.0,
        x2: 30.0,
        y2: 0.0,
    });
    let mut frame = Frame::new(&list, Color::rgba(0.0, 0.0, 1.0, 1.0));
    frame.preview = Some(&preview);

    let mut surface = RecordingSurface::new();
    render_frame(&mut surface, &frame, &ViewTransform::IDENTITY, &style);

    let (_, last) = surface.strokes().last().expect("preview stroke");
    assert_eq!(last.dash, Some([5.0, 5.0]));
    assert_eq!(last.color.to_rgba8(), [0, 0, 255, 255]);
}

#[test]
fn geometry_follows_the_view_each_frame() {
    use kurbo::Shape as _;

    let style = RenderStyle::default();
    let list = [circle("c", "#ff0000", 100.0)];
    let mut surface = RecordingSurface::new();

    for (zoom, pan) in [(1.0, Vec2::ZERO), (4.0, Vec2::new(-50.0, 20.0))] {
        let view = ViewTransform::new(zoom, pan);
        render_frame(&mut surface, &Frame::new(&list, style.fallback_color), &view, &style);
        let (path, _) = surface.strokes().next().expect("circle stroke");
        let b = path.bounding_box();
        let expected = Point::new(100.0 * zoom, 0.0) + pan;
        assert!((b.center() - expected).hypot() < 0.05, "zoom {zoom}: {b:?}");
        assert!((b.width() - 20.0 * zoom).abs() < 0.1, "zoom {zoom}: {b:?}");
    }
}
