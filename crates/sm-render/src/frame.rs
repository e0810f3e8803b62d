//! Per-frame rendering of the annotation set.
//!
//! Everything is rebuilt from image-space state on every call: the viewer
//! may have panned or zoomed since the last frame, so no screen-space
//! geometry survives between frames.

use kurbo::{Arc, BezPath, Circle, Ellipse, Point, Shape as _, Vec2};
use sm_core::{Annotation, AnnotationId, Color, CoordinateMapper, EditorConfig, Shape, screen_bounds};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::surface::{StrokeStyle, Surface};

const TOLERANCE: f64 = 0.1;
const POLYGON_DOT_RADIUS: f64 = 3.0;
const CLOSING_SEGMENT_ALPHA: f32 = 0.3;
/// Extra width of the halo stroked under a selected open shape.
const SELECTION_HALO: f64 = 6.0;
const HANDLE_STROKE: Color = Color::rgba(0x40 as f32 / 255.0, 0x9e as f32 / 255.0, 1.0, 1.0);

/// Resolved styling constants for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub body_fill: Color,
    pub idle_fill_opacity: f32,
    pub selected_fill_opacity: f32,
    pub stroke_width: f64,
    pub dash: [f64; 2],
    pub control_point_radius: f64,
    pub marker_radius: f64,
    /// Used when an annotation's color string does not parse.
    pub fallback_color: Color,
}

impl RenderStyle {
    pub fn from_config(config: &EditorConfig) -> Self {
        let red = Color::rgba(1.0, 0.0, 0.0, 1.0);
        let fallback_color = Color::from_hex(&config.default_color).unwrap_or(red);
        Self {
            body_fill: Color::from_hex(&config.fill_color).unwrap_or(fallback_color),
            idle_fill_opacity: config.idle_fill_opacity,
            selected_fill_opacity: config.selected_fill_opacity,
            stroke_width: config.stroke_width,
            dash: config.dash,
            control_point_radius: config.control_point_radius,
            marker_radius: config.marker_radius,
            fallback_color,
        }
    }

    pub fn color_of(&self, css: &str) -> Color {
        Color::from_hex(css).unwrap_or(self.fallback_color)
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

/// Geometry buffered by an in-progress drawing session, in image space.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// A complete candidate shape (line, rect, circle, ellipse, square, freehand).
    Shape(Shape),
    /// Polygon under construction, with the live cursor position.
    OpenPolygon {
        vertices: Vec<Point>,
        cursor: Option<Point>,
    },
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// In z-order, oldest first.
    pub annotations: &'a [Annotation],
    pub selected: Option<AnnotationId>,
    /// Annotation under an edit session; drawn with its control points.
    pub editing: Option<AnnotationId>,
    /// Image-space handle positions for `editing`.
    pub control_points: &'a [Point],
    pub preview: Option<&'a Preview>,
    pub preview_color: Color,
}

impl<'a> Frame<'a> {
    pub fn new(annotations: &'a [Annotation], preview_color: Color) -> Self {
        Self {
            annotations,
            selected: None,
            editing: None,
            control_points: &[],
            preview: None,
            preview_color,
        }
    }
}

/// Clear the surface and draw a full frame.
pub fn render_frame<S: Surface + ?Sized>(
    surface: &mut S,
    frame: &Frame<'_>,
    mapper: &impl CoordinateMapper,
    style: &RenderStyle,
) {
    surface.clear();

    for ann in frame.annotations {
        let highlighted = frame.selected == Some(ann.id) && frame.editing != Some(ann.id);
        log::trace!("paint {} {} (highlighted: {highlighted})", ann.kind(), ann.id);
        paint_shape(surface, &ann.shape, style.color_of(&ann.color), highlighted, mapper, style);
    }

    if let Some(preview) = frame.preview {
        paint_preview(surface, preview, frame.preview_color, mapper, style);
    }

    if frame.editing.is_some() {
        for p in frame.control_points {
            let handle = Circle::new(mapper.image_to_screen(*p), style.control_point_radius).to_path(TOLERANCE);
            surface.fill_path(&handle, Color::WHITE);
            surface.stroke_path(&handle, &StrokeStyle::solid(HANDLE_STROKE, style.stroke_width));
        }
    }
}

// ─── Shape painters ──────────────────────────────────────────────────────

fn paint_shape<S: Surface + ?Sized>(
    surface: &mut S,
    shape: &Shape,
    color: Color,
    highlighted: bool,
    mapper: &impl CoordinateMapper,
    style: &RenderStyle,
) {
    let stroke = StrokeStyle::solid(color, style.stroke_width);
    // Open shapes have no body to fill, so selection shows as a halo.
    let halo = StrokeStyle::solid(
        style.body_fill.with_alpha(style.selected_fill_opacity),
        style.stroke_width + SELECTION_HALO,
    );

    if let Shape::Marker { x, y } = shape {
        let tip = mapper.image_to_screen(Point::new(*x, *y));
        let (pin, eye) = marker_pin(tip, style.marker_radius);
        if highlighted {
            surface.stroke_path(&pin, &halo);
        }
        surface.fill_path(&pin, color);
        surface.fill_path(&eye, Color::WHITE);
        return;
    }

    let path = shape_path(shape, mapper, style.marker_radius);
    if is_closed(shape) {
        let fill_opacity = if highlighted {
            style.selected_fill_opacity
        } else {
            style.idle_fill_opacity
        };
        surface.fill_path(&path, style.body_fill.with_alpha(fill_opacity));
    } else if highlighted {
        surface.stroke_path(&path, &halo);
    }
    surface.stroke_path(&path, &stroke);
}

fn paint_preview<S: Surface + ?Sized>(
    surface: &mut S,
    preview: &Preview,
    color: Color,
    mapper: &impl CoordinateMapper,
    style: &RenderStyle,
) {
    let dashed = StrokeStyle::dashed(color, style.stroke_width, style.dash);
    match preview {
        Preview::Shape(shape) => {
            let path = shape_path(shape, mapper, style.marker_radius);
            surface.stroke_path(&path, &dashed);
        }
        Preview::OpenPolygon { vertices, cursor } => {
            let screen: Vec<Point> = vertices.iter().map(|p| mapper.image_to_screen(*p)).collect();
            let cursor = cursor.map(|c| mapper.image_to_screen(c));

            for p in &screen {
                surface.fill_path(&Circle::new(*p, POLYGON_DOT_RADIUS).to_path(TOLERANCE), color);
            }
            if screen.len() >= 2 {
                surface.stroke_path(&polyline(&screen, false), &StrokeStyle::solid(color, style.stroke_width));
            }
            if let (Some(last), Some(cursor)) = (screen.last(), cursor) {
                surface.stroke_path(&polyline(&[*last, cursor], false), &dashed);
            }
            if screen.len() >= 3 {
                let from = cursor.or(screen.last().copied()).unwrap_or(screen[0]);
                let faint = StrokeStyle::dashed(
                    color.with_alpha(color.a * CLOSING_SEGMENT_ALPHA),
                    style.stroke_width,
                    style.dash,
                );
                surface.stroke_path(&polyline(&[from, screen[0]], false), &faint);
            }
        }
    }
}

fn is_closed(shape: &Shape) -> bool {
    !matches!(shape, Shape::Marker { .. } | Shape::Line { .. } | Shape::Freehand(_))
}

/// Screen-space outline of a shape.
pub fn shape_path(shape: &Shape, mapper: &impl CoordinateMapper, marker_radius: f64) -> BezPath {
    match shape {
        Shape::Marker { x, y } => marker_pin(mapper.image_to_screen(Point::new(*x, *y)), marker_radius).0,
        Shape::Line { x1, y1, x2, y2 } => polyline(
            &[
                mapper.image_to_screen(Point::new(*x1, *y1)),
                mapper.image_to_screen(Point::new(*x2, *y2)),
            ],
            false,
        ),
        Shape::Circle { cx, cy, r } => {
            let center = Point::new(*cx, *cy);
            Circle::new(mapper.image_to_screen(center), mapper.screen_radius_x(center, *r)).to_path(TOLERANCE)
        }
        Shape::Ellipse { cx, cy, rx, ry } => {
            let center = Point::new(*cx, *cy);
            let radii = Vec2::new(mapper.screen_radius_x(center, *rx), mapper.screen_radius_y(center, *ry));
            Ellipse::new(mapper.image_to_screen(center), radii, 0.0).to_path(TOLERANCE)
        }
        Shape::Rect { .. } | Shape::Square { .. } => screen_bounds(shape, mapper, marker_radius).to_path(TOLERANCE),
        Shape::Polygon { points } => {
            let screen: Vec<Point> = points.iter().map(|p| mapper.image_to_screen(*p)).collect();
            polyline(&screen, true)
        }
        Shape::Freehand(params) => {
            let screen: Vec<Point> = params.points.iter().map(|p| mapper.image_to_screen(*p)).collect();
            polyline(&screen, false)
        }
    }
}

fn polyline(points: &[Point], closed: bool) -> BezPath {
    let mut path = BezPath::new();
    for (i, p) in points.iter().enumerate() {
        if i == 0 {
            path.move_to(*p);
        } else {
            path.line_to(*p);
        }
    }
    if closed && points.len() > 2 {
        path.close_path();
    }
    path
}

/// Map pin with its tip at `tip`, spanning `[x - r, x + r] × [y - 2r, y]`.
/// Returns the pin body and the white eye drawn on top of it.
fn marker_pin(tip: Point, r: f64) -> (BezPath, BezPath) {
    let head_r = 0.7 * r;
    let center = Point::new(tip.x, tip.y - 2.0 * r + head_r);
    let dist = tip.y - center.y;
    // Angle between the tip direction and each tangent point.
    let alpha = (head_r / dist).acos();

    let mut body = BezPath::new();
    body.move_to(tip);
    let start = FRAC_PI_2 + alpha;
    body.line_to(center + Vec2::from_angle(start) * head_r);
    let arc = Arc {
        center,
        radii: Vec2::new(head_r, head_r),
        start_angle: start,
        sweep_angle: 2.0 * PI - 2.0 * alpha,
        x_rotation: 0.0,
    };
    body.extend(arc.append_iter(TOLERANCE));
    body.close_path();

    let eye = Circle::new(center, 0.4 * head_r).to_path(TOLERANCE);
    (body, eye)
}
