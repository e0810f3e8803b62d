//! Per-kind shape geometry: hit testing, bounds, centroid, translation and
//! the metrics shown in inspection popups.
//!
//! Hit testing runs in screen space. Every image-space parameter is pushed
//! through the [`CoordinateMapper`] at call time, so tolerances stay constant
//! in screen pixels at any zoom. Metrics are computed from image-space
//! parameters and do not depend on the view.

use crate::config::EditorConfig;
use crate::mapper::CoordinateMapper;
use crate::model::Shape;
use kurbo::{Point, Rect, Vec2};
use serde::Serialize;
use std::f64::consts::PI;

// ─── Hit testing ─────────────────────────────────────────────────────────

/// Does the screen point `pt` land on `shape`?
pub fn hit_test(shape: &Shape, mapper: &impl CoordinateMapper, pt: Point, config: &EditorConfig) -> bool {
    match shape {
        Shape::Marker { x, y } => {
            let anchor = mapper.image_to_screen(Point::new(*x, *y));
            pt.distance(anchor) < config.marker_radius
        }
        Shape::Line { x1, y1, x2, y2 } => {
            let a = mapper.image_to_screen(Point::new(*x1, *y1));
            let b = mapper.image_to_screen(Point::new(*x2, *y2));
            distance_to_segment(pt, a, b) < config.line_tolerance
        }
        Shape::Circle { cx, cy, r } => {
            let center = Point::new(*cx, *cy);
            let r_screen = mapper.screen_radius_x(center, *r);
            pt.distance(mapper.image_to_screen(center)) <= r_screen
        }
        Shape::Ellipse { cx, cy, rx, ry } => {
            let center = Point::new(*cx, *cy);
            let rx = mapper.screen_radius_x(center, *rx);
            let ry = mapper.screen_radius_y(center, *ry);
            if rx <= 0.0 || ry <= 0.0 {
                return false;
            }
            let d = pt - mapper.image_to_screen(center);
            (d.x / rx).powi(2) + (d.y / ry).powi(2) <= 1.0
        }
        Shape::Rect { .. } | Shape::Square { .. } => {
            let bounds = screen_box(image_bounds(shape), mapper);
            pt.x >= bounds.x0 && pt.x <= bounds.x1 && pt.y >= bounds.y0 && pt.y <= bounds.y1
        }
        Shape::Polygon { points } => {
            let screen: Vec<Point> = points.iter().map(|p| mapper.image_to_screen(*p)).collect();
            point_in_polygon(pt, &screen)
        }
        Shape::Freehand(params) => {
            let screen: Vec<Point> = params.points.iter().map(|p| mapper.image_to_screen(*p)).collect();
            point_in_polygon(pt, &screen)
        }
    }
}

/// Distance from `p` to the segment `a`-`b`, projection clamped to the
/// segment. A zero-length segment degrades to the distance to `a`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Even-odd ray cast. The vertex list is treated as closed.
pub fn point_in_polygon(p: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (a, b) = (vertices[i], vertices[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

// ─── Bounds ──────────────────────────────────────────────────────────────

/// Axis-aligned bounds in image space.
pub fn image_bounds(shape: &Shape) -> Rect {
    match shape {
        Shape::Marker { x, y } => Rect::new(*x, *y, *x, *y),
        Shape::Line { x1, y1, x2, y2 } => Rect::from_points((*x1, *y1), (*x2, *y2)),
        Shape::Circle { cx, cy, r } => Rect::new(cx - r, cy - r, cx + r, cy + r),
        Shape::Ellipse { cx, cy, rx, ry } => Rect::new(cx - rx, cy - ry, cx + rx, cy + ry),
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => Rect::from_points((*x, *y), (x + width, y + height)),
        Shape::Square { x, y, side } => Rect::from_points((*x, *y), (x + side, y + side)),
        Shape::Polygon { points } => points_bounds(points),
        Shape::Freehand(params) => points_bounds(&params.points),
    }
}

fn points_bounds(points: &[Point]) -> Rect {
    let Some((first, rest)) = points.split_first() else {
        return Rect::ZERO;
    };
    rest.iter()
        .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p))
}

/// Bounds in screen space. The marker's box covers the pin drawn above its
/// point: `[x - r, x + r] × [y - 2r, y]`.
pub fn screen_bounds(shape: &Shape, mapper: &impl CoordinateMapper, marker_radius: f64) -> Rect {
    if let Shape::Marker { x, y } = shape {
        let p = mapper.image_to_screen(Point::new(*x, *y));
        return Rect::new(
            p.x - marker_radius,
            p.y - 2.0 * marker_radius,
            p.x + marker_radius,
            p.y,
        );
    }
    screen_box(image_bounds(shape), mapper)
}

fn screen_box(image: Rect, mapper: &impl CoordinateMapper) -> Rect {
    let a = mapper.image_to_screen(Point::new(image.x0, image.y0));
    let b = mapper.image_to_screen(Point::new(image.x1, image.y1));
    Rect::from_points(a, b)
}

// ─── Centroid / translate ────────────────────────────────────────────────

/// Representative center in image space.
pub fn centroid(shape: &Shape) -> Point {
    match shape {
        Shape::Marker { x, y } => Point::new(*x, *y),
        Shape::Line { x1, y1, x2, y2 } => Point::new((x1 + x2) / 2.0, (y1 + y2) / 2.0),
        Shape::Circle { cx, cy, .. } | Shape::Ellipse { cx, cy, .. } => Point::new(*cx, *cy),
        Shape::Rect { .. } | Shape::Square { .. } => image_bounds(shape).center(),
        Shape::Polygon { points } => vertex_mean(points),
        Shape::Freehand(params) => vertex_mean(&params.points),
    }
}

fn vertex_mean(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::ZERO;
    }
    let sum = points.iter().fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
    (sum / points.len() as f64).to_point()
}

/// Shift every coordinate of `shape` by `delta` (image space).
pub fn translate(shape: &mut Shape, delta: Vec2) {
    match shape {
        Shape::Marker { x, y } => {
            *x += delta.x;
            *y += delta.y;
        }
        Shape::Line { x1, y1, x2, y2 } => {
            *x1 += delta.x;
            *y1 += delta.y;
            *x2 += delta.x;
            *y2 += delta.y;
        }
        Shape::Circle { cx, cy, .. } | Shape::Ellipse { cx, cy, .. } => {
            *cx += delta.x;
            *cy += delta.y;
        }
        Shape::Rect { x, y, .. } | Shape::Square { x, y, .. } => {
            *x += delta.x;
            *y += delta.y;
        }
        Shape::Polygon { points } => points.iter_mut().for_each(|p| *p += delta),
        Shape::Freehand(params) => params.points.iter_mut().for_each(|p| *p += delta),
    }
}

// ─── Metrics ─────────────────────────────────────────────────────────────

/// Image-space measurements for the inspection popup. Fields that do not
/// apply to a kind are `None` and omitted from JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_extent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_extent: Option<f64>,
}

pub fn metrics(shape: &Shape) -> ShapeMetrics {
    let extents = |shape: &Shape| {
        let b = image_bounds(shape);
        ShapeMetrics {
            horizontal_extent: Some(b.width()),
            vertical_extent: Some(b.height()),
            ..Default::default()
        }
    };

    match shape {
        Shape::Marker { .. } => ShapeMetrics::default(),
        Shape::Line { x1, y1, x2, y2 } => ShapeMetrics {
            length: Some(Point::new(*x1, *y1).distance(Point::new(*x2, *y2))),
            ..Default::default()
        },
        Shape::Circle { r, .. } => ShapeMetrics {
            area: Some(PI * r * r),
            ..Default::default()
        },
        Shape::Ellipse { rx, ry, .. } => ShapeMetrics {
            area: Some(PI * rx * ry),
            ..extents(shape)
        },
        Shape::Rect { width, height, .. } => ShapeMetrics {
            area: Some(width * height),
            ..Default::default()
        },
        Shape::Square { side, .. } => ShapeMetrics {
            area: Some(side * side),
            ..Default::default()
        },
        Shape::Polygon { .. } | Shape::Freehand(_) => extents(shape),
    }
}

/// Where an inspection popup attaches, in screen space: horizontally at the
/// centroid, vertically at the bottom of the shape's screen bounds. Markers
/// anchor at their point.
pub fn popup_anchor(shape: &Shape, mapper: &impl CoordinateMapper, marker_radius: f64) -> Point {
    let center = mapper.image_to_screen(centroid(shape));
    if matches!(shape, Shape::Marker { .. }) {
        return center;
    }
    Point::new(center.x, screen_bounds(shape, mapper, marker_radius).y1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::ViewTransform;
    use pretty_assertions::assert_eq;

    fn triangle() -> Shape {
        Shape::Polygon {
            points: vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(0.0, 100.0)],
        }
    }

    #[test]
    fn segment_distance_clamps_projection() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(distance_to_segment(Point::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_segment(Point::new(14.0, 3.0), a, b), 5.0);
        assert_eq!(distance_to_segment(Point::new(3.0, 4.0), a, a), 5.0);
    }

    #[test]
    fn even_odd_polygon() {
        let Shape::Polygon { points } = triangle() else {
            unreachable!()
        };
        assert!(point_in_polygon(Point::new(10.0, 10.0), &points));
        assert!(!point_in_polygon(Point::new(80.0, 80.0), &points));
        assert!(!point_in_polygon(Point::new(1.0, 1.0), &points[..2]));
    }

    #[test]
    fn marker_and_line_tolerances_are_screen_pixels() {
        let config = EditorConfig::default();
        let view = ViewTransform::new(10.0, Vec2::ZERO);
        let marker = Shape::Marker { x: 10.0, y: 10.0 };
        assert!(hit_test(&marker, &view, Point::new(120.0, 100.0), &config));
        assert!(!hit_test(&marker, &view, Point::new(121.0, 100.0), &config));

        let line = Shape::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 0.0,
        };
        assert!(hit_test(&line, &view, Point::new(50.0, 9.0), &config));
        assert!(!hit_test(&line, &view, Point::new(50.0, 10.0), &config));
    }

    #[test]
    fn ellipse_uses_per_axis_screen_radii() {
        let config = EditorConfig::default();
        let view = ViewTransform::new(2.0, Vec2::new(5.0, 5.0));
        let ellipse = Shape::Ellipse {
            cx: 50.0,
            cy: 50.0,
            rx: 20.0,
            ry: 10.0,
        };
        let c = view.image_to_screen(Point::new(50.0, 50.0));
        assert!(hit_test(&ellipse, &view, c + Vec2::new(39.0, 0.0), &config));
        assert!(!hit_test(&ellipse, &view, c + Vec2::new(0.0, 21.0), &config));
        let flat = Shape::Ellipse {
            cx: 50.0,
            cy: 50.0,
            rx: 20.0,
            ry: 0.0,
        };
        assert!(!hit_test(&flat, &view, c, &config));
    }

    #[test]
    fn rect_and_freehand_hits() {
        let config = EditorConfig::default();
        let view = ViewTransform::IDENTITY;
        let rect = Shape::Rect {
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 5.0,
        };
        assert!(hit_test(&rect, &view, Point::new(30.0, 15.0), &config));
        assert!(!hit_test(&rect, &view, Point::new(30.5, 15.0), &config));

        let stroke = Shape::freehand(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(0.0, 100.0)]);
        assert!(hit_test(&stroke, &view, Point::new(10.0, 10.0), &config));
    }

    #[test]
    fn bounds_and_marker_screen_box() {
        let view = ViewTransform::new(2.0, Vec2::new(10.0, 0.0));
        assert_eq!(image_bounds(&triangle()), Rect::new(0.0, 0.0, 100.0, 100.0));
        let marker = Shape::Marker { x: 5.0, y: 50.0 };
        assert_eq!(
            screen_bounds(&marker, &view, 21.0),
            Rect::new(-1.0, 58.0, 41.0, 100.0)
        );
        let circle = Shape::Circle {
            cx: 0.0,
            cy: 0.0,
            r: 10.0,
        };
        assert_eq!(
            screen_bounds(&circle, &view, 21.0),
            Rect::new(-10.0, -20.0, 30.0, 20.0)
        );
    }

    #[test]
    fn centroid_per_kind() {
        assert_eq!(
            centroid(&Shape::Line {
                x1: 0.0,
                y1: 0.0,
                x2: 10.0,
                y2: 20.0
            }),
            Point::new(5.0, 10.0)
        );
        assert_eq!(
            centroid(&Shape::Square {
                x: 10.0,
                y: 10.0,
                side: 4.0
            }),
            Point::new(12.0, 12.0)
        );
        assert_eq!(
            centroid(&Shape::Polygon {
                points: vec![Point::new(0.0, 0.0), Point::new(6.0, 0.0), Point::new(0.0, 3.0)]
            }),
            Point::new(2.0, 1.0)
        );
    }

    #[test]
    fn translate_moves_every_point() {
        let mut shape = triangle();
        translate(&mut shape, Vec2::new(5.0, -2.0));
        assert_eq!(
            shape,
            Shape::Polygon {
                points: vec![Point::new(5.0, -2.0), Point::new(105.0, -2.0), Point::new(5.0, 98.0)]
            }
        );
        let mut rect = Shape::Rect {
            x: 1.0,
            y: 1.0,
            width: 3.0,
            height: 3.0,
        };
        translate(&mut rect, Vec2::new(1.0, 1.0));
        assert_eq!(
            rect,
            Shape::Rect {
                x: 2.0,
                y: 2.0,
                width: 3.0,
                height: 3.0
            }
        );
    }

    #[test]
    fn metrics_per_kind() {
        let line = Shape::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 3.0,
            y2: 4.0,
        };
        assert_eq!(metrics(&line).length, Some(5.0));

        let ellipse = metrics(&Shape::Ellipse {
            cx: 0.0,
            cy: 0.0,
            rx: 2.0,
            ry: 1.0,
        });
        assert_eq!(ellipse.area, Some(2.0 * PI));
        assert_eq!(ellipse.horizontal_extent, Some(4.0));
        assert_eq!(ellipse.vertical_extent, Some(2.0));

        let poly = metrics(&triangle());
        assert_eq!(poly.area, None);
        assert_eq!(poly.horizontal_extent, Some(100.0));

        let json = serde_json::to_string(&metrics(&Shape::Square {
            x: 0.0,
            y: 0.0,
            side: 3.0,
        }))
        .unwrap();
        assert_eq!(json, r#"{"area":9.0}"#);
    }

    #[test]
    fn popup_anchor_sits_under_the_shape() {
        let view = ViewTransform::new(2.0, Vec2::ZERO);
        let rect = Shape::Rect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 20.0,
        };
        assert_eq!(popup_anchor(&rect, &view, 21.0), Point::new(10.0, 40.0));
        let marker = Shape::Marker { x: 3.0, y: 4.0 };
        assert_eq!(popup_anchor(&marker, &view, 21.0), Point::new(6.0, 8.0));
    }
}
