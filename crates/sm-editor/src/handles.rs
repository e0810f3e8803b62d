//! Control points (resize handles) and the resize rules for each kind.
//!
//! Handle positions are derived from the current shape parameters on every
//! call. Nothing here caches positions between frames.

use kurbo::Point;
use sm_core::{CoordinateMapper, EditorConfig, Rect, Shape};
use smallvec::SmallVec;

/// Rect/square corner, indexed clockwise from the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::TopLeft, Corner::TopRight, Corner::BottomRight, Corner::BottomLeft];

    /// The diagonally opposite corner, held fixed while this one is dragged.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomRight => Corner::TopLeft,
            Corner::BottomLeft => Corner::TopRight,
        }
    }

    pub fn of(self, r: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(r.x0, r.y0),
            Corner::TopRight => Point::new(r.x1, r.y0),
            Corner::BottomRight => Point::new(r.x1, r.y1),
            Corner::BottomLeft => Point::new(r.x0, r.y1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinal {
    Top,
    Right,
    Bottom,
    Left,
}

/// What dragging a handle does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleRole {
    LineStart,
    LineEnd,
    CircleEdge(Cardinal),
    /// The single ellipse handle at `(cx + rx, cy + ry)`.
    EllipseCorner,
    Corner(Corner),
    Vertex(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    pub role: HandleRole,
    /// Image space.
    pub position: Point,
}

/// Handles for `shape`, in hit-test priority order (last wins).
pub fn control_points(shape: &Shape) -> SmallVec<[ControlPoint; 4]> {
    let cp = |role, x: f64, y: f64| ControlPoint {
        role,
        position: Point::new(x, y),
    };
    match *shape {
        Shape::Marker { .. } | Shape::Freehand(_) => SmallVec::new(),
        Shape::Line { x1, y1, x2, y2 } => {
            SmallVec::from_iter([cp(HandleRole::LineStart, x1, y1), cp(HandleRole::LineEnd, x2, y2)])
        }
        Shape::Circle { cx, cy, r } => SmallVec::from_iter([
            cp(HandleRole::CircleEdge(Cardinal::Top), cx, cy - r),
            cp(HandleRole::CircleEdge(Cardinal::Right), cx + r, cy),
            cp(HandleRole::CircleEdge(Cardinal::Bottom), cx, cy + r),
            cp(HandleRole::CircleEdge(Cardinal::Left), cx - r, cy),
        ]),
        Shape::Ellipse { cx, cy, rx, ry } => SmallVec::from_iter([cp(HandleRole::EllipseCorner, cx + rx, cy + ry)]),
        Shape::Rect { .. } | Shape::Square { .. } => {
            let bounds = sm_core::image_bounds(shape);
            Corner::ALL
                .into_iter()
                .map(|c| ControlPoint {
                    role: HandleRole::Corner(c),
                    position: c.of(bounds),
                })
                .collect()
        }
        Shape::Polygon { ref points } => points
            .iter()
            .enumerate()
            .map(|(i, p)| ControlPoint {
                role: HandleRole::Vertex(i),
                position: *p,
            })
            .collect(),
    }
}

/// Handle under the screen point `pt`, if any. Later handles win ties.
pub fn control_point_at(
    shape: &Shape,
    mapper: &impl CoordinateMapper,
    pt: Point,
    config: &EditorConfig,
) -> Option<HandleRole> {
    control_points(shape)
        .iter()
        .rev()
        .find(|cp| mapper.image_to_screen(cp.position).distance(pt) < config.control_point_tolerance)
        .map(|cp| cp.role)
}

/// Per-drag state captured when a handle is grabbed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeDrag {
    pub role: HandleRole,
    /// `rx / ry` at grab time; scales ellipses uniformly.
    pub ellipse_ratio: f64,
    /// Image point that stays put for the whole drag: the corner opposite
    /// the grabbed one for rects, the center for squares.
    pub anchor: Option<Point>,
}

impl ResizeDrag {
    pub fn begin(shape: &Shape, role: HandleRole) -> Self {
        let ellipse_ratio = match *shape {
            Shape::Ellipse { rx, ry, .. } if ry != 0.0 && rx > 0.0 => rx / ry,
            _ => 1.0,
        };
        let anchor = match (shape, role) {
            (
                &Shape::Rect {
                    x,
                    y,
                    width,
                    height,
                },
                HandleRole::Corner(corner),
            ) => Some(corner.opposite().of(Rect::new(x, y, x + width, y + height))),
            (&Shape::Square { x, y, side }, HandleRole::Corner(_)) => Some(Point::new(x + side / 2.0, y + side / 2.0)),
            _ => None,
        };
        Self {
            role,
            ellipse_ratio,
            anchor,
        }
    }
}

/// Move the grabbed handle to image point `pt`. Returns `false` when the
/// update is rejected (would shrink below the minimum size) or the handle
/// does not belong to this kind; the shape is then left untouched.
pub fn apply_resize(shape: &mut Shape, drag: &ResizeDrag, pt: Point, config: &EditorConfig) -> bool {
    match (shape, drag.role) {
        (Shape::Line { x1, y1, .. }, HandleRole::LineStart) => {
            (*x1, *y1) = (pt.x, pt.y);
            true
        }
        (Shape::Line { x2, y2, .. }, HandleRole::LineEnd) => {
            (*x2, *y2) = (pt.x, pt.y);
            true
        }
        // Any of the four handles sets the radius to the cursor distance.
        (Shape::Circle { cx, cy, r }, HandleRole::CircleEdge(_)) => {
            *r = Point::new(*cx, *cy).distance(pt).max(config.min_radius);
            true
        }
        (Shape::Ellipse { cx, cy, rx, ry }, HandleRole::EllipseCorner) => {
            let d = Point::new(*cx, *cy).distance(pt);
            let ratio = drag.ellipse_ratio;
            let new_rx = d / (1.0 + 1.0 / (ratio * ratio)).sqrt();
            *rx = new_rx.max(config.min_radius);
            *ry = (new_rx / ratio).max(config.min_radius);
            true
        }
        (
            Shape::Rect {
                x,
                y,
                width,
                height,
            },
            HandleRole::Corner(corner),
        ) => {
            let fixed = drag
                .anchor
                .unwrap_or_else(|| corner.opposite().of(Rect::new(*x, *y, *x + *width, *y + *height)));
            let next = Rect::from_points(fixed, pt);
            if next.width() < config.min_resize_side || next.height() < config.min_resize_side {
                return false;
            }
            (*x, *y, *width, *height) = (next.x0, next.y0, next.width(), next.height());
            true
        }
        (Shape::Square { x, y, side }, HandleRole::Corner(_)) => {
            let center = drag
                .anchor
                .unwrap_or_else(|| Point::new(*x + *side / 2.0, *y + *side / 2.0));
            let half = (pt.x - center.x).abs().max((pt.y - center.y).abs());
            if 2.0 * half < config.min_resize_side {
                return false;
            }
            (*x, *y, *side) = (center.x - half, center.y - half, 2.0 * half);
            true
        }
        (Shape::Polygon { points }, HandleRole::Vertex(i)) => match points.get_mut(i) {
            Some(v) => {
                *v = pt;
                true
            }
            None => false,
        },
        _ => false,
    }
}
