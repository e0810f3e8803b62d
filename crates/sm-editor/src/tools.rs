//! Drawing tools.
//!
//! One [`DrawingSession`] variant per shape kind. The session buffers the
//! in-progress geometry in image space and turns each [`ImageEvent`] into a
//! [`DrawOutcome`]; the editor decides what a commit means (id, color,
//! restart or exit).
//!
//! | kind | press | move | release | double-click |
//! |------|-------|------|---------|--------------|
//! | marker | commit | - | - | - |
//! | line/rect/circle/ellipse | anchor | preview | commit | - |
//! | square | origin | - | commit | - |
//! | polygon | add vertex / close | cursor | - | commit |
//! | freehand | start | sample | commit | - |

use crate::input::ImageEvent;
use kurbo::Point;
use sm_core::{CoordinateMapper, EditorConfig, Shape, ShapeKind};
use sm_render::Preview;

/// Options accepted when a drawing tool is selected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawOptions {
    /// Side for the square tool (image units). Falls back to the config.
    pub square_size: Option<f64>,
    /// Color for shapes drawn from now on.
    pub color: Option<String>,
}

/// Result of feeding one event to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutcome {
    /// Nothing visible changed.
    Pending,
    /// Buffered geometry changed; redraw the preview.
    Updated,
    /// A finished shape. Buffers are already cleared.
    Commit(Shape),
    /// The gesture produced degenerate geometry and was dropped. Buffers are
    /// cleared and the session stays active.
    Discard,
}

/// Anchor + current point of a press-drag-release gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Drag {
    pub anchor: Option<Point>,
    pub current: Option<Point>,
}

/// The in-progress drawing, discriminated by shape kind.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawingSession {
    Marker,
    Line(Drag),
    Circle(Drag),
    Ellipse(Drag),
    Rect(Drag),
    Square { side: f64, origin: Option<Point> },
    Polygon { vertices: Vec<Point>, cursor: Option<Point> },
    Freehand { points: Vec<Point>, sampling: bool },
}

impl DrawingSession {
    pub fn new(kind: ShapeKind, options: &DrawOptions, config: &EditorConfig) -> Self {
        match kind {
            ShapeKind::Marker => Self::Marker,
            ShapeKind::Line => Self::Line(Drag::default()),
            ShapeKind::Circle => Self::Circle(Drag::default()),
            ShapeKind::Ellipse => Self::Ellipse(Drag::default()),
            ShapeKind::Rect => Self::Rect(Drag::default()),
            ShapeKind::Square => Self::Square {
                side: options
                    .square_size
                    .filter(|s| *s > 0.0 && s.is_finite())
                    .unwrap_or(config.square_size),
                origin: None,
            },
            ShapeKind::Polygon => Self::Polygon {
                vertices: Vec::new(),
                cursor: None,
            },
            ShapeKind::Freehand => Self::Freehand {
                points: Vec::new(),
                sampling: false,
            },
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Marker => ShapeKind::Marker,
            Self::Line(_) => ShapeKind::Line,
            Self::Circle(_) => ShapeKind::Circle,
            Self::Ellipse(_) => ShapeKind::Ellipse,
            Self::Rect(_) => ShapeKind::Rect,
            Self::Square { .. } => ShapeKind::Square,
            Self::Polygon { .. } => ShapeKind::Polygon,
            Self::Freehand { .. } => ShapeKind::Freehand,
        }
    }

    /// Clear buffered geometry, keeping the kind and its options.
    pub fn reset(&mut self) {
        match self {
            Self::Marker => {}
            Self::Line(drag) | Self::Circle(drag) | Self::Ellipse(drag) | Self::Rect(drag) => {
                *drag = Drag::default();
            }
            Self::Square { origin, .. } => *origin = None,
            Self::Polygon { vertices, cursor } => {
                vertices.clear();
                *cursor = None;
            }
            Self::Freehand { points, sampling } => {
                points.clear();
                *sampling = false;
            }
        }
    }

    /// Whether any geometry is buffered.
    pub fn in_progress(&self) -> bool {
        match self {
            Self::Marker => false,
            Self::Line(drag) | Self::Circle(drag) | Self::Ellipse(drag) | Self::Rect(drag) => drag.anchor.is_some(),
            Self::Square { origin, .. } => origin.is_some(),
            Self::Polygon { vertices, .. } => !vertices.is_empty(),
            Self::Freehand { points, .. } => !points.is_empty(),
        }
    }

    /// Feed one image-space event. `mapper` is only consulted for
    /// screen-space tolerances (the polygon closing gesture).
    pub fn handle(&mut self, event: ImageEvent, mapper: &impl CoordinateMapper, config: &EditorConfig) -> DrawOutcome {
        let kind = self.kind();
        match self {
            Self::Marker => match event {
                ImageEvent::Press(p) => DrawOutcome::Commit(Shape::Marker { x: p.x, y: p.y }),
                _ => DrawOutcome::Pending,
            },

            Self::Line(drag) | Self::Circle(drag) | Self::Ellipse(drag) | Self::Rect(drag) => match event {
                ImageEvent::Press(p) => {
                    *drag = Drag {
                        anchor: Some(p),
                        current: Some(p),
                    };
                    DrawOutcome::Updated
                }
                ImageEvent::Move(p) if drag.anchor.is_some() => {
                    drag.current = Some(p);
                    DrawOutcome::Updated
                }
                ImageEvent::Release(p) => {
                    let Some(anchor) = drag.anchor else {
                        return DrawOutcome::Pending;
                    };
                    *drag = Drag::default();
                    let shape = drag_shape(kind, anchor, p);
                    if is_degenerate(&shape) {
                        log::debug!("discarding zero-size {kind}");
                        DrawOutcome::Discard
                    } else {
                        DrawOutcome::Commit(shape)
                    }
                }
                _ => DrawOutcome::Pending,
            },

            Self::Square { side, origin } => match event {
                ImageEvent::Press(p) => {
                    *origin = Some(p);
                    DrawOutcome::Updated
                }
                ImageEvent::Release(_) => match origin.take() {
                    Some(o) => DrawOutcome::Commit(Shape::Square {
                        x: o.x,
                        y: o.y,
                        side: *side,
                    }),
                    None => DrawOutcome::Pending,
                },
                _ => DrawOutcome::Pending,
            },

            Self::Polygon { vertices, cursor } => match event {
                ImageEvent::Press(p) => {
                    if vertices.len() >= 3 {
                        let first = mapper.image_to_screen(vertices[0]);
                        if mapper.image_to_screen(p).distance(first) < config.polygon_close_tolerance {
                            return close_polygon(vertices, cursor);
                        }
                    }
                    // The two presses of a double-click land on the same spot.
                    if vertices.last() == Some(&p) {
                        return DrawOutcome::Pending;
                    }
                    vertices.push(p);
                    DrawOutcome::Updated
                }
                ImageEvent::Move(p) if !vertices.is_empty() => {
                    *cursor = Some(p);
                    DrawOutcome::Updated
                }
                ImageEvent::DoubleClick(_) => close_polygon(vertices, cursor),
                _ => DrawOutcome::Pending,
            },

            Self::Freehand { points, sampling } => match event {
                ImageEvent::Press(p) => {
                    points.clear();
                    points.push(p);
                    *sampling = true;
                    DrawOutcome::Updated
                }
                ImageEvent::Move(p) if *sampling => {
                    points.push(p);
                    DrawOutcome::Updated
                }
                ImageEvent::Release(_) if *sampling => {
                    *sampling = false;
                    let taken = std::mem::take(points);
                    if taken.len() >= 2 {
                        DrawOutcome::Commit(Shape::freehand(taken))
                    } else {
                        log::debug!("discarding freehand stroke with {} point(s)", taken.len());
                        DrawOutcome::Discard
                    }
                }
                _ => DrawOutcome::Pending,
            },
        }
    }

    /// Explicit finish (Enter). Only polygons have an open-ended protocol.
    pub fn finish(&mut self) -> DrawOutcome {
        match self {
            Self::Polygon { vertices, cursor } => close_polygon(vertices, cursor),
            _ => DrawOutcome::Pending,
        }
    }

    /// Geometry to draw as a dashed preview.
    pub fn preview(&self) -> Option<Preview> {
        match self {
            Self::Marker => None,
            Self::Line(drag) | Self::Circle(drag) | Self::Ellipse(drag) | Self::Rect(drag) => {
                let (anchor, current) = (drag.anchor?, drag.current?);
                Some(Preview::Shape(drag_shape(self.kind(), anchor, current)))
            }
            Self::Square { side, origin } => origin.map(|o| {
                Preview::Shape(Shape::Square {
                    x: o.x,
                    y: o.y,
                    side: *side,
                })
            }),
            Self::Polygon { vertices, cursor } if !vertices.is_empty() => Some(Preview::OpenPolygon {
                vertices: vertices.clone(),
                cursor: *cursor,
            }),
            Self::Polygon { .. } => None,
            Self::Freehand { points, .. } if !points.is_empty() => Some(Preview::Shape(Shape::freehand(points.clone()))),
            Self::Freehand { .. } => None,
        }
    }
}

fn close_polygon(vertices: &mut Vec<Point>, cursor: &mut Option<Point>) -> DrawOutcome {
    if vertices.len() < 3 {
        return DrawOutcome::Pending;
    }
    *cursor = None;
    DrawOutcome::Commit(Shape::Polygon {
        points: std::mem::take(vertices),
    })
}

/// Shape spanned by a press at `a` dragged to `b`.
fn drag_shape(kind: ShapeKind, a: Point, b: Point) -> Shape {
    match kind {
        ShapeKind::Line => Shape::Line {
            x1: a.x,
            y1: a.y,
            x2: b.x,
            y2: b.y,
        },
        ShapeKind::Circle => Shape::Circle {
            cx: a.x,
            cy: a.y,
            r: a.distance(b),
        },
        ShapeKind::Ellipse => Shape::Ellipse {
            cx: a.x,
            cy: a.y,
            rx: (b.x - a.x).abs(),
            ry: (b.y - a.y).abs(),
        },
        _ => Shape::Rect {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        },
    }
}

fn is_degenerate(shape: &Shape) -> bool {
    match *shape {
        Shape::Line { x1, y1, x2, y2 } => x1 == x2 && y1 == y2,
        Shape::Circle { r, .. } => r == 0.0,
        Shape::Ellipse { rx, ry, .. } => rx == 0.0 || ry == 0.0,
        Shape::Rect { width, height, .. } => width == 0.0 || height == 0.0,
        _ => false,
    }
}
