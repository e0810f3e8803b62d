//! Annotation data model.
//!
//! Every coordinate stored here is in **image space**: the pixel grid of the
//! underlying image, unaffected by the viewer's pan and zoom. Screen-space
//! values are derived on demand through a [`CoordinateMapper`] and never
//! persisted.
//!
//! The serde form matches the JSON exchanged with the external store:
//!
//! ```json
//! {"id":"3","type":"rect","color":"#ff0000","info":"","params":{"x":0,"y":0,"width":10,"height":5}}
//! ```
//!
//! [`CoordinateMapper`]: crate::mapper::CoordinateMapper

use crate::error::Error;
use crate::id::AnnotationId;
use crate::path_data;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let nibble = |i: usize| hex_val(bytes[i]).map(|v| v as f32 * 17.0 / 255.0);
        let byte = |i: usize| -> Option<f32> {
            Some((hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) as f32 / 255.0)
        };

        match bytes.len() {
            3 => Some(Self::rgba(nibble(0)?, nibble(1)?, nibble(2)?, 1.0)),
            4 => Some(Self::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, 1.0)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Same color with the alpha channel replaced.
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// 8-bit channels, for backends that take integer colors.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// CSS `rgba(...)` form for Canvas2D.
    pub fn to_css(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({r}, {g}, {b}, {})", self.a.clamp(0.0, 1.0))
    }
}

// ─── Shape kinds ─────────────────────────────────────────────────────────

/// The eight annotation shape kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Marker,
    Line,
    Circle,
    Ellipse,
    Rect,
    Square,
    Polygon,
    Freehand,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 8] = [
        ShapeKind::Marker,
        ShapeKind::Line,
        ShapeKind::Circle,
        ShapeKind::Ellipse,
        ShapeKind::Rect,
        ShapeKind::Square,
        ShapeKind::Polygon,
        ShapeKind::Freehand,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Marker => "marker",
            ShapeKind::Line => "line",
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Rect => "rect",
            ShapeKind::Square => "square",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Freehand => "freehand",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Shape payloads ──────────────────────────────────────────────────────

/// Variant payload of an annotation, one variant per [`ShapeKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "lowercase")]
pub enum Shape {
    Marker { x: f64, y: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    Circle { cx: f64, cy: f64, r: f64 },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    /// `(x, y)` is the min corner; `width`/`height` are non-negative.
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Square { x: f64, y: f64, side: f64 },
    /// Closed implicitly; at least 3 vertices once committed.
    Polygon { points: Vec<Point> },
    Freehand(FreehandParams),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Marker { .. } => ShapeKind::Marker,
            Shape::Line { .. } => ShapeKind::Line,
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Ellipse { .. } => ShapeKind::Ellipse,
            Shape::Rect { .. } => ShapeKind::Rect,
            Shape::Square { .. } => ShapeKind::Square,
            Shape::Polygon { .. } => ShapeKind::Polygon,
            Shape::Freehand(_) => ShapeKind::Freehand,
        }
    }

    pub fn freehand(points: Vec<Point>) -> Self {
        Shape::Freehand(FreehandParams { points })
    }

    /// Check the persisted-geometry invariants: finite coordinates,
    /// non-negative sizes, and minimum point counts.
    pub fn validate(&self) -> Result<(), Error> {
        let kind = self.kind();
        let finite = |vals: &[f64]| vals.iter().all(|v| v.is_finite());
        let points_finite = |pts: &[Point]| pts.iter().all(|p| p.x.is_finite() && p.y.is_finite());

        let ok = match self {
            Shape::Marker { x, y } => finite(&[*x, *y]),
            Shape::Line { x1, y1, x2, y2 } => finite(&[*x1, *y1, *x2, *y2]),
            Shape::Circle { cx, cy, r } => {
                if *r < 0.0 {
                    return Err(Error::geometry(kind, "negative radius"));
                }
                finite(&[*cx, *cy, *r])
            }
            Shape::Ellipse { cx, cy, rx, ry } => {
                if *rx < 0.0 || *ry < 0.0 {
                    return Err(Error::geometry(kind, "negative radius"));
                }
                finite(&[*cx, *cy, *rx, *ry])
            }
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => {
                if *width < 0.0 || *height < 0.0 {
                    return Err(Error::geometry(kind, "negative size"));
                }
                finite(&[*x, *y, *width, *height])
            }
            Shape::Square { x, y, side } => {
                if *side < 0.0 {
                    return Err(Error::geometry(kind, "negative side"));
                }
                finite(&[*x, *y, *side])
            }
            Shape::Polygon { points } => {
                if points.len() < 3 {
                    return Err(Error::geometry(
                        kind,
                        format!("needs at least 3 points, got {}", points.len()),
                    ));
                }
                points_finite(points)
            }
            Shape::Freehand(params) => {
                if params.points.len() < 2 {
                    return Err(Error::geometry(
                        kind,
                        format!("needs at least 2 points, got {}", params.points.len()),
                    ));
                }
                points_finite(&params.points)
            }
        };

        if ok {
            Ok(())
        } else {
            Err(Error::geometry(kind, "non-finite coordinate"))
        }
    }
}

/// Freehand payload. On the wire it also carries `d`, the SVG path data for
/// the same points; `points` is authoritative and `d` is regenerated on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FreehandWire", into = "FreehandWire")]
pub struct FreehandParams {
    pub points: Vec<Point>,
}

#[derive(Serialize, Deserialize)]
struct FreehandWire {
    #[serde(default)]
    d: String,
    #[serde(default)]
    points: Vec<Point>,
}

impl TryFrom<FreehandWire> for FreehandParams {
    type Error = Error;

    fn try_from(wire: FreehandWire) -> Result<Self, Error> {
        if !wire.points.is_empty() || wire.d.trim().is_empty() {
            return Ok(Self {
                points: wire.points,
            });
        }
        Ok(Self {
            points: path_data::parse_polyline(&wire.d)?,
        })
    }
}

impl From<FreehandParams> for FreehandWire {
    fn from(params: FreehandParams) -> Self {
        Self {
            d: path_data::to_path_data(&params.points),
            points: params.points,
        }
    }
}

// ─── Annotation ──────────────────────────────────────────────────────────

/// A persisted annotation. List position is z-order (oldest first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub color: String,
    #[serde(default)]
    pub info: String,
    /// AI-origin annotations are read-only and reject interactive edits.
    #[serde(rename = "readOnly", default, skip_serializing_if = "is_false")]
    pub read_only: bool,
    #[serde(flatten)]
    pub shape: Shape,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Annotation {
    pub fn new(id: AnnotationId, color: impl Into<String>, shape: Shape) -> Self {
        Self {
            id,
            color: color.into(),
            info: String::new(),
            read_only: false,
            shape,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.shape.validate()
    }
}

/// Decode a snapshot pushed in by the external store.
pub fn annotations_from_json(json: &str) -> Result<Vec<Annotation>, Error> {
    Ok(serde_json::from_str(json)?)
}

/// Encode the current list for the external store.
pub fn annotations_to_json(annotations: &[Annotation]) -> Result<String, Error> {
    Ok(serde_json::to_string(annotations)?)
}
