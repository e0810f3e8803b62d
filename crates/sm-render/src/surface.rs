//! Drawing surface abstraction.
//!
//! The renderer emits screen-space paths and never touches a backend
//! directly. Backends: vello [`Scene`](vello::Scene) (see `paint`), the
//! browser's Canvas2D (in the wasm bridge), and [`RecordingSurface`] for
//! tests and exporters.

use kurbo::BezPath;
use sm_core::Color;

/// Stroke parameters in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    /// `[dash, gap]`; `None` draws solid.
    pub dash: Option<[f64; 2]>,
}

impl StrokeStyle {
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: Color, width: f64, dash: [f64; 2]) -> Self {
        Self {
            color,
            width,
            dash: Some(dash),
        }
    }
}

pub trait Surface {
    /// Drop everything drawn so far.
    fn clear(&mut self);
    fn fill_path(&mut self, path: &BezPath, color: Color);
    fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle);
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    Fill { path: BezPath, color: Color },
    Stroke { path: BezPath, style: StrokeStyle },
}

/// A surface that only records calls.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fills(&self) -> impl Iterator<Item = (&BezPath, Color)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Fill { path, color } => Some((path, *color)),
            _ => None,
        })
    }

    pub fn strokes(&self) -> impl Iterator<Item = (&BezPath, &StrokeStyle)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Stroke { path, style } => Some((path, style)),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear);
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.ops.push(DrawOp::Fill {
            path: path.clone(),
            color,
        });
    }

    fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle) {
        self.ops.push(DrawOp::Stroke {
            path: path.clone(),
            style: *style,
        });
    }
}
