pub mod frame;
pub mod hit;
pub mod paint;
pub mod surface;

pub use frame::{Frame, Preview, RenderStyle, render_frame, shape_path};
pub use hit::hit_test;
pub use surface::{DrawOp, RecordingSurface, StrokeStyle, Surface};
