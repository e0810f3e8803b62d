pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod mapper;
pub mod model;
pub mod path_data;

pub use config::EditorConfig;
pub use error::Error;
pub use geometry::{ShapeMetrics, centroid, hit_test, image_bounds, metrics, popup_anchor, screen_bounds, translate};
pub use id::AnnotationId;
pub use mapper::{CoordinateMapper, ViewTransform};
pub use model::*;

// Re-export kurbo primitives so downstream crates share one version
pub use kurbo::{Point, Rect, Vec2};
