//! The image viewer collaborator.
//!
//! The editor never owns the viewport. It asks the viewer for coordinate
//! conversions on every event and frame, locks the viewer's panning while a
//! gesture owns the pointer, and forwards wheel zoom to it.

use kurbo::{Point, Vec2};
use sm_core::{CoordinateMapper, ViewTransform};

pub trait ImageViewer: CoordinateMapper {
    /// Enable or suspend the viewer's own drag-to-pan.
    fn set_pan_enabled(&mut self, enabled: bool);

    /// Zoom by `factor` around the screen point `anchor`.
    fn zoom_by(&mut self, factor: f64, anchor: Point);
}

/// A viewer backed by a plain [`ViewTransform`], for hosts that draw the
/// image themselves and for tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformViewer {
    pub view: ViewTransform,
    pub pan_enabled: bool,
}

impl Default for TransformViewer {
    fn default() -> Self {
        Self::new(ViewTransform::IDENTITY)
    }
}

impl TransformViewer {
    pub fn new(view: ViewTransform) -> Self {
        Self {
            view,
            pan_enabled: true,
        }
    }

    /// Host-driven pan; ignored while panning is suspended.
    pub fn pan_by(&mut self, delta: Vec2) {
        if self.pan_enabled {
            self.view.pan_by(delta);
        }
    }
}

impl CoordinateMapper for TransformViewer {
    fn image_to_screen(&self, p: Point) -> Point {
        self.view.image_to_screen(p)
    }

    fn screen_to_image(&self, p: Point) -> Point {
        self.view.screen_to_image(p)
    }
}

impl ImageViewer for TransformViewer {
    fn set_pan_enabled(&mut self, enabled: bool) {
        if self.pan_enabled != enabled {
            log::trace!("viewer pan {}", if enabled { "enabled" } else { "suspended" });
        }
        self.pan_enabled = enabled;
    }

    fn zoom_by(&mut self, factor: f64, anchor: Point) {
        self.view.zoom_by(factor, anchor);
    }
}
