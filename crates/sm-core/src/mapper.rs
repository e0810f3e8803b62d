//! Image ↔ screen coordinate mapping.
//!
//! Annotations persist in image space; rendering and hit testing happen in
//! screen space. The mapping belongs to the external viewer and changes with
//! every pan and zoom, so callers must query it fresh for each frame and each
//! pointer event rather than caching converted values.

use kurbo::{Affine, Point, Vec2};

/// Converts between image space and screen space using the viewer's current
/// viewport transform.
pub trait CoordinateMapper {
    fn image_to_screen(&self, p: Point) -> Point;
    fn screen_to_image(&self, p: Point) -> Point;

    /// On-screen length of an image-space radius measured along the x axis.
    fn screen_radius_x(&self, center: Point, r: f64) -> f64 {
        let c = self.image_to_screen(center);
        let edge = self.image_to_screen(Point::new(center.x + r, center.y));
        (edge.x - c.x).abs()
    }

    /// On-screen length of an image-space radius measured along the y axis.
    fn screen_radius_y(&self, center: Point, r: f64) -> f64 {
        let c = self.image_to_screen(center);
        let edge = self.image_to_screen(Point::new(center.x, center.y + r));
        (edge.y - c.y).abs()
    }
}

impl<M: CoordinateMapper + ?Sized> CoordinateMapper for &M {
    fn image_to_screen(&self, p: Point) -> Point {
        (**self).image_to_screen(p)
    }

    fn screen_to_image(&self, p: Point) -> Point {
        (**self).screen_to_image(p)
    }
}

/// A plain zoom + pan viewport: `screen = image * zoom + pan`.
///
/// Stands in for a real deep-zoom viewer in hosts that draw the image
/// themselves, and in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    zoom: f64,
    pan: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        zoom: 1.0,
        pan: Vec2::ZERO,
    };

    /// Zoom must be positive; non-positive values fall back to 1.
    pub fn new(zoom: f64, pan: Vec2) -> Self {
        if zoom > 0.0 && zoom.is_finite() {
            return Self { zoom, pan };
        }
        log::warn!("invalid zoom {zoom}, using 1");
        Self { zoom: 1.0, pan }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn affine(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Multiply the zoom by `factor`, keeping `anchor` (screen space) fixed.
    pub fn zoom_by(&mut self, factor: f64, anchor: Point) {
        if !(factor > 0.0 && factor.is_finite()) {
            log::debug!("ignoring zoom factor {factor}");
            return;
        }
        let image_anchor = self.screen_to_image(anchor);
        self.zoom *= factor;
        let moved = self.image_to_screen(image_anchor);
        self.pan += anchor - moved;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }
}

impl CoordinateMapper for ViewTransform {
    fn image_to_screen(&self, p: Point) -> Point {
        self.affine() * p
    }

    fn screen_to_image(&self, p: Point) -> Point {
        self.affine().inverse() * p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn roundtrip_at_several_zooms() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1234.5, -77.25),
            Point::new(98_000.0, 45_000.0),
        ];
        for zoom in [0.01, 0.5, 1.0, 3.0, 40.0] {
            let view = ViewTransform::new(zoom, Vec2::new(-320.0, 115.5));
            for p in points {
                let back = view.screen_to_image(view.image_to_screen(p));
                assert!(close(back, p), "zoom {zoom}: {p:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn zoom_by_keeps_anchor_fixed() {
        let mut view = ViewTransform::new(2.0, Vec2::new(10.0, 20.0));
        let anchor = Point::new(300.0, 200.0);
        let before = view.screen_to_image(anchor);
        view.zoom_by(1.1, anchor);
        assert!((view.zoom() - 2.2).abs() < 1e-12);
        assert!(close(view.screen_to_image(anchor), before));
    }

    #[test]
    fn screen_radius_scales_with_zoom() {
        let view = ViewTransform::new(4.0, Vec2::new(7.0, 9.0));
        let c = Point::new(50.0, 60.0);
        assert!((view.screen_radius_x(c, 10.0) - 40.0).abs() < 1e-9);
        assert!((view.screen_radius_y(c, 2.5) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_zoom_falls_back_to_one() {
        assert_eq!(ViewTransform::new(0.0, Vec2::ZERO).zoom(), 1.0);
        assert_eq!(ViewTransform::new(f64::NAN, Vec2::ZERO).zoom(), 1.0);
    }
}
