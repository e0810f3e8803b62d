//! Vello backend: paints frames into a [`Scene`].
//!
//! The caller owns the GPU side and presents the scene.

use kurbo::{Affine, BezPath, Stroke as KurboStroke};
use peniko::{Color as PenikoColor, Fill};
use sm_core::{Color, CoordinateMapper};
use vello::Scene;

use crate::frame::{Frame, RenderStyle, render_frame};
use crate::surface::{StrokeStyle, Surface};

impl Surface for Scene {
    fn clear(&mut self) {
        self.reset();
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.fill(Fill::NonZero, Affine::IDENTITY, to_peniko(color), None, path);
    }

    fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle) {
        let mut stroke = KurboStroke::new(style.width);
        if let Some([dash, gap]) = style.dash {
            stroke = stroke.with_dashes(0.0, [dash, gap]);
        }
        self.stroke(&stroke, Affine::IDENTITY, to_peniko(style.color), None, path);
    }
}

/// Paint one frame into `scene`, replacing its previous contents.
pub fn paint_scene(scene: &mut Scene, frame: &Frame<'_>, mapper: &impl CoordinateMapper, style: &RenderStyle) {
    render_frame(scene, frame, mapper, style);
}

fn to_peniko(color: Color) -> PenikoColor {
    let [r, g, b, a] = color.to_rgba8();
    PenikoColor::from_rgba8(r, g, b, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use sm_core::{Annotation, AnnotationId, Shape, ViewTransform};

    #[test]
    fn paints_every_kind_without_panicking() {
        let list: Vec<Annotation> = [
            Shape::Marker { x: 5.0, y: 5.0 },
            Shape::Line {
                x1: 0.0,
                y1: 0.0,
                x2: 9.0,
                y2: 9.0,
            },
            Shape::Circle {
                cx: 20.0,
                cy: 20.0,
                r: 4.0,
            },
            Shape::Ellipse {
                cx: 40.0,
                cy: 20.0,
                rx: 6.0,
                ry: 3.0,
            },
            Shape::Rect {
                x: 1.0,
                y: 1.0,
                width: 3.0,
                height: 2.0,
            },
            Shape::Square {
                x: 50.0,
                y: 50.0,
                side: 8.0,
            },
            Shape::Polygon {
                points: vec![Point::ZERO, Point::new(8.0, 0.0), Point::new(0.0, 8.0)],
            },
            Shape::freehand(vec![Point::ZERO, Point::new(2.0, 3.0)]),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, shape)| Annotation::new(AnnotationId::intern(&format!("k{i}")), "#ff0000", shape))
        .collect();

        let style = RenderStyle::default();
        let mut scene = Scene::new();
        paint_scene(&mut scene, &Frame::new(&list, style.fallback_color), &ViewTransform::new(1.5, kurbo::Vec2::ZERO), &style);
    }

    #[test]
    fn color_conversion_keeps_alpha() {
        let c = to_peniko(Color::rgba(1.0, 0.0, 0.0, 0.2));
        assert_eq!(c.components[0], 1.0);
        assert!((c.components[3] - 0.2).abs() < 1e-2);
    }
}
