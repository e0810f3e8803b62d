//! Hit testing: screen point → annotation lookup.
//!
//! Reverse-walks the list (last painted = topmost) so a click on
//! overlapping shapes picks the most recently added one.

use kurbo::Point;
use sm_core::{Annotation, AnnotationId, CoordinateMapper, EditorConfig, geometry};

/// Find the topmost annotation at screen position `pt`.
/// Returns `None` if nothing is hit (background).
pub fn hit_test(
    annotations: &[Annotation],
    mapper: &impl CoordinateMapper,
    pt: Point,
    config: &EditorConfig,
) -> Option<AnnotationId> {
    annotations
        .iter()
        .rev()
        .find(|ann| geometry::hit_test(&ann.shape, mapper, pt, config))
        .map(|ann| ann.id)
}
