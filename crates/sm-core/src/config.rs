//! Editor configuration: hit-test tolerances, resize limits, and style
//! constants. Loaded from JSON by hosts; every field has a default.

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// Tolerances and styling for the annotation editor.
///
/// Tolerances marked *screen px* are compared after mapping through the
/// viewer, so they feel the same at every zoom level. Limits marked *image
/// units* apply to persisted geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Marker hit radius and drawn pin half-width (screen px).
    pub marker_radius: f64,
    /// Max distance from a line segment that still hits it (screen px).
    pub line_tolerance: f64,
    /// Grab radius for resize handles (screen px).
    pub control_point_tolerance: f64,
    /// Distance to the first polygon vertex that closes the polygon (screen px).
    pub polygon_close_tolerance: f64,
    /// Smallest rect/square side a resize may produce (image units).
    pub min_resize_side: f64,
    /// Smallest circle/ellipse radius a resize may produce (image units).
    pub min_radius: f64,
    /// Side of squares placed by the square tool (image units).
    pub square_size: f64,
    /// Keep drawing the same kind after each commit.
    pub allow_multiple: bool,
    /// Color given to new annotations.
    pub default_color: String,
    /// Drawn radius of resize handles (screen px).
    pub control_point_radius: f64,
    pub stroke_width: f64,
    /// Dash pattern for previews (screen px).
    pub dash: [f64; 2],
    /// Body fill shared by all closed shapes.
    pub fill_color: String,
    /// Fill alpha for unselected shapes. Kept above zero so the body is
    /// still a hit target without obscuring the image.
    pub idle_fill_opacity: f32,
    pub selected_fill_opacity: f32,
    /// Wheel zoom factor per notch.
    pub wheel_zoom_step: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            marker_radius: 21.0,
            line_tolerance: 10.0,
            control_point_tolerance: 15.0,
            polygon_close_tolerance: 15.0,
            min_resize_side: 10.0,
            min_radius: 5.0,
            square_size: 256.0,
            allow_multiple: false,
            default_color: "#ff0000".to_string(),
            control_point_radius: 8.0,
            stroke_width: 2.0,
            dash: [5.0, 5.0],
            fill_color: "#334c6b".to_string(),
            idle_fill_opacity: 0.01,
            selected_fill_opacity: 0.2,
            wheel_zoom_step: 1.1,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let positive = [
            ("markerRadius", self.marker_radius),
            ("lineTolerance", self.line_tolerance),
            ("controlPointTolerance", self.control_point_tolerance),
            ("polygonCloseTolerance", self.polygon_close_tolerance),
            ("squareSize", self.square_size),
            ("strokeWidth", self.stroke_width),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(Error::InvalidConfig(format!("{name} must be positive, got {value}")));
            }
        }
        if self.min_resize_side < 0.0 || self.min_radius < 0.0 {
            return Err(Error::InvalidConfig("minimum sizes must be non-negative".into()));
        }
        if self.wheel_zoom_step <= 1.0 {
            return Err(Error::InvalidConfig(format!(
                "wheelZoomStep must be greater than 1, got {}",
                self.wheel_zoom_step
            )));
        }
        for opacity in [self.idle_fill_opacity, self.selected_fill_opacity] {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(Error::InvalidConfig(format!("opacity {opacity} outside [0, 1]")));
            }
        }
        Ok(())
    }
}
