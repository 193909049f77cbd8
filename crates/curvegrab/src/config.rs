//! JSON-loadable session configuration and calibration input.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::fit::FitConfig;
use crate::frame::{calibrate_axes, CalibrationError, GraphFrame, PixelPoint};
use crate::mapping::{AxisScales, CoordinateMapper, GraphCoordinates, MappingError};
use crate::raster::FilterMode;

/// Default brush radius in pixels.
pub const DEFAULT_BRUSH_RADIUS_PX: u32 = 5;

/// Tunable parameters of a digitization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Polynomial order, independent variable and evaluation sweep size.
    pub fit: FitConfig,
    /// Linear or log10 spacing of each axis.
    pub scales: AxisScales,
    /// Curve isolation filter.
    pub filter: FilterMode,
    /// Radius used for brush strokes that do not carry their own.
    pub brush_radius_px: u32,
    /// Disagreement between the X and Y axis angles above which a warning
    /// is logged.
    pub max_skew_disagreement_rad: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fit: FitConfig::default(),
            scales: AxisScales::default(),
            filter: FilterMode::default(),
            brush_radius_px: DEFAULT_BRUSH_RADIUS_PX,
            max_skew_disagreement_rad: 2f64.to_radians(),
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&data)?)
    }
}

/// The four picked axis points and the graph values typed for them.
///
/// ```json
/// {
///   "x_axis": [{"x": 20, "y": 220}, {"x": 220, "y": 220}],
///   "y_axis": [{"x": 20, "y": 220}, {"x": 20, "y": 20}],
///   "values": {"x1": 0.0, "x2": 10.0, "y1": 0.0, "y2": 10.0}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationInput {
    pub x_axis: [PixelPoint; 2],
    pub y_axis: [PixelPoint; 2],
    pub values: GraphCoordinates,
}

impl CalibrationInput {
    pub fn from_json_str(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&data)?)
    }

    /// Points in session click order: X1, X2, Y1, Y2.
    pub fn axis_points(&self) -> [PixelPoint; 4] {
        [self.x_axis[0], self.x_axis[1], self.y_axis[0], self.y_axis[1]]
    }

    pub fn frame(&self) -> Result<GraphFrame, CalibrationError> {
        calibrate_axes(self.x_axis, self.y_axis)
    }

    pub fn mapper(&self, scales: AxisScales) -> Result<CoordinateMapper, MappingError> {
        CoordinateMapper::calibrated(self.frame()?, self.values, scales)
    }
}
