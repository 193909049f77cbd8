//! Pixel-to-graph coordinate mapping with per-axis linear or log10 scales.
//!
//! The mapper is an affine map per axis, built from the frame's derotated
//! calibration extents and the graph values the user typed for them. On a
//! log axis the affine map runs in `log10` space and results are raised
//! back with `10^v`.
//!
//! Every setter recomputes the coefficients eagerly, so a caller can never
//! observe coefficients that are stale with respect to the inputs.

use serde::{Deserialize, Serialize};

use crate::frame::{AxisKind, CalibrationError, GraphFrame, PixelPoint};

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors raised while building or using a [`CoordinateMapper`].
#[derive(Debug, Clone, PartialEq)]
pub enum MappingError {
    /// Frame or graph coordinates have not been supplied yet.
    NotCalibrated,
    /// A reference value on a log axis is not strictly positive.
    LogDomain {
        /// Axis carrying the reference value.
        axis: AxisKind,
        /// Offending reference value.
        value: f64,
    },
    /// Both calibration points project onto the same pixel along an axis.
    ZeroPixelSpan {
        /// Axis whose projected extent is empty.
        axis: AxisKind,
    },
    /// The axis frame could not be built.
    Calibration(CalibrationError),
}

impl std::fmt::Display for MappingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotCalibrated => write!(f, "pixel mapping is not calibrated"),
            Self::LogDomain { axis, value } => write!(
                f,
                "{}-axis is logarithmic but reference value {} is not positive",
                axis, value
            ),
            Self::ZeroPixelSpan { axis } => {
                write!(f, "{}-axis calibration points share one pixel position", axis)
            }
            Self::Calibration(e) => write!(f, "calibration failed: {}", e),
        }
    }
}

impl std::error::Error for MappingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Calibration(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CalibrationError> for MappingError {
    fn from(e: CalibrationError) -> Self {
        Self::Calibration(e)
    }
}

// ── Types ──────────────────────────────────────────────────────────────────

/// How graph values are spaced along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisScale {
    #[default]
    Linear,
    Log10,
}

impl AxisScale {
    pub fn from_is_lin(is_lin: bool) -> Self {
        if is_lin {
            Self::Linear
        } else {
            Self::Log10
        }
    }

    pub fn is_log(self) -> bool {
        self == Self::Log10
    }
}

/// Scale choice for both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AxisScales {
    #[serde(default)]
    pub x: AxisScale,
    #[serde(default)]
    pub y: AxisScale,
}

impl AxisScales {
    pub fn new(x: AxisScale, y: AxisScale) -> Self {
        Self { x, y }
    }

    pub fn from_lin_flags(x_is_lin: bool, y_is_lin: bool) -> Self {
        Self {
            x: AxisScale::from_is_lin(x_is_lin),
            y: AxisScale::from_is_lin(y_is_lin),
        }
    }

    pub fn get(&self, axis: AxisKind) -> AxisScale {
        match axis {
            AxisKind::X => self.x,
            AxisKind::Y => self.y,
        }
    }
}

/// Graph-space values typed for the four calibration points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphCoordinates {
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
}

impl GraphCoordinates {
    pub fn new(x1: f64, x2: f64, y1: f64, y2: f64) -> Self {
        Self { x1, x2, y1, y2 }
    }

    fn pair(&self, axis: AxisKind) -> [f64; 2] {
        match axis {
            AxisKind::X => [self.x1, self.x2],
            AxisKind::Y => [self.y1, self.y2],
        }
    }
}

/// A graph-space point extracted from the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveSample {
    pub x: f64,
    pub y: f64,
}

impl CurveSample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn get(&self, axis: AxisKind) -> f64 {
        match axis {
            AxisKind::X => self.x,
            AxisKind::Y => self.y,
        }
    }
}

impl From<[f64; 2]> for CurveSample {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Affine pixel-to-graph map for one axis: `v = slope * pixel + intercept`.
///
/// On a log axis `v` is `log10` of the graph value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisMap {
    pub slope: f64,
    pub intercept: f64,
    pub scale: AxisScale,
}

impl AxisMap {
    /// Fit the map through two `(pixel, graph value)` references.
    pub fn from_references(
        axis: AxisKind,
        scale: AxisScale,
        pixels: [f64; 2],
        values: [f64; 2],
    ) -> Result<Self, MappingError> {
        let [v1, v2] = match scale {
            AxisScale::Linear => values,
            AxisScale::Log10 => {
                for value in values {
                    if value.is_nan() || value <= 0.0 {
                        return Err(MappingError::LogDomain { axis, value });
                    }
                }
                [values[0].log10(), values[1].log10()]
            }
        };
        let pixel_delta = pixels[1] - pixels[0];
        if pixel_delta == 0.0 {
            return Err(MappingError::ZeroPixelSpan { axis });
        }
        let slope = (v2 - v1) / pixel_delta;
        Ok(Self {
            slope,
            intercept: v1 - slope * pixels[0],
            scale,
        })
    }

    pub fn to_graph(&self, pixel: f64) -> f64 {
        let v = self.slope * pixel + self.intercept;
        match self.scale {
            AxisScale::Linear => v,
            AxisScale::Log10 => 10f64.powf(v),
        }
    }

    /// Inverse of [`Self::to_graph`]; NaN for non-positive values on a log axis.
    pub fn to_pixel(&self, value: f64) -> f64 {
        let v = match self.scale {
            AxisScale::Linear => value,
            AxisScale::Log10 => value.log10(),
        };
        (v - self.intercept) / self.slope
    }
}

/// Per-session pixel-to-graph mapping state.
#[derive(Debug, Clone, Default)]
pub struct CoordinateMapper {
    frame: Option<GraphFrame>,
    coords: Option<GraphCoordinates>,
    scales: AxisScales,
    maps: Option<[AxisMap; 2]>,
    generation: u64,
}

impl CoordinateMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uncalibrated mapper that will use `scales` once inputs arrive.
    pub fn with_scales(scales: AxisScales) -> Self {
        Self {
            scales,
            ..Self::default()
        }
    }

    /// Build a fully calibrated mapper in one step.
    pub fn calibrated(
        frame: GraphFrame,
        coords: GraphCoordinates,
        scales: AxisScales,
    ) -> Result<Self, MappingError> {
        let mut mapper = Self {
            frame: Some(frame),
            coords: Some(coords),
            scales,
            ..Self::default()
        };
        mapper.recompute_mapping()?;
        Ok(mapper)
    }

    pub fn frame(&self) -> Option<&GraphFrame> {
        self.frame.as_ref()
    }

    pub fn coordinates(&self) -> Option<&GraphCoordinates> {
        self.coords.as_ref()
    }

    pub fn scales(&self) -> AxisScales {
        self.scales
    }

    /// Current per-axis maps, `None` while inputs are incomplete or invalid.
    pub fn axis_maps(&self) -> Option<&[AxisMap; 2]> {
        self.maps.as_ref()
    }

    pub fn is_calibrated(&self) -> bool {
        self.maps.is_some()
    }

    /// Number of successful coefficient recomputations so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_frame(&mut self, frame: GraphFrame) -> Result<(), MappingError> {
        self.frame = Some(frame);
        self.refresh()
    }

    pub fn set_graph_coordinates(&mut self, coords: GraphCoordinates) -> Result<(), MappingError> {
        self.coords = Some(coords);
        self.refresh()
    }

    pub fn set_scales(&mut self, scales: AxisScales) -> Result<(), MappingError> {
        self.scales = scales;
        self.refresh()
    }

    pub fn set_lin_log(&mut self, x_is_lin: bool, y_is_lin: bool) -> Result<(), MappingError> {
        self.set_scales(AxisScales::from_lin_flags(x_is_lin, y_is_lin))
    }

    /// Recompute both axis maps from the current inputs.
    ///
    /// On failure the previous maps are discarded, so later conversions
    /// report [`MappingError::NotCalibrated`] instead of using stale values.
    pub fn recompute_mapping(&mut self) -> Result<(), MappingError> {
        self.maps = None;
        let (Some(frame), Some(coords)) = (&self.frame, &self.coords) else {
            return Err(MappingError::NotCalibrated);
        };
        let x = AxisMap::from_references(
            AxisKind::X,
            self.scales.x,
            frame.x_extent(),
            coords.pair(AxisKind::X),
        )?;
        let y = AxisMap::from_references(
            AxisKind::Y,
            self.scales.y,
            frame.y_extent(),
            coords.pair(AxisKind::Y),
        )?;
        tracing::debug!(
            "pixel mapping: x = {:.6e}*px + {:.6e} ({:?}), y = {:.6e}*py + {:.6e} ({:?})",
            x.slope,
            x.intercept,
            x.scale,
            y.slope,
            y.intercept,
            y.scale,
        );
        self.maps = Some([x, y]);
        self.generation += 1;
        Ok(())
    }

    /// Recompute if both frame and coordinates are present.
    fn refresh(&mut self) -> Result<(), MappingError> {
        if self.frame.is_some() && self.coords.is_some() {
            self.recompute_mapping()
        } else {
            self.maps = None;
            Ok(())
        }
    }

    /// Convert an (already derotated) image pixel into graph coordinates.
    pub fn pixel_to_graph(&self, p: PixelPoint) -> Result<[f64; 2], MappingError> {
        self.map_pixel(p.to_f64())
    }

    /// Sub-pixel variant of [`Self::pixel_to_graph`].
    pub fn map_pixel(&self, p: [f64; 2]) -> Result<[f64; 2], MappingError> {
        let [x, y] = self.maps.as_ref().ok_or(MappingError::NotCalibrated)?;
        Ok([x.to_graph(p[0]), y.to_graph(p[1])])
    }

    /// Convert graph coordinates back into derotated pixel coordinates.
    pub fn graph_to_pixel(&self, g: [f64; 2]) -> Result<[f64; 2], MappingError> {
        let [x, y] = self.maps.as_ref().ok_or(MappingError::NotCalibrated)?;
        Ok([x.to_pixel(g[0]), y.to_pixel(g[1])])
    }

    /// Map a batch of pixels into curve samples, preserving order.
    pub fn samples_from_pixels(&self, pixels: &[PixelPoint]) -> Result<Vec<CurveSample>, MappingError> {
        let [x, y] = self.maps.as_ref().ok_or(MappingError::NotCalibrated)?;
        Ok(pixels
            .iter()
            .map(|p| CurveSample::new(x.to_graph(p.x as f64), y.to_graph(p.y as f64)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::calibrate_axes;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn px(x: i32, y: i32) -> PixelPoint {
        PixelPoint::new(x, y)
    }

    fn square_frame() -> GraphFrame {
        calibrate_axes([px(10, 100), px(110, 100)], [px(10, 100), px(10, 0)]).unwrap()
    }

    #[test]
    fn axis_aligned_scenario_maps_center() {
        let mapper = CoordinateMapper::calibrated(
            square_frame(),
            GraphCoordinates::new(0.0, 10.0, 0.0, 10.0),
            AxisScales::default(),
        )
        .unwrap();
        let [a, b] = mapper.pixel_to_graph(px(60, 50)).unwrap();
        assert_abs_diff_eq!(a, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn axis_maps_expose_slope_and_intercept() {
        let pending = CoordinateMapper::with_scales(AxisScales::from_lin_flags(true, false));
        assert!(pending.axis_maps().is_none());
        assert!(pending.scales().y.is_log());

        let mapper = CoordinateMapper::calibrated(
            square_frame(),
            GraphCoordinates::new(0.0, 10.0, 0.0, 10.0),
            AxisScales::default(),
        )
        .unwrap();
        let [x, y] = mapper.axis_maps().unwrap();
        assert_abs_diff_eq!(x.slope, 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(x.intercept, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y.slope, -0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(y.intercept, 10.0, epsilon = 1e-12);
        assert_eq!(x.scale, AxisScale::Linear);
    }

    #[test]
    fn references_map_back_to_their_values_linear_and_log() {
        let frame =
            calibrate_axes([px(50, 200), px(150, 210)], [px(50, 200), px(60, 100)]).unwrap();
        let coords = GraphCoordinates::new(1.0, 1000.0, 0.5, 20.0);
        let pts = frame.projected_points();

        for scales in [
            AxisScales::from_lin_flags(true, true),
            AxisScales::from_lin_flags(false, false),
            AxisScales::from_lin_flags(true, false),
        ] {
            let mapper = CoordinateMapper::calibrated(frame.clone(), coords, scales).unwrap();
            assert_relative_eq!(mapper.map_pixel(pts[0]).unwrap()[0], 1.0, max_relative = 1e-9);
            assert_relative_eq!(mapper.map_pixel(pts[1]).unwrap()[0], 1000.0, max_relative = 1e-9);
            assert_relative_eq!(mapper.map_pixel(pts[2]).unwrap()[1], 0.5, max_relative = 1e-9);
            assert_relative_eq!(mapper.map_pixel(pts[3]).unwrap()[1], 20.0, max_relative = 1e-9);
        }
    }

    #[test]
    fn log_axis_midpoint_is_geometric_mean() {
        let mapper = CoordinateMapper::calibrated(
            square_frame(),
            GraphCoordinates::new(1.0, 100.0, 0.0, 10.0),
            AxisScales::from_lin_flags(false, true),
        )
        .unwrap();
        let [a, _] = mapper.pixel_to_graph(px(60, 50)).unwrap();
        assert_relative_eq!(a, 10.0, max_relative = 1e-12);
    }

    #[test]
    fn graph_to_pixel_inverts_pixel_to_graph() {
        let mapper = CoordinateMapper::calibrated(
            square_frame(),
            GraphCoordinates::new(1.0, 100.0, -5.0, 5.0),
            AxisScales::from_lin_flags(false, true),
        )
        .unwrap();
        let g = mapper.pixel_to_graph(px(37, 81)).unwrap();
        let p = mapper.graph_to_pixel(g).unwrap();
        assert_abs_diff_eq!(p[0], 37.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p[1], 81.0, epsilon = 1e-9);
    }

    #[test]
    fn conversion_before_calibration_is_an_error() {
        let mut mapper = CoordinateMapper::new();
        assert_eq!(
            mapper.pixel_to_graph(px(1, 1)),
            Err(MappingError::NotCalibrated)
        );
        mapper.set_frame(square_frame()).unwrap();
        assert!(!mapper.is_calibrated());
        mapper
            .set_graph_coordinates(GraphCoordinates::new(0.0, 10.0, 0.0, 10.0))
            .unwrap();
        assert!(mapper.is_calibrated());
    }

    #[test]
    fn lin_log_toggle_recomputes_exactly_once() {
        let mut mapper = CoordinateMapper::calibrated(
            square_frame(),
            GraphCoordinates::new(1.0, 10.0, 1.0, 10.0),
            AxisScales::default(),
        )
        .unwrap();
        let before = mapper.generation();
        let lin = mapper.pixel_to_graph(px(60, 50)).unwrap();

        mapper.set_lin_log(false, true).unwrap();
        assert_eq!(mapper.generation(), before + 1);

        let log = mapper.pixel_to_graph(px(60, 50)).unwrap();
        assert_relative_eq!(lin[0], 5.5, max_relative = 1e-12);
        assert_relative_eq!(log[0], 10f64.sqrt(), max_relative = 1e-12);
        assert_eq!(lin[1], log[1]);
    }

    #[test]
    fn log_domain_violation_clears_the_mapping() {
        let mut mapper = CoordinateMapper::calibrated(
            square_frame(),
            GraphCoordinates::new(0.0, 10.0, 0.0, 10.0),
            AxisScales::default(),
        )
        .unwrap();
        let err = mapper.set_lin_log(false, true).unwrap_err();
        assert_eq!(
            err,
            MappingError::LogDomain {
                axis: AxisKind::X,
                value: 0.0
            }
        );
        assert_eq!(
            mapper.pixel_to_graph(px(60, 50)),
            Err(MappingError::NotCalibrated)
        );
    }

    #[test]
    fn batch_mapping_preserves_order() {
        let mapper = CoordinateMapper::calibrated(
            square_frame(),
            GraphCoordinates::new(0.0, 10.0, 0.0, 10.0),
            AxisScales::default(),
        )
        .unwrap();
        let samples = mapper
            .samples_from_pixels(&[px(10, 100), px(110, 0), px(60, 50)])
            .unwrap();
        assert_eq!(samples.len(), 3);
        assert_abs_diff_eq!(samples[0].x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(samples[1].y, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(samples[2].x, 5.0, epsilon = 1e-12);
    }
}
