//! Skew angle, origin and derotated calibration extents from four clicks.

use nalgebra::{Matrix2x3, Vector3};
use serde::Serialize;

use super::segment::AxisSegment;
use super::types::{AxisKind, CalibrationError, PixelPoint};

/// Axis frame measured from one X and one Y calibration segment.
///
/// All derived quantities are computed once in [`GraphFrame::new`]; the
/// frame is immutable afterwards and is rebuilt whenever the user re-picks
/// axis points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphFrame {
    x_axis: AxisSegment,
    y_axis: AxisSegment,
    /// Mean skew angle in radians (positive = image rotated clockwise).
    angle: f64,
    /// Intersection of the two axis lines, in pixels.
    origin: [f64; 2],
    /// X calibration points projected onto the horizontal through the origin.
    x_extent: [f64; 2],
    /// Y calibration points projected onto the vertical through the origin.
    y_extent: [f64; 2],
}

/// Build a frame from the X-axis and Y-axis calibration point pairs.
pub fn calibrate_axes(
    x_pts: [PixelPoint; 2],
    y_pts: [PixelPoint; 2],
) -> Result<GraphFrame, CalibrationError> {
    GraphFrame::new(
        AxisSegment::new(AxisKind::X, x_pts[0], x_pts[1]),
        AxisSegment::new(AxisKind::Y, y_pts[0], y_pts[1]),
    )
}

impl GraphFrame {
    pub fn new(x_axis: AxisSegment, y_axis: AxisSegment) -> Result<Self, CalibrationError> {
        debug_assert_eq!(x_axis.kind, AxisKind::X);
        debug_assert_eq!(y_axis.kind, AxisKind::Y);
        for seg in [&x_axis, &y_axis] {
            if seg.is_zero_length() {
                return Err(CalibrationError::ZeroLengthAxis { axis: seg.kind });
            }
        }

        let angle = (x_axis.angle() + y_axis.angle()) / 2.0;
        if !angle.is_finite() {
            return Err(CalibrationError::NonFinite { what: "angle" });
        }

        let origin = intersect(&x_axis, &y_axis)?;
        let [x0, y0] = origin;
        let cos = angle.cos();

        let x_extent = [
            x0 + (x_axis.p1.x as f64 - x0) / cos,
            x0 + (x_axis.p2.x as f64 - x0) / cos,
        ];
        let y_extent = [
            y0 + (y_axis.p1.y as f64 - y0) / cos,
            y0 + (y_axis.p2.y as f64 - y0) / cos,
        ];
        if !x_extent.iter().chain(&y_extent).all(|v| v.is_finite()) {
            return Err(CalibrationError::NonFinite { what: "axis extent" });
        }

        let frame = Self {
            x_axis,
            y_axis,
            angle,
            origin,
            x_extent,
            y_extent,
        };
        tracing::debug!(
            "graph frame: angle={:.5} rad, origin=({:.2}, {:.2}), x=[{:.2}, {:.2}], y=[{:.2}, {:.2}]",
            frame.angle,
            x0,
            y0,
            frame.x_extent[0],
            frame.x_extent[1],
            frame.y_extent[0],
            frame.y_extent[1],
        );
        Ok(frame)
    }

    pub fn x_axis(&self) -> &AxisSegment {
        &self.x_axis
    }

    pub fn y_axis(&self) -> &AxisSegment {
        &self.y_axis
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn origin(&self) -> [f64; 2] {
        self.origin
    }

    /// Derotated x-pixel positions of X1 and X2 (both at the origin's y).
    pub fn x_extent(&self) -> [f64; 2] {
        self.x_extent
    }

    /// Derotated y-pixel positions of Y1 and Y2 (both at the origin's x).
    pub fn y_extent(&self) -> [f64; 2] {
        self.y_extent
    }

    /// Derotated calibration points in X1, X2, Y1, Y2 order.
    pub fn projected_points(&self) -> [[f64; 2]; 4] {
        let [x0, y0] = self.origin;
        [
            [self.x_extent[0], y0],
            [self.x_extent[1], y0],
            [x0, self.y_extent[0]],
            [x0, self.y_extent[1]],
        ]
    }

    /// Absolute difference between the X- and Y-derived skew angles.
    ///
    /// Large values mean the drawn axes are not perpendicular and the
    /// averaged angle is a compromise between them.
    pub fn skew_disagreement(&self) -> f64 {
        (self.x_axis.angle() - self.y_axis.angle()).abs()
    }

    /// 2x3 affine matrix rotating the image by `angle` about `origin`.
    ///
    /// Maps source pixels to derotated pixels:
    /// `[[c, s, (1-c)*x0 - s*y0], [-s, c, s*x0 + (1-c)*y0]]`.
    pub fn rotation_matrix(&self) -> Matrix2x3<f64> {
        let (s, c) = self.angle.sin_cos();
        let [x0, y0] = self.origin;
        Matrix2x3::new(
            c,
            s,
            (1.0 - c) * x0 - s * y0,
            -s,
            c,
            s * x0 + (1.0 - c) * y0,
        )
    }

    /// Apply [`Self::rotation_matrix`] to a single source pixel position.
    pub fn derotate_point(&self, p: [f64; 2]) -> [f64; 2] {
        let v = self.rotation_matrix() * Vector3::new(p[0], p[1], 1.0);
        [v[0], v[1]]
    }
}

/// Intersection of the two axis lines.
fn intersect(x_axis: &AxisSegment, y_axis: &AxisSegment) -> Result<[f64; 2], CalibrationError> {
    let sx = x_axis.slope();
    let [xx, xy] = x_axis.p1.to_f64();

    let x0 = if y_axis.is_vertical() {
        if x_axis.is_vertical() {
            return Err(CalibrationError::ParallelAxes);
        }
        y_axis.p2.x as f64
    } else {
        let sy = y_axis.slope();
        if sy == sx {
            return Err(CalibrationError::ParallelAxes);
        }
        let [yx, yy] = y_axis.p1.to_f64();
        (sy * yx - sx * xx + xy - yy) / (sy - sx)
    };
    let y0 = sx * (x0 - xx) + xy;

    if !x0.is_finite() || !y0.is_finite() {
        return Err(CalibrationError::NonFinite { what: "origin" });
    }
    Ok([x0, y0])
}
