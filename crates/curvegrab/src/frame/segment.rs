//! A single user-clicked axis segment.

use serde::Serialize;

use super::types::{AxisKind, PixelPoint};

/// Two calibration points marking one graph axis.
///
/// Point order is significant: `p1 -> p2` is the direction in which the
/// graph value grows from the first to the second reference value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisSegment {
    pub kind: AxisKind,
    pub p1: PixelPoint,
    pub p2: PixelPoint,
}

impl AxisSegment {
    pub fn new(kind: AxisKind, p1: PixelPoint, p2: PixelPoint) -> Self {
        Self { kind, p1, p2 }
    }

    pub fn dx(&self) -> f64 {
        (self.p2.x - self.p1.x) as f64
    }

    pub fn dy(&self) -> f64 {
        (self.p2.y - self.p1.y) as f64
    }

    pub fn is_vertical(&self) -> bool {
        self.p2.x == self.p1.x
    }

    pub fn is_zero_length(&self) -> bool {
        self.p1 == self.p2
    }

    /// `dy / dx`, or `+inf` for a vertical segment.
    pub fn slope(&self) -> f64 {
        if self.is_vertical() {
            f64::INFINITY
        } else {
            self.dy() / self.dx()
        }
    }

    /// Skew angle of the segment relative to its canonical image direction.
    ///
    /// X segments measure `atan(slope)` against the horizontal; Y segments
    /// measure `atan(-1 / slope)` against the vertical. With these signs a
    /// rigid rotation of both axes yields the same angle from either one.
    pub fn angle(&self) -> f64 {
        let slope = self.slope();
        match self.kind {
            AxisKind::X => slope.atan(),
            AxisKind::Y => (-1.0 / slope).atan(),
        }
    }

    /// Same segment with the two points swapped.
    pub fn reversed(&self) -> Self {
        Self {
            kind: self.kind,
            p1: self.p2,
            p2: self.p1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn horizontal_x_axis_has_zero_angle() {
        let seg = AxisSegment::new(AxisKind::X, PixelPoint::new(10, 100), PixelPoint::new(110, 100));
        assert_eq!(seg.slope(), 0.0);
        assert_abs_diff_eq!(seg.angle(), 0.0);
    }

    #[test]
    fn vertical_y_axis_has_infinite_slope_and_zero_angle() {
        let seg = AxisSegment::new(AxisKind::Y, PixelPoint::new(10, 100), PixelPoint::new(10, 0));
        assert!(seg.is_vertical());
        assert_eq!(seg.slope(), f64::INFINITY);
        assert_abs_diff_eq!(seg.angle(), 0.0);
    }

    #[test]
    fn rigid_rotation_gives_matching_angles() {
        // Rotated by atan(0.1): x direction (10, 1), y direction (1, -10).
        let x = AxisSegment::new(AxisKind::X, PixelPoint::new(0, 0), PixelPoint::new(100, 10));
        let y = AxisSegment::new(AxisKind::Y, PixelPoint::new(0, 0), PixelPoint::new(10, -100));
        assert_abs_diff_eq!(x.angle(), 0.1f64.atan(), epsilon = 1e-12);
        assert_abs_diff_eq!(y.angle(), 0.1f64.atan(), epsilon = 1e-12);
    }

    #[test]
    fn mirrored_skew_negates_angle() {
        let down = AxisSegment::new(AxisKind::X, PixelPoint::new(0, 50), PixelPoint::new(100, 60));
        let up = AxisSegment::new(AxisKind::X, PixelPoint::new(0, 50), PixelPoint::new(100, 40));
        assert_abs_diff_eq!(down.angle(), -up.angle(), epsilon = 1e-12);
    }

    #[test]
    fn reversing_keeps_slope_but_flips_deltas() {
        let seg = AxisSegment::new(AxisKind::X, PixelPoint::new(3, 4), PixelPoint::new(53, 9));
        let rev = seg.reversed();
        assert_eq!(rev.dx(), -seg.dx());
        assert_eq!(rev.dy(), -seg.dy());
        assert_abs_diff_eq!(rev.slope(), seg.slope());
    }
}
