//! Pixel-space primitives and calibration errors.

use serde::{Deserialize, Serialize};

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors raised while building a [`GraphFrame`](super::GraphFrame).
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Both calibration points of an axis are the same pixel.
    ZeroLengthAxis {
        /// Axis whose segment has zero length.
        axis: AxisKind,
    },
    /// The two axis lines never intersect, so no origin exists.
    ParallelAxes,
    /// A derived quantity came out infinite or NaN.
    NonFinite {
        /// Name of the offending quantity.
        what: &'static str,
    },
}

impl std::fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroLengthAxis { axis } => {
                write!(f, "{}-axis calibration points coincide", axis)
            }
            Self::ParallelAxes => write!(f, "x and y axes are parallel; no origin exists"),
            Self::NonFinite { what } => write!(f, "calibration produced a non-finite {}", what),
        }
    }
}

impl std::error::Error for CalibrationError {}

// ── Types ──────────────────────────────────────────────────────────────────

/// Integer pixel position in image space (x right, y down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position as floating-point `[x, y]`.
    pub fn to_f64(self) -> [f64; 2] {
        [self.x as f64, self.y as f64]
    }
}

impl From<(i32, i32)> for PixelPoint {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<[i32; 2]> for PixelPoint {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

/// Which graph axis a segment or value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    X,
    Y,
}

impl std::fmt::Display for AxisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}
