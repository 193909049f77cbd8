//! Axis calibration from four clicked pixel points.

mod graph_frame;
mod segment;
mod types;

pub use graph_frame::{calibrate_axes, GraphFrame};
pub use segment::AxisSegment;
pub use types::{AxisKind, CalibrationError, PixelPoint};
