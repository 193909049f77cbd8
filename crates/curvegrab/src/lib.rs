//! curvegrab — digitize plotted curves from raster images.
//!
//! The pipeline stages are:
//!
//! 1. **Frame** – four picked axis points give the skew angle, the origin
//!    and the derotated calibration extents.
//! 2. **Raster** – derotate the image, isolate the curve with a threshold
//!    or edge filter, outline it and let a brush pick curve pixels.
//! 3. **Mapping** – per-axis affine pixel-to-graph map with linear or
//!    log10 scales.
//! 4. **Fit** – least-squares polynomial over the graph-space samples,
//!    plus a resampled evaluation curve.
//! 5. **Export** – the fit as MATLAB, Python, Markdown, LaTeX or Excel text.
//!
//! # Public API
//! - [`Session`] drives the interactive workflow state by state.
//! - [`digitize`] runs the whole pipeline in one call.
//! - [`calibrate_axes`], [`CoordinateMapper`] and [`fit_curve`] are the
//!   underlying building blocks.

mod config;
mod export;
mod fit;
mod frame;
mod mapping;
mod pipeline;
mod raster;
mod session;

#[cfg(test)]
mod test_utils;

pub use config::{CalibrationInput, SessionConfig, DEFAULT_BRUSH_RADIUS_PX};
pub use export::{render, ExportFormat};
pub use fit::{
    evaluate, fit_curve, FitConfig, FitError, FitResult, Variable, DEFAULT_EVAL_SAMPLES, MAX_ORDER,
};
pub use frame::{calibrate_axes, AxisKind, AxisSegment, CalibrationError, GraphFrame, PixelPoint};
pub use mapping::{
    AxisMap, AxisScale, AxisScales, CoordinateMapper, CurveSample, GraphCoordinates, MappingError,
};
pub use pipeline::{digitize, Digitization};
pub use raster::{
    apply_filter, contour_mask, derotate, draw_markers, extract_curve_pixels,
    filtered_contours, BrushAction, BrushMask, BrushStroke, FilterMode, BACKGROUND,
};
pub use session::{Session, SessionError, SessionState};
