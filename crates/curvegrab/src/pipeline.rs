//! One-shot digitization: derotate, filter, extract, map and fit.

use image::{imageops, RgbImage};
use serde::Serialize;

use crate::config::{CalibrationInput, SessionConfig};
use crate::fit::FitResult;
use crate::frame::{CalibrationError, GraphFrame, PixelPoint};
use crate::mapping::CurveSample;
use crate::raster::{derotate, extract_curve_pixels, filtered_contours, BrushMask, BrushStroke};
use crate::session::{Session, SessionError};

/// Everything produced by [`digitize`].
#[derive(Debug, Clone, Serialize)]
pub struct Digitization {
    /// Image dimensions [width, height].
    pub image_size: [u32; 2],
    pub frame: GraphFrame,
    /// `|x_angle - y_angle|` of the picked axes, radians.
    pub skew_disagreement: f64,
    /// Extracted curve pixels in derotated image coordinates.
    pub pixels: Vec<PixelPoint>,
    /// Graph-space samples, one per pixel.
    pub samples: Vec<CurveSample>,
    pub fit: FitResult,
    /// The derotated source image.
    #[serde(skip)]
    pub derotated: RgbImage,
}

/// Run the full pipeline on one image.
///
/// With no brush strokes every contour pixel is taken.
pub fn digitize(
    image: &RgbImage,
    calibration: &CalibrationInput,
    config: &SessionConfig,
    strokes: &[BrushStroke],
) -> Result<Digitization, SessionError> {
    let mut session = Session::with_fit_config(config.fit.clone());
    session.set_scales(config.scales)?;
    session.start();
    for p in calibration.axis_points() {
        session.pick_axis_point(p)?;
    }
    session.confirm_calibration(calibration.values)?;
    let frame = session
        .frame()
        .cloned()
        .ok_or(SessionError::Calibration(CalibrationError::NonFinite {
            what: "frame",
        }))?;

    let skew = frame.skew_disagreement();
    if skew > config.max_skew_disagreement_rad {
        tracing::warn!(
            "x and y axes disagree by {:.3} deg; calibration points may be imprecise",
            skew.to_degrees()
        );
    }

    let derotated = derotate(image, &frame).ok_or(SessionError::Calibration(
        CalibrationError::NonFinite { what: "rotation" },
    ))?;
    let gray = imageops::grayscale(&derotated);
    let contours = filtered_contours(&gray, config.filter);

    let (w, h) = contours.dimensions();
    let brush = if strokes.is_empty() {
        BrushMask::select_all(w, h)
    } else {
        let mut brush = BrushMask::new(w, h);
        for stroke in strokes {
            brush.apply(stroke);
        }
        brush
    };
    tracing::debug!("brush selects {} of {} pixels", brush.selected_count(), w * h);
    let pixels = extract_curve_pixels(&contours, &brush);

    session.begin_selection()?;
    let fit = session.add_pixels(&pixels)?.clone();
    tracing::info!(
        "digitized {} pixels with order {} fit (rms {:.3e})",
        pixels.len(),
        fit.order,
        fit.rms_residual
    );

    Ok(Digitization {
        image_size: [image.width(), image.height()],
        frame,
        skew_disagreement: skew,
        samples: session.samples().to_vec(),
        pixels,
        fit,
        derotated,
    })
}
