//! Curve isolation filters and contour outlining.
//!
//! Each [`FilterMode`] turns a grayscale raster into a binary image; the
//! binary image is then reduced to the outline of its connected regions,
//! which forms the contour mask the user paints over.

use image::{GrayImage, Luma};
use imageproc::contours::find_contours;
use imageproc::contrast::otsu_level;
use imageproc::edges::canny;
use imageproc::filter::{box_filter, gaussian_blur_f32, median_filter};
use imageproc::map::{map_colors, map_colors2};
use serde::{Deserialize, Serialize};

const ON: Luma<u8> = Luma([255]);
const OFF: Luma<u8> = Luma([0]);

/// Radius of the median pre-blur (5x5 window).
const MEDIAN_RADIUS: u32 = 2;
/// Radius of the adaptive neighbourhood (11x11 window).
const ADAPTIVE_RADIUS: u32 = 5;
/// Offset subtracted from the local mean in adaptive thresholding.
const ADAPTIVE_OFFSET: i16 = 2;
/// Gaussian sigma equivalent to an 11x11 kernel.
const ADAPTIVE_SIGMA: f32 = 2.0;
/// Gaussian sigma equivalent to a 5x5 kernel.
const PRE_BLUR_SIGMA: f32 = 1.1;

/// Binarization applied before contour extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FilterMode {
    /// Use the grayscale image as is (non-zero pixels are foreground).
    None,
    /// Canny edge detector with hysteresis thresholds.
    Canny { low: f32, high: f32 },
    /// Median blur, then `pixel > level`.
    GlobalThreshold { level: u8 },
    /// Median blur, then `pixel > local_mean - 2` over an 11x11 box.
    AdaptiveMean,
    /// Median blur, then `pixel > gaussian_mean - 2` with an 11x11 kernel.
    AdaptiveGaussian,
    /// Global threshold at the Otsu level.
    Otsu,
    /// Gaussian blur, then Otsu.
    OtsuGaussian,
}

impl Default for FilterMode {
    fn default() -> Self {
        Self::GlobalThreshold { level: 127 }
    }
}

/// Apply a filter mode, producing a 0/255 image.
pub fn apply_filter(gray: &GrayImage, mode: FilterMode) -> GrayImage {
    match mode {
        FilterMode::None => binarize(gray, 0),
        FilterMode::Canny { low, high } => canny(gray, low, high),
        FilterMode::GlobalThreshold { level } => {
            binarize(&median_filter(gray, MEDIAN_RADIUS, MEDIAN_RADIUS), level)
        }
        FilterMode::AdaptiveMean => {
            let blurred = median_filter(gray, MEDIAN_RADIUS, MEDIAN_RADIUS);
            let mean = box_filter(&blurred, ADAPTIVE_RADIUS, ADAPTIVE_RADIUS);
            above_local(&blurred, &mean)
        }
        FilterMode::AdaptiveGaussian => {
            let blurred = median_filter(gray, MEDIAN_RADIUS, MEDIAN_RADIUS);
            let mean = gaussian_blur_f32(&blurred, ADAPTIVE_SIGMA);
            above_local(&blurred, &mean)
        }
        FilterMode::Otsu => binarize(gray, otsu_level(gray)),
        FilterMode::OtsuGaussian => {
            let blurred = gaussian_blur_f32(gray, PRE_BLUR_SIGMA);
            let level = otsu_level(&blurred);
            binarize(&blurred, level)
        }
    }
}

/// Outline every connected foreground region of a binary image.
///
/// Output pixels are 255 on a contour and 0 elsewhere.
pub fn contour_mask(binary: &GrayImage) -> GrayImage {
    let (w, h) = binary.dimensions();
    let mut out = GrayImage::new(w, h);
    let contours = find_contours::<u32>(binary);
    for contour in &contours {
        for p in &contour.points {
            out.put_pixel(p.x, p.y, ON);
        }
    }
    tracing::debug!("{} contours outlined", contours.len());
    out
}

/// [`apply_filter`] followed by [`contour_mask`].
pub fn filtered_contours(gray: &GrayImage, mode: FilterMode) -> GrayImage {
    contour_mask(&apply_filter(gray, mode))
}

fn binarize(gray: &GrayImage, level: u8) -> GrayImage {
    map_colors(gray, |p| if p[0] > level { ON } else { OFF })
}

fn above_local(gray: &GrayImage, local: &GrayImage) -> GrayImage {
    map_colors2(gray, local, |p, m| {
        if p[0] as i16 > m[0] as i16 - ADAPTIVE_OFFSET {
            ON
        } else {
            OFF
        }
    })
}
