//! Brush selection over the contour mask and curve-pixel extraction.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use serde::{Deserialize, Serialize};

use crate::frame::PixelPoint;

const SELECTED: u8 = 255;
const ERASED: u8 = 1;

/// What a brush stroke does to the pixels it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushAction {
    Select,
    Erase,
}

/// One brush stamp, in derotated image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushStroke {
    pub x: i32,
    pub y: i32,
    pub radius: u32,
    pub action: BrushAction,
}

/// Painted selection layer, same size as the contour mask.
#[derive(Debug, Clone)]
pub struct BrushMask {
    mask: GrayImage,
}

impl BrushMask {
    /// New mask with nothing selected.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            mask: GrayImage::from_pixel(width, height, Luma([ERASED])),
        }
    }

    /// New mask with every pixel selected.
    pub fn select_all(width: u32, height: u32) -> Self {
        Self {
            mask: GrayImage::from_pixel(width, height, Luma([SELECTED])),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.mask.dimensions()
    }

    /// Stamp a filled disk of `radius` pixels at `(x, y)`.
    pub fn paint(&mut self, x: i32, y: i32, radius: u32, action: BrushAction) {
        let value = match action {
            BrushAction::Select => SELECTED,
            BrushAction::Erase => ERASED,
        };
        draw_filled_circle_mut(&mut self.mask, (x, y), radius as i32, Luma([value]));
    }

    pub fn apply(&mut self, stroke: &BrushStroke) {
        self.paint(stroke.x, stroke.y, stroke.radius, stroke.action);
    }

    pub fn is_selected(&self, x: u32, y: u32) -> bool {
        self.mask.get_pixel(x, y)[0] == SELECTED
    }

    pub fn selected_count(&self) -> usize {
        self.mask.pixels().filter(|p| p[0] == SELECTED).count()
    }
}

/// Every pixel that lies on a contour and is selected by the brush, in
/// row-major order.
///
/// Pixels outside the brush mask's bounds are never selected.
pub fn extract_curve_pixels(contours: &GrayImage, brush: &BrushMask) -> Vec<PixelPoint> {
    let (bw, bh) = brush.dimensions();
    let pixels: Vec<PixelPoint> = contours
        .enumerate_pixels()
        .filter(|&(x, y, p)| p[0] > 0 && x < bw && y < bh && brush.is_selected(x, y))
        .map(|(x, y, _)| PixelPoint::new(x as i32, y as i32))
        .collect();
    tracing::info!("{} curve pixels extracted", pixels.len());
    pixels
}

/// Draw small filled markers at sub-pixel positions (e.g. projected
/// calibration points or an evaluation curve mapped back to pixels).
pub fn draw_markers(image: &mut RgbImage, points: &[[f64; 2]], radius: i32, color: Rgb<u8>) {
    for p in points {
        if !p[0].is_finite() || !p[1].is_finite() {
            continue;
        }
        draw_filled_circle_mut(
            image,
            (p[0].round() as i32, p[1].round() as i32),
            radius,
            color,
        );
    }
}
