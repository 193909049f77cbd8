//! De-skewing a source raster with the frame's rotation transform.

use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{warp, Interpolation, Projection};

use crate::frame::GraphFrame;

/// Fill colour for pixels with no source pre-image.
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Rotate `image` by the frame's skew angle about its origin so that both
/// axes become horizontal/vertical. Output has the input's dimensions.
///
/// Returns `None` if the rotation transform is not invertible (which only
/// happens for non-finite frames).
pub fn derotate(image: &RgbImage, frame: &GraphFrame) -> Option<RgbImage> {
    let projection = rotation_projection(frame)?;
    let out = warp(image, &projection, Interpolation::Bilinear, BACKGROUND);
    tracing::debug!(
        "derotated {}x{} image by {:.4} deg",
        out.width(),
        out.height(),
        frame.angle().to_degrees()
    );
    Some(out)
}

fn rotation_projection(frame: &GraphFrame) -> Option<Projection> {
    let m = frame.rotation_matrix();
    Projection::from_matrix([
        m[(0, 0)] as f32,
        m[(0, 1)] as f32,
        m[(0, 2)] as f32,
        m[(1, 0)] as f32,
        m[(1, 1)] as f32,
        m[(1, 2)] as f32,
        0.0,
        0.0,
        1.0,
    ])
}
