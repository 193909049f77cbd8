//! Synthetic plot rasters for unit tests.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;

const INK: Rgb<u8> = Rgb([0, 0, 0]);

/// Stamp a 3 px wide dark stroke from `a` to `b`.
pub(crate) fn stroke(img: &mut RgbImage, a: [f64; 2], b: [f64; 2], color: Rgb<u8>) {
    let len = ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)).sqrt();
    let steps = (len * 2.0).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = a[0] + (b[0] - a[0]) * t;
        let y = a[1] + (b[1] - a[1]) * t;
        draw_filled_circle_mut(img, (x.round() as i32, y.round() as i32), 1, color);
    }
}

/// White image with X and Y axes of length `len` starting at `origin`,
/// rotated clockwise by `angle` radians.
pub(crate) fn draw_axes_image(w: u32, h: u32, origin: [i32; 2], len: u32, angle: f64) -> RgbImage {
    let mut img = RgbImage::from_pixel(w, h, Rgb([255, 255, 255]));
    let (s, c) = angle.sin_cos();
    let o = [origin[0] as f64, origin[1] as f64];
    let l = len as f64;
    stroke(&mut img, o, [o[0] + l * c, o[1] + l * s], INK);
    stroke(&mut img, o, [o[0] + l * s, o[1] - l * c], INK);
    img
}

/// Axis-aligned plot of `f` drawn as a polyline, with the graph rectangle
/// `[0, x_max] x [0, y_max]` mapped onto pixels `[left, right] x [bottom, top]`.
pub(crate) fn draw_function_image(
    w: u32,
    h: u32,
    px_box: [f64; 4],
    graph_max: [f64; 2],
    f: impl Fn(f64) -> f64,
    color: Rgb<u8>,
) -> RgbImage {
    let [left, right, bottom, top] = px_box;
    let mut img = RgbImage::from_pixel(w, h, Rgb([255, 255, 255]));
    let to_px = |x: f64, y: f64| {
        [
            left + (right - left) * x / graph_max[0],
            bottom + (top - bottom) * y / graph_max[1],
        ]
    };
    let n = 200;
    let mut prev = to_px(0.0, f(0.0));
    for i in 1..=n {
        let x = graph_max[0] * i as f64 / n as f64;
        let cur = to_px(x, f(x));
        stroke(&mut img, prev, cur, color);
        prev = cur;
    }
    img
}
