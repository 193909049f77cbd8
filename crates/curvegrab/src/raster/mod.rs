//! Raster-side helpers around the core transform: de-skewing the source
//! image, isolating curve outlines, and painting the pixel selection.

mod derotate;
mod extract;
mod filter;

pub use derotate::{derotate, BACKGROUND};
pub use extract::{draw_markers, extract_curve_pixels, BrushAction, BrushMask, BrushStroke};
pub use filter::{apply_filter, contour_mask, filtered_contours, FilterMode};
