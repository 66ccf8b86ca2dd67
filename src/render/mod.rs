//! Lane overlay rendering and text annotation.

mod annotate;
mod overlay;

pub use annotate::{info_lines, Annotator};
pub use overlay::{
    blend, visualize, OverlayOptions, LANE_FILL, LEFT_PIXELS, RIGHT_PIXELS, WINDOW_OUTLINE,
};
