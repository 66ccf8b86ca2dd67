//! Synthetic masks and samples shared by unit tests.

use crate::lane::FeatureImage;
use image::{GrayImage, Luma};

pub(crate) fn blank_mask(width: u32, height: u32) -> GrayImage {
    GrayImage::new(width, height)
}

/// Paint column `x` over rows `[y_from, y_to)`.
pub(crate) fn draw_vertical_line(mask: &mut GrayImage, x: u32, y_from: u32, y_to: u32) {
    for y in y_from..y_to.min(mask.height()) {
        mask.put_pixel(x, y, Luma([255]));
    }
}

/// Paint a band `[x - half, x + half]` on every row.
pub(crate) fn draw_band(mask: &mut GrayImage, x: u32, half: u32) {
    for y in 0..mask.height() {
        for dx in x.saturating_sub(half)..=(x + half).min(mask.width() - 1) {
            mask.put_pixel(dx, y, Luma([255]));
        }
    }
}

/// 1280x720 mask with solid vertical lanes at the given columns.
pub(crate) fn two_lane_mask(left_x: u32, right_x: u32) -> FeatureImage {
    let mut mask = blank_mask(1280, 720);
    draw_band(&mut mask, left_x, 2);
    draw_band(&mut mask, right_x, 2);
    FeatureImage::new(mask).unwrap()
}

/// Exact samples of `x = a·y² + b·y + c` for integer `y` in `ys`.
pub(crate) fn sample_quadratic(
    a: f64,
    b: f64,
    c: f64,
    ys: impl Iterator<Item = u32>,
) -> (Vec<f64>, Vec<f64>) {
    ys.map(|y| {
        let y = f64::from(y);
        (a * y * y + b * y + c, y)
    })
    .unzip()
}
