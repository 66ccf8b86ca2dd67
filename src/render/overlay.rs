use crate::lane::{FrameResult, PixelSet, PolynomialFit, Side, TrackingContext};
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;

pub const LANE_FILL: Rgb<u8> = Rgb([0, 255, 0]);
pub const LEFT_PIXELS: Rgb<u8> = Rgb([255, 0, 0]);
pub const RIGHT_PIXELS: Rgb<u8> = Rgb([0, 0, 255]);
pub const WINDOW_OUTLINE: Rgb<u8> = Rgb([255, 255, 0]);

/// What to paint in [`visualize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayOptions {
    /// Current-frame matched pixels, red for left and blue for right.
    pub draw_pixels: bool,
    /// Smoothed lane area between the two tracked fits.
    pub draw_lane_fill: bool,
    /// Search window outlines.
    pub draw_windows: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            draw_pixels: true,
            draw_lane_fill: true,
            draw_windows: false,
        }
    }
}

/// Render lane geometry in bird's-eye space.
///
/// `base` is drawn as grayscale underneath; `None` starts from black. The lane
/// fill uses the smoothed fits held by `ctx` and is skipped while either side
/// has no history.
pub fn visualize(
    result: &FrameResult,
    base: Option<&GrayImage>,
    ctx: &TrackingContext,
    options: OverlayOptions,
) -> RgbImage {
    let _span = tracing::debug_span!("render").entered();

    let mut canvas = match base {
        Some(gray) => RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
            let v = gray.get_pixel(x, y)[0];
            Rgb([v, v, v])
        }),
        None => RgbImage::new(result.width, result.height),
    };

    if options.draw_lane_fill {
        match (ctx.smoothed_fit(Side::Left), ctx.smoothed_fit(Side::Right)) {
            (Some(left), Some(right)) => {
                let polygon = lane_polygon(&left, &right, canvas.height());
                if polygon.len() >= 3 {
                    draw_polygon_mut(&mut canvas, &polygon, LANE_FILL);
                }
            }
            _ => tracing::warn!("No smoothed fit for both sides yet, skipping lane fill"),
        }
    }

    if options.draw_windows {
        for window in result.left.windows.iter().chain(&result.right.windows) {
            let (w, h) = (window.x_high - window.x_low, window.y_high - window.y_low);
            if w > 0 && h > 0 {
                let rect = Rect::at(window.x_low as i32, window.y_low as i32)
                    .of_size(w as u32, h as u32);
                draw_hollow_rect_mut(&mut canvas, rect, WINDOW_OUTLINE);
            }
        }
    }

    if options.draw_pixels {
        paint_pixels(&mut canvas, &result.left.pixels, LEFT_PIXELS);
        paint_pixels(&mut canvas, &result.right.pixels, RIGHT_PIXELS);
    }

    canvas
}

/// Closed outline: left curve top to bottom, then right curve bottom to top.
fn lane_polygon(left: &PolynomialFit, right: &PolynomialFit, height: u32) -> Vec<Point<i32>> {
    let to_point = |fit: &PolynomialFit, y: u32| {
        Point::new(fit.x_at(f64::from(y)).round() as i32, y as i32)
    };
    let mut polygon: Vec<Point<i32>> = (0..height)
        .map(|y| to_point(left, y))
        .chain((0..height).rev().map(|y| to_point(right, y)))
        .collect();
    polygon.dedup();
    // imageproc closes the outline itself and rejects an explicit closing point
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    polygon
}

fn paint_pixels(canvas: &mut RgbImage, pixels: &PixelSet, color: Rgb<u8>) {
    for &(x, y) in pixels.points() {
        if x < canvas.width() && y < canvas.height() {
            canvas.put_pixel(x, y, color);
        }
    }
}

/// `base + overlay * weight` per channel, saturating at 255.
///
/// Overlay pixels outside `base` are ignored.
pub fn blend(base: &RgbImage, overlay: &RgbImage, weight: f32) -> RgbImage {
    let mut out = base.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        if let Some(over) = overlay.get_pixel_checked(x, y) {
            for c in 0..3 {
                let v = f32::from(pixel[c]) + f32::from(over[c]) * weight;
                pixel[c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}
