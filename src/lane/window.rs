use super::types::{PixelSet, Window};
use crate::config::SearchParams;

/// Windows and matched pixels collected for one side.
#[derive(Debug, Clone, Default)]
pub struct SearchTrace {
    pub windows: Vec<Window>,
    pub pixels: PixelSet,
}

/// Bottom-up sliding-window search for one lane side.
#[derive(Debug, Clone, Copy)]
pub struct WindowSearch {
    params: SearchParams,
}

impl WindowSearch {
    pub fn new(params: SearchParams) -> Self {
        Self { params }
    }

    /// Trace a lane upward from `seed`.
    ///
    /// `foreground` must be in row-major order, as returned by
    /// [`super::FeatureImage::nonzero`]. Always emits `n_windows` windows;
    /// band 0 is the bottom one.
    pub fn search(&self, foreground: &[(u32, u32)], height: u32, seed: u32) -> SearchTrace {
        let n_windows = self.params.n_windows;
        let half_width = i64::from(self.params.window_half_width);
        let height = i64::from(height);
        let window_height = height / n_windows.max(1) as i64;

        let mut trace = SearchTrace {
            windows: Vec::with_capacity(n_windows),
            pixels: PixelSet::new(),
        };
        let mut current = i64::from(seed);

        for band in 0..n_windows as i64 {
            let window = Window {
                x_low: current - half_width,
                y_low: height - (band + 1) * window_height,
                x_high: current + half_width,
                y_high: height - band * window_height,
            };
            trace.windows.push(window);

            let mut count = 0usize;
            let mut sum_x = 0i64;
            for &(x, y) in rows_in(foreground, window.y_low, window.y_high) {
                if window.contains(x, y) {
                    trace.pixels.push(x, y);
                    count += 1;
                    sum_x += i64::from(x);
                }
            }

            if count > self.params.min_pixel_to_recenter {
                current = sum_x / count as i64;
            }
        }

        trace
    }
}

/// Slice of row-major pixels whose row lies in `[y_low, y_high)`.
fn rows_in(foreground: &[(u32, u32)], y_low: i64, y_high: i64) -> &[(u32, u32)] {
    let start = foreground.partition_point(|&(_, y)| i64::from(y) < y_low);
    let end = foreground.partition_point(|&(_, y)| i64::from(y) < y_high);
    &foreground[start..end.max(start)]
}
