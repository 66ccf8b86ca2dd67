use super::types::FeatureImage;
use ndarray::{s, Array1, ArrayView2, Axis};

/// Initial x position of each lane side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seeds {
    pub left: u32,
    pub right: u32,
}

/// Column sums over the lower half of the mask (rows `[H/2, H)`).
pub fn histogram(image: &FeatureImage) -> Array1<u64> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    // GrayImage is a packed row-major buffer, so the shape always matches
    let view = match ArrayView2::from_shape((height, width), image.as_gray().as_raw().as_slice())
    {
        Ok(view) => view,
        Err(_) => return Array1::zeros(width),
    };
    view.slice(s![height / 2.., ..])
        .mapv(u64::from)
        .sum_axis(Axis(0))
}

/// Histogram peak of each half. Ties resolve to the lowest column.
pub fn seeds_from_histogram(histogram: &Array1<u64>) -> Seeds {
    let midpoint = histogram.len() / 2;
    let left = argmax(histogram.slice(s![..midpoint]).iter());
    let right = argmax(histogram.slice(s![midpoint..]).iter()) + midpoint;
    Seeds {
        left: left as u32,
        right: right as u32,
    }
}

/// Histogram-seeded starting point of the sliding-window search.
pub fn scan(image: &FeatureImage) -> Seeds {
    let _span = tracing::debug_span!("feature_scan").entered();
    let seeds = seeds_from_histogram(&histogram(image));
    tracing::debug!("Seeds: left={}, right={}", seeds.left, seeds.right);
    seeds
}

fn argmax<'a>(values: impl Iterator<Item = &'a u64>) -> usize {
    let mut best = (0usize, 0u64);
    for (i, &v) in values.enumerate() {
        if i == 0 || v > best.1 {
            best = (i, v);
        }
    }
    best.0
}
