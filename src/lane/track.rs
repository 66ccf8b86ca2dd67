use super::types::{FrameResult, PixelSet, PolynomialFit, Side, SideResult};
use crate::config::LaneConfig;
use crate::error::ConfigError;
use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// FIFO that evicts its oldest entry once `capacity` is exceeded.
#[derive(Debug, Clone)]
struct History<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.get()),
            capacity: capacity.get(),
        }
    }

    fn push(&mut self, item: T) {
        self.items.push_back(item);
        if self.items.len() > self.capacity {
            self.items.pop_front();
        }
    }

    fn last(&self) -> Option<&T> {
        self.items.back()
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}

/// Bounded history of one lane side across frames.
#[derive(Debug, Clone)]
pub struct LaneTrack {
    poly_fit: History<PolynomialFit>,
    lane_ind: History<PixelSet>,
    lane_start: History<u32>,
}

impl LaneTrack {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            poly_fit: History::new(capacity),
            lane_ind: History::new(capacity),
            lane_start: History::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.poly_fit.capacity
    }

    /// Number of retained fits.
    pub fn len(&self) -> usize {
        self.poly_fit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poly_fit.len() == 0
    }

    pub fn add_poly_fit(&mut self, fit: PolynomialFit) {
        self.poly_fit.push(fit);
    }

    pub fn add_lane_ind(&mut self, pixels: PixelSet) {
        self.lane_ind.push(pixels);
    }

    pub fn add_lane_start(&mut self, seed: u32) {
        self.lane_start.push(seed);
    }

    pub fn get_last_poly_fit(&self) -> Option<&PolynomialFit> {
        self.poly_fit.last()
    }

    /// Mean of the retained fits; the smoothed geometry used for rendering.
    pub fn get_average_poly_fit(&self) -> Option<PolynomialFit> {
        PolynomialFit::mean(self.poly_fit.iter())
    }

    pub fn get_last_lane_ind(&self) -> Option<&PixelSet> {
        self.lane_ind.last()
    }

    pub fn get_last_lane_start(&self) -> Option<u32> {
        self.lane_start.last().copied()
    }

    pub fn get_average_lane_start(&self) -> Option<f64> {
        let n = self.lane_start.len();
        (n > 0).then(|| self.lane_start.iter().map(|&s| f64::from(s)).sum::<f64>() / n as f64)
    }

    pub fn reset(&mut self) {
        self.poly_fit.clear();
        self.lane_ind.clear();
        self.lane_start.clear();
    }

    /// Append one successfully fitted frame. Failed sides are skipped.
    fn record(&mut self, result: &SideResult) -> bool {
        let Some(fit) = result.fit_px() else {
            return false;
        };
        self.add_poly_fit(*fit);
        self.add_lane_ind(result.pixels.clone());
        self.add_lane_start(result.seed);
        true
    }
}

/// Per-session tracking state for both lane sides.
///
/// Owned by the caller. Frames must be recorded in time order; two contexts
/// are fully independent.
#[derive(Debug, Clone)]
pub struct TrackingContext {
    left: LaneTrack,
    right: LaneTrack,
}

impl TrackingContext {
    pub fn new(history_capacity: NonZeroUsize) -> Self {
        Self {
            left: LaneTrack::new(history_capacity),
            right: LaneTrack::new(history_capacity),
        }
    }

    pub fn from_config(config: &LaneConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.history_capacity()?))
    }

    pub fn history_capacity(&self) -> usize {
        self.left.capacity()
    }

    pub fn track(&self, side: Side) -> &LaneTrack {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn left(&self) -> &LaneTrack {
        &self.left
    }

    pub fn right(&self) -> &LaneTrack {
        &self.right
    }

    /// Smoothed fit for `side`, `None` if the side never produced one.
    pub fn smoothed_fit(&self, side: Side) -> Option<PolynomialFit> {
        self.track(side).get_average_poly_fit()
    }

    /// Append this frame's successful sides.
    pub fn record(&mut self, result: &FrameResult) {
        for (track, side) in [(&mut self.left, &result.left), (&mut self.right, &result.right)] {
            if !track.record(side) {
                tracing::debug!(
                    "Skipping {} track update, keeping {} prior fits",
                    side.side,
                    track.len()
                );
            }
        }
    }

    pub fn reset(&mut self) {
        tracing::info!("Resetting lane tracks");
        self.left.reset();
        self.right.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cap(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn capacity_one_is_unsmoothed() {
        let mut track = LaneTrack::new(cap(1));
        for i in 0..4 {
            let fit = PolynomialFit::new(1e-4 * f64::from(i), 0.5, 300.0 + f64::from(i));
            track.add_poly_fit(fit);
            assert_eq!(track.get_average_poly_fit(), track.get_last_poly_fit().copied());
            assert_eq!(track.get_average_poly_fit(), Some(fit));
        }
        assert_eq!(track.len(), 1);
    }

    #[test]
    fn uniform_history_averages_to_itself() {
        let mut track = LaneTrack::new(cap(5));
        let fit = PolynomialFit::new(2e-4, -0.1, 640.0);
        for _ in 0..5 {
            track.add_poly_fit(fit);
        }
        let avg = track.get_average_poly_fit().unwrap();
        assert_relative_eq!(avg.a, fit.a);
        assert_relative_eq!(avg.b, fit.b);
        assert_relative_eq!(avg.c, fit.c);
    }

    #[test]
    fn sixth_fit_evicts_first() {
        let mut track = LaneTrack::new(cap(5));
        for c in [100.0, 10.0, 10.0, 10.0, 10.0, 20.0] {
            track.add_poly_fit(PolynomialFit::new(0.0, 0.0, c));
        }
        assert_eq!(track.len(), 5);
        assert_relative_eq!(track.get_average_poly_fit().unwrap().c, 12.0);
        assert_relative_eq!(track.get_last_poly_fit().unwrap().c, 20.0);
    }

    #[test]
    fn empty_track_has_no_result() {
        let track = LaneTrack::new(cap(5));
        assert!(track.is_empty());
        assert!(track.get_average_poly_fit().is_none());
        assert!(track.get_last_poly_fit().is_none());
        assert!(track.get_last_lane_ind().is_none());
        assert!(track.get_average_lane_start().is_none());
    }

    #[test]
    fn lane_start_history() {
        let mut track = LaneTrack::new(cap(2));
        track.add_lane_start(300);
        track.add_lane_start(310);
        track.add_lane_start(320);
        assert_eq!(track.get_last_lane_start(), Some(320));
        assert_relative_eq!(track.get_average_lane_start().unwrap(), 315.0);

        track.add_lane_ind(PixelSet::from(vec![(1, 2)]));
        assert_eq!(track.get_last_lane_ind().unwrap().points(), &[(1, 2)]);
        track.reset();
        assert!(track.get_last_lane_start().is_none());
    }

    #[test]
    fn context_rejects_zero_capacity() {
        let config = LaneConfig {
            history_capacity: 0,
            ..LaneConfig::default()
        };
        assert_eq!(
            TrackingContext::from_config(&config).unwrap_err(),
            ConfigError::ZeroHistory
        );
        let ctx = TrackingContext::from_config(&LaneConfig::default()).unwrap();
        assert_eq!(ctx.history_capacity(), 5);
    }
}
