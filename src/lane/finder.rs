use super::curvature::CurvatureEstimator;
use super::fit::CurveFitter;
use super::scan;
use super::track::TrackingContext;
use super::types::{FeatureImage, FrameResult, LaneGeometry, PixelSet, Side, SideResult};
use super::window::WindowSearch;
use crate::config::LaneConfig;
use crate::error::{ConfigError, LaneError};
use image::DynamicImage;
use std::num::NonZeroUsize;

/// Per-frame lane geometry estimator.
///
/// `find` holds no state and can run on independent images concurrently.
/// Temporal smoothing is opt-in through [`LaneFinder::track`].
#[derive(Debug, Clone)]
pub struct LaneFinder {
    config: LaneConfig,
    history_capacity: NonZeroUsize,
    window_search: WindowSearch,
    fitter: CurveFitter,
    estimator: CurvatureEstimator,
}

impl LaneFinder {
    pub fn new(config: LaneConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            history_capacity: config.history_capacity()?,
            window_search: WindowSearch::new(config.search),
            fitter: CurveFitter::new(config.calibration),
            estimator: CurvatureEstimator::new(config.calibration),
        })
    }

    pub fn config(&self) -> &LaneConfig {
        &self.config
    }

    /// Tracking context sized by this finder's `history_capacity`.
    pub fn new_context(&self) -> TrackingContext {
        TrackingContext::new(self.history_capacity)
    }

    /// Estimate both lane sides from a single mask.
    pub fn find(&self, image: &FeatureImage) -> FrameResult {
        let seeds = scan::scan(image);
        let foreground = image.nonzero();

        let left = self.trace_side(Side::Left, seeds.left, &foreground, image.height());
        let right = self.trace_side(Side::Right, seeds.right, &foreground, image.height());

        let offset_px = CurvatureEstimator::offset_px(seeds.left, seeds.right, image.width());
        FrameResult {
            width: image.width(),
            height: image.height(),
            left,
            right,
            offset_px,
            offset_m: self.estimator.offset_m(offset_px),
        }
    }

    /// Validate an arbitrary decoded image as a mask, then [`Self::find`].
    pub fn find_image(&self, image: &DynamicImage) -> Result<FrameResult, LaneError> {
        let mask = FeatureImage::try_from(image)?;
        Ok(self.find(&mask))
    }

    /// [`Self::find`], then append the successful sides to `ctx`.
    pub fn track(&self, image: &FeatureImage, ctx: &mut TrackingContext) -> FrameResult {
        let result = self.find(image);
        ctx.record(&result);
        result
    }

    fn trace_side(
        &self,
        side: Side,
        seed: u32,
        foreground: &[(u32, u32)],
        height: u32,
    ) -> SideResult {
        let trace = {
            let _span = tracing::debug_span!("window_search", side = side.as_str()).entered();
            self.window_search.search(foreground, height, seed)
        };

        let geometry = self.fit_side(side, &trace.pixels, height);
        if let Err(e) = &geometry {
            tracing::debug!("{}", e);
        }

        SideResult {
            side,
            seed,
            windows: trace.windows,
            pixels: trace.pixels,
            geometry,
        }
    }

    fn fit_side(
        &self,
        side: Side,
        pixels: &PixelSet,
        height: u32,
    ) -> Result<LaneGeometry, LaneError> {
        if pixels.is_empty() {
            return Err(LaneError::LaneNotFound { side });
        }
        let (fit_px, fit_world) = self
            .fitter
            .fit(pixels)
            .map_err(|reason| LaneError::DegenerateFit { side, reason })?;
        Ok(LaneGeometry {
            fit_px,
            fit_world,
            radius: self.estimator.radius(&fit_world, height),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FitError;
    use crate::lane::Radius;
    use crate::test_utils::{blank_mask, draw_band, draw_vertical_line, two_lane_mask};
    use approx::assert_abs_diff_eq;
    use image::{GrayImage, Luma, RgbImage};

    fn finder() -> LaneFinder {
        LaneFinder::new(LaneConfig::default()).unwrap()
    }

    #[test]
    fn finds_two_straight_lanes() {
        let result = finder().find(&two_lane_mask(300, 1000));
        assert_eq!(result.left.seed, 298);
        assert_eq!(result.right.seed, 998);
        assert_eq!(result.left.windows.len(), 9);
        assert_eq!(result.right.windows.len(), 9);

        let left = result.left.fit_px().unwrap();
        assert_abs_diff_eq!(left.x_at(0.0), 300.0, epsilon = 1e-6);
        assert_abs_diff_eq!(left.x_at(719.0), 300.0, epsilon = 1e-6);
        assert_eq!(result.left.radius(), Some(Radius::Straight));
        assert_abs_diff_eq!(result.right.fit_px().unwrap().c, 1000.0, epsilon = 1e-6);
    }

    #[test]
    fn missing_right_lane_does_not_affect_left() {
        let mut mask = blank_mask(1280, 720);
        draw_band(&mut mask, 300, 2);
        let image = FeatureImage::new(mask).unwrap();
        let result = finder().find(&image);

        assert!(matches!(
            result.right.geometry,
            Err(LaneError::LaneNotFound { side: Side::Right })
        ));
        assert_eq!(result.right.windows.len(), 9);
        assert!(result.right.pixels.is_empty());

        let reference = finder().find(&two_lane_mask(300, 1000));
        assert_eq!(result.left.geometry, reference.left.geometry);
        assert_eq!(result.left.pixels, reference.left.pixels);
    }

    #[test]
    fn single_row_reports_degenerate_fit() {
        let mut mask = blank_mask(200, 90);
        for x in 20..30 {
            mask.put_pixel(x, 85, Luma([255]));
        }
        draw_vertical_line(&mut mask, 150, 10, 90);
        let config = LaneConfig {
            search: crate::SearchParams {
                n_windows: 3,
                window_half_width: 15,
                min_pixel_to_recenter: 5,
            },
            ..LaneConfig::default()
        };
        let result = LaneFinder::new(config)
            .unwrap()
            .find(&FeatureImage::new(mask).unwrap());
        assert_eq!(
            result.left.geometry,
            Err(LaneError::DegenerateFit {
                side: Side::Left,
                reason: FitError::RepeatedY
            })
        );
        assert!(result.right.is_found());
    }

    #[test]
    fn offset_follows_seed_positions() {
        let result = finder().find(&two_lane_mask(302, 1002));
        assert_eq!(result.offset_px, 20);
        assert!(result.offset_m > 0.0);
        assert_abs_diff_eq!(result.offset_m, 20.0 * 3.7 / 700.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_multi_channel_input() {
        let err = finder()
            .find_image(&DynamicImage::ImageRgb8(RgbImage::new(64, 64)))
            .unwrap_err();
        assert_eq!(err, LaneError::InvalidChannelCount { channels: 3 });

        let gray = DynamicImage::ImageLuma8(GrayImage::new(64, 64));
        assert!(finder().find_image(&gray).is_ok());
    }

    #[test]
    fn failed_side_keeps_prior_history() {
        let finder = finder();
        let mut ctx = finder.new_context();
        finder.track(&two_lane_mask(300, 1000), &mut ctx);
        finder.track(&two_lane_mask(310, 1010), &mut ctx);

        let mut mask = blank_mask(1280, 720);
        draw_band(&mut mask, 320, 2);
        let result = finder.track(&FeatureImage::new(mask).unwrap(), &mut ctx);
        assert!(!result.right.is_found());

        assert_eq!(ctx.left().len(), 3);
        assert_eq!(ctx.right().len(), 2);
        let right = ctx.smoothed_fit(Side::Right).unwrap();
        assert_abs_diff_eq!(right.c, 1005.0, epsilon = 1e-6);
        assert_eq!(ctx.right().get_last_lane_start(), Some(1008));
    }

    #[test]
    fn never_found_side_has_no_smoothed_fit() {
        let finder = finder();
        let mut ctx = finder.new_context();
        let mut mask = blank_mask(1280, 720);
        draw_band(&mut mask, 300, 2);
        let image = FeatureImage::new(mask).unwrap();
        for _ in 0..3 {
            finder.track(&image, &mut ctx);
        }
        assert!(ctx.smoothed_fit(Side::Right).is_none());
        assert!(ctx.smoothed_fit(Side::Left).is_some());
    }

    #[test]
    fn still_image_context_tracks_last_frame_only() {
        let finder = LaneFinder::new(LaneConfig::still_image()).unwrap();
        let mut ctx = finder.new_context();
        finder.track(&two_lane_mask(300, 1000), &mut ctx);
        let result = finder.track(&two_lane_mask(340, 1040), &mut ctx);
        assert_eq!(
            ctx.smoothed_fit(Side::Left),
            result.left.fit_px().copied()
        );
        assert_eq!(
            ctx.left().get_average_poly_fit(),
            ctx.left().get_last_poly_fit().copied()
        );
    }
}
