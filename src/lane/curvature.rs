use super::types::{PolynomialFit, Radius};
use crate::config::Calibration;
use crate::error::FitError;

/// Below this magnitude (1/m) the world-space leading coefficient counts as zero.
pub const STRAIGHT_EPSILON: f64 = 1e-12;

/// `R = (1 + (2a·y + b)²)^1.5 / |2a|` evaluated at `y_eval`.
pub fn radius_of_curvature(fit: &PolynomialFit, y_eval: f64) -> Result<f64, FitError> {
    if fit.a.abs() <= STRAIGHT_EPSILON {
        return Err(FitError::FlatCurve);
    }
    let first = 2.0 * fit.a * y_eval + fit.b;
    let second = 2.0 * fit.a;
    Ok((1.0 + first * first).powf(1.5) / second.abs())
}

/// Radius of curvature and lateral offset in real-world units.
#[derive(Debug, Clone, Copy)]
pub struct CurvatureEstimator {
    calibration: Calibration,
}

impl CurvatureEstimator {
    pub fn new(calibration: Calibration) -> Self {
        Self { calibration }
    }

    /// Radius at the bottom row of a mask `height` pixels tall.
    pub fn radius(&self, fit_world: &PolynomialFit, height: u32) -> Radius {
        let y_eval = f64::from(height) * self.calibration.ym_per_pix;
        match radius_of_curvature(fit_world, y_eval) {
            Ok(meters) => Radius::Meters(meters),
            Err(e) => {
                tracing::debug!("Curvature fallback to straight: {}", e);
                Radius::Straight
            }
        }
    }

    /// `left_seed - (width - right_seed)` in pixels.
    pub fn offset_px(left_seed: u32, right_seed: u32, width: u32) -> i64 {
        i64::from(left_seed) - (i64::from(width) - i64::from(right_seed))
    }

    pub fn offset_m(&self, offset_px: i64) -> f64 {
        offset_px as f64 * self.calibration.xm_per_pix
    }
}
