use super::types::{PixelSet, PolynomialFit};
use crate::config::Calibration;
use crate::error::FitError;
use ndarray::{Array1, Array2};

/// Least-squares fit of `x = a·y² + b·y + c`.
///
/// `y` is centred and scaled to `[-1, 1]` before building the normal
/// equations, then the coefficients are mapped back to raw `y`.
pub fn fit_quadratic(xs: &[f64], ys: &[f64]) -> Result<PolynomialFit, FitError> {
    let n = xs.len().min(ys.len());
    if n < 3 {
        return Err(FitError::TooFewPoints(n));
    }
    if !has_three_distinct(&ys[..n]) {
        return Err(FitError::RepeatedY);
    }

    let (y_min, y_max) = ys[..n]
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &y| (lo.min(y), hi.max(y)));
    let mid = (y_min + y_max) / 2.0;
    let half = (y_max - y_min) / 2.0;

    let mut design = Array2::<f64>::zeros((n, 3));
    for (mut row, &y) in design.rows_mut().into_iter().zip(ys) {
        let t = (y - mid) / half;
        row[0] = t * t;
        row[1] = t;
        row[2] = 1.0;
    }
    let target = Array1::from_iter(xs[..n].iter().copied());

    let normal = design.t().dot(&design);
    let rhs = design.t().dot(&target);
    let (ta, tb, tc) = solve_3x3(
        [
            [normal[[0, 0]], normal[[0, 1]], normal[[0, 2]]],
            [normal[[1, 0]], normal[[1, 1]], normal[[1, 2]]],
            [normal[[2, 0]], normal[[2, 1]], normal[[2, 2]]],
        ],
        [rhs[0], rhs[1], rhs[2]],
    )
    .ok_or(FitError::Singular)?;

    // x = ta·t² + tb·t + tc with t = (y - mid) / half
    let a = ta / (half * half);
    let b = tb / half - 2.0 * ta * mid / (half * half);
    let c = ta * mid * mid / (half * half) - tb * mid / half + tc;
    Ok(PolynomialFit::new(a, b, c))
}

fn has_three_distinct(ys: &[f64]) -> bool {
    let mut seen: [f64; 2] = [f64::NAN; 2];
    let mut distinct = 0;
    for &y in ys {
        if seen[..distinct].contains(&y) {
            continue;
        }
        if distinct == 2 {
            return true;
        }
        seen[distinct] = y;
        distinct += 1;
    }
    false
}

/// Gaussian elimination with partial pivoting.
fn solve_3x3(mut m: [[f64; 3]; 3], mut rhs: [f64; 3]) -> Option<(f64, f64, f64)> {
    let scale = m
        .iter()
        .flatten()
        .fold(0.0f64, |acc, v| acc.max(v.abs()))
        .max(f64::MIN_POSITIVE);

    for col in 0..3 {
        let pivot = (col..3).max_by(|&i, &j| m[i][col].abs().total_cmp(&m[j][col].abs()))?;
        if m[pivot][col].abs() < 1e-12 * scale {
            return None;
        }
        m.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in (col + 1)..3 {
            let factor = m[row][col] / m[col][col];
            for k in col..3 {
                m[row][k] -= factor * m[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let c = rhs[2] / m[2][2];
    let b = (rhs[1] - m[1][2] * c) / m[1][1];
    let a = (rhs[0] - m[0][2] * c - m[0][1] * b) / m[0][0];

    (a.is_finite() && b.is_finite() && c.is_finite()).then_some((a, b, c))
}

/// Fits a side's pixels in pixel space and in real-world space.
#[derive(Debug, Clone, Copy)]
pub struct CurveFitter {
    calibration: Calibration,
}

impl CurveFitter {
    pub fn new(calibration: Calibration) -> Self {
        Self { calibration }
    }

    pub fn fit_pixels(&self, pixels: &PixelSet) -> Result<PolynomialFit, FitError> {
        let (xs, ys) = pixels.scaled_coords(1.0, 1.0);
        fit_quadratic(&xs, &ys)
    }

    pub fn fit_world(&self, pixels: &PixelSet) -> Result<PolynomialFit, FitError> {
        let (xs, ys) =
            pixels.scaled_coords(self.calibration.xm_per_pix, self.calibration.ym_per_pix);
        fit_quadratic(&xs, &ys)
    }

    /// `(pixel_fit, world_fit)` for one side.
    pub fn fit(&self, pixels: &PixelSet) -> Result<(PolynomialFit, PolynomialFit), FitError> {
        let _span = tracing::debug_span!("curve_fit", points = pixels.len()).entered();
        Ok((self.fit_pixels(pixels)?, self.fit_world(pixels)?))
    }
}
