use crate::error::ConfigError;
use std::num::NonZeroUsize;

/// Sliding-window search parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    /// Number of vertical bands the mask is split into.
    pub n_windows: usize,
    /// Horizontal half-extent of each window in pixels.
    pub window_half_width: u32,
    /// A window re-centers the next band only when it holds more pixels than this.
    pub min_pixel_to_recenter: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            n_windows: 9,
            window_half_width: 120,
            min_pixel_to_recenter: 50,
        }
    }
}

/// Pixel to meter scale of the warped mask.
///
/// Defaults assume a 3.7 m lane spanning 700 px and 30 m of road over 720 px.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub xm_per_pix: f64,
    pub ym_per_pix: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            xm_per_pix: 3.7 / 700.0,
            ym_per_pix: 30.0 / 720.0,
        }
    }
}

impl Calibration {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("xm_per_pix", self.xm_per_pix), ("ym_per_pix", self.ym_per_pix)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidScale { name, value });
            }
        }
        Ok(())
    }
}

/// Full configuration of a lane finder and its tracking context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneConfig {
    pub search: SearchParams,
    pub calibration: Calibration,
    /// Number of frames retained per side for smoothing. 1 disables smoothing.
    pub history_capacity: usize,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            search: SearchParams::default(),
            calibration: Calibration::default(),
            history_capacity: 5,
        }
    }
}

impl LaneConfig {
    /// Configuration for independent still images: no temporal smoothing.
    pub fn still_image() -> Self {
        Self {
            history_capacity: 1,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.n_windows == 0 {
            return Err(ConfigError::ZeroWindows);
        }
        self.history_capacity()?;
        self.calibration.validate()
    }

    pub(crate) fn history_capacity(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.history_capacity).ok_or(ConfigError::ZeroHistory)
    }
}
