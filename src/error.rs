//! Error types for lane finding.

use crate::lane::Side;
use thiserror::Error;

/// Errors surfaced by the lane finder.
///
/// `InvalidChannelCount` and `InvalidDimensions` fail the whole call. The
/// per-side kinds are carried inside [`crate::SideResult`] so one side failing
/// never blocks the other.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LaneError {
    #[error("Invalid image channels, expected 1 but {channels} provided")]
    InvalidChannelCount { channels: u8 },

    #[error("Invalid mask dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("No lane pixels found for {side} side")]
    LaneNotFound { side: Side },

    #[error("Degenerate fit for {side} side: {reason}")]
    DegenerateFit { side: Side, reason: FitError },
}

impl LaneError {
    /// Side this error belongs to, if it is a per-side failure.
    pub fn side(&self) -> Option<Side> {
        match self {
            Self::LaneNotFound { side } | Self::DegenerateFit { side, .. } => Some(*side),
            _ => None,
        }
    }
}

/// Side-less failure of a quadratic fit or curvature evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FitError {
    #[error("{0} points, at least 3 required")]
    TooFewPoints(usize),

    #[error("fewer than 3 distinct y values")]
    RepeatedY,

    #[error("singular normal equations")]
    Singular,

    #[error("leading coefficient is zero, radius is unbounded")]
    FlatCurve,
}

/// Invalid numeric configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("n_windows must be at least 1")]
    ZeroWindows,

    #[error("history_capacity must be at least 1")]
    ZeroHistory,

    #[error("{name} must be finite and positive, got {value}")]
    InvalidScale { name: &'static str, value: f64 },
}
