//! Lane-geometry estimation and temporal tracking on bird's-eye binary masks.
//!
//! The per-frame entry point is [`LaneFinder::find`], which is pure and can be
//! run on independent images in parallel. Temporal smoothing lives in a
//! caller-owned [`TrackingContext`] that must be fed frames in order.

pub mod config;
pub mod error;
pub mod lane;
pub mod render;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{Calibration, LaneConfig, SearchParams};
pub use error::{ConfigError, FitError, LaneError};
pub use lane::{
    FeatureImage, FrameResult, LaneFinder, LaneGeometry, LaneTrack, PixelSet, PolynomialFit,
    Radius, Side, SideResult, TrackingContext, Window,
};
