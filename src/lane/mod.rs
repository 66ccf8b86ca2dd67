mod curvature;
mod finder;
mod fit;
mod scan;
mod track;
pub mod types;
mod window;

pub use curvature::{radius_of_curvature, CurvatureEstimator, STRAIGHT_EPSILON};
pub use finder::LaneFinder;
pub use fit::{fit_quadratic, CurveFitter};
pub use scan::{histogram, scan, seeds_from_histogram, Seeds};
pub use track::{LaneTrack, TrackingContext};
pub use types::{
    FeatureImage, FrameResult, LaneGeometry, PixelSet, PolynomialFit, Radius, Side, SideResult,
    Window,
};
pub use window::{SearchTrace, WindowSearch};
