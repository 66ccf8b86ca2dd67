use crate::error::LaneError;
use image::{DynamicImage, GrayImage};
use std::fmt;
use std::ops::{Add, Div};

/// Lane boundary side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-channel bird's-eye binary mask. Any non-zero value is foreground.
#[derive(Debug, Clone)]
pub struct FeatureImage {
    mask: GrayImage,
}

impl FeatureImage {
    /// Wrap a mask, rejecting shapes that cannot be split into two halves.
    pub fn new(mask: GrayImage) -> Result<Self, LaneError> {
        let (width, height) = mask.dimensions();
        if width < 2 || height == 0 {
            return Err(LaneError::InvalidDimensions { width, height });
        }
        Ok(Self { mask })
    }

    pub fn width(&self) -> u32 {
        self.mask.width()
    }

    pub fn height(&self) -> u32 {
        self.mask.height()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.mask
    }

    /// Foreground pixel coordinates `(x, y)` in row-major order.
    pub fn nonzero(&self) -> Vec<(u32, u32)> {
        self.mask
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] != 0)
            .map(|(x, y, _)| (x, y))
            .collect()
    }
}

impl TryFrom<&DynamicImage> for FeatureImage {
    type Error = LaneError;

    fn try_from(image: &DynamicImage) -> Result<Self, Self::Error> {
        let channels = image.color().channel_count();
        if channels != 1 {
            return Err(LaneError::InvalidChannelCount { channels });
        }
        let mask = match image {
            DynamicImage::ImageLuma8(gray) => gray.clone(),
            other => other.to_luma8(),
        };
        Self::new(mask)
    }
}

/// Search rectangle, half-open on the high edges. `x_low` may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x_low: i64,
    pub y_low: i64,
    pub x_high: i64,
    pub y_high: i64,
}

impl Window {
    pub fn contains(&self, x: u32, y: u32) -> bool {
        let (x, y) = (i64::from(x), i64::from(y));
        x >= self.x_low && x < self.x_high && y >= self.y_low && y < self.y_high
    }

    pub fn center_x(&self) -> i64 {
        (self.x_low + self.x_high) / 2
    }
}

/// Foreground pixels attributed to one lane side in one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelSet {
    points: Vec<(u32, u32)>,
}

impl PixelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: u32, y: u32) {
        self.points.push((x, y));
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[(u32, u32)] {
        &self.points
    }

    /// Split into `(xs, ys)` scaled by the given factors.
    pub fn scaled_coords(&self, x_scale: f64, y_scale: f64) -> (Vec<f64>, Vec<f64>) {
        self.points
            .iter()
            .map(|&(x, y)| (f64::from(x) * x_scale, f64::from(y) * y_scale))
            .unzip()
    }
}

impl From<Vec<(u32, u32)>> for PixelSet {
    fn from(points: Vec<(u32, u32)>) -> Self {
        Self { points }
    }
}

/// Quadratic `x = a·y² + b·y + c`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolynomialFit {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl PolynomialFit {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    pub fn x_at(&self, y: f64) -> f64 {
        (self.a * y + self.b) * y + self.c
    }

    /// Coefficient-wise mean, `None` for an empty iterator.
    pub fn mean<'a, I>(fits: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a PolynomialFit>,
    {
        let (sum, count) = fits
            .into_iter()
            .fold((Self::default(), 0usize), |(sum, n), fit| (sum + *fit, n + 1));
        (count > 0).then(|| sum / count as f64)
    }
}

impl Add for PolynomialFit {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.a + rhs.a, self.b + rhs.b, self.c + rhs.c)
    }
}

impl Div<f64> for PolynomialFit {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.a / rhs, self.b / rhs, self.c / rhs)
    }
}

/// Radius of curvature at the bottom of the mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Radius {
    Meters(f64),
    /// Leading coefficient vanished; the boundary is a straight line.
    Straight,
}

impl Radius {
    pub fn meters(&self) -> Option<f64> {
        match self {
            Self::Meters(m) => Some(*m),
            Self::Straight => None,
        }
    }
}

/// Geometry of one side when its fit succeeded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneGeometry {
    pub fit_px: PolynomialFit,
    pub fit_world: PolynomialFit,
    pub radius: Radius,
}

/// Everything the finder produced for one side in one frame.
///
/// Windows and pixels are present even when `geometry` failed.
#[derive(Debug, Clone)]
pub struct SideResult {
    pub side: Side,
    pub seed: u32,
    pub windows: Vec<Window>,
    pub pixels: PixelSet,
    pub geometry: Result<LaneGeometry, LaneError>,
}

impl SideResult {
    pub fn fit_px(&self) -> Option<&PolynomialFit> {
        self.geometry.as_ref().ok().map(|g| &g.fit_px)
    }

    pub fn fit_world(&self) -> Option<&PolynomialFit> {
        self.geometry.as_ref().ok().map(|g| &g.fit_world)
    }

    pub fn radius(&self) -> Option<Radius> {
        self.geometry.as_ref().ok().map(|g| g.radius)
    }

    pub fn is_found(&self) -> bool {
        self.geometry.is_ok()
    }
}

/// Per-frame output of [`crate::LaneFinder::find`]. Nothing here is smoothed.
#[derive(Debug, Clone)]
pub struct FrameResult {
    pub width: u32,
    pub height: u32,
    pub left: SideResult,
    pub right: SideResult,
    /// `left_seed - (width - right_seed)`; negative means left of center.
    pub offset_px: i64,
    pub offset_m: f64,
}

impl FrameResult {
    pub fn side(&self, side: Side) -> &SideResult {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}
