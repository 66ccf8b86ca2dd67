use crate::error::LaneError;
use crate::lane::{FrameResult, Radius, SideResult};
use ab_glyph::{FontArc, InvalidFont, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;

const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const TEXT_ORIGIN_X: i32 = 20;
const FIRST_BASELINE: i32 = 50;
const LINE_SPACING: i32 = 50;

/// Curvature and offset lines as they appear on an annotated frame.
pub fn info_lines(result: &FrameResult) -> [String; 3] {
    [
        format!("Left Curve: {}", curve_text(&result.left)),
        format!("Right Curve: {}", curve_text(&result.right)),
        offset_text(result.offset_px, result.offset_m),
    ]
}

fn curve_text(side: &SideResult) -> String {
    match &side.geometry {
        Ok(geometry) => match geometry.radius {
            Radius::Meters(m) => format!("{:6.2}m", m),
            Radius::Straight => "straight".to_string(),
        },
        Err(LaneError::LaneNotFound { .. }) => "n/a (lane not found)".to_string(),
        Err(LaneError::DegenerateFit { reason, .. }) => format!("n/a ({})", reason),
        Err(e) => format!("n/a ({})", e),
    }
}

fn offset_text(offset_px: i64, offset_m: f64) -> String {
    match offset_px.signum() {
        0 => "Distance from center 0m".to_string(),
        -1 => format!("Distance from center {:4.2}m to the left", -offset_m),
        _ => format!("Distance from center {:4.2}m to the right", offset_m),
    }
}

/// Draws curvature and offset text onto frames.
#[derive(Clone)]
pub struct Annotator {
    font: FontArc,
    scale: PxScale,
}

impl Annotator {
    pub fn new(font: FontArc) -> Self {
        Self {
            font,
            scale: PxScale::from(32.0),
        }
    }

    /// Load a TrueType/OpenType font from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, InvalidFont> {
        Ok(Self::new(FontArc::try_from_vec(bytes)?))
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = PxScale::from(scale);
        self
    }

    pub fn annotate(&self, mut image: RgbImage, result: &FrameResult) -> RgbImage {
        for (i, line) in info_lines(result).iter().enumerate() {
            // imageproc positions text by its top edge
            let y = FIRST_BASELINE + LINE_SPACING * i as i32 - self.scale.y as i32;
            draw_text_mut(&mut image, TEXT_COLOR, TEXT_ORIGIN_X, y, self.scale, &self.font, line);
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lane::{LaneFinder, LaneGeometry, PixelSet, PolynomialFit, Side};
    use crate::test_utils::two_lane_mask;
    use crate::LaneConfig;

    fn side_result(side: Side, geometry: Result<LaneGeometry, LaneError>) -> SideResult {
        SideResult {
            side,
            seed: 0,
            windows: Vec::new(),
            pixels: PixelSet::new(),
            geometry,
        }
    }

    fn geometry(radius: Radius) -> LaneGeometry {
        LaneGeometry {
            fit_px: PolynomialFit::default(),
            fit_world: PolynomialFit::default(),
            radius,
        }
    }

    #[test]
    fn formats_radius_and_offset() {
        let result = FrameResult {
            width: 1280,
            height: 720,
            left: side_result(Side::Left, Ok(geometry(Radius::Meters(1234.5678)))),
            right: side_result(Side::Right, Ok(geometry(Radius::Straight))),
            offset_px: -30,
            offset_m: -30.0 * 3.7 / 700.0,
        };
        let lines = info_lines(&result);
        assert_eq!(lines[0], "Left Curve: 1234.57m");
        assert_eq!(lines[1], "Right Curve: straight");
        assert_eq!(lines[2], "Distance from center 0.16m to the left");
    }

    #[test]
    fn formats_failures_and_center() {
        let result = FrameResult {
            width: 1280,
            height: 720,
            left: side_result(
                Side::Left,
                Err(LaneError::DegenerateFit {
                    side: Side::Left,
                    reason: crate::FitError::RepeatedY,
                }),
            ),
            right: side_result(Side::Right, Err(LaneError::LaneNotFound { side: Side::Right })),
            offset_px: 0,
            offset_m: 0.0,
        };
        let lines = info_lines(&result);
        assert_eq!(lines[0], "Left Curve: n/a (fewer than 3 distinct y values)");
        assert_eq!(lines[1], "Right Curve: n/a (lane not found)");
        assert_eq!(lines[2], "Distance from center 0m");
    }

    #[test]
    fn right_of_center_from_finder() {
        let finder = LaneFinder::new(LaneConfig::default()).unwrap();
        let result = finder.find(&two_lane_mask(302, 1002));
        assert_eq!(info_lines(&result)[2], "Distance from center 0.11m to the right");
        assert_eq!(info_lines(&result)[0], "Left Curve: straight");
    }

    #[test]
    fn rejects_invalid_font_bytes() {
        assert!(Annotator::from_bytes(vec![0, 1, 2, 3]).is_err());
    }
}
