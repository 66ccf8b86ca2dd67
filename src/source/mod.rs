mod mask_dir;

pub use mask_dir::{load_frame, MaskDirectory};

use anyhow::Result;
use image::DynamicImage;

/// A decoded mask and the name it was loaded under.
pub struct Frame {
    pub name: String,
    pub image: DynamicImage,
}

/// Trait for ordered sources of bird's-eye masks
pub trait FrameSource {
    /// Next frame in time order, `None` once the source is exhausted
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Number of frames not yet returned, if known
    fn remaining(&self) -> Option<usize> {
        None
    }
}
