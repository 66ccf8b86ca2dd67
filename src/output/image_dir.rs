use super::OutputSink;
use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Writes rendered frames as zero-padded numbered PNGs (`0000.png`, `0001.png`, ...).
pub struct ImageDirOutput {
    dir: PathBuf,
    written: u64,
}

impl ImageDirOutput {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        tracing::info!("Writing overlays to {}", dir.display());

        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        Ok(Self {
            dir: dir.to_path_buf(),
            written: 0,
        })
    }

    pub fn path_for(&self, index: u64) -> PathBuf {
        self.dir.join(format!("{:04}.png", index))
    }

    /// Write a frame at an explicit index without advancing the sequence.
    pub fn write_frame_at(&self, index: u64, frame: &RgbImage) -> Result<()> {
        let path = self.path_for(index);
        frame
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

impl OutputSink for ImageDirOutput {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        self.write_frame_at(self.written, frame)?;
        self.written += 1;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.written
    }
}
