use super::{Frame, FrameSource};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

const EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Directory of mask images, replayed in filename order as a frame sequence.
pub struct MaskDirectory {
    paths: Vec<PathBuf>,
    next: usize,
}

impl MaskDirectory {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        tracing::info!("Reading masks from {}", dir.display());

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read mask directory {}", dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && has_image_extension(&path) {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            bail!("No mask images found in {}", dir.display());
        }
        paths.sort();

        tracing::info!("Found {} masks", paths.len());
        Ok(Self { paths, next: 0 })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decode one mask file.
pub fn load_frame(path: &Path) -> Result<Frame> {
    let image =
        image::open(path).with_context(|| format!("Failed to decode {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Frame { name, image })
}

impl FrameSource for MaskDirectory {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;
        load_frame(path).map(Some)
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.paths.len() - self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn replays_masks_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        for (name, value) in [("0002.png", 2u8), ("0001.png", 1), ("0010.png", 10)] {
            GrayImage::from_pixel(4, 4, Luma([value]))
                .save(dir.path().join(name))
                .unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut source = MaskDirectory::new(dir.path()).unwrap();
        assert_eq!(source.remaining(), Some(3));

        let mut seen = Vec::new();
        while let Some(frame) = source.next_frame().unwrap() {
            seen.push((frame.name, frame.image.to_luma8().get_pixel(0, 0)[0]));
        }
        assert_eq!(
            seen,
            vec![
                ("0001.png".to_string(), 1),
                ("0002.png".to_string(), 2),
                ("0010.png".to_string(), 10)
            ]
        );
        assert_eq!(source.remaining(), Some(0));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(MaskDirectory::new(dir.path()).is_err());
    }
}
