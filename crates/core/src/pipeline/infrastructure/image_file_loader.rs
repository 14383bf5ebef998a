use std::path::{Path, PathBuf};

use crate::pipeline::image_loader::ImageLoader;
use crate::shared::frame::Frame;

/// Decodes image files with the `image` crate into RGB frames.
///
/// Image ids are file paths, resolved against `base_dir` when relative.
#[derive(Default)]
pub struct ImageFileLoader {
    base_dir: Option<PathBuf>,
}

impl ImageFileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, image_id: &str) -> PathBuf {
        let path = Path::new(image_id);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ImageLoader for ImageFileLoader {
    fn load(&self, image_id: &str) -> Result<Frame, Box<dyn std::error::Error + Send + Sync>> {
        let path = self.resolve(image_id);
        let rgb = image::open(&path)
            .map_err(|e| format!("{}: {e}", path.display()))?
            .to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(Frame::new(rgb.into_raw(), width, height, 3, image_id))
    }
}
