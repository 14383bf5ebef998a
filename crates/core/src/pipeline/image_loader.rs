use crate::shared::frame::Frame;

/// Resolves an image id to decoded pixels.
pub trait ImageLoader: Send + Sync {
    fn load(&self, image_id: &str) -> Result<Frame, Box<dyn std::error::Error + Send + Sync>>;
}
