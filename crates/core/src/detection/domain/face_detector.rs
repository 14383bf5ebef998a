use crate::detection::domain::detection::Detection;
use crate::shared::frame::Frame;

/// Domain interface for the external face detection/embedding model.
///
/// Shared across extraction workers, hence `&self` and `Sync`;
/// implementations wrapping a non-reentrant inference session guard it
/// with a `Mutex`.
pub trait FaceDetector: Send + Sync {
    fn detect(
        &self,
        frame: &Frame,
    ) -> Result<Vec<Detection>, Box<dyn std::error::Error + Send + Sync>>;
}
