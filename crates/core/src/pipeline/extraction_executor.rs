use std::sync::atomic::AtomicBool;

use crate::detection::domain::detection::Detection;
use crate::quality::quality_assessment::QualityAssessment;
use crate::shared::error::GroupingError;

/// Faces extracted from one image.
#[derive(Clone, Debug)]
pub struct ImageFaces {
    pub image_id: String,
    /// Detections that passed the quality gate, in detector order.
    pub accepted: Vec<(Detection, QualityAssessment)>,
    pub rejected: usize,
}

/// Load → detect → assess for a single image id.
pub type ExtractionJob<'a> = dyn Fn(&str) -> Result<ImageFaces, GroupingError> + Sync + 'a;

/// Outcome for the image at a given position of the batch.
pub type ExtractionResult = (usize, Result<ImageFaces, GroupingError>);

/// Runs the per-image extraction job over a batch.
///
/// Jobs are independent; results may come back in any order and carry the
/// batch position of their image. Once `cancelled` is set no new job is
/// started. `progress` is called on the calling thread as `(done, total)`.
pub trait ExtractionExecutor: Send + Sync {
    fn run(
        &self,
        image_ids: &[String],
        job: &ExtractionJob<'_>,
        cancelled: &AtomicBool,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Vec<ExtractionResult>;
}
