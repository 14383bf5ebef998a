use std::sync::atomic::{AtomicBool, Ordering};

use crate::pipeline::extraction_executor::{ExtractionExecutor, ExtractionJob, ExtractionResult};

/// Runs extraction jobs one after another on the calling thread.
#[derive(Default)]
pub struct SequentialExtractionExecutor;

impl ExtractionExecutor for SequentialExtractionExecutor {
    fn run(
        &self,
        image_ids: &[String],
        job: &ExtractionJob<'_>,
        cancelled: &AtomicBool,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Vec<ExtractionResult> {
        let total = image_ids.len();
        let mut results = Vec::with_capacity(total);
        for (position, image_id) in image_ids.iter().enumerate() {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            results.push((position, job(image_id)));
            progress(results.len(), total);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction_executor::ImageFaces;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("img{i}")).collect()
    }

    fn empty_faces(image_id: &str) -> Result<ImageFaces, crate::shared::error::GroupingError> {
        Ok(ImageFaces {
            image_id: image_id.to_string(),
            accepted: Vec::new(),
            rejected: 0,
        })
    }

    #[test]
    fn test_runs_every_image_in_order() {
        let cancelled = AtomicBool::new(false);
        let mut reports = Vec::new();
        let results = SequentialExtractionExecutor.run(&ids(3), &empty_faces, &cancelled, &mut |d, t| {
            reports.push((d, t))
        });

        let positions: Vec<usize> = results.iter().map(|(p, _)| *p).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(reports, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_stops_when_cancelled() {
        let cancelled = AtomicBool::new(false);
        let job = |image_id: &str| {
            cancelled.store(true, Ordering::Relaxed);
            empty_faces(image_id)
        };
        let results = SequentialExtractionExecutor.run(&ids(5), &job, &cancelled, &mut |_, _| {});
        assert_eq!(results.len(), 1);
    }
}
