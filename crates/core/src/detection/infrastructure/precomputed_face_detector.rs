use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum DetectionFileError {
    #[error("failed to read detections from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed detections in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Replays detector output recorded ahead of time, keyed by image id.
///
/// The sidecar is a JSON object mapping each image id to its list of
/// detections. Images missing from it yield no faces.
pub struct PrecomputedFaceDetector {
    detections: Arc<HashMap<String, Vec<Detection>>>,
}

impl PrecomputedFaceDetector {
    pub fn new(detections: Arc<HashMap<String, Vec<Detection>>>) -> Self {
        Self { detections }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, DetectionFileError> {
        let json = fs::read_to_string(path).map_err(|source| DetectionFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let detections: HashMap<String, Vec<Detection>> =
            serde_json::from_str(&json).map_err(|source| DetectionFileError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!(
            "Loaded detections for {} images from {}",
            detections.len(),
            path.display()
        );
        Ok(Self::new(Arc::new(detections)))
    }

    pub fn image_count(&self) -> usize {
        self.detections.len()
    }
}

impl FaceDetector for PrecomputedFaceDetector {
    fn detect(
        &self,
        frame: &Frame,
    ) -> Result<Vec<Detection>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .detections
            .get(frame.image_id())
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face_landmarks::FaceLandmarks;
    use crate::shared::bounding_box::BoundingBox;
    use std::io::Write;

    fn frame(image_id: &str) -> Frame {
        Frame::new(vec![0u8; 10 * 10 * 3], 10, 10, 3, image_id)
    }

    fn detection(x: i32, embedding: Vec<f32>) -> Detection {
        Detection::new(
            BoundingBox::new(x, 0, x + 100, 100),
            FaceLandmarks::default(),
            0.9,
            embedding,
        )
    }

    #[test]
    fn test_returns_detections_for_known_image() {
        let faces = vec![detection(0, vec![1.0, 0.0]), detection(200, vec![0.0, 1.0])];
        let detector =
            PrecomputedFaceDetector::new(Arc::new(HashMap::from([("a.jpg".into(), faces.clone())])));

        assert_eq!(detector.detect(&frame("a.jpg")).unwrap(), faces);
    }

    #[test]
    fn test_returns_empty_for_unknown_image() {
        let detector = PrecomputedFaceDetector::new(Arc::new(HashMap::from([(
            "a.jpg".into(),
            vec![detection(0, vec![1.0])],
        )])));

        assert!(detector.detect(&frame("b.jpg")).unwrap().is_empty());
    }

    #[test]
    fn test_loads_sidecar_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"a.jpg": [{{"bbox": [0, 0, 120, 120], "landmarks": [[30, 40], [90, 40]], "confidence": 0.99, "embedding": [0.5, 0.5]}}], "b.jpg": []}}"#
        )
        .unwrap();

        let detector = PrecomputedFaceDetector::from_json_file(file.path()).unwrap();

        assert_eq!(detector.image_count(), 2);
        let faces = detector.detect(&frame("a.jpg")).unwrap();
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].bbox, BoundingBox::new(0, 0, 120, 120));
        assert!(detector.detect(&frame("b.jpg")).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = PrecomputedFaceDetector::from_json_file(Path::new("/nonexistent/dets.json"));
        assert!(matches!(result, Err(DetectionFileError::Read { .. })));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        let result = PrecomputedFaceDetector::from_json_file(file.path());
        assert!(matches!(result, Err(DetectionFileError::Parse { .. })));
    }
}
