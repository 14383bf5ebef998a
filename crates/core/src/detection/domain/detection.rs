use serde::{Deserialize, Serialize};

use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::bounding_box::BoundingBox;

/// One face as reported by the external detector/embedding model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    #[serde(default)]
    pub landmarks: FaceLandmarks,
    pub confidence: f64,
    pub embedding: Vec<f32>,
}

impl Detection {
    pub fn new(
        bbox: BoundingBox,
        landmarks: FaceLandmarks,
        confidence: f64,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            bbox,
            landmarks,
            confidence,
            embedding,
        }
    }
}
