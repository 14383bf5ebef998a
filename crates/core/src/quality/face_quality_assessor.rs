use serde::{Deserialize, Serialize};

use crate::detection::domain::detection::Detection;
use crate::quality::image_metrics::{gray_crop, laplacian_variance, mean_intensity};
use crate::quality::quality_assessment::{QualityAssessment, QualityIssue};
use crate::shared::constants::{
    BLUR_PENALTY, BLUR_THRESHOLD, DEFAULT_QUALITY_THRESHOLD, LIGHTING_PENALTY, MAX_BRIGHTNESS,
    MAX_TILT_DEGREES, MIN_BRIGHTNESS, MIN_FACE_SIZE, SMALL_FACE_PENALTY, TILT_PENALTY,
};
use crate::shared::frame::Frame;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub min_face_size: i32,
    pub blur_threshold: f64,
    pub min_brightness: f64,
    pub max_brightness: f64,
    pub max_tilt_degrees: f64,
    /// Faces scoring below this are not clustered.
    pub acceptance_threshold: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_face_size: MIN_FACE_SIZE,
            blur_threshold: BLUR_THRESHOLD,
            min_brightness: MIN_BRIGHTNESS,
            max_brightness: MAX_BRIGHTNESS,
            max_tilt_degrees: MAX_TILT_DEGREES,
            acceptance_threshold: DEFAULT_QUALITY_THRESHOLD,
        }
    }
}

/// Scores detected faces for usability before they enter the feature store.
///
/// Four independent checks each multiply a running score that starts at
/// 1.0: size, sharpness, exposure and pose. Checks that need pixels or
/// landmarks are skipped when those are unavailable.
#[derive(Clone, Debug, Default)]
pub struct FaceQualityAssessor {
    config: QualityConfig,
}

impl FaceQualityAssessor {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    pub fn assess(&self, frame: &Frame, detection: &Detection) -> QualityAssessment {
        let cfg = &self.config;
        let mut qa = QualityAssessment::perfect();

        let bbox = &detection.bbox;
        if bbox.width() < cfg.min_face_size || bbox.height() < cfg.min_face_size {
            qa = qa.penalize(QualityIssue::TooSmall, SMALL_FACE_PENALTY);
        }

        if let Some(gray) = gray_crop(frame, bbox) {
            if laplacian_variance(&gray) < cfg.blur_threshold {
                qa = qa.penalize(QualityIssue::Blurry, BLUR_PENALTY);
            }
            let brightness = mean_intensity(&gray);
            if brightness < cfg.min_brightness || brightness > cfg.max_brightness {
                qa = qa.penalize(QualityIssue::PoorLighting, LIGHTING_PENALTY);
            }
        }

        if let Some(angle) = detection.landmarks.eye_angle_degrees() {
            if angle > cfg.max_tilt_degrees {
                qa = qa.penalize(QualityIssue::Tilted, TILT_PENALTY);
            }
        }

        qa
    }

    /// Assesses `detection` against an explicit acceptance threshold.
    pub fn is_good_quality(
        &self,
        frame: &Frame,
        detection: &Detection,
        threshold: f64,
    ) -> (bool, QualityAssessment) {
        let qa = self.assess(frame, detection);
        (qa.score() >= threshold, qa)
    }

    /// Assesses `detection` against the configured acceptance threshold.
    pub fn accept(&self, frame: &Frame, detection: &Detection) -> (bool, QualityAssessment) {
        self.is_good_quality(frame, detection, self.config.acceptance_threshold)
    }
}
