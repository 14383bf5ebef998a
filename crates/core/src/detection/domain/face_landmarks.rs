//! Ordered facial landmark points as emitted by the detector.
//!
//! The first two points are the left and right eye, the usual 5-point
//! layout (eyes, nose, mouth corners).

use serde::{Deserialize, Serialize};

const LEFT_EYE: usize = 0;
const RIGHT_EYE: usize = 1;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceLandmarks {
    points: Vec<(f64, f64)>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Absolute angle of the eye line in degrees, 0 for a level face.
    ///
    /// Measured from the left eye to the right eye, so swapped eyes read as
    /// close to 180. `None` when fewer than two points are present.
    pub fn eye_angle_degrees(&self) -> Option<f64> {
        let left = self.points.get(LEFT_EYE)?;
        let right = self.points.get(RIGHT_EYE)?;
        let dy = right.1 - left.1;
        let dx = right.0 - left.0;
        Some(dy.atan2(dx).to_degrees().abs())
    }
}
