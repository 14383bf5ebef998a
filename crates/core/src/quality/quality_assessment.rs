use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Why a face lost quality points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityIssue {
    TooSmall,
    Blurry,
    PoorLighting,
    Tilted,
}

impl std::fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityIssue::TooSmall => write!(f, "too_small"),
            QualityIssue::Blurry => write!(f, "blurry"),
            QualityIssue::PoorLighting => write!(f, "poor_lighting"),
            QualityIssue::Tilted => write!(f, "tilted"),
        }
    }
}

/// Usability score of one detected face, in (0, 1], with the penalties
/// that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    score: f64,
    issues: BTreeSet<QualityIssue>,
}

impl QualityAssessment {
    /// A perfect score with no issues.
    pub fn perfect() -> Self {
        Self {
            score: 1.0,
            issues: BTreeSet::new(),
        }
    }

    /// Multiplies the score by `factor` (in (0, 1]) and records `issue`.
    pub(crate) fn penalize(mut self, issue: QualityIssue, factor: f64) -> Self {
        debug_assert!(factor > 0.0 && factor <= 1.0);
        self.score *= factor;
        self.issues.insert(issue);
        self
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn issues(&self) -> &BTreeSet<QualityIssue> {
        &self.issues
    }

    pub fn has(&self, issue: QualityIssue) -> bool {
        self.issues.contains(&issue)
    }
}
