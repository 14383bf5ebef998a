use thiserror::Error;

/// Failures surfaced by a grouping request.
///
/// `InvalidImage` and `ModelUnavailable` are per-image: the batch records
/// them and carries on. The embedding variants abort clustering for the
/// whole batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GroupingError {
    #[error("invalid image {image_id}: {reason}")]
    InvalidImage { image_id: String, reason: String },
    #[error("face detector unavailable for {image_id}: {reason}")]
    ModelUnavailable { image_id: String, reason: String },
    #[error("embedding {index} has dimension {actual}, expected {expected}")]
    EmbeddingDimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("embedding {index} contains non-finite values")]
    NonFiniteEmbedding { index: usize },
    #[error("grouping cancelled")]
    Cancelled,
}

impl GroupingError {
    /// True for failures confined to a single image.
    pub fn is_per_image(&self) -> bool {
        matches!(
            self,
            GroupingError::InvalidImage { .. } | GroupingError::ModelUnavailable { .. }
        )
    }

    /// Image the failure belongs to, for per-image failures.
    pub fn image_id(&self) -> Option<&str> {
        match self {
            GroupingError::InvalidImage { image_id, .. }
            | GroupingError::ModelUnavailable { image_id, .. } => Some(image_id),
            _ => None,
        }
    }
}
