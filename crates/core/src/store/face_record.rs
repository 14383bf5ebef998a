use crate::shared::error::GroupingError;

/// One accepted face: its embedding, usability score and source image.
///
/// Quality is normalized into (0, 1] at construction; NaN is read as the
/// least trusted score.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceRecord {
    embedding: Vec<f32>,
    quality_score: f64,
    image_id: String,
}

impl FaceRecord {
    pub fn new(embedding: Vec<f32>, quality_score: f64, image_id: impl Into<String>) -> Self {
        let quality_score = if quality_score.is_nan() {
            f64::MIN_POSITIVE
        } else {
            quality_score.clamp(f64::MIN_POSITIVE, 1.0)
        };
        Self {
            embedding,
            quality_score,
            image_id: image_id.into(),
        }
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn quality_score(&self) -> f64 {
        self.quality_score
    }

    pub fn image_id(&self) -> &str {
        &self.image_id
    }
}

/// Shared embedding dimensionality of `records`, `None` when empty.
///
/// Fails on the first record whose length differs from the first
/// record's, or whose values are not all finite.
pub fn embedding_dimension(records: &[FaceRecord]) -> Result<Option<usize>, GroupingError> {
    let Some(first) = records.first() else {
        return Ok(None);
    };
    let expected = first.embedding().len();
    for (index, record) in records.iter().enumerate() {
        let actual = record.embedding().len();
        if actual != expected {
            return Err(GroupingError::EmbeddingDimensionMismatch {
                index,
                expected,
                actual,
            });
        }
        if record.embedding().iter().any(|v| !v.is_finite()) {
            return Err(GroupingError::NonFiniteEmbedding { index });
        }
    }
    Ok(Some(expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::distance_matrix::{quality_weight, MIN_QUALITY_WEIGHT};
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.8, 0.8)]
    #[case(1.5, 1.0)]
    #[case(f64::NAN, f64::MIN_POSITIVE)]
    #[case(-0.2, f64::MIN_POSITIVE)]
    fn test_quality_is_normalized(#[case] input: f64, #[case] expected: f64) {
        let r = FaceRecord::new(vec![1.0], input, "a");
        assert_relative_eq!(r.quality_score(), expected);
    }

    #[test]
    fn test_nan_quality_gets_the_weight_floor() {
        let nan = FaceRecord::new(vec![1.0], f64::NAN, "a");
        let poor = FaceRecord::new(vec![1.0], 0.0, "b");
        assert_eq!(nan.quality_score(), poor.quality_score());
        assert_relative_eq!(
            quality_weight(nan.quality_score(), 1.0),
            MIN_QUALITY_WEIGHT
        );
    }

    #[test]
    fn test_dimension_of_empty_is_none() {
        assert_eq!(embedding_dimension(&[]), Ok(None));
    }

    #[test]
    fn test_dimension_consistent() {
        let records = vec![
            FaceRecord::new(vec![1.0, 0.0, 0.0], 1.0, "a"),
            FaceRecord::new(vec![0.0, 1.0, 0.0], 1.0, "b"),
        ];
        assert_eq!(embedding_dimension(&records), Ok(Some(3)));
    }

    #[test]
    fn test_dimension_mismatch_reports_index() {
        let records = vec![
            FaceRecord::new(vec![1.0, 0.0, 0.0], 1.0, "a"),
            FaceRecord::new(vec![0.0, 1.0, 0.0], 1.0, "b"),
            FaceRecord::new(vec![0.0, 1.0], 1.0, "c"),
        ];
        assert_eq!(
            embedding_dimension(&records),
            Err(GroupingError::EmbeddingDimensionMismatch {
                index: 2,
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let records = vec![
            FaceRecord::new(vec![1.0, 0.0], 1.0, "a"),
            FaceRecord::new(vec![f32::NAN, 1.0], 1.0, "b"),
        ];
        assert_eq!(
            embedding_dimension(&records),
            Err(GroupingError::NonFiniteEmbedding { index: 1 })
        );
    }
}
