use ndarray::{Array2, ArrayView2};

use crate::shared::error::GroupingError;
use crate::store::face_record::{embedding_dimension, FaceRecord};

/// Read access to cosine similarity between two faces of a batch.
pub trait PairwiseSimilarity {
    fn len(&self) -> usize;

    /// Cosine similarity clipped to `[0, 1]`; a face is fully similar to
    /// itself.
    fn similarity(&self, i: usize, j: usize) -> f64;
}

/// Unit-length copies of the batch embeddings, one row per face.
///
/// Normalization runs in `f64` so extreme magnitudes neither overflow nor
/// underflow. A zero vector stays zero and is similar to nothing but
/// itself.
#[derive(Clone, Debug)]
pub struct NormalizedEmbeddings {
    rows: Array2<f64>,
}

impl NormalizedEmbeddings {
    /// Fails when the records disagree on dimensionality or carry
    /// non-finite values.
    pub fn from_records(records: &[FaceRecord]) -> Result<Self, GroupingError> {
        let dim = embedding_dimension(records)?.unwrap_or(0);
        let mut rows = Array2::<f64>::zeros((records.len(), dim));
        for (mut row, record) in rows.outer_iter_mut().zip(records) {
            let norm = record
                .embedding()
                .iter()
                .map(|&x| (x as f64) * (x as f64))
                .sum::<f64>()
                .sqrt();
            if norm > 0.0 && norm.is_finite() {
                for (out, &x) in row.iter_mut().zip(record.embedding()) {
                    *out = x as f64 / norm;
                }
            }
        }
        Ok(Self { rows })
    }
}

impl PairwiseSimilarity for NormalizedEmbeddings {
    fn len(&self) -> usize {
        self.rows.nrows()
    }

    fn similarity(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 1.0;
        }
        self.rows.row(i).dot(&self.rows.row(j)).clamp(0.0, 1.0)
    }
}

/// Dense N×N cosine similarity matrix: symmetric, unit diagonal, every
/// entry in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct SimilarityMatrix {
    values: Array2<f64>,
}

impl SimilarityMatrix {
    pub fn from_embeddings(embeddings: &NormalizedEmbeddings) -> Self {
        let n = embeddings.len();
        let gram = embeddings.rows.dot(&embeddings.rows.t());
        let mut values = Array2::<f64>::eye(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let s = gram[[i, j]].clamp(0.0, 1.0);
                values[[i, j]] = s;
                values[[j, i]] = s;
            }
        }
        Self { values }
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }
}

impl PairwiseSimilarity for SimilarityMatrix {
    fn len(&self) -> usize {
        self.values.nrows()
    }

    fn similarity(&self, i: usize, j: usize) -> f64 {
        self.values[[i, j]]
    }
}
