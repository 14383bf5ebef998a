use ndarray::Array2;

use crate::clustering::similarity_matrix::SimilarityMatrix;

/// Lower bound on the pair weight: a low-quality pair is never pushed more
/// than 2× further apart.
pub const MIN_QUALITY_WEIGHT: f64 = 0.5;

/// Weight of a pair of faces: the square root of the weaker quality score,
/// floored at [`MIN_QUALITY_WEIGHT`].
pub fn quality_weight(quality_a: f64, quality_b: f64) -> f64 {
    quality_a.min(quality_b).sqrt().max(MIN_QUALITY_WEIGHT)
}

/// `1 - similarity`, scaled up by the inverse pair weight and kept
/// non-negative.
pub fn adjusted_distance(similarity: f64, weight: f64) -> f64 {
    ((1.0 - similarity) / weight).max(0.0)
}

/// Symmetric N×N matrix of quality-adjusted distances with a zero diagonal.
#[derive(Clone, Debug)]
pub struct DistanceMatrix {
    values: Array2<f64>,
}

impl DistanceMatrix {
    pub fn quality_adjusted(similarity: &SimilarityMatrix, quality: &[f64]) -> Self {
        let sim = similarity.values();
        let n = sim.nrows();
        debug_assert_eq!(n, quality.len());
        let mut values = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in (i + 1)..n {
                let d = adjusted_distance(sim[[i, j]], quality_weight(quality[i], quality[j]));
                values[[i, j]] = d;
                values[[j, i]] = d;
            }
        }
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.values[[i, j]]
    }
}
