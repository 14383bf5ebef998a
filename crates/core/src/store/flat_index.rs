use crate::shared::vector_math::{l2_normalize, squared_l2};
use crate::store::similarity_index::{IndexKind, Neighbor, SimilarityIndex};

/// Brute-force exact index: every query scans every stored vector.
pub struct FlatIndex {
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    pub fn new(mut vectors: Vec<Vec<f32>>) -> Self {
        for v in &mut vectors {
            l2_normalize(v);
        }
        Self { vectors }
    }
}

impl SimilarityIndex for FlatIndex {
    fn kind(&self) -> IndexKind {
        IndexKind::Exact
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn search(&self, query: &[f32], k: usize) -> Vec<Neighbor> {
        let mut query = query.to_vec();
        l2_normalize(&mut query);
        let candidates = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, v)| Neighbor {
                index,
                distance: squared_l2(&query, v),
            })
            .collect();
        nearest(candidates, k)
    }
}

/// Sorts by distance, then index, and keeps the first `k`.
pub(crate) fn nearest(mut candidates: Vec<Neighbor>, k: usize) -> Vec<Neighbor> {
    candidates.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then(a.index.cmp(&b.index))
    });
    candidates.truncate(k);
    candidates
}
