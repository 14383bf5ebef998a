use crate::clustering::distance_matrix::{adjusted_distance, quality_weight, DistanceMatrix};
use crate::clustering::similarity_matrix::{NormalizedEmbeddings, PairwiseSimilarity};
use crate::store::face_record::FaceRecord;
use crate::store::similarity_index::SimilarityIndex;

/// Radius queries over the faces of one batch.
pub trait Neighborhood {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every point within `radius` of `point` (inclusive), the point itself
    /// included, in ascending index order.
    fn neighbors_within(&self, point: usize, radius: f64) -> Vec<usize>;
}

impl Neighborhood for DistanceMatrix {
    fn len(&self) -> usize {
        DistanceMatrix::len(self)
    }

    fn neighbors_within(&self, point: usize, radius: f64) -> Vec<usize> {
        (0..DistanceMatrix::len(self))
            .filter(|&j| self.distance(point, j) <= radius)
            .collect()
    }
}

/// Sparse neighborhood built from a similarity index: each face is linked
/// to its nearest candidates, links are made symmetric, and every kept
/// edge carries the exact quality-adjusted distance.
///
/// Pairs the index never proposes are treated as out of range.
pub struct CandidateGraph {
    edges: Vec<Vec<(usize, f64)>>,
}

impl CandidateGraph {
    pub fn from_index(
        index: &dyn SimilarityIndex,
        records: &[FaceRecord],
        embeddings: &NormalizedEmbeddings,
        candidates: usize,
    ) -> Self {
        let n = records.len();
        let mut edges: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for (i, record) in records.iter().enumerate() {
            for neighbor in index.search(record.embedding(), candidates + 1) {
                let j = neighbor.index;
                if j == i || j >= n {
                    continue;
                }
                let weight = quality_weight(record.quality_score(), records[j].quality_score());
                let d = adjusted_distance(embeddings.similarity(i, j), weight);
                edges[i].push((j, d));
                edges[j].push((i, d));
            }
        }
        for list in &mut edges {
            list.sort_by_key(|&(j, _)| j);
            list.dedup_by_key(|&mut (j, _)| j);
        }
        Self { edges }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum::<usize>() / 2
    }
}

impl Neighborhood for CandidateGraph {
    fn len(&self) -> usize {
        self.edges.len()
    }

    fn neighbors_within(&self, point: usize, radius: f64) -> Vec<usize> {
        let mut out: Vec<usize> = self.edges[point]
            .iter()
            .filter(|&&(_, d)| d <= radius)
            .map(|&(j, _)| j)
            .collect();
        let at = out.partition_point(|&j| j < point);
        out.insert(at, point);
        out
    }
}
