use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    EXACT_INDEX_CUTOFF, INDEX_PROBES, INDEX_TRAINING_ITERATIONS, MAX_PARTITIONS,
    RECORDS_PER_PARTITION,
};
use crate::store::flat_index::FlatIndex;
use crate::store::partitioned_index::PartitionedIndex;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexBuildError {
    #[error("no vectors to train on")]
    EmptyTrainingSet,
    #[error("cannot train {partitions} partitions from {samples} samples")]
    InsufficientTrainingData { samples: usize, partitions: usize },
    #[error("only {distinct} distinct vectors for {partitions} partitions")]
    DegenerateTrainingData { distinct: usize, partitions: usize },
    #[error("k-means training failed: {0}")]
    Training(String),
}

/// Which index flavor a store ended up with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    Exact,
    Partitioned { partitions: usize },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    /// Squared L2 distance between unit vectors (`2 - 2 * cosine`).
    pub distance: f32,
}

/// Nearest-neighbor lookup over the store's (unit-normalized) embeddings.
///
/// Used to generate candidate pairs when the full pairwise matrix is too
/// costly; exact clustering never needs it.
pub trait SimilarityIndex: Send + Sync {
    fn kind(&self) -> IndexKind;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Up to `k` stored vectors closest to `query`, nearest first, ties
    /// broken by insertion order.
    fn search(&self, query: &[f32], k: usize) -> Vec<Neighbor>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub enabled: bool,
    /// Stores with fewer records use the exact index.
    pub exact_cutoff: usize,
    pub records_per_partition: usize,
    pub max_partitions: usize,
    pub training_iterations: usize,
    /// Partitions scanned per query.
    pub probes: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            exact_cutoff: EXACT_INDEX_CUTOFF,
            records_per_partition: RECORDS_PER_PARTITION,
            max_partitions: MAX_PARTITIONS,
            training_iterations: INDEX_TRAINING_ITERATIONS,
            probes: INDEX_PROBES,
        }
    }
}

impl IndexConfig {
    pub fn partitions_for(&self, records: usize) -> usize {
        (records / self.records_per_partition.max(1)).min(self.max_partitions)
    }
}

/// Builds the index flavor suited to the number of vectors.
///
/// Below `exact_cutoff` the exact index is used. Above it a partitioned
/// index is trained; a training failure degrades to the exact index.
pub fn build_index(vectors: Vec<Vec<f32>>, config: &IndexConfig) -> Box<dyn SimilarityIndex> {
    if vectors.len() < config.exact_cutoff {
        log::info!("Using exact index for {} faces", vectors.len());
        return Box::new(FlatIndex::new(vectors));
    }

    let partitions = config.partitions_for(vectors.len());
    match PartitionedIndex::train(&vectors, partitions, config.training_iterations, config.probes)
    {
        Ok(index) => {
            log::info!(
                "Using partitioned index for {} faces ({partitions} partitions)",
                vectors.len()
            );
            Box::new(index)
        }
        Err(e) => {
            log::warn!("Partitioned index training failed ({e}), falling back to exact index");
            Box::new(FlatIndex::new(vectors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn spread_vectors(n: usize) -> Vec<Vec<f32>> {
        (0..n)
            .map(|i| {
                let a = i as f32 * 0.37;
                vec![a.cos(), a.sin(), (i % 7) as f32 * 0.1]
            })
            .collect()
    }

    #[rstest]
    #[case(9, 0)]
    #[case(25, 2)]
    #[case(5000, 100)]
    fn test_partitions_for(#[case] records: usize, #[case] expected: usize) {
        assert_eq!(IndexConfig::default().partitions_for(records), expected);
    }

    #[test]
    fn test_small_store_uses_exact_index() {
        let index = build_index(spread_vectors(9), &IndexConfig::default());
        assert_eq!(index.kind(), IndexKind::Exact);
        assert_eq!(index.len(), 9);
    }

    #[test]
    fn test_large_store_uses_partitioned_index() {
        let index = build_index(spread_vectors(40), &IndexConfig::default());
        assert_eq!(index.kind(), IndexKind::Partitioned { partitions: 4 });
        assert_eq!(index.len(), 40);
    }

    #[test]
    fn test_training_failure_falls_back_to_exact() {
        // Identical vectors cannot seed several distinct partitions.
        let vectors = vec![vec![1.0, 0.0]; 30];
        let index = build_index(vectors, &IndexConfig::default());
        assert_eq!(index.kind(), IndexKind::Exact);
        assert_eq!(index.len(), 30);
    }
}
