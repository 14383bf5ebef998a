use std::collections::HashSet;

use smartcore::cluster::kmeans::{KMeans, KMeansParameters};
use smartcore::linalg::basic::arrays::Array2;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::shared::constants::INDEX_TRAINING_SEED;
use crate::shared::vector_math::{l2_normalize, squared_l2};
use crate::store::flat_index::nearest;
use crate::store::similarity_index::{IndexBuildError, IndexKind, Neighbor, SimilarityIndex};

/// Approximate index that partitions vectors around k-means centroids and
/// scans only the partitions nearest to each query.
pub struct PartitionedIndex {
    vectors: Vec<Vec<f32>>,
    partitions: usize,
    /// Non-empty partitions only.
    centroids: Vec<Vec<f32>>,
    lists: Vec<Vec<usize>>,
    probes: usize,
}

impl PartitionedIndex {
    /// Trains `partitions` centroids with seeded k-means, so training is
    /// deterministic for a given input order.
    pub fn train(
        vectors: &[Vec<f32>],
        partitions: usize,
        iterations: usize,
        probes: usize,
    ) -> Result<Self, IndexBuildError> {
        if vectors.is_empty() {
            return Err(IndexBuildError::EmptyTrainingSet);
        }
        if partitions == 0 || vectors.len() < partitions {
            return Err(IndexBuildError::InsufficientTrainingData {
                samples: vectors.len(),
                partitions,
            });
        }

        let vectors: Vec<Vec<f32>> = vectors
            .iter()
            .map(|v| {
                let mut v = v.clone();
                l2_normalize(&mut v);
                v
            })
            .collect();

        let distinct = distinct_count(&vectors);
        if distinct < partitions {
            return Err(IndexBuildError::DegenerateTrainingData {
                distinct,
                partitions,
            });
        }

        let assignments = fit_assignments(&vectors, partitions, iterations)?;

        let mut members = vec![Vec::new(); partitions];
        for (i, &c) in assignments.iter().enumerate() {
            let slot = members
                .get_mut(c)
                .ok_or_else(|| IndexBuildError::Training(format!("unknown partition {c}")))?;
            slot.push(i);
        }
        let lists: Vec<Vec<usize>> = members.into_iter().filter(|l| !l.is_empty()).collect();
        let centroids = lists.iter().map(|list| centroid(&vectors, list)).collect();

        Ok(Self {
            vectors,
            partitions,
            centroids,
            probes: probes.clamp(1, partitions),
            lists,
        })
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }
}

impl SimilarityIndex for PartitionedIndex {
    fn kind(&self) -> IndexKind {
        IndexKind::Partitioned {
            partitions: self.partitions(),
        }
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn search(&self, query: &[f32], k: usize) -> Vec<Neighbor> {
        let mut query = query.to_vec();
        l2_normalize(&mut query);

        let ranked = nearest(
            self.centroids
                .iter()
                .enumerate()
                .map(|(index, c)| Neighbor {
                    index,
                    distance: squared_l2(&query, c),
                })
                .collect(),
            self.probes,
        );

        let candidates = ranked
            .iter()
            .flat_map(|p| self.lists[p.index].iter())
            .map(|&index| Neighbor {
                index,
                distance: squared_l2(&query, &self.vectors[index]),
            })
            .collect();
        nearest(candidates, k)
    }
}

fn distinct_count(vectors: &[Vec<f32>]) -> usize {
    let mut seen: HashSet<Vec<u32>> = HashSet::new();
    vectors
        .iter()
        .filter(|v| seen.insert(v.iter().map(|x| x.to_bits()).collect()))
        .count()
}

/// Partition of each vector after a seeded k-means fit.
fn fit_assignments(
    vectors: &[Vec<f32>],
    k: usize,
    max_iter: usize,
) -> Result<Vec<usize>, IndexBuildError> {
    let (n, f) = (vectors.len(), vectors[0].len());
    let x: DenseMatrix<f64> = DenseMatrix::from_iterator(
        vectors.iter().flatten().map(|&v| v as f64),
        n,
        f,
        0,
    );

    let params = KMeansParameters {
        k,
        max_iter: max_iter.max(1),
        seed: Some(INDEX_TRAINING_SEED),
    };
    let model: KMeans<f64, usize, DenseMatrix<f64>, Vec<usize>> =
        KMeans::fit(&x, params).map_err(|e| IndexBuildError::Training(e.to_string()))?;
    model
        .predict(&x)
        .map_err(|e| IndexBuildError::Training(e.to_string()))
}

fn centroid(vectors: &[Vec<f32>], members: &[usize]) -> Vec<f32> {
    let dim = vectors[members[0]].len();
    let mut sum = vec![0.0f64; dim];
    for &i in members {
        for (s, &x) in sum.iter_mut().zip(&vectors[i]) {
            *s += x as f64;
        }
    }
    sum.into_iter()
        .map(|s| (s / members.len() as f64) as f32)
        .collect()
}
