use serde::{Deserialize, Serialize};

use crate::clustering::cluster_labeling::ClusterLabeling;
use crate::clustering::dbscan::dbscan;
use crate::clustering::distance_matrix::DistanceMatrix;
use crate::clustering::neighborhood::{CandidateGraph, Neighborhood};
use crate::clustering::similarity_matrix::{
    NormalizedEmbeddings, PairwiseSimilarity, SimilarityMatrix,
};
use crate::shared::constants::{
    DEFAULT_CANDIDATE_NEIGHBORS, DEFAULT_EXACT_PAIR_LIMIT, DEFAULT_MIN_SAMPLES,
    DEFAULT_RADIUS_MAX, DEFAULT_RADIUS_MIN, DEFAULT_RADIUS_STEPS, DEFAULT_TARGET_CLUSTERS,
};
use crate::shared::error::GroupingError;
use crate::shared::vector_math::linspace;
use crate::store::face_record::FaceRecord;
use crate::store::similarity_index::SimilarityIndex;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Search the radius; otherwise cluster once at the caller's threshold.
    pub adaptive: bool,
    pub target_clusters: usize,
    pub radius_min: f64,
    pub radius_max: f64,
    pub radius_steps: usize,
    /// Minimum neighborhood size (self included) for a core face.
    pub min_samples: usize,
    /// Above this many faces, neighborhoods come from the similarity index
    /// instead of the full pairwise matrix.
    pub exact_pair_limit: usize,
    pub candidate_neighbors: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            adaptive: true,
            target_clusters: DEFAULT_TARGET_CLUSTERS,
            radius_min: DEFAULT_RADIUS_MIN,
            radius_max: DEFAULT_RADIUS_MAX,
            radius_steps: DEFAULT_RADIUS_STEPS,
            min_samples: DEFAULT_MIN_SAMPLES,
            exact_pair_limit: DEFAULT_EXACT_PAIR_LIMIT,
            candidate_neighbors: DEFAULT_CANDIDATE_NEIGHBORS,
        }
    }
}

/// Cluster count observed at one candidate radius.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SweepStep {
    pub radius: f64,
    pub cluster_count: usize,
}

/// Where group similarity is read from after clustering.
pub enum BatchSimilarity {
    Dense(SimilarityMatrix),
    /// Large batches skip the full matrix; pairs are computed when asked.
    OnDemand(NormalizedEmbeddings),
}

impl PairwiseSimilarity for BatchSimilarity {
    fn len(&self) -> usize {
        match self {
            Self::Dense(m) => m.len(),
            Self::OnDemand(e) => e.len(),
        }
    }

    fn similarity(&self, i: usize, j: usize) -> f64 {
        match self {
            Self::Dense(m) => m.similarity(i, j),
            Self::OnDemand(e) => e.similarity(i, j),
        }
    }
}

pub struct ClusteringOutcome {
    pub labeling: ClusterLabeling,
    /// Radius the final labeling was produced with.
    pub radius: f64,
    /// Empty when the search is disabled.
    pub sweep: Vec<SweepStep>,
    pub similarity: BatchSimilarity,
}

/// Quality-weighted density clustering with a searched neighborhood radius.
pub struct AdaptiveClusterer {
    config: ClusteringConfig,
}

impl AdaptiveClusterer {
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Labels every record of the batch.
    ///
    /// `fixed_radius` is used when the search is disabled or yields no
    /// candidate. `index`, when it covers every record, is only consulted
    /// for batches larger than `exact_pair_limit`.
    pub fn cluster(
        &self,
        records: &[FaceRecord],
        fixed_radius: f64,
        index: Option<&dyn SimilarityIndex>,
    ) -> Result<ClusteringOutcome, GroupingError> {
        let embeddings = NormalizedEmbeddings::from_records(records)?;
        let index = index.filter(|index| {
            records.len() > self.config.exact_pair_limit && index.len() == records.len()
        });

        match index {
            Some(index) => {
                let graph = CandidateGraph::from_index(
                    index,
                    records,
                    &embeddings,
                    self.config.candidate_neighbors,
                );
                log::info!(
                    "Clustering {} faces over {} candidate pairs",
                    records.len(),
                    graph.edge_count()
                );
                let (labeling, radius, sweep) = self.search(&graph, fixed_radius);
                Ok(ClusteringOutcome {
                    labeling,
                    radius,
                    sweep,
                    similarity: BatchSimilarity::OnDemand(embeddings),
                })
            }
            None => {
                let similarity = SimilarityMatrix::from_embeddings(&embeddings);
                let quality: Vec<f64> = records.iter().map(|r| r.quality_score()).collect();
                let distances = DistanceMatrix::quality_adjusted(&similarity, &quality);
                let (labeling, radius, sweep) = self.search(&distances, fixed_radius);
                Ok(ClusteringOutcome {
                    labeling,
                    radius,
                    sweep,
                    similarity: BatchSimilarity::Dense(similarity),
                })
            }
        }
    }

    fn search(
        &self,
        points: &dyn Neighborhood,
        fixed_radius: f64,
    ) -> (ClusterLabeling, f64, Vec<SweepStep>) {
        let min_samples = self.config.min_samples;
        let sweep: Vec<SweepStep> = if self.config.adaptive {
            linspace(
                self.config.radius_min,
                self.config.radius_max,
                self.config.radius_steps,
            )
            .into_iter()
            .map(|radius| {
                let cluster_count = dbscan(points, radius, min_samples).cluster_count();
                log::debug!("radius {radius:.3}: {cluster_count} clusters");
                SweepStep {
                    radius,
                    cluster_count,
                }
            })
            .collect()
        } else {
            Vec::new()
        };

        let radius = select_radius(&sweep, self.config.target_clusters).unwrap_or(fixed_radius);
        let labeling = dbscan(points, radius, min_samples);
        log::info!(
            "Selected radius {radius:.3}: {} clusters, {} noise faces",
            labeling.cluster_count(),
            labeling.noise_count()
        );
        (labeling, radius, sweep)
    }
}

/// Radius whose cluster count is closest to `target`; the earliest step
/// wins ties.
pub fn select_radius(sweep: &[SweepStep], target: usize) -> Option<f64> {
    let mut best: Option<(usize, f64)> = None;
    for step in sweep {
        let gap = step.cluster_count.abs_diff(target);
        if best.map_or(true, |(best_gap, _)| gap < best_gap) {
            best = Some((gap, step.radius));
        }
    }
    best.map(|(_, radius)| radius)
}
