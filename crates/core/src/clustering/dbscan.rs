use crate::clustering::cluster_labeling::{ClusterLabel, ClusterLabeling};
use crate::clustering::neighborhood::Neighborhood;

/// Density-based clustering over a precomputed neighborhood.
///
/// A point is a core point when at least `min_samples` points (itself
/// included) lie within `radius`. Clusters grow from core points in index
/// order; border points join the first cluster that reaches them and
/// everything unreached is noise. Never fails: an empty or all-noise
/// labeling is a valid result.
pub fn dbscan(points: &dyn Neighborhood, radius: f64, min_samples: usize) -> ClusterLabeling {
    let n = points.len();
    let neighborhoods: Vec<Vec<usize>> = (0..n)
        .map(|i| points.neighbors_within(i, radius))
        .collect();
    let is_core: Vec<bool> = neighborhoods
        .iter()
        .map(|neighbors| neighbors.len() >= min_samples)
        .collect();

    let mut labels = vec![ClusterLabel::Noise; n];
    let mut next_label = 0;
    let mut stack = Vec::new();

    for seed in 0..n {
        if labels[seed] != ClusterLabel::Noise || !is_core[seed] {
            continue;
        }
        let mut i = seed;
        loop {
            if labels[i] == ClusterLabel::Noise {
                labels[i] = ClusterLabel::Cluster(next_label);
                if is_core[i] {
                    stack.extend(
                        neighborhoods[i]
                            .iter()
                            .copied()
                            .filter(|&j| labels[j] == ClusterLabel::Noise),
                    );
                }
            }
            match stack.pop() {
                Some(j) => i = j,
                None => break,
            }
        }
        next_label += 1;
    }

    ClusterLabeling::new(labels)
}
