/// Density-clustering label of one face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClusterLabel {
    Noise,
    Cluster(usize),
}

/// One label per face of the batch. Clusters are numbered `0..cluster_count`
/// in discovery order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterLabeling {
    labels: Vec<ClusterLabel>,
    cluster_count: usize,
}

impl ClusterLabeling {
    pub fn new(labels: Vec<ClusterLabel>) -> Self {
        let cluster_count = labels
            .iter()
            .filter_map(|l| match l {
                ClusterLabel::Cluster(c) => Some(c + 1),
                ClusterLabel::Noise => None,
            })
            .max()
            .unwrap_or(0);
        Self {
            labels,
            cluster_count,
        }
    }

    pub fn all_noise(len: usize) -> Self {
        Self::new(vec![ClusterLabel::Noise; len])
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[ClusterLabel] {
        &self.labels
    }

    pub fn label(&self, face: usize) -> ClusterLabel {
        self.labels[face]
    }

    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    pub fn noise_count(&self) -> usize {
        self.labels
            .iter()
            .filter(|l| **l == ClusterLabel::Noise)
            .count()
    }

    /// No face belongs to a cluster. Valid, just nothing grouped.
    pub fn is_degenerate(&self) -> bool {
        self.cluster_count == 0
    }

    /// Member face indices of every cluster, indexed by cluster number.
    pub fn clusters(&self) -> Vec<Vec<usize>> {
        let mut clusters = vec![Vec::new(); self.cluster_count];
        for (face, label) in self.labels.iter().enumerate() {
            if let ClusterLabel::Cluster(c) = label {
                clusters[*c].push(face);
            }
        }
        clusters
    }

    pub fn noise(&self) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == ClusterLabel::Noise)
            .map(|(face, _)| face)
            .collect()
    }
}
