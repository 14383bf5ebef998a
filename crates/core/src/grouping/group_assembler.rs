use std::collections::HashSet;

use crate::clustering::cluster_labeling::ClusterLabeling;
use crate::clustering::similarity_matrix::PairwiseSimilarity;
use crate::grouping::group::Group;
use crate::store::face_record::FaceRecord;

/// Maps face-level cluster labels back to image-level groups.
pub struct GroupAssembler;

impl GroupAssembler {
    /// One group per cluster in label order, then the residual group when
    /// anything is left over.
    ///
    /// The residual group collects every batch image with no clustered face
    /// (in batch order), followed by noise-only images that were not part of
    /// `batch_image_ids` (e.g. faces restored from a snapshot).
    pub fn assemble(
        records: &[FaceRecord],
        labeling: &ClusterLabeling,
        similarity: &dyn PairwiseSimilarity,
        batch_image_ids: &[String],
    ) -> Vec<Group> {
        debug_assert_eq!(records.len(), labeling.len());
        let mut groups = Vec::with_capacity(labeling.cluster_count() + 1);
        let mut grouped: HashSet<&str> = HashSet::new();

        for (label, members) in labeling.clusters().into_iter().enumerate() {
            let ids = members.iter().map(|&face| records[face].image_id());
            grouped.extend(ids.clone());
            groups.push(Group::cluster(
                label,
                ids.map(str::to_string),
                mean_pairwise_similarity(&members, similarity),
                members.len(),
            ));
        }

        let leftover: Vec<String> = batch_image_ids
            .iter()
            .map(String::as_str)
            .chain(labeling.noise().into_iter().map(|face| records[face].image_id()))
            .filter(|id| !grouped.contains(id))
            .map(str::to_string)
            .collect();
        if !leftover.is_empty() {
            groups.push(Group::residual(leftover));
        }
        groups
    }
}

/// Mean similarity over the unordered member pairs; `0.0` for a cluster
/// with fewer than two faces.
fn mean_pairwise_similarity(members: &[usize], similarity: &dyn PairwiseSimilarity) -> f64 {
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (a, &i) in members.iter().enumerate() {
        for &j in &members[a + 1..] {
            total += similarity.similarity(i, j);
            pairs += 1;
        }
    }
    if pairs == 0 {
        0.0
    } else {
        total / pairs as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::cluster_labeling::ClusterLabel::{Cluster, Noise};
    use crate::clustering::similarity_matrix::{NormalizedEmbeddings, SimilarityMatrix};
    use crate::grouping::group::RESIDUAL_GROUP_ID;
    use approx::assert_relative_eq;

    fn records(faces: &[(&str, Vec<f32>)]) -> Vec<FaceRecord> {
        faces
            .iter()
            .map(|(id, e)| FaceRecord::new(e.clone(), 0.9, *id))
            .collect()
    }

    fn matrix(records: &[FaceRecord]) -> SimilarityMatrix {
        SimilarityMatrix::from_embeddings(&NormalizedEmbeddings::from_records(records).unwrap())
    }

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_two_identical_faces_form_one_group() {
        let records = records(&[("img1", vec![0.6, 0.8]), ("img2", vec![0.6, 0.8])]);
        let labeling = ClusterLabeling::new(vec![Cluster(0), Cluster(0)]);
        let groups = GroupAssembler::assemble(
            &records,
            &labeling,
            &matrix(&records),
            &ids(&["img1", "img2"]),
        );

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].image_ids(), &["img1", "img2"]);
        assert_relative_eq!(groups[0].similarity_score(), 1.0, epsilon = 1e-9);
        assert_eq!(groups[0].face_count(), 2);
    }

    #[test]
    fn test_multi_face_image_is_listed_once() {
        let records = records(&[
            ("a", vec![1.0, 0.0]),
            ("a", vec![1.0, 0.0]),
            ("b", vec![1.0, 0.0]),
        ]);
        let labeling = ClusterLabeling::new(vec![Cluster(0); 3]);
        let groups = GroupAssembler::assemble(&records, &labeling, &matrix(&records), &ids(&["a", "b"]));
        assert_eq!(groups[0].image_ids(), &["a", "b"]);
        assert_eq!(groups[0].face_count(), 3);
    }

    #[test]
    fn test_group_similarity_is_mean_over_pairs() {
        let records = records(&[
            ("a", vec![1.0, 0.0]),
            ("b", vec![1.0, 0.0]),
            ("c", vec![0.0, 1.0]),
        ]);
        let labeling = ClusterLabeling::new(vec![Cluster(0); 3]);
        let groups = GroupAssembler::assemble(&records, &labeling, &matrix(&records), &[]);
        // Pairs: (a,b)=1, (a,c)=0, (b,c)=0.
        assert_relative_eq!(groups[0].similarity_score(), 1.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_noise_and_faceless_images_go_to_residual_last() {
        let records = records(&[
            ("img1", vec![1.0, 0.0]),
            ("img2", vec![1.0, 0.0]),
            ("img3", vec![0.0, 1.0]),
        ]);
        let labeling = ClusterLabeling::new(vec![Cluster(0), Cluster(0), Noise]);
        let groups = GroupAssembler::assemble(
            &records,
            &labeling,
            &matrix(&records),
            &ids(&["img1", "img4", "img2", "img3"]),
        );

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].image_ids(), &["img1", "img2"]);
        let residual = &groups[1];
        assert_eq!(residual.group_id(), RESIDUAL_GROUP_ID);
        assert_eq!(residual.image_ids(), &["img4", "img3"]);
        assert_eq!(residual.similarity_score(), 0.0);
        assert_eq!(residual.face_count(), 0);
    }

    #[test]
    fn test_image_with_a_clustered_face_is_not_residual() {
        let records = records(&[
            ("a", vec![1.0, 0.0]),
            ("b", vec![1.0, 0.0]),
            ("b", vec![0.0, 1.0]),
        ]);
        let labeling = ClusterLabeling::new(vec![Cluster(0), Cluster(0), Noise]);
        let groups = GroupAssembler::assemble(&records, &labeling, &matrix(&records), &ids(&["a", "b"]));
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_all_noise_yields_residual_only() {
        let records = records(&[("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0])]);
        let labeling = ClusterLabeling::all_noise(2);
        let groups = GroupAssembler::assemble(&records, &labeling, &matrix(&records), &ids(&["a", "b"]));
        assert_eq!(groups.len(), 1);
        assert!(groups[0].is_residual());
        assert_eq!(groups[0].image_ids(), &["a", "b"]);
    }

    #[test]
    fn test_restored_noise_faces_outside_the_batch_are_kept() {
        let records = records(&[("old", vec![1.0, 0.0])]);
        let labeling = ClusterLabeling::all_noise(1);
        let groups = GroupAssembler::assemble(&records, &labeling, &matrix(&records), &[]);
        assert_eq!(groups[0].image_ids(), &["old"]);
    }

    #[test]
    fn test_nothing_submitted_yields_no_groups() {
        let labeling = ClusterLabeling::new(Vec::new());
        let groups = GroupAssembler::assemble(&[], &labeling, &matrix(&[]), &[]);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_clusters_keep_label_order() {
        let records = records(&[
            ("x", vec![0.0, 1.0]),
            ("y", vec![1.0, 0.0]),
            ("z", vec![0.0, 1.0]),
            ("w", vec![1.0, 0.0]),
        ]);
        let labeling = ClusterLabeling::new(vec![Cluster(0), Cluster(1), Cluster(0), Cluster(1)]);
        let groups = GroupAssembler::assemble(&records, &labeling, &matrix(&records), &[]);
        assert_eq!(groups[0].group_id(), "0");
        assert_eq!(groups[0].image_ids(), &["x", "z"]);
        assert_eq!(groups[1].group_id(), "1");
        assert_eq!(groups[1].image_ids(), &["y", "w"]);
    }
}
