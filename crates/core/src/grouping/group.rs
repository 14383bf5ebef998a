use std::collections::HashSet;

use serde::Serialize;

pub const RESIDUAL_GROUP_ID: &str = "ungrouped";
pub const RESIDUAL_GROUP_NAME: &str = "Other images";

/// Image-level result of one grouping request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Group {
    group_id: String,
    name: String,
    image_ids: Vec<String>,
    similarity_score: f64,
    face_count: usize,
    residual: bool,
}

impl Group {
    /// Group for one cluster label. Image ids keep their first-seen order
    /// with repeats dropped; the score is clamped to `[0, 1]`.
    pub fn cluster(
        label: usize,
        image_ids: impl IntoIterator<Item = String>,
        similarity_score: f64,
        face_count: usize,
    ) -> Self {
        Self {
            group_id: label.to_string(),
            name: format!("Group {label}"),
            image_ids: dedup_in_order(image_ids),
            similarity_score: similarity_score.clamp(0.0, 1.0),
            face_count,
            residual: false,
        }
    }

    /// Catch-all group for images without a clustered face.
    pub fn residual(image_ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            group_id: RESIDUAL_GROUP_ID.to_string(),
            name: RESIDUAL_GROUP_NAME.to_string(),
            image_ids: dedup_in_order(image_ids),
            similarity_score: 0.0,
            face_count: 0,
            residual: true,
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image_ids(&self) -> &[String] {
        &self.image_ids
    }

    pub fn similarity_score(&self) -> f64 {
        self.similarity_score
    }

    pub fn face_count(&self) -> usize {
        self.face_count
    }

    pub fn is_residual(&self) -> bool {
        self.residual
    }
}

fn dedup_in_order(ids: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
