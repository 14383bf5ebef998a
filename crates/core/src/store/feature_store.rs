use crate::detection::domain::detection::Detection;
use crate::quality::quality_assessment::QualityAssessment;
use crate::shared::error::GroupingError;
use crate::store::face_record::{embedding_dimension, FaceRecord};
use crate::store::feature_snapshot::{FeatureSnapshot, SnapshotError};
use crate::store::similarity_index::{build_index, IndexConfig, IndexKind, SimilarityIndex};

/// Request-scoped accumulator of accepted faces.
///
/// Each grouping request owns its own store; sharing across requests goes
/// through [`FeatureStore::snapshot`] and [`FeatureStore::restore`].
pub struct FeatureStore {
    records: Vec<FaceRecord>,
    config: IndexConfig,
    index: Option<Box<dyn SimilarityIndex>>,
}

impl Default for FeatureStore {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}

impl FeatureStore {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            records: Vec::new(),
            config,
            index: None,
        }
    }

    /// Records an accepted face. Never rejects; filtering happens upstream.
    pub fn add_face(
        &mut self,
        detection: &Detection,
        assessment: &QualityAssessment,
        image_id: impl Into<String>,
    ) {
        self.push_record(FaceRecord::new(
            detection.embedding.clone(),
            assessment.score(),
            image_id,
        ));
    }

    pub fn push_record(&mut self, record: FaceRecord) {
        self.records.push(record);
        self.index = None;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FaceRecord] {
        &self.records
    }

    pub fn index_config(&self) -> &IndexConfig {
        &self.config
    }

    /// Builds the similarity index over every record.
    ///
    /// Returns `None` when indexing is disabled or the store is empty.
    /// Embeddings of mixed dimensionality reject the whole store.
    pub fn build_index(&mut self) -> Result<Option<IndexKind>, GroupingError> {
        embedding_dimension(&self.records)?;
        if !self.config.enabled || self.records.is_empty() {
            self.index = None;
            return Ok(None);
        }
        let vectors = self.records.iter().map(|r| r.embedding().to_vec()).collect();
        let index = build_index(vectors, &self.config);
        let kind = index.kind();
        self.index = Some(index);
        Ok(Some(kind))
    }

    /// The index built by [`FeatureStore::build_index`], if it still covers
    /// every record.
    pub fn index(&self) -> Option<&dyn SimilarityIndex> {
        self.index
            .as_deref()
            .filter(|index| index.len() == self.records.len())
    }

    pub fn snapshot(&self) -> FeatureSnapshot {
        FeatureSnapshot::from_records(&self.records)
    }

    pub fn restore(snapshot: FeatureSnapshot, config: IndexConfig) -> Result<Self, SnapshotError> {
        let records = snapshot.into_records()?;
        Ok(Self {
            records,
            config,
            index: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face_landmarks::FaceLandmarks;
    use crate::quality::quality_assessment::QualityIssue;
    use crate::shared::bounding_box::BoundingBox;
    use approx::assert_relative_eq;

    fn detection(embedding: Vec<f32>) -> Detection {
        Detection::new(
            BoundingBox::new(0, 0, 100, 100),
            FaceLandmarks::default(),
            0.99,
            embedding,
        )
    }

    fn spread_store(n: usize) -> FeatureStore {
        let mut store = FeatureStore::default();
        for i in 0..n {
            let a = i as f32 * 0.37;
            store.push_record(FaceRecord::new(
                vec![a.cos(), a.sin(), (i % 7) as f32 * 0.1],
                1.0,
                format!("img{i}"),
            ));
        }
        store
    }

    #[test]
    fn test_add_face_records_quality_and_image() {
        let mut store = FeatureStore::default();
        let assessment = QualityAssessment::perfect().penalize(QualityIssue::Blurry, 0.7);
        store.add_face(&detection(vec![0.5, 0.5]), &assessment, "a.jpg");

        assert_eq!(store.len(), 1);
        let record = &store.records()[0];
        assert_eq!(record.embedding(), &[0.5, 0.5]);
        assert_relative_eq!(record.quality_score(), 0.7);
        assert_eq!(record.image_id(), "a.jpg");
    }

    #[test]
    fn test_build_index_on_empty_store_is_none() {
        let mut store = FeatureStore::default();
        assert_eq!(store.build_index().unwrap(), None);
        assert!(store.index().is_none());
    }

    #[test]
    fn test_build_index_when_disabled_is_none() {
        let mut store = spread_store(20);
        store.config.enabled = false;
        assert_eq!(store.build_index().unwrap(), None);
    }

    #[test]
    fn test_build_index_chooses_flavor_by_size() {
        let mut small = spread_store(5);
        assert_eq!(small.build_index().unwrap(), Some(IndexKind::Exact));

        let mut large = spread_store(40);
        assert_eq!(
            large.build_index().unwrap(),
            Some(IndexKind::Partitioned { partitions: 4 })
        );
        assert_eq!(large.index().map(|i| i.len()), Some(40));
    }

    #[test]
    fn test_adding_a_face_invalidates_the_index() {
        let mut store = spread_store(5);
        store.build_index().unwrap();
        store.push_record(FaceRecord::new(vec![0.0, 0.0, 1.0], 1.0, "late"));
        assert!(store.index().is_none());
    }

    #[test]
    fn test_build_index_rejects_mixed_dimensions() {
        let mut store = spread_store(3);
        store.push_record(FaceRecord::new(vec![1.0, 0.0], 1.0, "short"));
        assert_eq!(
            store.build_index(),
            Err(GroupingError::EmbeddingDimensionMismatch {
                index: 3,
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let store = spread_store(12);
        let restored = FeatureStore::restore(store.snapshot(), IndexConfig::default()).unwrap();
        assert_eq!(restored.records(), store.records());
        assert!(restored.index().is_none());
    }
}
