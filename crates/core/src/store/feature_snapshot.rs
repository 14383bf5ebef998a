use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::LEGACY_QUALITY_SCORE;
use crate::store::face_record::FaceRecord;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("failed to access snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed snapshot {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("snapshot has {embeddings} embeddings but {image_ids} image ids")]
    LengthMismatch { embeddings: usize, image_ids: usize },
    #[error("snapshot has {quality_scores} quality scores for {embeddings} embeddings")]
    QualityScoreMismatch {
        embeddings: usize,
        quality_scores: usize,
    },
}

/// Serializable copy of a store's records as parallel lists.
///
/// Snapshots written before quality scoring existed have no
/// `quality_scores`; missing entries read back as perfect quality.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSnapshot {
    pub embeddings: Vec<Vec<f32>>,
    pub image_ids: Vec<String>,
    #[serde(default)]
    pub quality_scores: Vec<f64>,
}

impl FeatureSnapshot {
    pub fn from_records(records: &[FaceRecord]) -> Self {
        Self {
            embeddings: records.iter().map(|r| r.embedding().to_vec()).collect(),
            image_ids: records.iter().map(|r| r.image_id().to_string()).collect(),
            quality_scores: records.iter().map(|r| r.quality_score()).collect(),
        }
    }

    pub fn into_records(self) -> Result<Vec<FaceRecord>, SnapshotError> {
        if self.embeddings.len() != self.image_ids.len() {
            return Err(SnapshotError::LengthMismatch {
                embeddings: self.embeddings.len(),
                image_ids: self.image_ids.len(),
            });
        }
        if self.quality_scores.len() > self.embeddings.len() {
            return Err(SnapshotError::QualityScoreMismatch {
                embeddings: self.embeddings.len(),
                quality_scores: self.quality_scores.len(),
            });
        }
        let mut scores = self.quality_scores.into_iter();
        Ok(self
            .embeddings
            .into_iter()
            .zip(self.image_ids)
            .map(|(embedding, image_id)| {
                let quality = scores.next().unwrap_or(LEGACY_QUALITY_SCORE);
                FaceRecord::new(embedding, quality, image_id)
            })
            .collect())
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string(self).map_err(|source| SnapshotError::Serialization {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Saved {} face records to {}", self.embeddings.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let json = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: Self =
            serde_json::from_str(&json).map_err(|source| SnapshotError::Serialization {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!(
            "Loaded {} face records from {}",
            snapshot.embeddings.len(),
            path.display()
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn records() -> Vec<FaceRecord> {
        vec![
            FaceRecord::new(vec![1.0, 0.0], 0.9, "a.jpg"),
            FaceRecord::new(vec![0.0, 1.0], 0.45, "b.jpg"),
        ]
    }

    #[test]
    fn test_save_and_load_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("snapshot.json");
        FeatureSnapshot::from_records(&records()).save(&path).unwrap();

        let restored = FeatureSnapshot::load(&path).unwrap().into_records().unwrap();
        assert_eq!(restored, records());
    }

    #[test]
    fn test_missing_quality_scores_default_to_perfect() {
        let json = r#"{"embeddings": [[1.0, 0.0], [0.0, 1.0]], "image_ids": ["a", "b"]}"#;
        let snapshot: FeatureSnapshot = serde_json::from_str(json).unwrap();
        let restored = snapshot.into_records().unwrap();
        assert_eq!(restored.len(), 2);
        for r in &restored {
            assert_relative_eq!(r.quality_score(), 1.0);
        }
    }

    #[test]
    fn test_short_quality_list_is_padded() {
        let snapshot = FeatureSnapshot {
            embeddings: vec![vec![1.0], vec![2.0]],
            image_ids: vec!["a".into(), "b".into()],
            quality_scores: vec![0.3],
        };
        let restored = snapshot.into_records().unwrap();
        assert_relative_eq!(restored[0].quality_score(), 0.3);
        assert_relative_eq!(restored[1].quality_score(), 1.0);
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let snapshot = FeatureSnapshot {
            embeddings: vec![vec![1.0]],
            image_ids: vec![],
            quality_scores: vec![],
        };
        assert!(matches!(
            snapshot.into_records(),
            Err(SnapshotError::LengthMismatch {
                embeddings: 1,
                image_ids: 0
            })
        ));
    }

    #[test]
    fn test_extra_quality_scores_are_rejected() {
        let snapshot = FeatureSnapshot {
            embeddings: vec![vec![1.0]],
            image_ids: vec!["a".into()],
            quality_scores: vec![0.9, 0.8],
        };
        assert!(matches!(
            snapshot.into_records(),
            Err(SnapshotError::QualityScoreMismatch {
                embeddings: 1,
                quality_scores: 2
            })
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = FeatureSnapshot::load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(SnapshotError::Io { .. })));
    }

    #[test]
    fn test_load_garbage_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        let result = FeatureSnapshot::load(&path);
        assert!(matches!(result, Err(SnapshotError::Serialization { .. })));
    }
}
