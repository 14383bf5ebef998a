use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clustering::adaptive_clusterer::ClusteringConfig;
use crate::quality::face_quality_assessor::QualityConfig;
use crate::store::similarity_index::IndexConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Every tunable of a grouping request. Missing keys in a config file take
/// their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    pub quality: QualityConfig,
    pub clustering: ClusteringConfig,
    pub index: IndexConfig,
    /// Extraction worker threads.
    pub workers: usize,
    /// Keep only the first N detections of each image; `None` keeps all.
    pub max_faces_per_image: Option<usize>,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            quality: QualityConfig::default(),
            clustering: ClusteringConfig::default(),
            index: IndexConfig::default(),
            workers: default_workers(),
            max_faces_per_image: None,
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl GroupingConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let q = &self.quality;
        let c = &self.clustering;
        let i = &self.index;

        check(
            (0.0..=1.0).contains(&q.acceptance_threshold),
            "quality.acceptance_threshold must be within [0, 1]",
        )?;
        check(q.min_face_size >= 0, "quality.min_face_size must not be negative")?;
        check(
            q.min_brightness <= q.max_brightness,
            "quality.min_brightness must not exceed quality.max_brightness",
        )?;
        check(c.radius_steps > 0, "clustering.radius_steps must be positive")?;
        check(c.min_samples > 0, "clustering.min_samples must be positive")?;
        check(
            c.radius_min >= 0.0 && c.radius_min <= c.radius_max,
            "clustering radius range must satisfy 0 <= radius_min <= radius_max",
        )?;
        check(
            c.candidate_neighbors > 0,
            "clustering.candidate_neighbors must be positive",
        )?;
        check(
            i.records_per_partition > 0 && i.probes > 0,
            "index.records_per_partition and index.probes must be positive",
        )?;
        check(self.workers > 0, "workers must be positive")?;
        check(
            self.max_faces_per_image != Some(0),
            "max_faces_per_image must be positive when set",
        )?;
        Ok(())
    }
}

fn check(condition: bool, message: &str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Invalid(message.to_string()))
    }
}
