//! Trained classifier state as persisted by storage.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::fs_atomic::atomic_write;
use crate::hand::FEATURE_VECTOR_LEN;
use crate::ml::mlp::MlpNetwork;

/// Current artifact format version.
pub const ARTIFACT_VERSION: i64 = 1;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read model {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write model {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid model JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Failed to serialize model: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Invalid model: {0}")]
    Invalid(String),
}

/// Summary of the training run that produced an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub iterations: usize,
    pub final_error: f32,
    #[serde(default)]
    pub final_accuracy: f32,
    #[serde(default)]
    pub samples: usize,
}

/// Network topology and weights plus the label order of its outputs.
///
/// Immutable once trained; a new training run produces a new artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub artifact_version: i64,
    pub feature_len: usize,
    pub labels: Vec<String>,
    pub network: MlpNetwork,
    pub stats: TrainingStats,
}

impl ClassifierArtifact {
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.artifact_version != ARTIFACT_VERSION {
            return Err(ArtifactError::Invalid(format!(
                "Unsupported artifact_version {} (expected {})",
                self.artifact_version, ARTIFACT_VERSION
            )));
        }
        if self.feature_len != FEATURE_VECTOR_LEN {
            return Err(ArtifactError::Invalid(format!(
                "Unsupported feature_len {} (expected {})",
                self.feature_len, FEATURE_VECTOR_LEN
            )));
        }
        if self.labels.len() < 2 {
            return Err(ArtifactError::Invalid(
                "Model must contain at least 2 labels".to_string(),
            ));
        }
        if !self.labels.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(ArtifactError::Invalid(
                "labels must be sorted and unique".to_string(),
            ));
        }
        self.network.validate().map_err(ArtifactError::Invalid)?;
        if self.network.input_len() != self.feature_len {
            return Err(ArtifactError::Invalid("network input width mismatch".to_string()));
        }
        if self.network.output_len() != self.labels.len() {
            return Err(ArtifactError::Invalid("network output width mismatch".to_string()));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ArtifactError> {
        serde_json::to_string(self).map_err(ArtifactError::Serialize)
    }

    /// Parse and validate an artifact blob.
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let artifact: Self = serde_json::from_str(json).map_err(ArtifactError::Parse)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn save_json(&self, path: &Path) -> Result<(), ArtifactError> {
        let json = serde_json::to_string_pretty(self).map_err(ArtifactError::Serialize)?;
        atomic_write(path, json.as_bytes()).map_err(|source| ArtifactError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Saved classifier ({} labels) to {}", self.labels.len(), path.display());
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self, ArtifactError> {
        let json = std::fs::read_to_string(path).map_err(|source| ArtifactError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact = Self::from_json(&json)?;
        info!(
            "Loaded classifier ({} labels, {} iterations) from {}",
            artifact.labels.len(),
            artifact.stats.iterations,
            path.display()
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::tempdir;

    fn artifact() -> ClassifierArtifact {
        let mut rng = StdRng::seed_from_u64(5);
        ClassifierArtifact {
            artifact_version: ARTIFACT_VERSION,
            feature_len: FEATURE_VECTOR_LEN,
            labels: vec!["A".into(), "B".into(), "C".into()],
            network: MlpNetwork::random(&[FEATURE_VECTOR_LEN, 4, 3], &mut rng),
            stats: TrainingStats {
                iterations: 12,
                final_error: 0.01,
                final_accuracy: 1.0,
                samples: 30,
            },
        }
    }

    #[test]
    fn json_round_trip_is_exact() {
        let original = artifact();
        let restored = ClassifierArtifact::from_json(&original.to_json().unwrap()).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("models").join("alphabet.json");
        let original = artifact();
        original.save_json(&path).unwrap();
        assert_eq!(ClassifierArtifact::load_json(&path).unwrap(), original);
    }

    #[test]
    fn rejects_label_output_mismatch() {
        let mut broken = artifact();
        broken.labels.pop();
        let json = serde_json::to_string(&broken).unwrap();
        assert!(matches!(
            ClassifierArtifact::from_json(&json),
            Err(ArtifactError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            ClassifierArtifact::from_json("{\"labels\":"),
            Err(ArtifactError::Parse(_))
        ));
    }
}
