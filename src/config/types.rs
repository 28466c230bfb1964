use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::defaults::*;
use crate::ml::TrainOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    #[error("No suitable config directory found")]
    NoConfigDir,
}

/// Persisted settings, stored as `config.toml` in the app directory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HandsignSettings {
    #[serde(default)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub inference: InferenceSettings,
}

impl HandsignSettings {
    /// Clamp loaded values into usable ranges.
    pub fn normalized(mut self) -> Self {
        self.training = self.training.normalized();
        self.inference = self.inference.normalized();
        self
    }
}

/// Hyperparameters and data hygiene for training runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSettings {
    #[serde(default = "default_hidden_layers")]
    pub hidden_layers: Vec<usize>,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    #[serde(default = "default_momentum")]
    pub momentum: f32,
    #[serde(default = "default_dropout")]
    pub dropout: f32,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_error_threshold")]
    pub error_threshold: f32,
    /// Iterations between progress log lines (0 = silent).
    #[serde(default = "default_log_period")]
    pub log_period: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Labels with fewer samples are reported as under-trained.
    #[serde(default = "default_min_samples_per_label")]
    pub min_samples_per_label: usize,
    /// Downsample every label to the smallest label's count before training.
    #[serde(default = "default_true")]
    pub balance_labels: bool,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            hidden_layers: default_hidden_layers(),
            learning_rate: default_learning_rate(),
            momentum: default_momentum(),
            dropout: default_dropout(),
            max_iterations: default_max_iterations(),
            error_threshold: default_error_threshold(),
            log_period: default_log_period(),
            seed: default_seed(),
            min_samples_per_label: default_min_samples_per_label(),
            balance_labels: default_true(),
        }
    }
}

impl TrainingSettings {
    pub fn normalized(mut self) -> Self {
        self.hidden_layers.retain(|size| *size > 0);
        if self.hidden_layers.is_empty() {
            self.hidden_layers = default_hidden_layers();
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            self.learning_rate = default_learning_rate();
        }
        if !self.momentum.is_finite() || !(0.0..1.0).contains(&self.momentum) {
            self.momentum = default_momentum();
        }
        self.dropout = if self.dropout.is_finite() {
            self.dropout.clamp(0.0, MAX_DROPOUT)
        } else {
            default_dropout()
        };
        self.max_iterations = self.max_iterations.clamp(1, MAX_ITERATIONS_CAP);
        if !self.error_threshold.is_finite() || self.error_threshold < 0.0 {
            self.error_threshold = default_error_threshold();
        }
        self
    }

    pub fn train_options(&self) -> TrainOptions {
        TrainOptions {
            hidden_layers: self.hidden_layers.clone(),
            learning_rate: self.learning_rate,
            momentum: self.momentum,
            dropout: self.dropout,
            max_iterations: self.max_iterations,
            error_threshold: self.error_threshold,
            log_period: self.log_period,
            seed: self.seed,
        }
    }
}

/// Thresholds applied at prediction and practice-feedback time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceSettings {
    /// Scores below half of this are reported as uncertain.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    /// Confidence a correct gesture needs to count as a success.
    #[serde(default = "default_success_threshold")]
    pub success_threshold: f32,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            success_threshold: default_success_threshold(),
        }
    }
}

impl InferenceSettings {
    pub fn normalized(mut self) -> Self {
        self.confidence_threshold =
            clamp_unit(self.confidence_threshold, default_confidence_threshold());
        self.success_threshold = clamp_unit(self.success_threshold, default_success_threshold());
        self
    }
}
