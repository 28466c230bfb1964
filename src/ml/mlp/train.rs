use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info};

use super::network::MlpNetwork;
use crate::hand::{FEATURE_VECTOR_LEN, Sample};
use crate::ml::artifact::{ARTIFACT_VERSION, ClassifierArtifact, TrainingStats};
use crate::ml::dataset::TrainDataset;

/// Errors that prevent a training run from producing an artifact.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainError {
    /// Training needs at least one sample and two distinct labels.
    #[error("Insufficient training data: {samples} samples across {labels} labels")]
    TrainingDataInsufficient { samples: usize, labels: usize },
    /// A feature row does not have the expected length.
    #[error("Row {row} has {found} features (expected {expected})")]
    FeatureLengthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A hyperparameter is out of range.
    #[error("Invalid training option: {0}")]
    InvalidOptions(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    pub hidden_layers: Vec<usize>,
    pub learning_rate: f32,
    pub momentum: f32,
    pub dropout: f32,
    pub max_iterations: usize,
    pub error_threshold: f32,
    /// Emit a debug log line every `log_period` iterations (0 disables).
    pub log_period: usize,
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            hidden_layers: vec![128, 64, 32],
            learning_rate: 0.1,
            momentum: 0.1,
            dropout: 0.1,
            max_iterations: 3000,
            error_threshold: 0.003,
            log_period: 100,
            seed: 42,
        }
    }
}

impl TrainOptions {
    pub fn validate(&self) -> Result<(), TrainError> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(TrainError::InvalidOptions(format!(
                "learning_rate must be > 0 (got {})",
                self.learning_rate
            )));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(TrainError::InvalidOptions(format!(
                "momentum must be in [0, 1) (got {})",
                self.momentum
            )));
        }
        if !(0.0..=0.9).contains(&self.dropout) {
            return Err(TrainError::InvalidOptions(format!(
                "dropout must be in [0, 0.9] (got {})",
                self.dropout
            )));
        }
        if !self.error_threshold.is_finite() || self.error_threshold < 0.0 {
            return Err(TrainError::InvalidOptions(format!(
                "error_threshold must be finite and >= 0 (got {})",
                self.error_threshold
            )));
        }
        if self.max_iterations == 0 {
            return Err(TrainError::InvalidOptions(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.hidden_layers.contains(&0) {
            return Err(TrainError::InvalidOptions(
                "hidden layer sizes must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Metrics from one full pass over the training rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport {
    /// 1-based iteration number.
    pub iteration: usize,
    /// Mean squared error over every output of every row.
    pub error: f32,
    /// Fraction of rows whose top output matched the target during the pass.
    pub accuracy: f32,
}

/// Train a sigmoid MLP on `dataset` and package it as an artifact.
///
/// `progress` receives the real optimizer trace, one report per iteration.
pub fn train_classifier(
    dataset: &TrainDataset,
    options: &TrainOptions,
    mut progress: Option<&mut dyn FnMut(&IterationReport)>,
) -> Result<ClassifierArtifact, TrainError> {
    if dataset.is_empty() || dataset.labels.len() < 2 {
        return Err(TrainError::TrainingDataInsufficient {
            samples: dataset.len(),
            labels: dataset.labels.len(),
        });
    }
    options.validate()?;
    if let Some((row, features)) = dataset
        .rows
        .iter()
        .enumerate()
        .find(|(_, features)| features.len() != FEATURE_VECTOR_LEN)
    {
        return Err(TrainError::FeatureLengthMismatch {
            row,
            expected: FEATURE_VECTOR_LEN,
            found: features.len(),
        });
    }

    let n_outputs = dataset.labels.len();
    let mut sizes = Vec::with_capacity(options.hidden_layers.len() + 2);
    sizes.push(FEATURE_VECTOR_LEN);
    sizes.extend_from_slice(&options.hidden_layers);
    sizes.push(n_outputs);

    info!(
        "Training classifier on {} samples, {} labels, topology {:?}",
        dataset.len(),
        n_outputs,
        sizes
    );

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut network = MlpNetwork::random(&sizes, &mut rng);
    let mut state = PassState::new(&network);
    let mut indices: Vec<usize> = (0..dataset.len()).collect();

    let mut last = IterationReport {
        iteration: 0,
        error: f32::INFINITY,
        accuracy: 0.0,
    };
    for iteration in 1..=options.max_iterations {
        indices.shuffle(&mut rng);
        let mut error_sum = 0.0f32;
        let mut correct = 0usize;
        for &idx in &indices {
            let input = dataset.rows[idx].as_slice();
            let target = dataset.targets[idx];
            state.forward(&network, input, options.dropout, &mut rng);
            let (sq_err, hit) = state.backward(&network, target);
            error_sum += sq_err;
            if hit {
                correct += 1;
            }
            state.apply(&mut network, input, options.learning_rate, options.momentum);
        }

        last = IterationReport {
            iteration,
            error: error_sum / (dataset.len() * n_outputs) as f32,
            accuracy: correct as f32 / dataset.len() as f32,
        };
        if let Some(callback) = progress.as_mut() {
            callback(&last);
        }
        if options.log_period > 0 && iteration % options.log_period == 0 {
            debug!(
                "iteration {} error={:.5} accuracy={:.3}",
                iteration, last.error, last.accuracy
            );
        }
        if last.error < options.error_threshold {
            break;
        }
    }

    info!(
        "Training finished after {} iterations (error {:.5}, accuracy {:.3})",
        last.iteration, last.error, last.accuracy
    );

    Ok(ClassifierArtifact {
        artifact_version: ARTIFACT_VERSION,
        feature_len: FEATURE_VECTOR_LEN,
        labels: dataset.labels.clone(),
        network,
        stats: TrainingStats {
            iterations: last.iteration,
            final_error: last.error,
            final_accuracy: last.accuracy,
            samples: dataset.len(),
        },
    })
}

/// Build a dataset from stored samples (dropping invalid ones) and train on it.
pub fn train_from_samples(
    samples: &[Sample],
    options: &TrainOptions,
) -> Result<ClassifierArtifact, TrainError> {
    let dataset = TrainDataset::from_samples(samples);
    if dataset.skipped > 0 {
        info!("Skipped {} invalid samples", dataset.skipped);
    }
    train_classifier(&dataset, options, None)
}

/// Scratch buffers for one online SGD step, sized to the network.
struct PassState {
    /// Post-dropout activations per layer.
    outputs: Vec<Vec<f32>>,
    /// Activation derivative per unit, including the dropout mask.
    slopes: Vec<Vec<f32>>,
    deltas: Vec<Vec<f32>>,
    weight_changes: Vec<Vec<f32>>,
    bias_changes: Vec<Vec<f32>>,
}

impl PassState {
    fn new(network: &MlpNetwork) -> Self {
        let per_unit = || {
            network
                .layers
                .iter()
                .map(|layer| vec![0.0f32; layer.outputs])
                .collect::<Vec<_>>()
        };
        Self {
            outputs: per_unit(),
            slopes: per_unit(),
            deltas: per_unit(),
            weight_changes: network
                .layers
                .iter()
                .map(|layer| vec![0.0f32; layer.weights.len()])
                .collect(),
            bias_changes: per_unit(),
        }
    }

    fn forward(&mut self, network: &MlpNetwork, input: &[f32], dropout: f32, rng: &mut StdRng) {
        let last = network.layers.len() - 1;
        for (l, layer) in network.layers.iter().enumerate() {
            let (done, rest) = self.outputs.split_at_mut(l);
            let layer_in: &[f32] = if l == 0 { input } else { &done[l - 1] };
            let out = &mut rest[0];
            layer.forward_into(layer_in, out);
            let slopes = &mut self.slopes[l];
            for (value, slope) in out.iter_mut().zip(slopes.iter_mut()) {
                let raw = *value;
                let mut mask = 1.0f32;
                if l < last && dropout > 0.0 {
                    mask = if rng.random::<f32>() > dropout {
                        1.0 / (1.0 - dropout)
                    } else {
                        0.0
                    };
                }
                *value = raw * mask;
                *slope = raw * (1.0 - raw) * mask;
            }
        }
    }

    /// Fill `deltas` for the target class; returns the summed squared error and whether the
    /// top output was the target.
    fn backward(&mut self, network: &MlpNetwork, target: usize) -> (f32, bool) {
        let last = network.layers.len() - 1;
        let mut sq_err = 0.0f32;
        let mut best = 0usize;
        let mut best_val = f32::NEG_INFINITY;
        for (c, &out) in self.outputs[last].iter().enumerate() {
            if out > best_val {
                best_val = out;
                best = c;
            }
            let expected = if c == target { 1.0 } else { 0.0 };
            let err = expected - out;
            sq_err += err * err;
            self.deltas[last][c] = err * self.slopes[last][c];
        }

        for l in (0..last).rev() {
            let next = &network.layers[l + 1];
            let (head, tail) = self.deltas.split_at_mut(l + 1);
            let upstream = &tail[0];
            for (h, delta) in head[l].iter_mut().enumerate() {
                let mut sum = 0.0f32;
                for (o, up) in upstream.iter().enumerate() {
                    sum += next.weights[o * next.inputs + h] * up;
                }
                *delta = sum * self.slopes[l][h];
            }
        }
        (sq_err, best == target)
    }

    fn apply(&mut self, network: &mut MlpNetwork, input: &[f32], learning_rate: f32, momentum: f32) {
        for l in 0..network.layers.len() {
            let layer_in: &[f32] = if l == 0 { input } else { &self.outputs[l - 1] };
            let layer = &mut network.layers[l];
            let weight_changes = &mut self.weight_changes[l];
            let bias_changes = &mut self.bias_changes[l];
            for (o, &delta) in self.deltas[l].iter().enumerate() {
                let base = o * layer.inputs;
                for (i, &x) in layer_in.iter().enumerate() {
                    let change = learning_rate * delta * x + momentum * weight_changes[base + i];
                    weight_changes[base + i] = change;
                    layer.weights[base + i] += change;
                }
                let change = learning_rate * delta + momentum * bias_changes[o];
                bias_changes[o] = change;
                layer.biases[o] += change;
            }
        }
    }
}
