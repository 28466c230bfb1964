use crate::feedback::DEFAULT_SUCCESS_THRESHOLD;
use crate::ml::TrainOptions;

pub(super) const MAX_ITERATIONS_CAP: usize = 100_000;
pub(super) const MAX_DROPOUT: f32 = 0.9;

pub(super) fn default_hidden_layers() -> Vec<usize> {
    TrainOptions::default().hidden_layers
}

pub(super) fn default_learning_rate() -> f32 {
    TrainOptions::default().learning_rate
}

pub(super) fn default_momentum() -> f32 {
    TrainOptions::default().momentum
}

pub(super) fn default_dropout() -> f32 {
    TrainOptions::default().dropout
}

pub(super) fn default_max_iterations() -> usize {
    TrainOptions::default().max_iterations
}

pub(super) fn default_error_threshold() -> f32 {
    TrainOptions::default().error_threshold
}

pub(super) fn default_log_period() -> usize {
    TrainOptions::default().log_period
}

pub(super) fn default_seed() -> u64 {
    TrainOptions::default().seed
}

pub(super) fn default_min_samples_per_label() -> usize {
    10
}

pub(super) fn default_true() -> bool {
    true
}

pub(super) fn default_confidence_threshold() -> f32 {
    0.7
}

pub(super) fn default_success_threshold() -> f32 {
    DEFAULT_SUCCESS_THRESHOLD
}

pub(super) fn clamp_unit(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}
