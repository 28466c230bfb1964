//! Static hand-gesture recognition from 21 tracked hand landmarks.
//!
//! Raw landmarks are normalized ([`hand::normalize`]), encoded as 102 geometric features
//! ([`hand::extract_features`]), classified by a small sigmoid network ([`ml`]), and in
//! practice mode turned into learner feedback ([`feedback`]).

/// Application directories for config, logs and models.
pub mod app_dirs;
/// Persisted training and inference settings.
pub mod config;
/// Practice-mode feedback categories.
pub mod feedback;
mod fs_atomic;
/// Landmark geometry and feature extraction.
pub mod hand;
/// Tracing subscriber setup.
pub mod logging;
/// Classifier training and inference.
pub mod ml;

pub use feedback::{FeedbackCategory, classify_feedback, classify_feedback_with_threshold};
pub use hand::{FeatureVector, Landmark, Sample, SampleError};
pub use ml::{
    ClassifierArtifact, PredictError, Prediction, TrainError, TrainOptions, predict,
    predict_landmarks, train_from_samples,
};
