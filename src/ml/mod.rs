//! Gesture classifier training, persistence and inference.
//!
//! Training consumes [`TrainDataset`] rows and produces an immutable [`ClassifierArtifact`];
//! inference reads that artifact without mutating it.

pub mod artifact;
pub mod cache;
pub mod dataset;
pub mod metrics;
pub mod mlp;
pub mod predict;

pub use artifact::{ArtifactError, ClassifierArtifact, TrainingStats};
pub use cache::{ArtifactSlot, ClassifierCache};
pub use dataset::TrainDataset;
pub use metrics::{Evaluation, evaluate};
pub use mlp::{
    IterationReport, TrainError, TrainOptions, train_classifier, train_from_samples,
};
pub use predict::{
    PredictError, Prediction, UnrecognizedReason, predict, predict_landmarks, try_predict,
    try_predict_landmarks,
};
