//! Sigmoid feed-forward network and its momentum SGD trainer.

mod network;
mod train;

pub use network::{DenseLayer, MlpNetwork, sigmoid};
pub use train::{IterationReport, TrainError, TrainOptions, train_classifier, train_from_samples};
