//! Confidence-gated inference over a trained artifact.
//!
//! Prediction is a pure function of the artifact and the input: the network is read straight
//! from the artifact on every call and nothing is cached or mutated, so one artifact can be
//! shared across threads behind an `Arc`.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::warn;

use crate::hand::{FeatureVector, Landmark, SampleError, hand_features, hand_from_slice};
use crate::ml::artifact::ClassifierArtifact;

/// Label reported when the best score falls below half the confidence threshold.
pub const UNCERTAIN_LABEL: &str = "uncertain";
pub const MIN_CONFIDENCE: f32 = 0.01;
pub const MAX_CONFIDENCE: f32 = 0.99;

/// Why a frame produced no label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnrecognizedReason {
    /// No trained artifact was available.
    UntrainedModel,
    /// The landmarks or features were unusable.
    InvalidInput,
    /// The forward pass failed unexpectedly.
    InferenceFailure,
}

impl UnrecognizedReason {
    /// Display string used by callers that show a single label field.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::UntrainedModel => "UNKNOWN",
            Self::InvalidInput => "INVALID",
            Self::InferenceFailure => "ERROR",
        }
    }
}

/// Outcome of classifying one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    Recognized {
        label: String,
        confidence: f32,
        scores: BTreeMap<String, f32>,
    },
    /// The best label scored too low to be trusted.
    Uncertain {
        candidate: String,
        confidence: f32,
        scores: BTreeMap<String, f32>,
    },
    Unrecognized { reason: UnrecognizedReason },
}

impl Prediction {
    /// Single displayable label, including the sentinel strings for failures.
    pub fn display_label(&self) -> &str {
        match self {
            Self::Recognized { label, .. } => label,
            Self::Uncertain { .. } => UNCERTAIN_LABEL,
            Self::Unrecognized { reason } => reason.as_label(),
        }
    }

    /// Clamped confidence, or 0 when nothing was recognized.
    pub fn confidence(&self) -> f32 {
        match self {
            Self::Recognized { confidence, .. } | Self::Uncertain { confidence, .. } => *confidence,
            Self::Unrecognized { .. } => 0.0,
        }
    }

    /// Raw network score per label, when inference ran.
    pub fn scores(&self) -> Option<&BTreeMap<String, f32>> {
        match self {
            Self::Recognized { scores, .. } | Self::Uncertain { scores, .. } => Some(scores),
            Self::Unrecognized { .. } => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::Recognized { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("No trained model available")]
    UntrainedModel,
    #[error("Invalid sample: {0}")]
    InvalidSample(#[from] SampleError),
    #[error("Inference failed: {0}")]
    InferenceFailure(String),
}

impl PredictError {
    pub fn reason(&self) -> UnrecognizedReason {
        match self {
            Self::UntrainedModel => UnrecognizedReason::UntrainedModel,
            Self::InvalidSample(_) => UnrecognizedReason::InvalidInput,
            Self::InferenceFailure(_) => UnrecognizedReason::InferenceFailure,
        }
    }
}

/// Classify a feature vector, reporting failures through the error channel.
pub fn try_predict(
    artifact: Option<&ClassifierArtifact>,
    features: &FeatureVector,
    confidence_threshold: f32,
) -> Result<Prediction, PredictError> {
    let artifact = artifact.ok_or(PredictError::UntrainedModel)?;
    artifact
        .validate()
        .map_err(|err| PredictError::InferenceFailure(err.to_string()))?;
    let scores = artifact.network.forward(features.as_slice());
    if scores.is_empty() || scores.len() != artifact.labels.len() {
        return Err(PredictError::InferenceFailure(format!(
            "network produced {} scores for {} labels",
            scores.len(),
            artifact.labels.len()
        )));
    }
    if let Some(idx) = scores.iter().position(|score| !score.is_finite()) {
        return Err(PredictError::InferenceFailure(format!(
            "score for {} is not finite",
            artifact.labels[idx]
        )));
    }

    let mut best = 0usize;
    let mut best_val = f32::NEG_INFINITY;
    for (idx, &score) in scores.iter().enumerate() {
        if score > best_val {
            best_val = score;
            best = idx;
        }
    }
    let per_label: BTreeMap<String, f32> = artifact
        .labels
        .iter()
        .cloned()
        .zip(scores.iter().copied())
        .collect();
    let candidate = artifact.labels[best].clone();

    if best_val < confidence_threshold / 2.0 {
        return Ok(Prediction::Uncertain {
            candidate,
            confidence: clamp_confidence(best_val / 2.0),
            scores: per_label,
        });
    }
    Ok(Prediction::Recognized {
        label: candidate,
        confidence: clamp_confidence(best_val),
        scores: per_label,
    })
}

/// Classify a feature vector, always returning a displayable prediction.
pub fn predict(
    artifact: Option<&ClassifierArtifact>,
    features: &FeatureVector,
    confidence_threshold: f32,
) -> Prediction {
    try_predict(artifact, features, confidence_threshold).unwrap_or_else(unrecognized)
}

/// Validate, normalize and classify one tracked hand.
///
/// Landmark sets that are not exactly 21 finite points come back as `INVALID`.
pub fn try_predict_landmarks(
    artifact: Option<&ClassifierArtifact>,
    landmarks: &[Landmark],
    confidence_threshold: f32,
) -> Result<Prediction, PredictError> {
    let artifact = artifact.ok_or(PredictError::UntrainedModel)?;
    let features = hand_features(&hand_from_slice(landmarks)?)?;
    try_predict(Some(artifact), &features, confidence_threshold)
}

pub fn predict_landmarks(
    artifact: Option<&ClassifierArtifact>,
    landmarks: &[Landmark],
    confidence_threshold: f32,
) -> Prediction {
    try_predict_landmarks(artifact, landmarks, confidence_threshold).unwrap_or_else(unrecognized)
}

fn unrecognized(err: PredictError) -> Prediction {
    if let PredictError::InferenceFailure(message) = &err {
        warn!("Inference failed: {message}");
    }
    Prediction::Unrecognized {
        reason: err.reason(),
    }
}

fn clamp_confidence(value: f32) -> f32 {
    value.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}
