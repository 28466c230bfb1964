use serde::{Deserialize, Serialize};

use super::features::{FeatureVector, hand_features};
use super::landmark::{Hand, Landmark, SampleError, hand_from_slice};

/// A labeled hand captured at one instant, as handed over by storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub landmarks: Vec<Landmark>,
    pub label: String,
    /// Capture time in Unix milliseconds.
    #[serde(default)]
    pub timestamp: i64,
}

impl Sample {
    pub fn new(landmarks: Vec<Landmark>, label: impl Into<String>, timestamp: i64) -> Self {
        Self {
            landmarks,
            label: label.into(),
            timestamp,
        }
    }

    /// Checked fixed-size view of the landmarks.
    pub fn hand(&self) -> Result<Hand, SampleError> {
        hand_from_slice(&self.landmarks)
    }

    /// Validate, normalize and extract the feature vector for this sample.
    pub fn features(&self) -> Result<FeatureVector, SampleError> {
        hand_features(&self.hand()?)
    }
}
