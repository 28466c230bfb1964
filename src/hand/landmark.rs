use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of landmarks in one tracked hand.
pub const LANDMARK_COUNT: usize = 21;

/// Wrist landmark index; the origin after normalization.
pub const WRIST: usize = 0;
/// Fingertip indices, thumb first.
pub const FINGERTIPS: [usize; 5] = [4, 8, 12, 16, 20];
/// Base joint paired with each entry of [`FINGERTIPS`].
pub const FINGER_BASES: [usize; 5] = [2, 5, 9, 13, 17];
/// Landmarks that outline the palm.
pub const PALM_ANCHORS: [usize; 6] = [0, 1, 5, 9, 13, 17];

/// One 3-D point of a tracked hand skeleton in camera-normalized space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const ORIGIN: Landmark = Landmark {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn sub(&self, other: &Landmark) -> Landmark {
        Landmark::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn scale(&self, factor: f32) -> Landmark {
        Landmark::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn dot(&self, other: &Landmark) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean length of the point treated as a vector from the origin.
    pub fn norm(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn distance(&self, other: &Landmark) -> f32 {
        self.sub(other).norm()
    }
}

/// A complete, finite set of landmarks for one hand.
pub type Hand = [Landmark; LANDMARK_COUNT];

/// Reasons a single hand sample cannot be used for training or inference.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    /// The tracker delivered a landmark set of the wrong size.
    #[error("Expected {expected} landmarks, found {found}")]
    InvalidLandmarkCount { expected: usize, found: usize },
    /// A raw landmark coordinate is NaN or infinite.
    #[error("Landmark {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
    /// A feature vector of the wrong size was supplied.
    #[error("Expected {expected} feature values, found {found}")]
    InvalidFeatureLength { expected: usize, found: usize },
    /// Feature extraction produced a NaN or infinite value.
    #[error("Feature {index} is not finite")]
    NonFiniteFeature { index: usize },
}

/// Check a tracker landmark list and copy it into a fixed-size hand.
pub fn hand_from_slice(landmarks: &[Landmark]) -> Result<Hand, SampleError> {
    let hand: Hand = landmarks
        .try_into()
        .map_err(|_| SampleError::InvalidLandmarkCount {
            expected: LANDMARK_COUNT,
            found: landmarks.len(),
        })?;
    if let Some(index) = hand.iter().position(|point| !point.is_finite()) {
        return Err(SampleError::NonFiniteCoordinate { index });
    }
    Ok(hand)
}
