//! Hand geometry: landmarks, normalization and feature extraction.

pub mod features;
pub mod landmark;
pub mod normalize;
pub mod sample;

pub use features::{FEATURE_VECTOR_LEN, FeatureVector, extract_features, hand_features};
pub use landmark::{Hand, LANDMARK_COUNT, Landmark, SampleError, hand_from_slice};
pub use normalize::normalize;
pub use sample::Sample;
