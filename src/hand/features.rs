//! Feature extraction for static hand shapes.
//!
//! Layout of the 102 values, in order:
//! - `0..63`: x, y, z of every landmark
//! - `63..68`: fingertip to finger-base distances
//! - `68..83`: pairwise distances between palm anchors
//! - `83..102`: angle at each joint `1..=19` between its neighbours

use super::landmark::{FINGER_BASES, FINGERTIPS, Hand, LANDMARK_COUNT, Landmark, PALM_ANCHORS, SampleError};
use super::normalize::normalize;

pub const COORDINATE_FEATURES: usize = LANDMARK_COUNT * 3;
pub const FINGER_DISTANCE_FEATURES: usize = FINGERTIPS.len();
pub const PALM_DISTANCE_FEATURES: usize = PALM_ANCHORS.len() * (PALM_ANCHORS.len() - 1) / 2;
pub const JOINT_ANGLE_FEATURES: usize = LANDMARK_COUNT - 2;

/// Number of `f32` values per feature vector.
pub const FEATURE_VECTOR_LEN: usize = COORDINATE_FEATURES
    + FINGER_DISTANCE_FEATURES
    + PALM_DISTANCE_FEATURES
    + JOINT_ANGLE_FEATURES;

/// Fixed-length, all-finite encoding of one hand's geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    /// Wrap raw values, rejecting wrong lengths or any non-finite entry.
    pub fn from_values(values: Vec<f32>) -> Result<Self, SampleError> {
        if values.len() != FEATURE_VECTOR_LEN {
            return Err(SampleError::InvalidFeatureLength {
                expected: FEATURE_VECTOR_LEN,
                found: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(SampleError::NonFiniteFeature { index });
        }
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

/// Extract features from an already normalized hand.
pub fn extract_features(normalized: &Hand) -> Result<FeatureVector, SampleError> {
    let mut values = Vec::with_capacity(FEATURE_VECTOR_LEN);

    for point in normalized {
        values.extend_from_slice(&[point.x, point.y, point.z]);
    }

    for (&tip, &base) in FINGERTIPS.iter().zip(FINGER_BASES.iter()) {
        values.push(normalized[tip].distance(&normalized[base]));
    }

    for (pos, &i) in PALM_ANCHORS.iter().enumerate() {
        for &j in &PALM_ANCHORS[pos + 1..] {
            values.push(normalized[i].distance(&normalized[j]));
        }
    }

    for joint in 1..LANDMARK_COUNT - 1 {
        values.push(joint_angle(
            &normalized[joint - 1],
            &normalized[joint],
            &normalized[joint + 1],
        ));
    }

    FeatureVector::from_values(values)
}

/// Normalize a raw hand and extract its features in one step.
pub fn hand_features(hand: &Hand) -> Result<FeatureVector, SampleError> {
    extract_features(&normalize(hand))
}

/// Angle in radians at `vertex` between the rays towards `prev` and `next`.
///
/// Zero when either ray has no length.
fn joint_angle(prev: &Landmark, vertex: &Landmark, next: &Landmark) -> f32 {
    let v1 = prev.sub(vertex);
    let v2 = next.sub(vertex);
    let mag1 = v1.norm();
    let mag2 = v2.norm();
    if mag1 == 0.0 || mag2 == 0.0 {
        return 0.0;
    }
    let cos_angle = (v1.dot(&v2) / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_angle.acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn spread_hand() -> Hand {
        std::array::from_fn(|i| {
            let t = i as f32;
            Landmark::new(0.5 + 0.02 * t, 0.5 - 0.03 * (t * 0.4).cos(), 0.001 * t)
        })
    }

    #[test]
    fn vector_has_fixed_length() {
        assert_eq!(FEATURE_VECTOR_LEN, 102);
        let features = hand_features(&spread_hand()).unwrap();
        assert_eq!(features.len(), 102);
    }

    #[test]
    fn degenerate_hand_still_extracts() {
        let features = hand_features(&[Landmark::new(0.3, 0.3, 0.3); LANDMARK_COUNT]).unwrap();
        assert!(features.as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn nan_coordinate_voids_vector() {
        let mut hand = spread_hand();
        hand[11].y = f32::NAN;
        let err = extract_features(&hand).unwrap_err();
        assert!(matches!(err, SampleError::NonFiniteFeature { .. }));
    }

    #[test]
    fn palm_distances_follow_pair_order() {
        let mut hand = [Landmark::ORIGIN; LANDMARK_COUNT];
        hand[1] = Landmark::new(1.0, 0.0, 0.0);
        hand[5] = Landmark::new(0.0, 2.0, 0.0);
        let features = extract_features(&hand).unwrap();
        let palm = &features.as_slice()[68..83];
        // (0,1), (0,5), (0,9), (0,13), (0,17), (1,5), ...
        assert!((palm[0] - 1.0).abs() < 1e-6);
        assert!((palm[1] - 2.0).abs() < 1e-6);
        assert!((palm[2] - 0.0).abs() < 1e-6);
        assert!((palm[5] - 5.0f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn joint_angles_cover_straight_bent_and_collapsed() {
        let straight = joint_angle(
            &Landmark::new(0.0, 0.0, 0.0),
            &Landmark::new(1.0, 0.0, 0.0),
            &Landmark::new(2.0, 0.0, 0.0),
        );
        assert!((straight - PI).abs() < 1e-5);

        let bent = joint_angle(
            &Landmark::new(0.0, 0.0, 0.0),
            &Landmark::new(1.0, 0.0, 0.0),
            &Landmark::new(1.0, 1.0, 0.0),
        );
        assert!((bent - FRAC_PI_2).abs() < 1e-5);

        let collapsed = joint_angle(&Landmark::ORIGIN, &Landmark::ORIGIN, &Landmark::new(1.0, 0.0, 0.0));
        assert_eq!(collapsed, 0.0);
    }
}
