//! Translation and scale normalization of a hand.
//!
//! The wrist becomes the origin and the farthest landmark ends up at distance 1, so hands of
//! different sizes and camera distances produce comparable geometry.

use super::landmark::{Hand, Landmark, WRIST};

/// Move the wrist to the origin and scale the hand to unit radius.
///
/// A degenerate hand (every landmark on the wrist) is returned translated but unscaled, which
/// yields all-zero landmarks.
pub fn normalize(hand: &Hand) -> Hand {
    let wrist = hand[WRIST];
    let translated: Hand = hand.map(|point| point.sub(&wrist));

    let max_distance = translated
        .iter()
        .map(Landmark::norm)
        .filter(|distance| *distance > 0.0)
        .fold(0.0f32, f32::max);
    if max_distance == 0.0 || !max_distance.is_finite() {
        return translated;
    }

    let inv = 1.0 / max_distance;
    translated.map(|point| point.scale(inv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::landmark::LANDMARK_COUNT;

    fn sample_hand() -> Hand {
        std::array::from_fn(|i| {
            let t = i as f32;
            Landmark::new(0.4 + 0.01 * t, 0.6 - 0.015 * (t * 0.7).sin(), 0.002 * t)
        })
    }

    fn assert_close(a: &Hand, b: &Hand) {
        for (lhs, rhs) in a.iter().zip(b.iter()) {
            assert!((lhs.x - rhs.x).abs() < 1e-4, "{lhs:?} vs {rhs:?}");
            assert!((lhs.y - rhs.y).abs() < 1e-4, "{lhs:?} vs {rhs:?}");
            assert!((lhs.z - rhs.z).abs() < 1e-4, "{lhs:?} vs {rhs:?}");
        }
    }

    #[test]
    fn wrist_becomes_origin_and_radius_is_one() {
        let out = normalize(&sample_hand());
        assert_eq!(out[WRIST], Landmark::ORIGIN);
        let max = out.iter().map(Landmark::norm).fold(0.0f32, f32::max);
        assert!((max - 1.0).abs() < 1e-5);
    }

    #[test]
    fn invariant_to_scale_and_translation() {
        let hand = sample_hand();
        let shifted = hand.map(|p| {
            let scaled = p.scale(2.5);
            Landmark::new(scaled.x + 0.3, scaled.y - 0.2, scaled.z + 0.05)
        });
        assert_close(&normalize(&hand), &normalize(&shifted));
    }

    #[test]
    fn degenerate_hand_collapses_to_zero() {
        let hand = [Landmark::new(0.5, 0.5, 0.1); LANDMARK_COUNT];
        let out = normalize(&hand);
        assert!(out.iter().all(|p| *p == Landmark::ORIGIN));
    }
}
