//! Synthetic hand poses for pipeline tests.

use handsign::hand::{LANDMARK_COUNT, Landmark, Sample};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Palm-side base joint of each finger, thumb first.
const FINGER_ROOTS: [(f32, f32); 5] = [
    (-0.30, 0.20),
    (-0.15, 0.50),
    (0.00, 0.55),
    (0.15, 0.50),
    (0.30, 0.45),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pose {
    Open,
    Fist,
    Point,
}

impl Pose {
    pub const ALL: [Pose; 3] = [Pose::Open, Pose::Fist, Pose::Point];

    pub fn label(self) -> &'static str {
        match self {
            Pose::Open => "open",
            Pose::Fist => "fist",
            Pose::Point => "point",
        }
    }

    fn extended(self, finger: usize) -> bool {
        match self {
            Pose::Open => true,
            Pose::Fist => false,
            Pose::Point => finger == 1,
        }
    }
}

/// 21 landmarks for `pose`, wrist at the origin, in unit-ish camera space.
pub fn pose_landmarks(pose: Pose) -> Vec<Landmark> {
    let mut points = vec![Landmark::ORIGIN; LANDMARK_COUNT];
    for (finger, &(rx, ry)) in FINGER_ROOTS.iter().enumerate() {
        let first = 1 + finger * 4;
        let root = Landmark::new(rx, ry, 0.0);
        let dir = root.scale(1.0 / root.norm());
        points[first] = root;
        for joint in 1..4 {
            let step = joint as f32;
            points[first + joint] = if pose.extended(finger) {
                Landmark::new(
                    root.x + dir.x * 0.15 * step,
                    root.y + dir.y * 0.15 * step,
                    0.0,
                )
            } else {
                let curl = [(0.08, -0.06), (0.0, -0.12), (-0.10, -0.08)][joint - 1];
                Landmark::new(root.x, root.y + curl.0, curl.1)
            };
        }
    }
    points
}

/// Apply a similarity transform plus per-point noise.
pub fn jittered(base: &[Landmark], rng: &mut StdRng, noise: f32) -> Vec<Landmark> {
    let scale = rng.random_range(0.5..2.0f32);
    let offset = Landmark::new(
        rng.random_range(-1.0..1.0f32),
        rng.random_range(-1.0..1.0f32),
        rng.random_range(-0.2..0.2f32),
    );
    base.iter()
        .map(|point| {
            let noisy = Landmark::new(
                point.x + rng.random_range(-noise..=noise),
                point.y + rng.random_range(-noise..=noise),
                point.z + rng.random_range(-noise..=noise),
            );
            Landmark::new(
                noisy.x * scale + offset.x,
                noisy.y * scale + offset.y,
                noisy.z * scale + offset.z,
            )
        })
        .collect()
}

/// `per_pose` jittered samples for every pose in [`Pose::ALL`].
pub fn pose_samples(per_pose: usize, seed: u64) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut samples = Vec::with_capacity(per_pose * Pose::ALL.len());
    let mut timestamp = 1_700_000_000_000i64;
    for pose in Pose::ALL {
        let base = pose_landmarks(pose);
        for _ in 0..per_pose {
            samples.push(Sample::new(
                jittered(&base, &mut rng, 0.01),
                pose.label(),
                timestamp,
            ));
            timestamp += 33;
        }
    }
    samples
}
