use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use handsign::hand::{FEATURE_VECTOR_LEN, Hand, LANDMARK_COUNT, Landmark, hand_features};
use handsign::ml::artifact::ARTIFACT_VERSION;
use handsign::ml::mlp::MlpNetwork;
use handsign::ml::{ClassifierArtifact, TrainingStats, predict};
use rand::{SeedableRng, rngs::StdRng};

const LABEL_COUNT: usize = 26;

fn sample_hand() -> Hand {
    let mut hand = [Landmark::ORIGIN; LANDMARK_COUNT];
    for (idx, point) in hand.iter_mut().enumerate().skip(1) {
        let finger = (idx - 1) / 4;
        let joint = ((idx - 1) % 4 + 1) as f32;
        *point = Landmark::new(
            0.1 + finger as f32 * 0.08 - 0.2,
            0.2 + joint * 0.09,
            -0.01 * joint,
        );
    }
    hand
}

fn default_artifact() -> ClassifierArtifact {
    let mut rng = StdRng::seed_from_u64(1);
    let network = MlpNetwork::random(&[FEATURE_VECTOR_LEN, 128, 64, 32, LABEL_COUNT], &mut rng);
    ClassifierArtifact {
        artifact_version: ARTIFACT_VERSION,
        feature_len: FEATURE_VECTOR_LEN,
        labels: (0..LABEL_COUNT)
            .map(|idx| char::from(b'A' + idx as u8).to_string())
            .collect(),
        network,
        stats: TrainingStats {
            iterations: 0,
            final_error: 0.0,
            final_accuracy: 0.0,
            samples: 0,
        },
    }
}

fn bench_features(c: &mut Criterion) {
    let hand = sample_hand();
    c.bench_function("hand_features", |b| {
        b.iter(|| hand_features(black_box(&hand)).expect("features"));
    });
}

fn bench_predict(c: &mut Criterion) {
    let artifact = default_artifact();
    let features = hand_features(&sample_hand()).expect("features");
    c.bench_with_input(
        BenchmarkId::new("predict", LABEL_COUNT),
        &features,
        |b, features| {
            b.iter(|| predict(Some(&artifact), black_box(features), 0.7));
        },
    );
}

criterion_group!(benches, bench_features, bench_predict);
criterion_main!(benches);
