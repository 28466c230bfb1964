//! Labeled feature rows ready for training or evaluation.

use std::collections::{BTreeMap, BTreeSet};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::hand::{FeatureVector, Sample};

/// Feature rows with class indices into the sorted, de-duplicated `labels`.
#[derive(Debug, Clone, Default)]
pub struct TrainDataset {
    pub labels: Vec<String>,
    pub rows: Vec<FeatureVector>,
    pub targets: Vec<usize>,
    /// Samples dropped because they failed validation or feature extraction.
    pub skipped: usize,
}

impl TrainDataset {
    /// Build a dataset from stored samples, dropping any that cannot produce features.
    pub fn from_samples(samples: &[Sample]) -> Self {
        let mut rows = Vec::with_capacity(samples.len());
        let mut skipped = 0usize;
        for (idx, sample) in samples.iter().enumerate() {
            match sample.features() {
                Ok(features) => rows.push((features, sample.label.clone())),
                Err(err) => {
                    debug!("Dropping sample {idx} ({}): {err}", sample.label);
                    skipped += 1;
                }
            }
        }
        let mut dataset = Self::from_rows(rows);
        dataset.skipped = skipped;
        dataset
    }

    /// Build a dataset from already extracted rows.
    pub fn from_rows(rows: Vec<(FeatureVector, String)>) -> Self {
        let labels: Vec<String> = rows
            .iter()
            .map(|(_, label)| label.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index: BTreeMap<&str, usize> = labels
            .iter()
            .enumerate()
            .map(|(idx, label)| (label.as_str(), idx))
            .collect();
        let targets = rows.iter().map(|(_, label)| index[label.as_str()]).collect();
        let rows = rows.into_iter().map(|(features, _)| features).collect();
        Self {
            labels,
            rows,
            targets,
            skipped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn label_of(&self, row: usize) -> &str {
        &self.labels[self.targets[row]]
    }

    pub fn label_counts(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> =
            self.labels.iter().map(|label| (label.clone(), 0)).collect();
        for &target in &self.targets {
            if let Some(count) = counts.get_mut(&self.labels[target]) {
                *count += 1;
            }
        }
        counts
    }

    /// Downsample every label to the size of the smallest one.
    ///
    /// Row selection is a seeded shuffle, so the same seed always keeps the same rows. Kept
    /// rows stay in their original order.
    pub fn balanced(&self, seed: u64) -> Self {
        let mut per_label: Vec<Vec<usize>> = vec![Vec::new(); self.labels.len()];
        for (row, &target) in self.targets.iter().enumerate() {
            per_label[target].push(row);
        }
        let keep_count = per_label.iter().map(Vec::len).min().unwrap_or(0);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut kept: Vec<usize> = Vec::with_capacity(keep_count * self.labels.len());
        for rows in &mut per_label {
            rows.shuffle(&mut rng);
            kept.extend_from_slice(&rows[..keep_count]);
        }
        kept.sort_unstable();
        Self {
            labels: self.labels.clone(),
            rows: kept.iter().map(|&row| self.rows[row].clone()).collect(),
            targets: kept.iter().map(|&row| self.targets[row]).collect(),
            skipped: self.skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::{FEATURE_VECTOR_LEN, LANDMARK_COUNT, Landmark};

    fn row(value: f32) -> FeatureVector {
        FeatureVector::from_values(vec![value; FEATURE_VECTOR_LEN]).unwrap()
    }

    #[test]
    fn labels_are_sorted_and_unique() {
        let dataset = TrainDataset::from_rows(vec![
            (row(0.1), "C".into()),
            (row(0.2), "A".into()),
            (row(0.3), "C".into()),
        ]);
        assert_eq!(dataset.labels, vec!["A".to_string(), "C".to_string()]);
        assert_eq!(dataset.targets, vec![1, 0, 1]);
        assert_eq!(dataset.label_of(1), "A");
    }

    #[test]
    fn invalid_samples_are_counted_and_dropped() {
        let good: Vec<Landmark> = (0..LANDMARK_COUNT)
            .map(|i| Landmark::new(0.4 + i as f32 * 0.01, 0.5, 0.0))
            .collect();
        let mut bad = good.clone();
        bad[3].x = f32::NAN;
        let samples = vec![
            Sample::new(good.clone(), "A", 1),
            Sample::new(bad, "A", 2),
            Sample::new(good[..20].to_vec(), "B", 3),
        ];
        let dataset = TrainDataset::from_samples(&samples);
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.skipped, 2);
        assert_eq!(dataset.labels, vec!["A".to_string()]);
    }

    #[test]
    fn balancing_caps_each_label_and_is_deterministic() {
        let mut rows = Vec::new();
        for i in 0..6 {
            rows.push((row(i as f32), "A".to_string()));
        }
        for i in 0..2 {
            rows.push((row(10.0 + i as f32), "B".to_string()));
        }
        let dataset = TrainDataset::from_rows(rows);
        let balanced = dataset.balanced(3);
        let counts = balanced.label_counts();
        assert_eq!(counts["A"], 2);
        assert_eq!(counts["B"], 2);
        assert_eq!(balanced.rows, dataset.balanced(3).rows);
    }
}
