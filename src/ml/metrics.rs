//! Evaluation of a trained classifier against labeled rows.

use std::collections::BTreeMap;

use crate::ml::artifact::ClassifierArtifact;
use crate::ml::dataset::TrainDataset;

#[derive(Debug, Clone, PartialEq)]
/// Confusion matrix for a `K`-label classifier.
pub struct ConfusionMatrix {
    pub n_labels: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    pub fn new(n_labels: usize) -> Self {
        Self {
            n_labels,
            counts: vec![0; n_labels * n_labels],
        }
    }

    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_labels || predicted >= self.n_labels {
            return;
        }
        let idx = truth * self.n_labels + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_labels + predicted]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn accuracy(&self) -> f32 {
        let correct: u32 = (0..self.n_labels).map(|i| self.get(i, i)).sum();
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            correct as f32 / total as f32
        }
    }

    /// Precision and recall per label, in label order.
    pub fn per_label(&self) -> Vec<LabelStats> {
        (0..self.n_labels)
            .map(|label| {
                let tp = self.get(label, label) as f32;
                let support: u32 = (0..self.n_labels).map(|j| self.get(label, j)).sum();
                let predicted: u32 = (0..self.n_labels).map(|i| self.get(i, label)).sum();
                let precision = if predicted == 0 { 0.0 } else { tp / predicted as f32 };
                let recall = if support == 0 { 0.0 } else { tp / support as f32 };
                LabelStats {
                    precision,
                    recall,
                    support,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStats {
    /// `TP / (TP + FP)`.
    pub precision: f32,
    /// `TP / (TP + FN)`.
    pub recall: f32,
    pub support: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Artifact label order; indexes both matrix axes.
    pub labels: Vec<String>,
    pub confusion: ConfusionMatrix,
    /// Rows whose label the artifact was never trained on.
    pub unknown_labels: usize,
}

impl Evaluation {
    pub fn accuracy(&self) -> f32 {
        self.confusion.accuracy()
    }

    pub fn per_label(&self) -> BTreeMap<String, LabelStats> {
        self.labels
            .iter()
            .cloned()
            .zip(self.confusion.per_label())
            .collect()
    }
}

/// Run the artifact over every row and tally argmax predictions.
pub fn evaluate(artifact: &ClassifierArtifact, dataset: &TrainDataset) -> Evaluation {
    let index: BTreeMap<&str, usize> = artifact
        .labels
        .iter()
        .enumerate()
        .map(|(idx, label)| (label.as_str(), idx))
        .collect();
    let mut confusion = ConfusionMatrix::new(artifact.labels.len());
    let mut unknown_labels = 0usize;
    for (row, features) in dataset.rows.iter().enumerate() {
        let Some(&truth) = index.get(dataset.label_of(row)) else {
            unknown_labels += 1;
            continue;
        };
        let scores = artifact.network.forward(features.as_slice());
        if let Some(predicted) = argmax(&scores) {
            confusion.add(truth, predicted);
        }
    }
    Evaluation {
        labels: artifact.labels.clone(),
        confusion,
        unknown_labels,
    }
}

fn argmax(values: &[f32]) -> Option<usize> {
    let mut best = None;
    let mut best_val = f32::NEG_INFINITY;
    for (idx, &value) in values.iter().enumerate() {
        if value > best_val {
            best_val = value;
            best = Some(idx);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_recall_from_counts() {
        let mut cm = ConfusionMatrix::new(2);
        cm.add(0, 0);
        cm.add(0, 0);
        cm.add(0, 1);
        cm.add(1, 1);
        cm.add(5, 0);
        assert_eq!(cm.total(), 4);
        assert!((cm.accuracy() - 0.75).abs() < 1e-6);
        let stats = cm.per_label();
        assert!((stats[0].precision - 1.0).abs() < 1e-6);
        assert!((stats[0].recall - 2.0 / 3.0).abs() < 1e-6);
        assert!((stats[1].precision - 0.5).abs() < 1e-6);
        assert_eq!(stats[1].support, 1);
    }

    #[test]
    fn empty_matrix_has_zero_accuracy() {
        assert_eq!(ConfusionMatrix::new(3).accuracy(), 0.0);
    }
}
