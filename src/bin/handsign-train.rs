//! Developer utility to train a gesture classifier from exported samples.

use std::path::PathBuf;

use handsign::app_dirs;
use handsign::config::{self, TrainingSettings};
use handsign::hand::Sample;
use handsign::logging;
use handsign::ml::{IterationReport, TrainDataset, evaluate, train_classifier};

fn main() {
    if let Err(err) = logging::init("handsign-train") {
        eprintln!("Logging disabled: {err}");
    }
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let settings = match &options.config_path {
        Some(path) => config::load_from_path(path),
        None => config::load_or_default(),
    }
    .map_err(|err| err.to_string())?;
    let training = options.apply(settings.training);
    let model_out = match &options.model_out {
        Some(path) => path.clone(),
        None => app_dirs::default_model_path().map_err(|err| err.to_string())?,
    };

    let json = std::fs::read_to_string(&options.samples_path)
        .map_err(|err| format!("Failed to read {}: {err}", options.samples_path.display()))?;
    let samples: Vec<Sample> = serde_json::from_str(&json)
        .map_err(|err| format!("Invalid samples file {}: {err}", options.samples_path.display()))?;

    let (train_samples, test_samples): (Vec<_>, Vec<_>) = samples
        .into_iter()
        .enumerate()
        .partition(|(idx, sample)| split_u01(sample, *idx) >= options.holdout);
    let train_samples: Vec<Sample> = train_samples.into_iter().map(|(_, s)| s).collect();
    let test_samples: Vec<Sample> = test_samples.into_iter().map(|(_, s)| s).collect();

    let mut dataset = TrainDataset::from_samples(&train_samples);
    println!(
        "Loaded {} training samples across {} labels (skipped {})",
        dataset.len(),
        dataset.labels.len(),
        dataset.skipped
    );
    for (label, count) in dataset.label_counts() {
        if count < training.min_samples_per_label {
            println!(
                "warning: label {label} has only {count} samples (recommended {})",
                training.min_samples_per_label
            );
        }
    }
    if training.balance_labels {
        dataset = dataset.balanced(training.seed);
        println!("Balanced to {} samples", dataset.len());
    }

    let train_options = training.train_options();
    let period = train_options.log_period.max(1);
    let mut progress = |report: &IterationReport| {
        if report.iteration % period == 0 || report.iteration == 1 {
            println!(
                "iteration {:>5}  error={:.5}  accuracy={:.3}",
                report.iteration, report.error, report.accuracy
            );
        }
    };
    let artifact = train_classifier(&dataset, &train_options, Some(&mut progress))
        .map_err(|err| err.to_string())?;
    println!(
        "Finished after {} iterations, final error {:.5}",
        artifact.stats.iterations, artifact.stats.final_error
    );
    artifact.save_json(&model_out).map_err(|err| err.to_string())?;
    println!("Wrote {}", model_out.display());

    let holdout = TrainDataset::from_samples(&test_samples);
    if holdout.is_empty() {
        println!("No holdout samples; skipping evaluation");
        return Ok(());
    }
    let report = evaluate(&artifact, &holdout);
    println!("holdout accuracy: {:.4}", report.accuracy());
    for (label, stats) in report.per_label() {
        println!(
            "{:<16}  precision={:.3}  recall={:.3}  support={}",
            label, stats.precision, stats.recall, stats.support
        );
    }
    if report.unknown_labels > 0 {
        println!("{} holdout samples had labels missing from training", report.unknown_labels);
    }
    println!("confusion matrix (rows=true, cols=pred):");
    for truth in 0..report.confusion.n_labels {
        let mut row = String::new();
        for pred in 0..report.confusion.n_labels {
            row.push_str(&format!("{:6}", report.confusion.get(truth, pred)));
        }
        println!("{row}");
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct CliOptions {
    samples_path: PathBuf,
    model_out: Option<PathBuf>,
    config_path: Option<PathBuf>,
    holdout: f32,
    hidden_layers: Option<Vec<usize>>,
    iterations: Option<usize>,
    learning_rate: Option<f32>,
    momentum: Option<f32>,
    seed: Option<u64>,
    no_balance: bool,
}

impl CliOptions {
    fn apply(&self, mut training: TrainingSettings) -> TrainingSettings {
        if let Some(hidden) = &self.hidden_layers {
            training.hidden_layers = hidden.clone();
        }
        if let Some(iterations) = self.iterations {
            training.max_iterations = iterations;
        }
        if let Some(learning_rate) = self.learning_rate {
            training.learning_rate = learning_rate;
        }
        if let Some(momentum) = self.momentum {
            training.momentum = momentum;
        }
        if let Some(seed) = self.seed {
            training.seed = seed;
        }
        if self.no_balance {
            training.balance_labels = false;
        }
        training
    }
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut samples_path: Option<PathBuf> = None;
    let mut model_out = None;
    let mut config_path = None;
    let mut holdout = 0.2f32;
    let mut hidden_layers = None;
    let mut iterations = None;
    let mut learning_rate = None;
    let mut momentum = None;
    let mut seed = None;
    let mut no_balance = false;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--samples" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--samples requires a value".to_string())?;
                samples_path = Some(PathBuf::from(value));
            }
            "--out" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--out requires a value".to_string())?;
                model_out = Some(PathBuf::from(value));
            }
            "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                config_path = Some(PathBuf::from(value));
            }
            "--holdout" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--holdout requires a value".to_string())?;
                holdout = value
                    .parse::<f32>()
                    .ok()
                    .filter(|v| (0.0..1.0).contains(v))
                    .ok_or_else(|| format!("Invalid --holdout value: {value}"))?;
            }
            "--hidden" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--hidden requires a value".to_string())?;
                let sizes = value
                    .split(',')
                    .map(|part| part.trim().parse::<usize>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| format!("Invalid --hidden value: {value}"))?;
                hidden_layers = Some(sizes);
            }
            "--iterations" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--iterations requires a value".to_string())?;
                iterations = Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| format!("Invalid --iterations value: {value}"))?,
                );
            }
            "--learning-rate" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--learning-rate requires a value".to_string())?;
                learning_rate = Some(
                    value
                        .parse::<f32>()
                        .map_err(|_| format!("Invalid --learning-rate value: {value}"))?,
                );
            }
            "--momentum" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--momentum requires a value".to_string())?;
                momentum = Some(
                    value
                        .parse::<f32>()
                        .map_err(|_| format!("Invalid --momentum value: {value}"))?,
                );
            }
            "--seed" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--seed requires a value".to_string())?;
                seed = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("Invalid --seed value: {value}"))?,
                );
            }
            "--no-balance" => {
                no_balance = true;
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let samples_path = samples_path.ok_or_else(help_text)?;
    Ok(CliOptions {
        samples_path,
        model_out,
        config_path,
        holdout,
        hidden_layers,
        iterations,
        learning_rate,
        momentum,
        seed,
        no_balance,
    })
}

fn help_text() -> String {
    [
        "handsign-train",
        "",
        "Trains a gesture classifier from a JSON array of samples and writes an artifact.",
        "",
        "Usage:",
        "  handsign-train --samples <samples.json> [--out <model.json>]",
        "",
        "Options:",
        "  --samples <file>      JSON array of {landmarks, label, timestamp} (required).",
        "  --out <file>          Output artifact path (default <app dir>/models/model.json).",
        "  --config <file>       Settings TOML (default: app config directory).",
        "  --holdout <f>         Fraction of samples held out for evaluation (default 0.2).",
        "  --hidden <a,b,c>      Hidden layer sizes (default 128,64,32).",
        "  --iterations <n>      Maximum training iterations (default 3000).",
        "  --learning-rate <f>   Learning rate (default 0.1).",
        "  --momentum <f>        Momentum (default 0.1).",
        "  --seed <n>            RNG seed (default 42).",
        "  --no-balance          Train on all samples instead of balancing labels.",
    ]
    .join("\n")
}

/// Stable pseudo-random position in `[0, 1)` used for the holdout split.
fn split_u01(sample: &Sample, idx: usize) -> f32 {
    let key = format!("{}:{}:{}", sample.label, sample.timestamp, idx);
    let hash = blake3::hash(key.as_bytes());
    let bytes = hash.as_bytes();
    let raw = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    raw as f32 / u32::MAX as f32
}
