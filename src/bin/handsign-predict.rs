//! Classify a single captured hand with a trained artifact.

use std::path::PathBuf;

use handsign::app_dirs;
use handsign::config;
use handsign::feedback::feedback_for;
use handsign::hand::{Landmark, Sample};
use handsign::logging;
use handsign::ml::{ClassifierArtifact, Prediction, predict_landmarks};
use serde::Deserialize;

fn main() {
    if let Err(err) = logging::init("handsign-predict") {
        eprintln!("Logging disabled: {err}");
    }
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

/// Accepts either a bare landmark array or an exported sample.
#[derive(Deserialize)]
#[serde(untagged)]
enum HandInput {
    Landmarks(Vec<Landmark>),
    Sample(Sample),
}

impl HandInput {
    fn into_landmarks(self) -> (Vec<Landmark>, Option<String>) {
        match self {
            Self::Landmarks(landmarks) => (landmarks, None),
            Self::Sample(sample) => (sample.landmarks, Some(sample.label)),
        }
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let settings = config::load_or_default().map_err(|err| err.to_string())?;
    let threshold = options
        .threshold
        .unwrap_or(settings.inference.confidence_threshold);

    let model_path = match &options.model_path {
        Some(path) => path.clone(),
        None => app_dirs::default_model_path().map_err(|err| err.to_string())?,
    };
    let artifact = ClassifierArtifact::load_json(&model_path).map_err(|err| err.to_string())?;
    let json = std::fs::read_to_string(&options.landmarks_path)
        .map_err(|err| format!("Failed to read {}: {err}", options.landmarks_path.display()))?;
    let input: HandInput = serde_json::from_str(&json).map_err(|err| {
        format!(
            "Invalid landmarks file {}: {err}",
            options.landmarks_path.display()
        )
    })?;
    let (landmarks, sample_label) = input.into_landmarks();

    let prediction = predict_landmarks(Some(&artifact), &landmarks, threshold);
    print_prediction(&prediction);

    if let Some(expected) = options.expect.or(sample_label) {
        let category = feedback_for(&prediction, &expected, settings.inference.success_threshold);
        println!("expected {expected}: {}", category.as_str());
    }
    Ok(())
}

fn print_prediction(prediction: &Prediction) {
    println!(
        "prediction: {}  confidence={:.3}",
        prediction.display_label(),
        prediction.confidence()
    );
    if let Prediction::Uncertain { candidate, .. } = prediction {
        println!("best candidate: {candidate}");
    }
    if let Some(scores) = prediction.scores() {
        let mut ranked: Vec<_> = scores.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(a.1));
        for (label, score) in ranked {
            println!("  {label:<16} {score:.4}");
        }
    }
}

#[derive(Debug, Clone)]
struct CliOptions {
    model_path: Option<PathBuf>,
    landmarks_path: PathBuf,
    threshold: Option<f32>,
    expect: Option<String>,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut model_path: Option<PathBuf> = None;
    let mut landmarks_path: Option<PathBuf> = None;
    let mut threshold = None;
    let mut expect = None;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--model" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--model requires a value".to_string())?;
                model_path = Some(PathBuf::from(value));
            }
            "--landmarks" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--landmarks requires a value".to_string())?;
                landmarks_path = Some(PathBuf::from(value));
            }
            "--threshold" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--threshold requires a value".to_string())?;
                threshold = Some(
                    value
                        .parse::<f32>()
                        .ok()
                        .filter(|v| (0.0..=1.0).contains(v))
                        .ok_or_else(|| format!("Invalid --threshold value: {value}"))?,
                );
            }
            "--expect" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--expect requires a value".to_string())?;
                expect = Some(value.clone());
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let landmarks_path = landmarks_path.ok_or_else(help_text)?;
    Ok(CliOptions {
        model_path,
        landmarks_path,
        threshold,
        expect,
    })
}

fn help_text() -> String {
    [
        "handsign-predict",
        "",
        "Classifies one hand (21 landmarks) with a trained artifact.",
        "",
        "Usage:",
        "  handsign-predict --landmarks <hand.json> [--model <model.json>] [--expect <label>]",
        "",
        "Options:",
        "  --model <file>        Artifact written by handsign-train (default <app dir>/models/model.json).",
        "  --landmarks <file>    JSON array of {x,y,z} or an exported sample (required).",
        "  --threshold <f>       Confidence threshold (default from config, 0.7).",
        "  --expect <label>      Print practice feedback against this label.",
    ]
    .join("\n")
}
