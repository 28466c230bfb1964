//! Practice-mode feedback derived from a prediction and the gesture the learner was asked for.

use serde::{Deserialize, Serialize};

use crate::ml::Prediction;

/// Confidence needed for a correct gesture to count as a success.
pub const DEFAULT_SUCCESS_THRESHOLD: f32 = 0.7;
/// Lowest confidence at which a correct gesture still counts as partial.
pub const PARTIAL_FLOOR: f32 = 0.5;
/// Lowest confidence at which a wrong gesture is reported as a mismatch.
pub const MISMATCH_FLOOR: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    Success,
    Partial,
    Mismatch,
    Unclear,
}

impl FeedbackCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Mismatch => "mismatch",
            Self::Unclear => "unclear",
        }
    }
}

/// Categorize with the default success threshold.
pub fn classify_feedback(predicted: &str, expected: &str, confidence: f32) -> FeedbackCategory {
    classify_feedback_with_threshold(predicted, expected, confidence, DEFAULT_SUCCESS_THRESHOLD)
}

/// Rules are checked in order and the first match wins:
/// 1. same label, `confidence >= threshold`: success
/// 2. same label, `PARTIAL_FLOOR <= confidence < threshold`: partial
/// 3. different label, `confidence >= MISMATCH_FLOOR`: mismatch
/// 4. anything else: unclear
pub fn classify_feedback_with_threshold(
    predicted: &str,
    expected: &str,
    confidence: f32,
    threshold: f32,
) -> FeedbackCategory {
    let same = predicted == expected;
    if same && confidence >= threshold {
        FeedbackCategory::Success
    } else if same && confidence >= PARTIAL_FLOOR && confidence < threshold {
        FeedbackCategory::Partial
    } else if !same && confidence >= MISMATCH_FLOOR {
        FeedbackCategory::Mismatch
    } else {
        FeedbackCategory::Unclear
    }
}

/// Feedback for a full prediction. Anything short of a recognized label is unclear.
pub fn feedback_for(prediction: &Prediction, expected: &str, threshold: f32) -> FeedbackCategory {
    if !prediction.is_recognized() {
        return FeedbackCategory::Unclear;
    }
    classify_feedback_with_threshold(
        prediction.display_label(),
        expected,
        prediction.confidence(),
        threshold,
    )
}
