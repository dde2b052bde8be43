use regex::Regex;
use std::sync::LazyLock;

use crate::models::recognition::Recognition;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("valid canonicalizer pattern"));

/// Accuracy awarded for an exact canonical match
pub const MATCH: f64 = 100.0;
/// Accuracy for anything else
pub const MISMATCH: f64 = 0.0;

/// Reduce text to lowercase ASCII alphanumerics
///
/// Used identically on predictions and user answers so comparisons ignore
/// case, whitespace and punctuation.
pub fn canonicalize(text: &str) -> String {
    NON_ALPHANUMERIC.replace_all(text, "").to_lowercase()
}

/// Binary accuracy of a prediction against a user answer
///
/// Returns 100 only when both inputs are non-empty and their canonical forms
/// are equal.
pub fn image_accuracy(prediction: &str, user_answer: &str) -> f64 {
    if prediction.is_empty() || user_answer.is_empty() {
        return MISMATCH;
    }

    if canonicalize(prediction) == canonicalize(user_answer) {
        MATCH
    } else {
        MISMATCH
    }
}

/// Score one recognizer outcome; failed recognitions always score 0
pub fn score(recognition: &Recognition, user_answer: &str) -> f64 {
    match recognition.prediction() {
        Some(prediction) => image_accuracy(prediction, user_answer),
        None => MISMATCH,
    }
}
