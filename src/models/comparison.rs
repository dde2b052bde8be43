use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::recognition::Recognition;
use crate::services::comparator;

/// Both recognizer outcomes for one uploaded image, scored against the user's answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageComparison {
    /// Scene-text OCR engine (method 1)
    pub algorithm_1: Recognition,
    /// Encoder-decoder transcription model (method 2)
    pub algorithm_2: Recognition,
    #[serde(default)]
    pub method1_accuracy: f64,
    #[serde(default)]
    pub method2_accuracy: f64,
    #[serde(default, deserialize_with = "answer_text")]
    pub user_answer: String,
    #[serde(default)]
    pub filename: String,
}

impl ImageComparison {
    /// Score both recognitions against `user_answer`
    pub fn new(
        algorithm_1: Recognition,
        algorithm_2: Recognition,
        user_answer: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        let user_answer = user_answer.into();
        let method1_accuracy = comparator::score(&algorithm_1, &user_answer);
        let method2_accuracy = comparator::score(&algorithm_2, &user_answer);

        Self {
            algorithm_1,
            algorithm_2,
            method1_accuracy,
            method2_accuracy,
            user_answer,
            filename: filename.into(),
        }
    }
}

/// Body of `POST /generate_report`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<ImageComparison>,
    #[serde(default, deserialize_with = "answer_list")]
    pub user_answers: Vec<String>,
}

/// Text form of a client-supplied answer
///
/// Browsers send numeric answers as JSON numbers; `null` means no answer.
fn answer_from_value(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn answer_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(answer_from_value)
}

fn answer_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let answers = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(answers.into_iter().map(answer_from_value).collect())
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
