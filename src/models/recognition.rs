use serde::{Deserialize, Serialize};

use crate::services::comparator::canonicalize;

/// Text produced by a successful recognizer run
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    pub cleaned_text: String,
    /// Only the scene-text engine reports a confidence
    pub confidence: Option<f64>,
    pub processing_time: f64,
}

/// A recognizer run that produced no usable text
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionFailure {
    pub error: String,
    pub processing_time: Option<f64>,
}

/// Outcome of one recognizer invocation
///
/// Serialized in the flat `{success, text, cleaned_text, confidence,
/// processing_time, error}` shape clients exchange with the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecognitionRecord", into = "RecognitionRecord")]
pub enum Recognition {
    Success(RecognizedText),
    Failure(RecognitionFailure),
}

impl Recognition {
    /// Successful run; the canonical form is derived from `text`
    pub fn success(text: impl Into<String>, confidence: Option<f64>, processing_time: f64) -> Self {
        let text = text.into();
        let cleaned_text = canonicalize(&text);
        Self::Success(RecognizedText {
            text,
            cleaned_text,
            confidence,
            processing_time,
        })
    }

    pub fn failure(error: impl Into<String>, processing_time: f64) -> Self {
        Self::Failure(RecognitionFailure {
            error: error.into(),
            processing_time: Some(processing_time),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Canonical prediction, if the run succeeded
    pub fn prediction(&self) -> Option<&str> {
        match self {
            Self::Success(recognized) => Some(&recognized.cleaned_text),
            Self::Failure(_) => None,
        }
    }

    /// Latency of a successful run; failed runs are excluded from averages
    pub fn successful_time(&self) -> Option<f64> {
        match self {
            Self::Success(recognized) => Some(recognized.processing_time),
            Self::Failure(_) => None,
        }
    }

    pub fn processing_time(&self) -> Option<f64> {
        match self {
            Self::Success(recognized) => Some(recognized.processing_time),
            Self::Failure(failure) => failure.processing_time,
        }
    }
}

/// Flat wire representation of [`Recognition`]
#[derive(Debug, Serialize, Deserialize)]
struct RecognitionRecord {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cleaned_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    processing_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TryFrom<RecognitionRecord> for Recognition {
    type Error = String;

    fn try_from(record: RecognitionRecord) -> Result<Self, Self::Error> {
        if !record.success {
            return Ok(Self::Failure(RecognitionFailure {
                error: record.error.unwrap_or_else(|| "Unknown error".to_string()),
                processing_time: record.processing_time,
            }));
        }

        let processing_time = record
            .processing_time
            .ok_or("successful recognition is missing processing_time")?;

        let cleaned_text = match (&record.cleaned_text, &record.text) {
            (Some(cleaned), _) => cleaned.clone(),
            (None, Some(text)) => canonicalize(text),
            (None, None) => {
                return Err("successful recognition has neither text nor cleaned_text".to_string())
            }
        };

        Ok(Self::Success(RecognizedText {
            text: record.text.unwrap_or_else(|| cleaned_text.clone()),
            cleaned_text,
            confidence: record.confidence,
            processing_time,
        }))
    }
}

impl From<Recognition> for RecognitionRecord {
    fn from(recognition: Recognition) -> Self {
        match recognition {
            Recognition::Success(recognized) => Self {
                success: true,
                text: Some(recognized.text),
                cleaned_text: Some(recognized.cleaned_text),
                confidence: recognized.confidence,
                processing_time: Some(recognized.processing_time),
                error: None,
            },
            Recognition::Failure(failure) => Self {
                success: false,
                text: None,
                cleaned_text: None,
                confidence: None,
                processing_time: failure.processing_time,
                error: Some(failure.error),
            },
        }
    }
}
