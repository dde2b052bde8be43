pub mod http_ocr;
pub mod preprocessing;
pub mod recognizer;

#[cfg(test)]
pub(crate) mod test_support;

use thiserror::Error;

// Re-export main types
pub use http_ocr::{HttpOcrClient, TextBox};
pub use recognizer::{Recognizers, SceneTextRecognizer, TranscriptionRecognizer};

/// Reasons a recognizer run produced no text
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Failed to read image {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to process image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OCR server error ({status}): {body}")]
    Server { status: u16, body: String },

    #[error("No text detected")]
    NoTextDetected,

    #[error("Image preprocessing task failed: {0}")]
    Task(String),
}
