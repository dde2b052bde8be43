use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

use super::http_ocr::{HttpOcrClient, TextBox};
use super::preprocessing::load_rgb_png;
use super::OcrError;
use crate::models::comparison::ImageComparison;
use crate::models::recognition::Recognition;

/// Method 1: general-purpose scene-text OCR engine
#[derive(Clone)]
pub struct SceneTextRecognizer {
    client: HttpOcrClient,
}

impl SceneTextRecognizer {
    pub fn new(client: HttpOcrClient) -> Self {
        Self { client }
    }

    /// Recognize the first detected text region of the image at `image_path`
    ///
    /// Never fails: unreadable files, engine errors and empty detections are
    /// captured as a failed [`Recognition`].
    pub async fn recognize(&self, image_path: &Path) -> Recognition {
        let started = Instant::now();
        let outcome = self.first_region(image_path).await;
        let elapsed = started.elapsed().as_secs_f64();

        match outcome {
            Ok(region) => {
                debug!("Scene-text OCR read {:?} (score {:.3}) in {:.3}s", region.text, region.score, elapsed);
                Recognition::success(region.text, Some(region.score), elapsed)
            }
            Err(e) => {
                warn!("Scene-text OCR failed for {}: {}", image_path.display(), e);
                Recognition::failure(e.to_string(), elapsed)
            }
        }
    }

    async fn first_region(&self, image_path: &Path) -> Result<TextBox, OcrError> {
        let bytes = tokio::fs::read(image_path).await.map_err(|source| OcrError::Io {
            path: image_path.display().to_string(),
            source,
        })?;

        self.client
            .detect_text(&bytes)
            .await?
            .into_iter()
            .next()
            .ok_or(OcrError::NoTextDetected)
    }
}

/// Method 2: encoder-decoder transcription model
#[derive(Clone)]
pub struct TranscriptionRecognizer {
    client: HttpOcrClient,
}

impl TranscriptionRecognizer {
    pub fn new(client: HttpOcrClient) -> Self {
        Self { client }
    }

    /// Transcribe the image at `image_path`; produces no confidence score
    pub async fn recognize(&self, image_path: &Path) -> Recognition {
        let started = Instant::now();
        let outcome = self.transcribe(image_path.to_path_buf()).await;
        let elapsed = started.elapsed().as_secs_f64();

        match outcome {
            Ok(text) => {
                debug!("Transcription model produced {:?} in {:.3}s", text, elapsed);
                Recognition::success(text.trim(), None, elapsed)
            }
            Err(e) => {
                warn!("Transcription failed for {}: {}", image_path.display(), e);
                Recognition::failure(e.to_string(), elapsed)
            }
        }
    }

    async fn transcribe(&self, image_path: PathBuf) -> Result<String, OcrError> {
        // Decoding is CPU-bound, keep it off the async workers
        let png = tokio::task::spawn_blocking(move || load_rgb_png(&image_path))
            .await
            .map_err(|e| OcrError::Task(e.to_string()))??;

        self.client.transcribe(&png).await
    }
}

/// The two fixed pipelines compared by the service
#[derive(Clone)]
pub struct Recognizers {
    pub scene_text: SceneTextRecognizer,
    pub transcription: TranscriptionRecognizer,
}

impl Recognizers {
    pub fn new(client: HttpOcrClient) -> Self {
        Self {
            scene_text: SceneTextRecognizer::new(client.clone()),
            transcription: TranscriptionRecognizer::new(client),
        }
    }

    /// Run method 1 then method 2 on the same file and score both
    pub async fn compare(&self, image_path: &Path, user_answer: &str, filename: &str) -> ImageComparison {
        let method1 = self.scene_text.recognize(image_path).await;
        let method2 = self.transcription.recognize(image_path).await;

        ImageComparison::new(method1, method2, user_answer, filename)
    }
}
