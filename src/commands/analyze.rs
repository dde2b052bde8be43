use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, info, warn};

use super::SharedState;
use crate::error::ApiError;
use crate::models::comparison::ImageComparison;
use crate::services::uploads::StoredUpload;

const CAPTCHA_FIELD: &str = "captcha";
const USER_ANSWER_FIELD: &str = "user_answer";

/// File part of the form, before validation
struct CaptchaPart {
    file_name: String,
    bytes: Bytes,
}

/// Fields read from the analysis form
#[derive(Default)]
struct AnalyzeForm {
    captcha: Option<CaptchaPart>,
    user_answer: String,
}

impl AnalyzeForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some(CAPTCHA_FIELD) => {
                    // A part without a filename is a plain value, not an upload
                    let Some(file_name) = field.file_name().map(str::to_string) else {
                        continue;
                    };
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    form.captcha = Some(CaptchaPart { file_name, bytes });
                }
                Some(USER_ANSWER_FIELD) => {
                    form.user_answer = field.text().await.map_err(multipart_error)?;
                }
                other => debug!("Ignoring form field {:?}", other),
            }
        }

        Ok(form)
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("File too large".to_string())
    } else {
        ApiError::bad_request(e.body_text())
    }
}

/// Run both recognizers on one uploaded CAPTCHA and score them against the user's answer
///
/// The upload is validated before anything touches disk; the stored copy is
/// removed before responding.
pub async fn analyze_single(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageComparison>, ApiError> {
    // Not a multipart body at all: same as a form without the file part
    let form = match multipart {
        Ok(multipart) => AnalyzeForm::read(multipart).await?,
        Err(rejection) => {
            debug!("Multipart rejected: {}", rejection.body_text());
            AnalyzeForm::default()
        }
    };

    let captcha = form
        .captcha
        .ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    if captcha.file_name.is_empty() {
        return Err(ApiError::bad_request("No file selected"));
    }
    if !state.upload.is_allowed(&captcha.file_name) {
        return Err(ApiError::bad_request("Invalid file format"));
    }

    let _pipeline = state.pipeline.lock().await;

    let upload = StoredUpload::save(&state.upload.dir, &captcha.file_name, &captcha.bytes)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store upload: {}", e)))?;
    info!("Analyzing {} ({} bytes)", upload.file_name(), captcha.bytes.len());

    let comparison = state
        .recognizers
        .compare(upload.path(), &form.user_answer, upload.file_name())
        .await;

    info!(
        "{}: method 1 {} ({:?}s), method 2 {} ({:?}s)",
        comparison.filename,
        comparison.method1_accuracy,
        comparison.algorithm_1.processing_time(),
        comparison.method2_accuracy,
        comparison.algorithm_2.processing_time(),
    );

    upload.remove().map_err(|e| {
        warn!("Failed to delete upload {}: {}", comparison.filename, e);
        ApiError::internal(format!("Failed to delete upload: {}", e))
    })?;

    Ok(Json(comparison))
}
