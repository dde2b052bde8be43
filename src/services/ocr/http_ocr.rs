use base64::{engine::general_purpose, Engine as _};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::OcrError;
use crate::models::config::ModelServerConfig;

/// HTTP client for the model server hosting both pretrained recognizers
#[derive(Clone)]
pub struct HttpOcrClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct ImageRequest {
    image_base64: String,
}

/// Single detected text region
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct TextBox {
    /// 4 corner points [[x1,y1], [x2,y2], [x3,y3], [x4,y4]]
    #[serde(rename = "box", default)]
    pub bbox: Vec<Vec<f64>>,
    pub text: String,
    pub score: f64,
}

/// Response of the scene-text endpoint, regions in engine order
#[derive(Deserialize)]
struct OcrResponse {
    boxes: Vec<TextBox>,
}

/// Response of the transcription endpoint
#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl HttpOcrClient {
    /// Create a new client for the configured model server
    pub fn new(config: &ModelServerConfig) -> Result<Self, OcrError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the model server is up and its models are loaded
    pub async fn health_check(&self) -> Result<(), OcrError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }
        Ok(())
    }

    /// Run the scene-text engine over raw image file bytes
    pub async fn detect_text(&self, image_bytes: &[u8]) -> Result<Vec<TextBox>, OcrError> {
        let data: OcrResponse = self.post_image("ocr", image_bytes).await?;
        Ok(data.boxes)
    }

    /// Run the transcription model over an RGB PNG
    pub async fn transcribe(&self, image_png: &[u8]) -> Result<String, OcrError> {
        let data: TranscriptionResponse = self.post_image("transcribe", image_png).await?;
        Ok(data.text)
    }

    async fn post_image<T: DeserializeOwned>(&self, endpoint: &str, image: &[u8]) -> Result<T, OcrError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let image_base64 = general_purpose::STANDARD.encode(image);

        let response = self
            .client
            .post(&url)
            .json(&ImageRequest { image_base64 })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        Ok(response.json().await?)
    }

    async fn server_error(response: reqwest::Response) -> OcrError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        OcrError::Server { status, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ocr::test_support::FakeModelServer;
    use serde_json::json;

    fn client_for(base_url: &str) -> HttpOcrClient {
        HttpOcrClient::new(&ModelServerConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = client_for("http://127.0.0.1:39835/");
        assert_eq!(client.base_url(), "http://127.0.0.1:39835");
    }

    #[test]
    fn test_text_box_deserialization() {
        let value = json!({
            "box": [[0.0, 0.0], [10.0, 0.0], [10.0, 5.0], [0.0, 5.0]],
            "text": "AB12",
            "score": 0.93
        });
        let text_box: TextBox = serde_json::from_value(value).unwrap();

        assert_eq!(text_box.text, "AB12");
        assert_eq!(text_box.score, 0.93);
        assert_eq!(text_box.bbox.len(), 4);
    }

    #[tokio::test]
    async fn test_detect_text_preserves_engine_order() {
        let server = FakeModelServer::spawn(
            json!([
                { "box": [], "text": "second-left", "score": 0.4 },
                { "box": [], "text": "first-left", "score": 0.9 }
            ]),
            Some("unused"),
        )
        .await;

        let boxes = client_for(&server.base_url).detect_text(b"raw bytes").await.unwrap();

        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].text, "second-left");
        assert_eq!(server.calls(), 1);
    }

    #[tokio::test]
    async fn test_transcribe() {
        let server = FakeModelServer::spawn(json!([]), Some(" hello ")).await;

        let text = client_for(&server.base_url).transcribe(b"png").await.unwrap();
        assert_eq!(text, " hello ");
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let server = FakeModelServer::spawn(json!([]), None).await;

        let err = client_for(&server.base_url).transcribe(b"png").await.unwrap_err();
        match err {
            OcrError::Server { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("model crashed"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = FakeModelServer::spawn(json!([]), Some("x")).await;
        assert!(client_for(&server.base_url).health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let err = client_for("http://127.0.0.1:9").health_check().await.unwrap_err();
        assert!(matches!(err, OcrError::Request(_)));
    }
}
