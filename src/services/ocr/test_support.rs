use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Request counters shared with the route handlers
#[derive(Default)]
struct Counters {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl Counters {
    async fn track(&self, delay: Duration) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-process stand-in for the model server, bound to an ephemeral port
pub(crate) struct FakeModelServer {
    pub base_url: String,
    counters: Arc<Counters>,
}

impl FakeModelServer {
    /// `boxes` is returned from `/ocr`; `transcription` from `/transcribe`,
    /// or a 500 when `None`
    pub async fn spawn(boxes: Value, transcription: Option<&str>) -> Self {
        Self::spawn_with_delay(boxes, transcription, Duration::ZERO).await
    }

    /// Like [`FakeModelServer::spawn`], each recognition request taking `delay`
    pub async fn spawn_with_delay(boxes: Value, transcription: Option<&str>, delay: Duration) -> Self {
        let counters = Arc::new(Counters::default());
        let transcription = transcription.map(str::to_string);

        let ocr_counters = Arc::clone(&counters);
        let transcribe_counters = Arc::clone(&counters);

        let app = Router::new()
            .route("/health", get(|| async { "ok" }))
            .route(
                "/ocr",
                post(move || {
                    let boxes = boxes.clone();
                    let counters = Arc::clone(&ocr_counters);
                    async move {
                        counters.track(delay).await;
                        Json(json!({ "boxes": boxes, "raw_text": "" }))
                    }
                }),
            )
            .route(
                "/transcribe",
                post(move || {
                    let transcription = transcription.clone();
                    let counters = Arc::clone(&transcribe_counters);
                    async move {
                        counters.track(delay).await;
                        match transcription {
                            Some(text) => (StatusCode::OK, Json(json!({ "text": text }))),
                            None => (
                                StatusCode::INTERNAL_SERVER_ERROR,
                                Json(json!({ "detail": "model crashed" })),
                            ),
                        }
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            counters,
        }
    }

    /// Number of recognition requests served so far
    pub fn calls(&self) -> usize {
        self.counters.calls.load(Ordering::SeqCst)
    }

    /// Most recognition requests ever handled at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.counters.peak_in_flight.load(Ordering::SeqCst)
    }
}
