use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde::Serialize;

use super::SharedState;

static INDEX_HTML: &str = include_str!("../../assets/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub model_server: bool,
}

/// Liveness of this service plus reachability of the model server
pub async fn health(State(state): State<SharedState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        model_server: state.client.health_check().await.is_ok(),
    })
}
