//! REST surface: liveness and the message endpoint.

use crate::store::MessageStore;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

#[derive(Clone)]
pub struct AppState {
    pub store: MessageStore,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/add-message", post(add_message))
        .with_state(state)
}

async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "hearth backend is running" }))
}

#[derive(Debug, Deserialize)]
struct AddMessageRequest {
    name: String,
    message: String,
}

/// Insert one message row; respond with the inserted record or a 500.
async fn add_message(
    State(state): State<AppState>,
    Json(req): Json<AddMessageRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let store = state.store.clone();
    let result =
        tokio::task::spawn_blocking(move || store.add_message(&req.name, &req.message)).await;

    match result {
        Ok(Ok(record)) => (StatusCode::OK, Json(serde_json::json!(record))),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "failed to insert message");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "failed to insert message" })),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "message insert task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "failed to insert message" })),
            )
        }
    }
}
