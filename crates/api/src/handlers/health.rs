use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// GET /health
///
/// Liveness probe. Does not touch the database.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
