use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

/// Generic 500 body returned after a recovered panic.
///
/// Never carries the failure detail; `request_id` is empty when unknown.
pub fn internal_error(request_id: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Internal server error",
            "request_id": request_id,
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        })),
    )
        .into_response()
}
