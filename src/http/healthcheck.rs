//! Healthcheck endpoint.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::http::response;

#[derive(Clone)]
struct SystemInfo {
    environment: String,
}

/// Application router served behind the admission stack: the healthcheck
/// plus a JSON 404 fallback.
pub fn router(environment: &str) -> Router {
    Router::new()
        .route("/v1/healthcheck", get(healthcheck))
        .fallback(response::not_found)
        .with_state(SystemInfo {
            environment: environment.to_string(),
        })
}

async fn healthcheck(State(info): State<SystemInfo>) -> Response {
    Json(json!({
        "status": "available",
        "system_info": {
            "environment": info.environment,
            "version": env!("CARGO_PKG_VERSION"),
        }
    }))
    .into_response()
}
