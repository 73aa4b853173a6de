//! JSON error envelopes.
//!
//! Every error surface speaks the same shape: `{"error": <message>}`. The
//! fault responses additionally mark the connection as non-reusable so a
//! possibly-corrupted exchange is never pipelined.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Message body for contained faults. Deliberately generic: internals stay
/// in the logs, not in the response.
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

/// Message body for admission denials.
pub const RATE_LIMIT_MESSAGE: &str = "rate limit exceeded";

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// 429 with the standard denial envelope.
pub fn rate_limit_exceeded() -> Response {
    json_error(StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_MESSAGE)
}

/// 500 with the generic fault envelope and `Connection: close`.
pub fn internal_error() -> Response {
    let mut response = json_error(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_MESSAGE);
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}

/// 404 fallback for unrouted paths.
pub async fn not_found() -> Response {
    json_error(
        StatusCode::NOT_FOUND,
        "the requested resource could not be found",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_rate_limit_envelope() {
        let response = rate_limit_exceeded();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "rate limit exceeded" })
        );
    }

    #[tokio::test]
    async fn test_internal_error_closes_connection() {
        let response = internal_error();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONNECTION).unwrap(),
            "close"
        );
        assert_eq!(
            body_json(response).await,
            json!({ "error": SERVER_ERROR_MESSAGE })
        );
    }
}
