//! Panic containment middleware.

use std::panic::AssertUnwindSafe;

use axum::{extract::Request, middleware::Next, response::Response};
use futures_util::FutureExt;

use crate::http::response;
use crate::lifecycle::tracker::panic_message;
use crate::observability::metrics;

/// Contain a panicking handler invocation.
///
/// The downstream future runs under `catch_unwind` in the same task that
/// polls it, so the recovery point is the nearest enclosing frame of the
/// failing call. A panic is logged with request context and converted into
/// the generic fault response; sibling requests never observe it.
pub async fn recover_panic(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            tracing::error!(
                method = %method,
                path = %path,
                panic = panic_message(payload.as_ref()),
                "handler panicked"
            );
            metrics::record_panic();
            response::internal_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware::from_fn, routing::get, Router};
    use tower::ServiceExt;

    async fn explode() -> &'static str {
        panic!("handler exploded")
    }

    fn app() -> Router {
        Router::new()
            .route("/ok", get(|| async { "fine" }))
            .route("/panic", get(explode))
            .layer(from_fn(recover_panic))
    }

    fn get_request(uri: &str) -> Request {
        axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_panic_becomes_generic_error() {
        let response = app().oneshot(get_request("/panic")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(axum::http::header::CONNECTION).unwrap(),
            "close"
        );
    }

    #[tokio::test]
    async fn test_healthy_handler_passes_through() {
        let response = app().oneshot(get_request("/ok")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
