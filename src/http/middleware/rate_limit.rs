//! Admission control middleware.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};

use crate::http::response;
use crate::limiter::RateLimiter;
use crate::observability::metrics;

/// Decide whether a request is admitted before it reaches the application.
///
/// The client identity is the peer IP from the connection origin. Denials
/// are a normal client-facing outcome, logged at warn; a request whose
/// origin cannot be determined takes the fault path instead.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    if !limiter.is_enabled() {
        return next.run(request).await;
    }

    let addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let Some(addr) = addr else {
        tracing::error!("request is missing its connection origin address");
        return response::internal_error();
    };
    let client = addr.ip().to_string();

    if limiter.check(&client) {
        metrics::record_admitted();
        next.run(request).await
    } else {
        tracing::warn!(client = %client, "rate limit exceeded");
        metrics::record_denied();
        response::rate_limit_exceeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::StatusCode,
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    use crate::config::LimiterConfig;

    fn app(config: LimiterConfig) -> Router {
        let limiter = Arc::new(RateLimiter::new(config));
        Router::new()
            .route("/", get(|| async { "hello" }))
            .layer(from_fn_with_state(limiter, rate_limit))
    }

    fn request_from(addr: &str) -> Request {
        let mut request = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo::<SocketAddr>(addr.parse().unwrap()));
        request
    }

    #[tokio::test]
    async fn test_burst_admits_then_denies() {
        let app = app(LimiterConfig {
            requests_per_second: 0.001,
            burst: 2,
            ..LimiterConfig::default()
        });

        for expected in [StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS] {
            let response = app
                .clone()
                .oneshot(request_from("10.1.1.1:40000"))
                .await
                .unwrap();
            assert_eq!(response.status(), expected);
        }
    }

    #[tokio::test]
    async fn test_missing_origin_is_a_fault_not_a_denial() {
        let app = app(LimiterConfig::default());

        let request = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_disabled_limiter_forwards_everything() {
        let app = app(LimiterConfig {
            enabled: false,
            requests_per_second: 0.001,
            burst: 1,
            ..LimiterConfig::default()
        });

        for _ in 0..10 {
            let response = app
                .clone()
                .oneshot(request_from("10.1.1.1:40000"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_ports_do_not_split_client_identity() {
        let app = app(LimiterConfig {
            requests_per_second: 0.001,
            burst: 1,
            ..LimiterConfig::default()
        });

        let first = app.clone().oneshot(request_from("10.1.1.1:40000")).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        // same IP, different ephemeral port: still the same bucket
        let second = app.oneshot(request_from("10.1.1.1:40001")).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
