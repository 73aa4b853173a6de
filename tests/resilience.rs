//! Panic containment through the full server stack.

use std::time::Duration;

use axum::{routing::get, Router};
use turnstile::config::ServerConfig;
use turnstile::http::response::SERVER_ERROR_MESSAGE;

mod common;

async fn explode() -> &'static str {
    panic!("handler exploded")
}

fn app() -> Router {
    Router::new()
        .route("/ok", get(|| async { "ok" }))
        .route("/panic", get(explode))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                "slow ok"
            }),
        )
}

fn permissive_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.limiter.requests_per_second = 1000.0;
    config.limiter.burst = 1000;
    config
}

#[tokio::test]
async fn test_panic_becomes_generic_500_and_closes_connection() {
    let server = common::start_server(permissive_config(), app()).await;
    let client = common::client();

    let res = client.get(server.url("/panic")).send().await.unwrap();
    assert_eq!(res.status(), 500);
    assert_eq!(
        res.headers().get("connection").map(|v| v.to_str().unwrap()),
        Some("close")
    );
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "error": SERVER_ERROR_MESSAGE }));

    server.lifecycle.begin_drain();
    let _ = server.handle.await.unwrap();
}

#[tokio::test]
async fn test_server_survives_a_panicking_handler() {
    let server = common::start_server(permissive_config(), app()).await;
    let client = common::client();

    for _ in 0..3 {
        let res = client.get(server.url("/panic")).send().await.unwrap();
        assert_eq!(res.status(), 500);
    }

    let res = client.get(server.url("/ok")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "ok");

    server.lifecycle.begin_drain();
    let _ = server.handle.await.unwrap();
}

#[tokio::test]
async fn test_panic_does_not_disturb_concurrent_requests() {
    let server = common::start_server(permissive_config(), app()).await;
    let client = common::client();

    let slow = {
        let client = client.clone();
        let url = server.url("/slow");
        tokio::spawn(async move { client.get(url).send().await.unwrap() })
    };

    // fires while the slow request is in flight
    tokio::time::sleep(Duration::from_millis(50)).await;
    let panicked = client.get(server.url("/panic")).send().await.unwrap();
    assert_eq!(panicked.status(), 500);

    let slow = slow.await.unwrap();
    assert_eq!(slow.status(), 200);
    assert_eq!(slow.text().await.unwrap(), "slow ok");

    server.lifecycle.begin_drain();
    let _ = server.handle.await.unwrap();
}
