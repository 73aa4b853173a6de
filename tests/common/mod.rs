//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use turnstile::config::ServerConfig;
use turnstile::http::{HttpServer, ServerError};
use turnstile::lifecycle::{InFlightTracker, LifecycleCoordinator, ShutdownOutcome};

/// A running server plus the handles needed to drive and observe it.
pub struct TestServer {
    pub addr: SocketAddr,
    pub lifecycle: LifecycleCoordinator,
    #[allow(dead_code)]
    pub tracker: Arc<InFlightTracker>,
    pub handle: JoinHandle<Result<ShutdownOutcome, ServerError>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a server on an ephemeral loopback port.
pub async fn start_server(config: ServerConfig, app: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config, app);
    let lifecycle = server.lifecycle();
    let tracker = server.tracker();
    let handle = tokio::spawn(async move { server.run(listener).await });

    // let the accept loop come up
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        addr,
        lifecycle,
        tracker,
        handle,
    }
}

/// A client that never proxies and keeps pooling predictable.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
