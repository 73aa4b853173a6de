//! HTTP server assembly and the serve/drain loop.
//!
//! # Responsibilities
//! - Wrap the application router with the admission stack
//!   (request ID, tracing, in-flight tracking, panic containment,
//!   request timeout, rate limiting)
//! - Run the accept loop with graceful shutdown
//! - Drive the drain protocol: stop accepting, wait for in-flight work,
//!   bounded by the configured deadline
//!
//! # Design Decisions
//! - The embedding application supplies its own `Router`; this module only
//!   owns the cross-cutting layers around it
//! - The drain deadline bounds the wait, not the work: admitted requests
//!   are never cancelled, the process just stops waiting for them

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::middleware::{
    in_flight::track_in_flight, rate_limit::rate_limit, recover::recover_panic,
};
use crate::http::request::UuidRequestId;
use crate::lifecycle::{
    signals, InFlightTracker, LifecycleCoordinator, ShutdownOutcome,
};
use crate::limiter::RateLimiter;

/// Error type for the serve loop.
///
/// Only listener-level failures surface here; per-request faults are
/// contained by the middleware stack and never reach the caller.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("listener error: {0}")]
    Listener(#[from] std::io::Error),
}

/// The admission-controlled HTTP server.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    limiter: Arc<RateLimiter>,
    tracker: Arc<InFlightTracker>,
    lifecycle: LifecycleCoordinator,
}

impl HttpServer {
    /// Wrap `app` with the admission stack described by `config`.
    pub fn new(config: ServerConfig, app: Router) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.limiter.clone()));
        let tracker = Arc::new(InFlightTracker::new());
        let lifecycle = LifecycleCoordinator::new();

        let router = Self::build_router(&config, app, limiter.clone(), tracker.clone());

        Self {
            router,
            config,
            limiter,
            tracker,
            lifecycle,
        }
    }

    /// Stack the middleware layers around the application router.
    ///
    /// Execution order is top-down from the last layer added: request ID →
    /// trace → in-flight tracking → panic containment → timeout → admission
    /// → application.
    fn build_router(
        config: &ServerConfig,
        app: Router,
        limiter: Arc<RateLimiter>,
        tracker: Arc<InFlightTracker>,
    ) -> Router {
        app.layer(from_fn_with_state(limiter, rate_limit))
            .layer(TimeoutLayer::new(config.timeouts.request()))
            .layer(from_fn(recover_panic))
            .layer(from_fn_with_state(tracker, track_in_flight))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Handle to the lifecycle coordinator, e.g. to trigger a drain without
    /// an OS signal.
    pub fn lifecycle(&self) -> LifecycleCoordinator {
        self.lifecycle.clone()
    }

    /// Handle for registering background jobs as in-flight work.
    pub fn tracker(&self) -> Arc<InFlightTracker> {
        self.tracker.clone()
    }

    /// Handle to the client registry, e.g. for external telemetry.
    pub fn limiter(&self) -> Arc<RateLimiter> {
        self.limiter.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve until a termination signal (or an explicit `begin_drain`),
    /// then drain and stop.
    pub async fn run(self, listener: TcpListener) -> Result<ShutdownOutcome, ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = %self.config.listener.environment,
            "HTTP server starting"
        );

        self.limiter.clone().spawn_sweeper(self.lifecycle.subscribe());

        {
            let lifecycle = self.lifecycle.clone();
            tokio::spawn(async move {
                let signal = signals::terminated().await;
                tracing::info!(signal, "shutdown signal received");
                lifecycle.begin_drain();
            });
        }

        let drain = {
            let lifecycle = self.lifecycle.clone();
            async move { lifecycle.drain_started().await }
        };
        let service = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let serve = axum::serve(listener, service)
            .with_graceful_shutdown(drain)
            .into_future();
        tokio::pin!(serve);

        // Running: until a drain begins or the listener fails
        let mut early_result = None;
        tokio::select! {
            res = &mut serve => early_result = Some(res),
            _ = self.lifecycle.drain_started() => {}
        }
        let serve_finished = match early_result {
            Some(Err(e)) => {
                self.lifecycle.mark_stopped();
                return Err(ServerError::Listener(e));
            }
            Some(Ok(())) => true,
            None => false,
        };

        // Draining: wait for connections and registered work, bounded
        let deadline = self.config.lifecycle.drain_deadline();
        tracing::info!(
            deadline_secs = deadline.as_secs(),
            in_flight = self.tracker.count(),
            "draining in-flight work"
        );

        let tracker = self.tracker.clone();
        let drained = async {
            if !serve_finished {
                (&mut serve).await?;
            }
            tracker.wait_idle().await;
            Ok::<(), std::io::Error>(())
        };

        let outcome = tokio::select! {
            res = drained => match res {
                Ok(()) => ShutdownOutcome::Clean,
                Err(e) => {
                    self.lifecycle.mark_stopped();
                    return Err(ServerError::Listener(e));
                }
            },
            _ = tokio::time::sleep(deadline) => {
                ShutdownOutcome::Forced { pending: self.tracker.count() }
            }
        };

        self.lifecycle.mark_stopped();
        match outcome {
            ShutdownOutcome::Clean => tracing::info!("HTTP server stopped cleanly"),
            ShutdownOutcome::Forced { pending } => {
                tracing::warn!(pending, "drain deadline elapsed; stopping with work outstanding");
            }
        }
        Ok(outcome)
    }
}
