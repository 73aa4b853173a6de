//! Self-protecting HTTP front-end.
//!
//! Turnstile wraps an application-supplied `axum::Router` with the layers a
//! public-facing service needs to stay up: per-client admission control,
//! per-request panic containment, and a lifecycle that drains in-flight work
//! before stopping.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌────────────────────────────────────────────────┐
//!                     │                   TURNSTILE                    │
//!                     │                                                │
//!   Client Request    │  ┌──────────┐   ┌───────────┐   ┌──────────┐  │
//!   ──────────────────┼─▶│in-flight │──▶│  panic    │──▶│admission │──┼─▶ application
//!                     │  │ tracking │   │containment│   │ control  │  │    router
//!                     │  └──────────┘   └───────────┘   └────┬─────┘  │
//!                     │                                      │        │
//!                     │                              ┌───────▼──────┐ │
//!                     │                              │   limiter    │ │
//!                     │                              │ (per-client  │ │
//!                     │                              │   buckets)   │ │
//!                     │                              └──────────────┘ │
//!                     │                                                │
//!                     │  ┌──────────────────────────────────────────┐ │
//!                     │  │           Cross-Cutting Concerns          │ │
//!                     │  │  ┌────────┐ ┌───────────┐ ┌────────────┐ │ │
//!                     │  │  │ config │ │ lifecycle │ │observability│ │ │
//!                     │  │  │        │ │drain/stop │ │logs+metrics│ │ │
//!                     │  │  └────────┘ └───────────┘ └────────────┘ │ │
//!                     │  └──────────────────────────────────────────┘ │
//!                     └────────────────────────────────────────────────┘
//! ```
//!
//! On SIGINT/SIGTERM the listener stops accepting, in-flight requests and
//! registered background jobs get a bounded window to finish, and the run
//! reports a clean or forced outcome for the process exit status.

// Core subsystems
pub mod config;
pub mod http;
pub mod limiter;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ServerConfig;
pub use http::{HttpServer, ServerError};
pub use lifecycle::{InFlightTracker, LifecycleCoordinator, ShutdownOutcome};
pub use limiter::RateLimiter;
