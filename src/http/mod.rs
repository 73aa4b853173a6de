//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → middleware stack (request ID, trace, in-flight, containment,
//!       timeout, admission)
//!     → application router (supplied by the embedding binary)
//!     → response.rs envelopes on denial/fault paths
//! ```

pub mod healthcheck;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use server::{HttpServer, ServerError};
