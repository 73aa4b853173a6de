//! Request-path middleware.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → in_flight.rs (register with the shutdown drain)
//!     → recover.rs (contain handler panics)
//!     → rate_limit.rs (admit or deny per client)
//!     → application router
//! ```
//!
//! # Design Decisions
//! - Containment wraps each invocation at its own call boundary; a shared
//!   recovery point cannot catch panics from independently scheduled tasks
//! - Admission decisions are immediate, no queueing
//! - In-flight registration is released by guard drop on every path

pub mod in_flight;
pub mod rate_limit;
pub mod recover;
