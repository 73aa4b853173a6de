//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Running:
//!     requests and background jobs register with InFlightTracker
//!
//! Signal received (signals.rs):
//!     SIGINT/SIGTERM → LifecycleCoordinator::begin_drain
//!
//! Draining:
//!     listener stops accepting → wait for tracker to reach zero,
//!     bounded by the drain deadline
//!
//! Stopped:
//!     outcome reported as clean or forced; process exit follows
//! ```
//!
//! # Design Decisions
//! - State moves one way only: Running → Draining → Stopped
//! - The deadline bounds the wait, never cancels admitted work
//! - Registration releases via RAII guards; a skipped release is impossible

pub mod coordinator;
pub mod signals;
pub mod tracker;

pub use coordinator::{LifecycleCoordinator, ServerState, ShutdownOutcome};
pub use tracker::{InFlightGuard, InFlightTracker};
