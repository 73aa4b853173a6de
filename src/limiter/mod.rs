//! Per-client admission control.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → middleware extracts client key (peer IP)
//!     → RateLimiter::check (single lock over the client map)
//!     → TokenBucket::try_consume (continuous refill, take one token)
//!     → admit or deny
//!
//! Background:
//!     sweeper task evicts clients idle past the threshold,
//!     stops when the server leaves Running
//! ```
//!
//! # Design Decisions
//! - One mutex over the whole client map; held briefly, never across I/O
//! - Buckets are created lazily on a client's first request
//! - An evicted client that returns simply gets a fresh bucket

pub mod bucket;
pub mod registry;

pub use bucket::TokenBucket;
pub use registry::RateLimiter;
