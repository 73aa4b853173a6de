//! Observability subsystem.
//!
//! Structured logging goes through `tracing` (the subscriber is installed in
//! `main`); this module owns the metrics surface. The registry size and
//! in-flight count gauges are the read-only telemetry the admission and
//! lifecycle subsystems expose.

pub mod metrics;
