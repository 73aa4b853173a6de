//! Configuration validation.
//!
//! Serde handles the syntactic side; this module covers the semantic checks
//! (addresses parse, rates are positive, durations are non-zero). All
//! failures are collected and reported together, not just the first.

use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An address field does not parse as host:port.
    InvalidAddress { field: &'static str, value: String },
    /// The limiter rate must be positive when the limiter is enabled.
    NonPositiveRate,
    /// The limiter burst must allow at least one request.
    ZeroBurst,
    /// A duration field must be at least one second.
    ZeroDuration { field: &'static str },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidAddress { field, value } => {
                write!(f, "{field}: '{value}' is not a valid socket address")
            }
            ValidationError::NonPositiveRate => {
                write!(f, "limiter.requests_per_second must be positive")
            }
            ValidationError::ZeroBurst => write!(f, "limiter.burst must be at least 1"),
            ValidationError::ZeroDuration { field } => {
                write!(f, "{field} must be at least 1 second")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a configuration for semantic problems.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.limiter.enabled {
        if config.limiter.requests_per_second <= 0.0 {
            errors.push(ValidationError::NonPositiveRate);
        }
        if config.limiter.burst == 0 {
            errors.push(ValidationError::ZeroBurst);
        }
    }

    for (field, value) in [
        ("limiter.idle_timeout_secs", config.limiter.idle_timeout_secs),
        ("limiter.sweep_interval_secs", config.limiter.sweep_interval_secs),
        ("lifecycle.drain_deadline_secs", config.lifecycle.drain_deadline_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroDuration { field });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
