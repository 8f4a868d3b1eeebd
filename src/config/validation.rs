//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, TTL ordering, capacities)
//! - Check addresses parse as socket addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// The TTL ceiling the proxy will ever honor, in seconds (one day).
pub const TTL_CEILING_SECS: u32 = 86_400;

/// A single semantic violation found in a config.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    BindAddress(String),

    #[error("observability.metrics_address {0:?} is not a valid socket address")]
    MetricsAddress(String),

    #[error("upstream.{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("cache.max_ttl_secs ({max}) must not be below cache.default_ttl_secs ({default})")]
    TtlOrdering { default: u32, max: u32 },

    #[error("cache.max_ttl_secs ({0}) exceeds the supported ceiling of {TTL_CEILING_SECS}")]
    TtlCeiling(u32),

    #[error("cache.max_entries must be greater than zero")]
    ZeroCapacity,
}

/// Validate a deserialized config, collecting every violation.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.upstream.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "connect_secs",
        });
    }
    if config.upstream.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "request_secs",
        });
    }

    if config.cache.max_ttl_secs < config.cache.default_ttl_secs {
        errors.push(ValidationError::TtlOrdering {
            default: config.cache.default_ttl_secs,
            max: config.cache.max_ttl_secs,
        });
    }
    if config.cache.max_ttl_secs > TTL_CEILING_SECS {
        errors.push(ValidationError::TtlCeiling(config.cache.max_ttl_secs));
    }
    if config.cache.max_entries == 0 {
        errors.push(ValidationError::ZeroCapacity);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
