//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check origins are usable as `Access-Control-Allow-Origin` values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.port must be non-zero")]
    ZeroPort,

    #[error("server.host must not be empty")]
    EmptyHost,

    #[error("server.request_timeout_secs must be non-zero")]
    ZeroRequestTimeout,

    #[error("cors.allowed_origins entry {0:?} is not a valid origin")]
    InvalidOrigin(String),

    #[error("limits.max_body_bytes must be non-zero")]
    ZeroBodyLimit,

    #[error("frontend.index_file must be a plain file name, got {0:?}")]
    InvalidIndexFile(String),

    #[error("database.connect_timeout_secs must be non-zero")]
    ZeroConnectTimeout,

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a loaded configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.server.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if let Some(origins) = &config.cors.allowed_origins {
        for origin in origins {
            let trimmed = origin.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !is_valid_origin(trimmed) {
                errors.push(ValidationError::InvalidOrigin(origin.clone()));
            }
        }
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let index = &config.frontend.index_file;
    if index.is_empty() || index.contains('/') || index.contains('\\') || index == ".." {
        errors.push(ValidationError::InvalidIndexFile(index.clone()));
    }

    if config.database.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `scheme://host[:port]` with no path, usable as a header value.
fn is_valid_origin(origin: &str) -> bool {
    if HeaderValue::from_str(origin).is_err() {
        return false;
    }
    match url::Url::parse(origin) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some()
                && url.path() == "/"
                && !origin.ends_with('/')
                && url.query().is_none()
        }
        Err(_) => false,
    }
}
