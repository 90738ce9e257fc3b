//! Request body limits.
//!
//! # Responsibilities
//! - Cap JSON and form bodies read through axum extractors
//!
//! # Design Decisions
//! - One limit for both body kinds (50MB by default)
//! - Oversized bodies are rejected with 413 Payload Too Large by the extractor

use axum::extract::DefaultBodyLimit;

use crate::config::LimitsConfig;

/// Layer enforcing the configured body limit on body extractors.
pub fn body_limit_layer(limits: &LimitsConfig) -> DefaultBodyLimit {
    DefaultBodyLimit::max(limits.max_body_bytes)
}
