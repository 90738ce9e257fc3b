//! Cross-origin policy.
//!
//! # Design Decisions
//! - Split mode: explicit allow-list, credentials only for listed origins
//! - Combined mode: frontend and API share an origin, so every origin is
//!   mirrored back with credentials
//! - The policy is plain data; `layer()` renders it as tower-http middleware

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::config::DeploymentMode;

/// Origins allowed in split mode when none are configured.
pub const DEFAULT_ORIGINS: [&str; 5] = [
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "https://winhronboard.azurewebsites.net",
];

/// Cross-origin rule set applied to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Only these exact origins are answered.
    AllowList(Vec<String>),
    /// Any origin is echoed back.
    AnyOrigin,
}

impl CorsPolicy {
    /// Build the policy for `mode`.
    ///
    /// `configured` is only consulted in split mode; entries are trimmed and
    /// blanks dropped, and an empty result falls back to [`DEFAULT_ORIGINS`].
    pub fn build(mode: DeploymentMode, configured: Option<&[String]>) -> Self {
        match mode {
            DeploymentMode::Combined => CorsPolicy::AnyOrigin,
            DeploymentMode::Split => {
                let configured: Vec<String> = configured
                    .unwrap_or_default()
                    .iter()
                    .map(|origin| origin.trim())
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect();

                if configured.is_empty() {
                    CorsPolicy::AllowList(DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect())
                } else {
                    CorsPolicy::AllowList(configured)
                }
            }
        }
    }

    /// Whether a request from `origin` gets CORS headers.
    pub fn allows(&self, origin: &str) -> bool {
        match self {
            CorsPolicy::AnyOrigin => true,
            CorsPolicy::AllowList(origins) => origins.iter().any(|o| o == origin),
        }
    }

    /// The allow-list, if the policy has one.
    pub fn origins(&self) -> Option<&[String]> {
        match self {
            CorsPolicy::AllowList(origins) => Some(origins),
            CorsPolicy::AnyOrigin => None,
        }
    }

    /// Render as middleware.
    pub fn layer(&self) -> CorsLayer {
        let base = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::HEAD,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true);

        match self {
            CorsPolicy::AnyOrigin => base.allow_origin(AllowOrigin::mirror_request()),
            CorsPolicy::AllowList(origins) => {
                let values: Vec<HeaderValue> = origins
                    .iter()
                    .filter(|origin| origin.as_str() != "*")
                    .filter_map(|origin| match HeaderValue::from_str(origin) {
                        Ok(value) => Some(value),
                        Err(_) => {
                            tracing::warn!(origin = %origin, "Skipping unusable CORS origin");
                            None
                        }
                    })
                    .collect();
                base.allow_origin(AllowOrigin::list(values))
            }
        }
    }
}
