//! Single-page-app fallback for combined deployments.
//!
//! Serves the built frontend after every static mount and API route has had
//! its chance: build files directly, the entry document for any other GET,
//! and a JSON 404 for unmatched API paths.

use std::path::{Path, PathBuf};

use axum::{
    extract::Request,
    handler::HandlerWithoutStateExt,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use tower::{ServiceBuilder, ServiceExt};
use tower_http::{
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
};

use crate::config::{DeploymentMode, FrontendConfig};
use crate::http::response::ErrorEnvelope;
use crate::routing::{Matcher, PathPrefixMatcher};

/// Message returned for unmatched API paths.
pub const API_NOT_FOUND: &str = "API endpoint not found";

/// Outcome of looking for the frontend build at startup.
#[derive(Debug)]
pub enum FallbackStatus {
    /// Split mode: the frontend is served elsewhere.
    Disabled,
    /// Combined mode but the build directory does not exist.
    Missing(PathBuf),
    /// Combined mode with a build to serve.
    Ready(SpaFallback),
}

impl FallbackStatus {
    pub fn into_fallback(self) -> Option<SpaFallback> {
        match self {
            FallbackStatus::Ready(spa) => Some(spa),
            _ => None,
        }
    }
}

/// The built frontend and how to serve it.
#[derive(Debug, Clone)]
pub struct SpaFallback {
    build_dir: PathBuf,
    index: PathBuf,
    asset_max_age_secs: u64,
}

impl SpaFallback {
    /// Check for the frontend build. Logs a warning when it is missing in
    /// combined mode.
    pub fn detect(mode: DeploymentMode, config: &FrontendConfig) -> FallbackStatus {
        if !mode.is_combined() {
            return FallbackStatus::Disabled;
        }

        let build_dir = config.build_dir.clone();
        if !build_dir.is_dir() {
            tracing::warn!(
                build_dir = %build_dir.display(),
                "Frontend build not found; SPA fallback disabled (build the frontend, e.g. `npm run build`)"
            );
            return FallbackStatus::Missing(build_dir);
        }

        tracing::info!(build_dir = %build_dir.display(), "Serving frontend build");
        FallbackStatus::Ready(Self::new(&build_dir, &config.index_file, config.asset_max_age_secs))
    }

    pub fn new(build_dir: &Path, index_file: &str, asset_max_age_secs: u64) -> Self {
        Self {
            build_dir: build_dir.to_path_buf(),
            index: build_dir.join(index_file),
            asset_max_age_secs,
        }
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Install as the router's fallback.
    pub(crate) fn apply(self, router: Router) -> Router {
        let index = self.index.clone();
        let entry = move |request: Request| {
            let index = index.clone();
            async move { entry_document(index, request).await }
        };

        let cache_control = HeaderValue::from_str(&format!("public, max-age={}", self.asset_max_age_secs))
            .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=86400"));

        let files = ServeDir::new(&self.build_dir)
            .call_fallback_on_method_not_allowed(true)
            .fallback(entry.into_service());

        let service = ServiceBuilder::new()
            .layer(SetResponseHeaderLayer::if_not_present(header::CACHE_CONTROL, cache_control))
            .service(files);

        router.fallback_service(service)
    }
}

/// Catch-all behind the build directory.
async fn entry_document(index: PathBuf, request: Request) -> Response {
    if PathPrefixMatcher::api().matches(&request) {
        return (StatusCode::NOT_FOUND, Json(ErrorEnvelope::message(API_NOT_FOUND))).into_response();
    }

    if request.method() != Method::GET && request.method() != Method::HEAD {
        return StatusCode::NOT_FOUND.into_response();
    }

    let mut response = match ServeFile::new(index).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    };
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}
