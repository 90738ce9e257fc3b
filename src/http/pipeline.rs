//! Request pipeline composition.
//!
//! # Data Flow
//! ```text
//! request
//!     → CORS
//!     → body limits
//!     → static mounts (/uploads, /documents, /assets)
//!     → API routes (/health, /api/<service>)
//!     → SPA fallback (combined mode with a frontend build)
//!     → error handler (fault → JSON envelope)
//! ```
//!
//! # Design Decisions
//! - Each stage is a distinct builder type, so the fallback can only be
//!   installed after static mounts and API routes
//! - Edge layers (CORS, limits, request id, tracing, error handling) are
//!   applied last so they wrap the fallback too
//! - The stage order is kept for startup diagnostics

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use axum::{
    extract::Request,
    http::{uri::PathAndQuery, Uri},
    middleware,
    routing::get,
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer};

use crate::config::LimitsConfig;
use crate::http::error::{error_envelope, panic_fault, FaultExposure};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::response::HealthStatus;
use crate::http::spa::SpaFallback;
use crate::http::static_files::StaticAssetMounts;
use crate::observability::{metrics, tracing::http_trace_layer};
use crate::routing::{ApiRouterTable, PathPrefixMatcher};
use crate::security::{body_limit_layer, CorsPolicy};

const HEALTH_PATH: &str = "/health";

/// A stage of the request pipeline, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Cors,
    BodyLimit,
    StaticMounts,
    ApiRoutes,
    SpaFallback,
    ErrorHandler,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Cors => "cors",
            Stage::BodyLimit => "body-limit",
            Stage::StaticMounts => "static-mounts",
            Stage::ApiRoutes => "api-routes",
            Stage::SpaFallback => "spa-fallback",
            Stage::ErrorHandler => "error-handler",
        };
        f.write_str(name)
    }
}

/// Builder state: static mounts next.
pub struct Assets;
/// Builder state: API routes next.
pub struct Api;
/// Builder state: SPA fallback next.
pub struct Fallback;
/// Builder state: routes complete, edge layers next.
pub struct Sealed;

/// Settings for the layers wrapped around every stage.
#[derive(Debug, Clone)]
pub struct EdgePolicy {
    pub cors: CorsPolicy,
    pub limits: LimitsConfig,
    pub exposure: FaultExposure,
    pub request_timeout: Duration,
}

/// Typed pipeline builder.
pub struct Pipeline<S> {
    router: Router,
    stages: Vec<Stage>,
    _state: PhantomData<S>,
}

impl<S> Pipeline<S> {
    fn advance<T>(self, stage: Option<Stage>, build: impl FnOnce(Router) -> Router) -> Pipeline<T> {
        let Pipeline { router, mut stages, .. } = self;
        stages.extend(stage);
        Pipeline {
            router: build(router),
            stages,
            _state: PhantomData,
        }
    }
}

impl Pipeline<Assets> {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            stages: Vec::new(),
            _state: PhantomData,
        }
    }

    pub fn static_mounts(self, mounts: &StaticAssetMounts) -> Pipeline<Api> {
        self.advance(Some(Stage::StaticMounts), |router| mounts.apply(router))
    }
}

impl Default for Pipeline<Assets> {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline<Api> {
    /// Mount `/health` and every entry of `table`.
    pub fn api_routes(self, table: ApiRouterTable) -> Pipeline<Fallback> {
        self.advance(Some(Stage::ApiRoutes), |router| {
            router.route(HEALTH_PATH, get(health)).merge(table.into_router())
        })
    }
}

impl Pipeline<Fallback> {
    /// Install the SPA fallback when there is one.
    pub fn spa_fallback(self, spa: Option<SpaFallback>) -> Pipeline<Sealed> {
        match spa {
            Some(spa) => self.advance(Some(Stage::SpaFallback), |router| spa.apply(router)),
            None => self.advance(None, |router| router),
        }
    }
}

impl Pipeline<Sealed> {
    /// Wrap the routes in the edge layers and return the finished router
    /// with its stage order.
    #[allow(deprecated)]
    pub fn finish(self, edge: EdgePolicy) -> (Router, Vec<Stage>) {
        let routes = self
            .router
            .layer(CatchPanicLayer::custom(panic_fault))
            .layer(TimeoutLayer::new(edge.request_timeout))
            .layer(middleware::from_fn_with_state(edge.exposure, error_envelope))
            .layer(body_limit_layer(&edge.limits))
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(http_trace_layer())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(edge.cors.layer());

        // Layers above run after route matching, so the trailing slash is
        // trimmed by a service wrapped around the whole router.
        let normalized = ServiceBuilder::new()
            .map_request(trim_trailing_slash)
            .service(routes);
        let router = Router::new().fallback_service(normalized);

        let mut stages = vec![Stage::Cors, Stage::BodyLimit];
        stages.extend(self.stages);
        stages.push(Stage::ErrorHandler);

        (router, stages)
    }
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::ok())
}

/// Map `/api/<service>/...` and `/health` with trailing slashes onto the
/// slash-less route. Other paths are left to the file services.
fn trim_trailing_slash(mut request: Request) -> Request {
    let path = request.uri().path();
    if path.len() <= 1 || !path.ends_with('/') {
        return request;
    }

    let trimmed = path.trim_end_matches('/');
    if !PathPrefixMatcher::api().matches_path(trimmed) && trimmed != HEALTH_PATH {
        return request;
    }

    let rewritten = match request.uri().query() {
        Some(query) => format!("{trimmed}?{query}"),
        None => trimmed.to_string(),
    };
    let mut parts = request.uri().clone().into_parts();
    match PathAndQuery::try_from(rewritten) {
        Ok(path_and_query) => parts.path_and_query = Some(path_and_query),
        Err(_) => return request,
    }
    if let Ok(uri) = Uri::from_parts(parts) {
        *request.uri_mut() = uri;
    }
    request
}
