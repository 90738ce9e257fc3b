//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Resolve the deployment mode and per-mode policies once
//! - Compose the pipeline (CORS, limits, static mounts, API, SPA fallback,
//!   error handling)
//! - Serve on a listener until shutdown is signalled

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::{AppConfig, DeploymentMode};
use crate::http::error::FaultExposure;
use crate::http::pipeline::{EdgePolicy, Pipeline, Stage};
use crate::http::spa::{FallbackStatus, SpaFallback};
use crate::http::static_files::StaticAssetMounts;
use crate::routing::{ApiRouterTable, ServiceRegistry};
use crate::security::CorsPolicy;

/// HTTP server for the backend.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    mode: DeploymentMode,
    stages: Vec<Stage>,
}

impl HttpServer {
    /// Create a server mounting the standard services from `services`.
    pub fn new(config: AppConfig, services: ServiceRegistry) -> Self {
        Self::with_table(config, ApiRouterTable::standard(services))
    }

    /// Create a server from a prepared route table.
    pub fn with_table(config: AppConfig, table: ApiRouterTable) -> Self {
        let mode = config.mode();
        tracing::info!(mode = %mode, environment = %config.server.environment, "Deployment mode resolved");

        let cors = CorsPolicy::build(mode, config.cors.allowed_origins.as_deref());
        match cors.origins() {
            Some(origins) => tracing::info!(origins = ?origins, "CORS enabled for listed origins"),
            None => tracing::info!("CORS mirrors every origin (combined deployment)"),
        }

        let mounts = StaticAssetMounts::new(&config.assets.root);
        for mount in mounts.iter() {
            tracing::info!(prefix = mount.prefix, dir = %mount.dir.display(), "Static mount");
        }

        for entry in table.entries() {
            tracing::info!(
                service = entry.name(),
                prefix = entry.prefix(),
                available = entry.is_available(),
                "API route"
            );
        }

        let spa = match SpaFallback::detect(mode, &config.frontend) {
            FallbackStatus::Ready(spa) => Some(spa),
            FallbackStatus::Missing(_) | FallbackStatus::Disabled => None,
        };

        let edge = EdgePolicy {
            cors,
            limits: config.limits.clone(),
            exposure: FaultExposure {
                expose_detail: config.server.is_development(),
            },
            request_timeout: Duration::from_secs(config.server.request_timeout_secs),
        };

        let (router, stages) = Pipeline::new()
            .static_mounts(&mounts)
            .api_routes(table)
            .spa_fallback(spa)
            .finish(edge);

        let order: Vec<String> = stages.iter().map(ToString::to_string).collect();
        tracing::info!(stages = %order.join(" -> "), "Request pipeline composed");

        Self {
            router,
            config,
            mode,
            stages,
        }
    }

    /// The composed router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Pipeline stages in evaluation order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn mode(&self) -> DeploymentMode {
        self.mode
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, mode = %self.mode, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
