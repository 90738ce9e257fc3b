//! Startup orchestration.
//!
//! # Responsibilities
//! - Verify the database is reachable
//! - Run start-up hooks (admin seeding and the like) in order
//! - Bind the listener and serve once everything above succeeded
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::error::Error as StdError;
use std::net::SocketAddr;
use std::time::Duration;

use futures_util::future::BoxFuture;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{AppConfig, DatabaseConfig};
use crate::database::{Datastore, DatastoreError, TcpProbe};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::ServiceRegistry;

/// Error returned by a start-up hook.
pub type HookError = Box<dyn StdError + Send + Sync>;

/// Work that must finish after the database is reachable and before the
/// server accepts traffic.
pub trait StartupHook: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self) -> BoxFuture<'_, Result<(), HookError>>;
}

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database connection string is not configured (set DATABASE_URI or MONGODB_URI)")]
    DatabaseNotConfigured,

    #[error("database connection failed: {0}")]
    Database(#[from] DatastoreError),

    #[error("startup hook '{name}' failed: {source}")]
    Hook {
        name: String,
        #[source]
        source: HookError,
    },

    #[error("metrics exporter failed: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Datastore described by the configuration, if any.
pub fn datastore_from_config(config: &DatabaseConfig) -> Result<Option<TcpProbe>, StartupError> {
    match config.uri.as_deref() {
        Some(uri) => {
            let timeout = Duration::from_secs(config.connect_timeout_secs);
            Ok(Some(TcpProbe::from_uri(uri, timeout)?))
        }
        None if config.required => Err(StartupError::DatabaseNotConfigured),
        None => Ok(None),
    }
}

/// Connect to the datastore, then run every hook in order.
pub async fn prepare(
    datastore: Option<&dyn Datastore>,
    hooks: &[Box<dyn StartupHook>],
) -> Result<(), StartupError> {
    match datastore {
        Some(datastore) => {
            tracing::info!(datastore = %datastore.describe(), "Connecting to database");
            datastore.connect().await?;
            tracing::info!("Database connected");
        }
        None => tracing::warn!("No database configured; skipping connection check"),
    }

    for hook in hooks {
        tracing::info!(hook = hook.name(), "Running startup hook");
        hook.run().await.map_err(|source| StartupError::Hook {
            name: hook.name().to_string(),
            source,
        })?;
    }

    Ok(())
}

/// Full startup: metrics, database, hooks, then serve until `shutdown`.
pub async fn launch(
    config: AppConfig,
    services: ServiceRegistry,
    hooks: Vec<Box<dyn StartupHook>>,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        if let Ok(addr) = config.observability.metrics_address.parse::<SocketAddr>() {
            metrics::init_metrics(addr)?;
        }
    }

    let datastore = datastore_from_config(&config.database)?;
    prepare(datastore.as_ref().map(|d| d as &dyn Datastore), &hooks).await?;

    let address = config.server.bind_address();
    let server = HttpServer::new(config, services);

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
