//! Document database connectivity.
//!
//! # Data Flow
//! ```text
//! DatabaseConfig.uri
//!     → probe.rs (parse hosts, TCP reachability check)
//!     → lifecycle::startup gates listening on the result
//! ```
//!
//! # Design Decisions
//! - The backend only needs to know the store is reachable before serving;
//!   data access lives in the sub-routers
//! - `Datastore` is the seam a real driver plugs into

pub mod probe;

use futures_util::future::BoxFuture;
use thiserror::Error;

pub use probe::{ProbeTarget, TcpProbe};

/// Error type for database connectivity.
#[derive(Debug, Error)]
pub enum DatastoreError {
    #[error("invalid connection string: {0}")]
    InvalidUri(String),

    #[error("unsupported connection scheme {0:?}")]
    UnsupportedScheme(String),

    #[error("no database host reachable ({targets}): {reason}")]
    Unreachable { targets: String, reason: String },
}

/// A database the server must reach before it accepts traffic.
pub trait Datastore: Send + Sync {
    /// Human-readable target description for logs (no credentials).
    fn describe(&self) -> String;

    /// Establish (or verify) the connection.
    fn connect(&self) -> BoxFuture<'_, Result<(), DatastoreError>>;
}
