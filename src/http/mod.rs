//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum::serve, graceful shutdown)
//!     → pipeline.rs (ordered stages)
//!         → request.rs (request ID)
//!         → static_files.rs (/uploads, /documents, /assets)
//!         → routing (API sub-routers, /health)
//!         → spa.rs (frontend build, combined mode only)
//!         → error.rs (faults → JSON envelope)
//!     → Send to client
//! ```

pub mod error;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod server;
pub mod spa;
pub mod static_files;

pub use error::{ApiError, Fault, FaultExposure};
pub use pipeline::{Pipeline, Stage};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::{ErrorEnvelope, HealthStatus};
pub use server::HttpServer;
pub use spa::{FallbackStatus, SpaFallback};
pub use static_files::StaticAssetMounts;
