//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional TOML file (loader.rs)
//!     → environment overrides (loader.rs)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → mode.rs derives the DeploymentMode once
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow running with environment only
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod mode;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use mode::DeploymentMode;
pub use schema::AppConfig;
pub use schema::{
    AssetsConfig, CorsConfig, DatabaseConfig, FrontendConfig, LimitsConfig, LogFormat,
    ObservabilityConfig, ServerConfig,
};
