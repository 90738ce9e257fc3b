//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (origin policy, preflight answers)
//!     → limits.rs (body size caps)
//!     → Pass to static mounts / API routes
//! ```

pub mod cors;
pub mod limits;

pub use cors::{CorsPolicy, DEFAULT_ORIGINS};
pub use limits::body_limit_layer;
