//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     ServiceRegistry (sub-routers supplied by the embedding binary)
//!     → router.rs (ApiRouterTable::standard, extra mounts validated)
//!     → matcher.rs (segment-aligned prefix checks)
//!     → Frozen into the axum Router by the pipeline
//!
//! Request:
//!     /api/<service>/... → nested sub-router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Prefixes are disjoint, so match order never changes the outcome

pub mod matcher;
pub mod router;

pub use matcher::{Matcher, PathPrefixMatcher, API_PREFIX};
pub use router::{ApiRouterTable, RouteEntry, RouteTableError, ServiceModule, ServiceRegistry};
