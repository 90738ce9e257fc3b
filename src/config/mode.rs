//! Deployment mode resolution.
//!
//! The backend runs either alongside a separately deployed frontend
//! (`Split`) or serves the built frontend itself (`Combined`). The mode is
//! decided once at startup and never changes.

use std::fmt;

use crate::config::schema::PRODUCTION_TIER;

/// How the frontend and the API are deployed relative to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeploymentMode {
    /// One process serves the API and the built frontend on the same origin.
    Combined,
    /// The frontend is served elsewhere; cross-origin access is explicit.
    Split,
}

impl DeploymentMode {
    /// Combined if the explicit flag is set or the tier is production.
    pub fn resolve(explicit_flag: bool, env_tier: &str) -> Self {
        if explicit_flag || env_tier == PRODUCTION_TIER {
            DeploymentMode::Combined
        } else {
            DeploymentMode::Split
        }
    }

    pub fn is_combined(self) -> bool {
        self == DeploymentMode::Combined
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentMode::Combined => write!(f, "combined"),
            DeploymentMode::Split => write!(f, "split"),
        }
    }
}
