//! API route table.
//!
//! # Responsibilities
//! - Store sub-routers with their mount prefixes
//! - Reject prefixes that would shadow or be shadowed by another
//! - Mount placeholders for services that are not provided
//!
//! # Design Decisions
//! - Immutable after construction
//! - Registration order is preserved for startup diagnostics
//! - Conflicts are reported as errors instead of router panics

use std::collections::HashMap;
use std::fmt;

use axum::Router;
use thiserror::Error;

use crate::http::error::ApiError;
use crate::routing::matcher::{PathPrefixMatcher, API_PREFIX};

/// The API services the backend exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceModule {
    Auth,
    Candidates,
    Onboarding,
    Employees,
    Admin,
    Chatbot,
    HrDatabase,
    Prompts,
    Learning,
}

impl ServiceModule {
    /// Every service, in mount order.
    pub const ALL: [ServiceModule; 9] = [
        ServiceModule::Auth,
        ServiceModule::Candidates,
        ServiceModule::Onboarding,
        ServiceModule::Employees,
        ServiceModule::Admin,
        ServiceModule::Chatbot,
        ServiceModule::HrDatabase,
        ServiceModule::Prompts,
        ServiceModule::Learning,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ServiceModule::Auth => "auth",
            ServiceModule::Candidates => "candidates",
            ServiceModule::Onboarding => "onboarding",
            ServiceModule::Employees => "employees",
            ServiceModule::Admin => "admin",
            ServiceModule::Chatbot => "chatbot",
            ServiceModule::HrDatabase => "hr-database",
            ServiceModule::Prompts => "prompts",
            ServiceModule::Learning => "learning",
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            ServiceModule::Auth => "/api/auth",
            ServiceModule::Candidates => "/api/candidates",
            ServiceModule::Onboarding => "/api/onboarding",
            ServiceModule::Employees => "/api/employees",
            ServiceModule::Admin => "/api/admin",
            ServiceModule::Chatbot => "/api/chatbot",
            ServiceModule::HrDatabase => "/api/hr-database",
            ServiceModule::Prompts => "/api/prompts",
            ServiceModule::Learning => "/api/learning",
        }
    }
}

impl fmt::Display for ServiceModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sub-routers supplied for the standard services.
#[derive(Default)]
pub struct ServiceRegistry {
    routers: HashMap<ServiceModule, Router>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide the router for `module`, replacing any earlier one.
    pub fn with(mut self, module: ServiceModule, router: Router) -> Self {
        self.routers.insert(module, router);
        self
    }

    pub fn insert(&mut self, module: ServiceModule, router: Router) {
        self.routers.insert(module, router);
    }

    pub fn contains(&self, module: ServiceModule) -> bool {
        self.routers.contains_key(&module)
    }

    fn take(&mut self, module: ServiceModule) -> Option<Router> {
        self.routers.remove(&module)
    }
}

/// Error type for route registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error("prefix {0:?} must start with \"/api/\"")]
    NotUnderApi(String),

    #[error("prefix {0:?} must not end with '/'")]
    TrailingSlash(String),

    #[error("prefix {0:?} is already mounted")]
    Duplicate(String),

    #[error("prefix {prefix:?} overlaps mounted prefix {existing:?}")]
    Overlap { prefix: String, existing: String },
}

/// A mounted sub-router.
pub struct RouteEntry {
    name: String,
    matcher: PathPrefixMatcher,
    router: Router,
    available: bool,
}

impl RouteEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    /// False for placeholders mounted in place of a missing service.
    pub fn is_available(&self) -> bool {
        self.available
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("name", &self.name)
            .field("prefix", &self.matcher.prefix())
            .field("available", &self.available)
            .finish()
    }
}

/// Ordered prefix → sub-router table.
#[derive(Debug, Default)]
pub struct ApiRouterTable {
    entries: Vec<RouteEntry>,
}

impl ApiRouterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount all standard services in order. Services missing from
    /// `registry` answer 503 through [`unavailable_router`].
    pub fn standard(mut registry: ServiceRegistry) -> Self {
        let mut table = Self::new();
        for module in ServiceModule::ALL {
            let (router, available) = match registry.take(module) {
                Some(router) => (router, true),
                None => (unavailable_router(module.name()), false),
            };
            table.entries.push(RouteEntry {
                name: module.name().to_string(),
                matcher: PathPrefixMatcher::new(module.prefix()),
                router,
                available,
            });
        }
        table
    }

    /// Mount `router` at `prefix`.
    pub fn mount(
        &mut self,
        name: impl Into<String>,
        prefix: &str,
        router: Router,
    ) -> Result<(), RouteTableError> {
        if !prefix.starts_with(&format!("{}/", API_PREFIX)) || prefix.len() <= API_PREFIX.len() + 1 {
            return Err(RouteTableError::NotUnderApi(prefix.to_string()));
        }
        if prefix.ends_with('/') {
            return Err(RouteTableError::TrailingSlash(prefix.to_string()));
        }

        let matcher = PathPrefixMatcher::new(prefix);
        for entry in &self.entries {
            if entry.matcher == matcher {
                return Err(RouteTableError::Duplicate(prefix.to_string()));
            }
            if entry.matcher.overlaps(&matcher) {
                return Err(RouteTableError::Overlap {
                    prefix: prefix.to_string(),
                    existing: entry.prefix().to_string(),
                });
            }
        }

        self.entries.push(RouteEntry {
            name: name.into(),
            matcher,
            router,
            available: true,
        });
        Ok(())
    }

    /// Entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_router(self) -> Router {
        self.entries
            .into_iter()
            .fold(Router::new(), |router, entry| {
                let prefix = entry.matcher.prefix().to_string();
                router.nest(&prefix, entry.router)
            })
    }
}

/// Placeholder answering every request with a 503 envelope.
pub fn unavailable_router(service: &str) -> Router {
    let service = service.to_string();
    Router::new().fallback(move || {
        let service = service.clone();
        async move { ApiError::Unavailable(service) }
    })
}
