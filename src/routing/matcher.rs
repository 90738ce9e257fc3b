//! Path prefix matching.
//!
//! # Design Decisions
//! - Prefixes match whole path segments: `/api` matches `/api` and
//!   `/api/x`, never `/apix`
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching

use axum::http::Request;

/// Prefix under which every API route lives.
pub const API_PREFIX: &str = "/api";

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches<B>(&self, req: &Request<B>) -> bool;
}

/// Matches the request path against a segment-aligned prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher. A trailing `/` is ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        while prefix.len() > 1 && prefix.ends_with('/') {
            prefix.pop();
        }
        Self { prefix }
    }

    /// Matcher for the API prefix.
    pub fn api() -> Self {
        Self::new(API_PREFIX)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Segment-aligned prefix test on a bare path.
    pub fn matches_path(&self, path: &str) -> bool {
        if self.prefix == "/" {
            return path.starts_with('/');
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Whether either prefix would capture paths of the other.
    pub fn overlaps(&self, other: &PathPrefixMatcher) -> bool {
        self.matches_path(&other.prefix) || other.matches_path(&self.prefix)
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches<B>(&self, req: &Request<B>) -> bool {
        self.matches_path(req.uri().path())
    }
}
