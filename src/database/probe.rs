//! TCP reachability probe built from a `mongodb://` connection string.

use std::fmt;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::net::TcpStream;
use url::{Host, Url};

use crate::database::{Datastore, DatastoreError};

/// Port used when a host omits one.
pub const DEFAULT_PORT: u16 = 27017;

/// One `host:port` from the connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Checks that at least one listed host accepts TCP connections.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    targets: Vec<ProbeTarget>,
    timeout: Duration,
}

impl TcpProbe {
    /// Parse the hosts out of `uri`.
    ///
    /// Credentials, database name and options are ignored. `mongodb+srv`
    /// needs DNS SRV resolution and is rejected.
    pub fn from_uri(uri: &str, timeout: Duration) -> Result<Self, DatastoreError> {
        let (scheme, rest) = uri
            .trim()
            .split_once("://")
            .ok_or_else(|| DatastoreError::InvalidUri("missing scheme".to_string()))?;

        if scheme != "mongodb" {
            return Err(DatastoreError::UnsupportedScheme(scheme.to_string()));
        }

        let authority = rest.split(['/', '?']).next().unwrap_or_default();
        let hosts = match authority.rfind('@') {
            Some(at) => &authority[at + 1..],
            None => authority,
        };

        let targets = hosts
            .split(',')
            .filter(|h| !h.is_empty())
            .map(parse_target)
            .collect::<Result<Vec<_>, _>>()?;

        if targets.is_empty() {
            return Err(DatastoreError::InvalidUri("no hosts".to_string()));
        }

        Ok(Self { targets, timeout })
    }

    pub fn targets(&self) -> &[ProbeTarget] {
        &self.targets
    }

    fn targets_label(&self) -> String {
        self.targets
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn parse_target(raw: &str) -> Result<ProbeTarget, DatastoreError> {
    let url = Url::parse(&format!("mongodb://{raw}"))
        .map_err(|e| DatastoreError::InvalidUri(format!("host {raw:?}: {e}")))?;

    let host = match url.host() {
        Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        _ => return Err(DatastoreError::InvalidUri(format!("host {raw:?} is empty"))),
    };

    Ok(ProbeTarget {
        host,
        port: url.port().unwrap_or(DEFAULT_PORT),
    })
}

impl Datastore for TcpProbe {
    fn describe(&self) -> String {
        format!("mongodb://{}", self.targets_label())
    }

    fn connect(&self) -> BoxFuture<'_, Result<(), DatastoreError>> {
        Box::pin(async move {
            let mut last_error = String::from("no attempt made");

            for target in &self.targets {
                let attempt = TcpStream::connect((target.host.as_str(), target.port));
                match tokio::time::timeout(self.timeout, attempt).await {
                    Ok(Ok(_stream)) => {
                        tracing::debug!(host = %target, "Database host reachable");
                        return Ok(());
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(host = %target, error = %e, "Database host unreachable");
                        last_error = e.to_string();
                    }
                    Err(_) => {
                        tracing::warn!(host = %target, timeout = ?self.timeout, "Database connection timed out");
                        last_error = format!("timed out after {:?}", self.timeout);
                    }
                }
            }

            Err(DatastoreError::Unreachable {
                targets: self.targets_label(),
                reason: last_error,
            })
        })
    }
}
