//! Configuration loading from disk and environment.
//!
//! Precedence, lowest first: built-in defaults, the optional TOML file,
//! environment variables. Validation runs on the merged result.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{AppConfig, LogFormat};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {var}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file plus the process environment.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so callers can supply a fixed map.
pub fn apply_env<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("SINGLE_SERVICE") {
        // Only the literal "true" enables it.
        config.server.single_service = value == "true";
    }
    // NODE_ENV and MONGODB_URI are fallbacks for the newer names.
    if let Some(value) = lookup("APP_ENV").or_else(|| lookup("NODE_ENV")) {
        config.server.environment = value.trim().to_string();
    }
    if let Some(value) = lookup("HOST") {
        config.server.host = value;
    }
    if let Some(value) = lookup("PORT") {
        config.server.port = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Env { var: "PORT", value })?;
    }
    if let Some(value) = lookup("ALLOWED_ORIGINS") {
        let origins = split_origins(&value);
        config.cors.allowed_origins = if origins.is_empty() { None } else { Some(origins) };
    }
    if let Some(value) = lookup("DATABASE_URI").or_else(|| lookup("MONGODB_URI")) {
        config.database.uri = Some(value).filter(|v| !v.trim().is_empty());
    }
    if let Some(value) = lookup("STATIC_ROOT") {
        config.assets.root = PathBuf::from(value);
    }
    if let Some(value) = lookup("FRONTEND_BUILD_DIR") {
        config.frontend.build_dir = PathBuf::from(value);
    }
    if let Some(value) = lookup("LOG_FORMAT") {
        config.observability.log_format = match value.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" | "text" => LogFormat::Pretty,
            _ => return Err(ConfigError::Env { var: "LOG_FORMAT", value }),
        };
    }
    if let Some(value) = lookup("METRICS_ADDRESS") {
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = value;
    }

    Ok(())
}

/// Split a comma-separated origin list, trimming entries and dropping blanks.
pub fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
