//! Onboarding backend entry point.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ CORS ─▶ body limit ─▶ static mounts ─▶ API routes ─▶ SPA fallback
//!                                                              │
//!     Client Response                                          ▼
//!     ◀────────────── error envelope ◀──────────────────── sub-routers
//!
//!     Startup: .env → config → logging → database → hooks → listen
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use onboard_backend::config::load_config;
use onboard_backend::lifecycle::{launch, signals, Shutdown};
use onboard_backend::observability::logging;
use onboard_backend::routing::ServiceRegistry;

#[derive(Parser)]
#[command(name = "onboard-backend")]
#[command(about = "Onboarding API server with optional single-service frontend hosting", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; environment variables override it
    #[arg(short, long, env = "ONBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Validate configuration and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to read .env: {e}");
        }
    }

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.check {
        println!("Configuration OK (mode: {})", config.mode());
        return ExitCode::SUCCESS;
    }

    if let Err(e) = logging::init(&config.observability) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.server.environment,
        "onboard-backend starting"
    );

    let shutdown = Shutdown::new();
    signals::install(shutdown.clone());

    // Services are mounted by the deployment; none are wired in by default.
    let services = ServiceRegistry::new();

    match launch(config, services, Vec::new(), &shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to start server");
            ExitCode::FAILURE
        }
    }
}
