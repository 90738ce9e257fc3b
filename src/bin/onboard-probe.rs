use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "onboard-probe")]
#[command(about = "Smoke-test a running onboarding backend", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    /// Bearer token for protected endpoints
    #[arg(short, long, env = "ONBOARD_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the health endpoint
    Health,
    /// GET an arbitrary path, e.g. /api/learning/all
    Get { path: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let path = match &cli.command {
        Commands::Health => "/health".to_string(),
        Commands::Get { path } if path.starts_with('/') => path.clone(),
        Commands::Get { path } => format!("/{path}"),
    };
    let target = format!("{base}{path}");

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
    }

    let mut res = client.get(&target).headers(headers.clone()).send().await?;

    // Some endpoints reject stale tokens but allow anonymous access.
    if res.status() == StatusCode::UNAUTHORIZED && !headers.is_empty() {
        eprintln!("401 with token, retrying {path} without auth");
        res = client.get(&target).send().await?;
    }

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    println!("Status: {status}");

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) if text.is_empty() => {}
        Err(_) => println!("{text}"),
    }

    if !status.is_success() {
        return Err(format!("request failed with status {status}").into());
    }
    Ok(())
}
