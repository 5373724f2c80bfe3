//! Binary crate for the weather HTTP service.
//!
//! This crate focuses on:
//! - Parsing startup flags and loading configuration
//! - Registering the HTTP routes
//! - Mapping core results and failures to HTTP responses

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use weather_core::{Config, WeatherAggregator, config::API_KEY_ENV};

mod routes;

#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather aggregation HTTP API")]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Optional TOML config file; environment variables override its values.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env(),
    };
    if !config.has_api_key() {
        tracing::warn!("{API_KEY_ENV} is not set; /weather requests will fail");
    }

    let app = routes::router(WeatherAggregator::openweather(&config));

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
