//! Storefront CLI entry point.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use storefront_cache::adapters::http::HttpCommerceApi;
use storefront_cache::cli::{dispatch, handle_error, Cli};
use storefront_cache::infrastructure::config::ConfigLoader;
use storefront_cache::infrastructure::logging::{LogConfig, LoggerImpl};
use storefront_cache::services::QueryClient;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json_mode);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match cli.config {
        Some(ref path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
    .context("Failed to load configuration")?;

    let _logger = LoggerImpl::init(&LogConfig::from_settings(&config.logging)?)
        .context("Failed to initialize logging")?;

    let api = HttpCommerceApi::new(&config.api).context("Failed to create API client")?;
    let client = QueryClient::new(Arc::new(api), &config.cache, &config.retry);

    dispatch(cli.command, &client, cli.json).await
}
