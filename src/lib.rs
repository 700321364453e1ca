pub mod cli;
pub mod core;
pub mod providers;

use crate::core::{Aggregator, ResultCache, config::AppConfig};
use crate::providers::{HttpTransactionSource, PingClient};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Aggregate one account and print it, as a table or as JSON.
    Aggregate { account: String, json: bool },
    Ping,
    /// Serve the HTTP endpoint, optionally overriding the configured address.
    Serve { bind: Option<String> },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Aggregate { account, json } => {
            let aggregator = build_aggregator(&config, Arc::new(ResultCache::new()))?;
            cli::aggregate::run(&aggregator, &account, json).await
        }
        AppCommand::Ping => cli::ping::run(&PingClient::new(&config.ping.base_url)).await,
        AppCommand::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let state = cli::serve::AppState {
                aggregator: Arc::new(build_aggregator(&config, Arc::new(ResultCache::new()))?),
                ping: Arc::new(PingClient::new(&config.ping.base_url)),
            };
            cli::serve::run(&bind, state).await
        }
    }
}

/// Wires both configured upstreams and `cache` into an [`Aggregator`].
pub fn build_aggregator(config: &AppConfig, cache: Arc<ResultCache>) -> Result<Aggregator> {
    let timeout = config.request_timeout_ms.map(Duration::from_millis);
    let primary = HttpTransactionSource::new(
        &config.sources.primary.name,
        &config.sources.primary.base_url,
        config.retry,
        timeout,
    )?;
    let secondary = HttpTransactionSource::new(
        &config.sources.secondary.name,
        &config.sources.secondary.base_url,
        config.retry,
        timeout,
    )?;
    Ok(Aggregator::new(Arc::new(primary), Arc::new(secondary), cache))
}
