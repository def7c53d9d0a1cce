mod command;
mod config;
mod error_handler;
mod platform;
mod router;
#[cfg(test)]
mod testing;

use std::path::PathBuf;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = Config::load(&config_path);

    // The file may carry a log filter, so logging comes up after loading it
    let filter = config
        .as_ref()
        .map(|c| c.logging.filter.clone())
        .unwrap_or_else(|_| config::LoggingConfig::default().filter);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match config {
        Ok(c) => c,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration loaded: {}", config.sources());

    platform::telegram::run(&config.telegram.bot_token).await
}
