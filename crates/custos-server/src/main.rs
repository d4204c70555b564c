//! Custos Server - Main entry point

use anyhow::Result;
use custos_common::logging::{init_logging, LogConfig};
use tracing::info;

use custos_server::{api, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables take precedence over the built-in defaults
    let mut log_config = LogConfig::from_env()
        .unwrap_or_default()
        .with_file_prefix("custos-server");
    if log_config.filter_directives.is_none() {
        log_config =
            log_config.with_filter("custos_server=debug,tower_http=debug,sqlx=warn");
    }

    init_logging(&log_config)?;

    info!("Starting Custos Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    api::serve(config).await
}
