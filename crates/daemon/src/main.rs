use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tvarr_daemon::{Daemon, DaemonConfig, feeds_from_config};
use tvarr_db::SqliteCatalog;
use tvarr_providers::HttpClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = DaemonConfig::from_env().context("invalid configuration")?;
    info!(db_path = %config.db_path, "opening catalog");

    let catalog = SqliteCatalog::open(&config.db_path)
        .await
        .context("failed to open catalog")?;
    info!("migrations complete");

    let http = HttpClient::new(config.fetch_timeout).context("failed to build HTTP client")?;
    let feeds = feeds_from_config(&config, &http);
    let daemon = Daemon::new(config, Arc::new(catalog)).with_feeds(feeds);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("shutdown requested");
                    cancel.cancel();
                }
                Err(e) => warn!(error = %e, "cannot listen for ctrl-c"),
            }
        });
    }

    daemon.run(cancel).await;
    Ok(())
}
