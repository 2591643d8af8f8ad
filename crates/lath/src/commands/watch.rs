//! Watch command: rebuild on change behind a live preview server.

use std::path::Path;

use anyhow::Result;
use lath_pipeline::{SiteBuilder, SiteConfig};
use lath_server::{PreviewConfig, WatchSession};

/// Run the watch command.
pub async fn run(config_path: &Path, port: Option<u16>, open: bool) -> Result<()> {
    let config = SiteConfig::load(config_path)?;

    let server_config = PreviewConfig {
        root: config.site.output.clone(),
        port: port.unwrap_or(config.serve.port),
        open: open && config.serve.open,
        ..Default::default()
    };

    tracing::info!("Watching {}", config.site.source.display());

    WatchSession::new(SiteBuilder::new(config), server_config)
        .run()
        .await?;

    Ok(())
}
