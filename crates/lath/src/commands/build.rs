//! One-shot site build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use lath_pipeline::{SiteBuilder, SiteConfig};

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let mut config = SiteConfig::load(config_path)?;
    if let Some(output) = output {
        config.site.output = output;
    }

    tracing::info!("Building {}", config.site.source.display());

    let builder = SiteBuilder::new(config);
    builder.build().await?;

    tracing::info!("Output: {}", builder.config().site.output.display());

    Ok(())
}
