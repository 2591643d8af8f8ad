//! Markdown-only render command.

use std::path::Path;

use anyhow::Result;
use lath_pipeline::{SiteBuilder, SiteConfig, TaskKind};

/// Render the markdown documents without running the rest of the build.
pub async fn run(config_path: &Path) -> Result<()> {
    let config = SiteConfig::load(config_path)?;
    let builder = SiteBuilder::new(config);
    builder.run_tasks(&[TaskKind::Markdown]).await?;
    Ok(())
}
