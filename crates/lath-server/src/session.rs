//! Watch session: seed build, file watcher, rebuild loop, preview server.

use std::sync::Arc;

use lath_pipeline::SiteBuilder;

use crate::reload::{message_for, ReloadHub};
use crate::server::{PreviewConfig, PreviewServer, ServeError};
use crate::watcher::{SourceChange, SourceWatcher};

/// A full watch session over a source tree.
///
/// Seeds the output with a fast build, then rebuilds single tasks as
/// their source files change, pushing reload messages to connected
/// preview tabs after each one.
pub struct WatchSession {
    builder: Arc<SiteBuilder>,
    server_config: PreviewConfig,
}

impl WatchSession {
    pub fn new(builder: SiteBuilder, server_config: PreviewConfig) -> Self {
        Self {
            builder: Arc::new(builder),
            server_config,
        }
    }

    /// Run until the process is stopped.
    pub async fn run(self) -> Result<(), ServeError> {
        self.builder
            .seed_watch()
            .await
            .map_err(|e| ServeError::BuildError(e.to_string()))?;

        let hub = ReloadHub::new();
        let (watcher, mut changes) = SourceWatcher::new(self.builder.layout())
            .map_err(|e| ServeError::WatchError(e.to_string()))?;

        let builder = Arc::clone(&self.builder);
        let change_hub = hub.clone();
        tokio::spawn(async move {
            while let Some(change) = changes.recv().await {
                handle_change(&builder, &change_hub, change).await;
            }
            drop(watcher);
        });

        PreviewServer::new(self.server_config, hub).serve().await
    }
}

/// Rebuild the task a changed file belongs to and notify preview tabs.
async fn handle_change(builder: &Arc<SiteBuilder>, hub: &ReloadHub, change: SourceChange) {
    tracing::info!("Source changed ({}): {}", change.task, change.path.display());

    let task = change.task;
    let worker = Arc::clone(builder);
    let outcome = tokio::task::spawn_blocking(move || worker.run_task(task)).await;

    match outcome {
        Ok(Ok(report)) => {
            tracing::info!(
                "Task {}: {} written, {} skipped",
                task,
                report.written,
                report.skipped
            );
            if let Some(msg) = message_for(task.stream()) {
                hub.send(msg);
            }
        }
        Ok(Err(e)) => {
            tracing::error!("Task {} failed: {}", task, e);
        }
        Err(e) => {
            tracing::error!("Task {} aborted: {}", task, e);
        }
    }
}
