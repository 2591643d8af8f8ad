//! File watching for the rebuild loop.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

use lath_pipeline::{SiteLayout, TaskKind};

/// A source file change, already mapped to the task that owns it.
#[derive(Debug, Clone)]
pub struct SourceChange {
    pub task: TaskKind,
    pub path: PathBuf,
}

/// Watches the source tree and emits one change per interesting file.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
}

impl SourceWatcher {
    /// Watch the layout's source root.
    ///
    /// Returns the watcher and a channel of classified changes. Events are
    /// debounced so editor write bursts trigger one rebuild.
    pub fn new(
        layout: &SiteLayout,
    ) -> Result<(Self, async_mpsc::Receiver<SourceChange>), std::io::Error> {
        // Notify reports canonical paths, so classify against a
        // canonicalized layout.
        let root = layout.source_root().canonicalize()?;
        let layout = SiteLayout::new(&root, layout.output_root());

        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(std::io::Error::other)?;

        // Forward events from the notify callback into async land,
        // classifying and debouncing on the way.
        std::thread::spawn(move || {
            let debounce_duration = Duration::from_millis(100);
            let mut last_event_time = Instant::now();

            while let Ok(event) = sync_rx.recv() {
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    continue;
                }

                let now = Instant::now();
                if now.duration_since(last_event_time) < debounce_duration {
                    continue;
                }
                last_event_time = now;

                for path in event.paths {
                    if let Some(task) = classify(&path, &layout) {
                        let _ = async_tx.blocking_send(SourceChange { task, path });
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Map a changed path to the task that owns it.
///
/// Top-level templates and the shared data file both re-render templates.
/// Changed images go through the full optimizing task, not the plain copy
/// the seeding pass uses. Static html has no watcher; it is picked up on
/// the next full build.
pub fn classify(path: &Path, layout: &SiteLayout) -> Option<TaskKind> {
    if path == layout.data_file() {
        return Some(TaskKind::Templates);
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if ext == "hbs" && path.parent() == Some(layout.source_root()) {
        return Some(TaskKind::Templates);
    }
    if path.starts_with(layout.scss_dir()) && ext == "scss" {
        return Some(TaskKind::Styles);
    }
    if path.starts_with(layout.css_dir()) && ext == "css" {
        return Some(TaskKind::PlainCss);
    }
    if path.starts_with(layout.js_dir()) && ext == "js" {
        return Some(TaskKind::Scripts);
    }
    if path.starts_with(layout.img_dir()) {
        return Some(TaskKind::Images);
    }
    if path.starts_with(layout.fonts_dir()) {
        return Some(TaskKind::Fonts);
    }
    if path.starts_with(layout.md_dir()) && ext == "md" {
        return Some(TaskKind::Markdown);
    }
    None
}
