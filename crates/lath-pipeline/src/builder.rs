//! Build orchestration: dispatching tasks and composing them into groups.

use crate::config::{SiteConfig, SiteLayout};
use crate::images::{self, ImageOptions};
use crate::scripts::{self, ScriptOptions};
use crate::task::{run_group, GroupReport, Job, PipelineError, TaskKind, TaskReport};
use crate::{markdown, passthrough, styles, templates};

/// Tasks a one-shot build runs, all concurrently.
pub const BUILD_TASKS: [TaskKind; 8] = [
    TaskKind::Styles,
    TaskKind::PlainCss,
    TaskKind::Scripts,
    TaskKind::Images,
    TaskKind::Fonts,
    TaskKind::Templates,
    TaskKind::Markdown,
    TaskKind::StaticHtml,
];

/// Tasks the watch session runs before serving. Images are copied rather
/// than optimized so the first preview comes up quickly.
pub const WATCH_SEED_TASKS: [TaskKind; 6] = [
    TaskKind::Styles,
    TaskKind::PlainCss,
    TaskKind::Scripts,
    TaskKind::ImagesMove,
    TaskKind::Fonts,
    TaskKind::Templates,
];

/// Runs build tasks against one site configuration.
#[derive(Clone)]
pub struct SiteBuilder {
    config: SiteConfig,
    layout: SiteLayout,
    scripts: ScriptOptions,
    images: ImageOptions,
}

impl SiteBuilder {
    pub fn new(config: SiteConfig) -> Self {
        let layout = config.layout();
        let scripts = ScriptOptions {
            target: config.build.script_target.clone(),
            minify: true,
            copy_helper: config.build.copy_helper,
        };
        Self {
            config,
            layout,
            scripts,
            images: ImageOptions::default(),
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    /// Run one task right here on the calling thread.
    pub fn run_task(&self, kind: TaskKind) -> Result<TaskReport, PipelineError> {
        match kind {
            TaskKind::Styles => styles::compile_styles(&self.layout),
            TaskKind::PlainCss => passthrough::copy_plain_css(&self.layout),
            TaskKind::Scripts => scripts::compile_scripts(&self.layout, &self.scripts),
            TaskKind::Templates => templates::render_templates(&self.layout),
            TaskKind::Markdown => markdown::render_documents(&self.layout, &self.config.site.title),
            TaskKind::Images => images::optimize_images(&self.layout, &self.images),
            TaskKind::ImagesMove => images::move_images(&self.layout),
            TaskKind::Fonts => passthrough::copy_fonts(&self.layout),
            TaskKind::StaticHtml => passthrough::copy_static_html(&self.layout),
        }
    }

    /// Build the whole site once.
    pub async fn build(&self) -> Result<GroupReport, PipelineError> {
        self.run_tasks(&BUILD_TASKS).await
    }

    /// Seed the output tree for a watch session.
    pub async fn seed_watch(&self) -> Result<GroupReport, PipelineError> {
        self.run_tasks(&WATCH_SEED_TASKS).await
    }

    /// Run a set of tasks concurrently and log each outcome. Every task
    /// gets to finish even when a sibling fails; the group is an error if
    /// any member failed.
    pub async fn run_tasks(&self, kinds: &[TaskKind]) -> Result<GroupReport, PipelineError> {
        self.check_source_root()?;

        let jobs: Vec<(TaskKind, Job)> = kinds.iter().map(|&kind| self.job(kind)).collect();
        let group = run_group(jobs).await;

        for run in &group.runs {
            match &run.result {
                Ok(report) => {
                    tracing::info!(
                        "Task {}: {} written, {} skipped",
                        run.kind,
                        report.written,
                        report.skipped
                    );
                }
                Err(e) => tracing::error!("Task {} failed: {}", run.kind, e),
            }
        }
        tracing::info!(
            "Ran {} tasks in {}ms ({} files written)",
            group.runs.len(),
            group.duration_ms,
            group.written()
        );

        if group.ok() {
            Ok(group)
        } else {
            Err(PipelineError::GroupError {
                failed: group.failed(),
                total: group.runs.len(),
            })
        }
    }

    fn job(&self, kind: TaskKind) -> (TaskKind, Job) {
        let builder = self.clone();
        (kind, Box::new(move || builder.run_task(kind)))
    }

    fn check_source_root(&self) -> Result<(), PipelineError> {
        let root = self.layout.source_root();
        if !root.exists() {
            return Err(PipelineError::ReadError {
                path: root.display().to_string(),
                message: "source directory does not exist".to_string(),
            });
        }
        Ok(())
    }
}
