//! Task identity, reporting, and concurrent group execution.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use futures::future::join_all;

/// Errors that can occur while running build tasks.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to read {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    WriteError { path: String, message: String },

    #[error("Failed to load config: {path}: {message}")]
    ConfigError { path: String, message: String },

    #[error("Failed to compile stylesheet: {path}: {message}")]
    StyleError { path: String, message: String },

    #[error("Failed to compile script: {path}: {message}")]
    ScriptError { path: String, message: String },

    #[error("Failed to render template: {path}: {message}")]
    TemplateError { path: String, message: String },

    #[error("Failed to parse template data: {path}: {message}")]
    DataError { path: String, message: String },

    #[error("Failed to optimize image: {path}: {message}")]
    ImageError { path: String, message: String },

    #[error("Task aborted: {0}")]
    Aborted(String),

    #[error("{failed} of {total} tasks failed")]
    GroupError { failed: usize, total: usize },
}

impl PipelineError {
    pub(crate) fn read(path: &Path, err: impl fmt::Display) -> Self {
        Self::ReadError {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn write(path: &Path, err: impl fmt::Display) -> Self {
        Self::WriteError {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn image(path: &Path, err: impl fmt::Display) -> Self {
        Self::ImageError {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

/// One build task. Watch mode maps changed source paths back to these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Compile `.scss` sheets into minified, prefixed css.
    Styles,
    /// Copy plain `.css` files into the css output.
    PlainCss,
    /// Transpile and minify `.js` sources.
    Scripts,
    /// Render top-level `.hbs` templates against the shared data file.
    Templates,
    /// Render markdown documents into full pages.
    Markdown,
    /// Optimize images newer than their output copies.
    Images,
    /// Copy images without optimizing, for fast watch startup.
    ImagesMove,
    /// Copy font files.
    Fonts,
    /// Copy static `.html` files from anywhere in the source tree.
    StaticHtml,
}

impl TaskKind {
    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Styles => "styles",
            TaskKind::PlainCss => "plain-css",
            TaskKind::Scripts => "scripts",
            TaskKind::Templates => "templates",
            TaskKind::Markdown => "markdown",
            TaskKind::Images => "images",
            TaskKind::ImagesMove => "images-move",
            TaskKind::Fonts => "fonts",
            TaskKind::StaticHtml => "static",
        }
    }

    /// What a completed run of this task pushes to preview clients.
    pub fn stream(self) -> Stream {
        match self {
            TaskKind::Styles => Stream::RefreshCss,
            TaskKind::Scripts
            | TaskKind::Templates
            | TaskKind::Markdown
            | TaskKind::ImagesMove => Stream::Reload,
            TaskKind::PlainCss | TaskKind::Images | TaskKind::Fonts | TaskKind::StaticHtml => {
                Stream::None
            }
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Push effect a finished task has on connected preview clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// No push; the change shows up on the next manual reload.
    None,
    /// Full page reload.
    Reload,
    /// In-place stylesheet refresh.
    RefreshCss,
}

/// What one task run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskReport {
    /// Files written to the output tree.
    pub written: usize,
    /// Files left alone because the output was already current.
    pub skipped: usize,
}

/// Result of one task inside a group.
#[derive(Debug)]
pub struct TaskRun {
    pub kind: TaskKind,
    pub result: Result<TaskReport, PipelineError>,
}

/// Outcome of a concurrently executed task group.
#[derive(Debug)]
pub struct GroupReport {
    pub runs: Vec<TaskRun>,
    pub duration_ms: u64,
}

impl GroupReport {
    pub fn ok(&self) -> bool {
        self.runs.iter().all(|run| run.result.is_ok())
    }

    pub fn failed(&self) -> usize {
        self.runs.iter().filter(|run| run.result.is_err()).count()
    }

    pub fn written(&self) -> usize {
        self.runs
            .iter()
            .filter_map(|run| run.result.as_ref().ok())
            .map(|report| report.written)
            .sum()
    }

    pub fn skipped(&self) -> usize {
        self.runs
            .iter()
            .filter_map(|run| run.result.as_ref().ok())
            .map(|report| report.skipped)
            .sum()
    }
}

/// A unit of build work, run on a blocking worker.
pub type Job = Box<dyn FnOnce() -> Result<TaskReport, PipelineError> + Send + 'static>;

/// Run every job concurrently and wait for all of them.
///
/// A failing job never cancels its siblings; each outcome lands in the
/// group report. A panicking job is reported as aborted.
pub async fn run_group(jobs: Vec<(TaskKind, Job)>) -> GroupReport {
    let start = Instant::now();
    let futures = jobs.into_iter().map(|(kind, job)| {
        let handle = tokio::task::spawn_blocking(job);
        async move {
            let result = match handle.await {
                Ok(result) => result,
                Err(err) => Err(PipelineError::Aborted(err.to_string())),
            };
            TaskRun { kind, result }
        }
    });
    let runs = join_all(futures).await;
    GroupReport {
        runs,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}
