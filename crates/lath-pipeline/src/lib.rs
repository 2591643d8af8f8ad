//! Asset build pipeline for documentation sites.
//!
//! Each task owns one category of the source tree: sass, plain css,
//! scripts, handlebars templates, markdown, images, fonts, and static
//! html. Tasks compose into concurrent groups for one-shot builds and
//! for the seeding pass a watch session runs before serving.

pub mod builder;
pub mod config;
pub mod images;
pub mod markdown;
pub mod passthrough;
pub mod scripts;
pub mod styles;
pub mod task;
pub mod templates;
mod walk;

pub use builder::{SiteBuilder, BUILD_TASKS, WATCH_SEED_TASKS};
pub use config::{SiteConfig, SiteLayout};
pub use task::{GroupReport, PipelineError, Stream, TaskKind, TaskReport};
