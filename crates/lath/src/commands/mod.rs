pub mod build;
pub mod markdown;
pub mod watch;
