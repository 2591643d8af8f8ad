//! Preview server with live reload for built documentation sites.
//!
//! Serves a build output tree over HTTP, watches the source tree, reruns
//! the build task a changed file belongs to, and pushes reload messages
//! to open tabs over a WebSocket.

pub mod reload;
pub mod server;
pub mod session;
pub mod watcher;

pub use reload::{message_for, reload_client_script, ReloadHub, ReloadMessage};
pub use server::{PreviewConfig, PreviewServer, ServeError};
pub use session::WatchSession;
pub use watcher::{classify, SourceChange, SourceWatcher};
