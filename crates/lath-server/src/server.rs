//! Preview server for the build output.
//!
//! Serves the output tree as plain static files, with one twist: HTML
//! responses get the reload client injected so open tabs follow rebuilds.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Request, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::reload::{reload_client_script, ReloadHub, ReloadMessage};

/// Script tag injected into every served HTML document.
const RELOAD_SCRIPT_TAG: &str = "<script src=\"/__reload.js\"></script>";

/// Configuration for the preview server.
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Directory to serve (the build output)
    pub root: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("build"),
            port: 3000,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur while serving.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("Failed to bind to {addr}: {message}")]
    BindError { addr: String, message: String },

    #[error("Initial build failed: {0}")]
    BuildError(String),

    #[error("File watch error: {0}")]
    WatchError(String),
}

/// Shared server state.
struct ServerState {
    root: PathBuf,
    hub: ReloadHub,
}

/// Preview server over a built output tree.
pub struct PreviewServer {
    config: PreviewConfig,
    hub: ReloadHub,
}

impl PreviewServer {
    pub fn new(config: PreviewConfig, hub: ReloadHub) -> Self {
        Self { config, hub }
    }

    /// Serve until the process is stopped.
    pub async fn serve(self) -> Result<(), ServeError> {
        let addr_text = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = addr_text.parse().map_err(|e: std::net::AddrParseError| {
            ServeError::BindError {
                addr: addr_text.clone(),
                message: e.to_string(),
            }
        })?;

        let app = router(Arc::new(ServerState {
            root: self.config.root.clone(),
            hub: self.hub.clone(),
        }));

        tracing::info!(
            "Serving {} at http://{}",
            self.config.root.display(),
            addr
        );

        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        let listener =
            tokio::net::TcpListener::bind(addr)
                .await
                .map_err(|e| ServeError::BindError {
                    addr: addr.to_string(),
                    message: e.to_string(),
                })?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServeError::BindError {
                addr: addr.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }
}

fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/__reload", get(ws_handler))
        .route("/__reload.js", get(script_handler))
        .fallback(static_handler)
        .with_state(state)
}

/// Handler for the reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Greet a new client, then forward every hub message to it.
async fn handle_socket(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.hub.subscribe();

    let greeting = serde_json::to_string(&ReloadMessage::Connected).unwrap_or_default();
    if socket.send(Message::Text(greeting.into())).await.is_err() {
        return;
    }

    while let Ok(msg) = rx.recv().await {
        let json = serde_json::to_string(&msg).unwrap_or_default();
        if socket.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}

/// Handler for the reload client script.
async fn script_handler() -> impl IntoResponse {
    (
        [("content-type", "application/javascript")],
        reload_client_script(),
    )
}

/// Serve a file from the output tree. HTML documents are read and
/// injected; everything else streams straight off disk.
async fn static_handler(State(state): State<Arc<ServerState>>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    if let Some(rel) = html_candidate(&path) {
        return serve_injected(&state.root, &rel).await;
    }

    match ServeDir::new(&state.root).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(infallible) => match infallible {},
    }
}

/// Map request paths to the HTML documents they name: directory requests,
/// explicit `.html` files, and extensionless routes.
fn html_candidate(path: &str) -> Option<String> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() || path.ends_with('/') {
        return Some(format!("{trimmed}index.html"));
    }
    if trimmed.ends_with(".html") {
        return Some(trimmed.to_string());
    }
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if !last.contains('.') {
        return Some(format!("{trimmed}.html"));
    }
    None
}

async fn serve_injected(root: &Path, rel: &str) -> Response {
    let Some(file) = resolve(root, rel) else {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };
    match tokio::fs::read_to_string(&file).await {
        Ok(html) => Html(inject_reload_script(&html)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// Resolve a request path inside the serve root, refusing traversal.
fn resolve(root: &Path, rel: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for part in rel.split('/') {
        match part {
            "" | "." => continue,
            ".." => return None,
            _ => path.push(part),
        }
    }
    Some(path)
}

/// Inject the reload client into an HTML document, just before the
/// closing body tag when there is one.
fn inject_reload_script(html: &str) -> String {
    if let Some(idx) = html.rfind("</body>") {
        let mut out = String::with_capacity(html.len() + RELOAD_SCRIPT_TAG.len());
        out.push_str(&html[..idx]);
        out.push_str(RELOAD_SCRIPT_TAG);
        out.push_str(&html[idx..]);
        out
    } else {
        let mut out = html.to_string();
        out.push_str(RELOAD_SCRIPT_TAG);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use pretty_assertions::assert_eq;
    use std::fs;

    async fn request(router: &Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .clone()
            .oneshot(
                axum::http::Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    fn fixture_router(root: &Path) -> Router {
        router(Arc::new(ServerState {
            root: root.to_path_buf(),
            hub: ReloadHub::new(),
        }))
    }

    #[test]
    fn html_candidates_cover_directories_and_routes() {
        assert_eq!(html_candidate("/"), Some("index.html".to_string()));
        assert_eq!(html_candidate("/guide"), Some("guide.html".to_string()));
        assert_eq!(
            html_candidate("/legal/"),
            Some("legal/index.html".to_string())
        );
        assert_eq!(
            html_candidate("/tutorials/intro.html"),
            Some("tutorials/intro.html".to_string())
        );
        assert_eq!(html_candidate("/assets/css/main.css"), None);
        assert_eq!(html_candidate("/assets/img/logo.png"), None);
    }

    #[test]
    fn resolve_refuses_traversal() {
        let root = Path::new("/srv/site");
        assert!(resolve(root, "../secrets.txt").is_none());
        assert!(resolve(root, "a/../../b.html").is_none());
        assert_eq!(
            resolve(root, "guide.html"),
            Some(PathBuf::from("/srv/site/guide.html"))
        );
    }

    #[test]
    fn injection_lands_before_the_closing_body_tag() {
        let html = "<html><body><h1>ok</h1></body></html>";
        let injected = inject_reload_script(html);
        assert_eq!(
            injected,
            "<html><body><h1>ok</h1><script src=\"/__reload.js\"></script></body></html>"
        );
    }

    #[test]
    fn injection_appends_when_body_is_absent() {
        let injected = inject_reload_script("<p>bare fragment</p>");
        assert!(injected.ends_with(RELOAD_SCRIPT_TAG));
    }

    #[tokio::test]
    async fn serves_injected_pages_and_raw_assets() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("assets/css")).unwrap();
        fs::write(
            dir.path().join("index.html"),
            "<html><body><h1>ok</h1></body></html>",
        )
        .unwrap();
        fs::write(dir.path().join("assets/css/main.css"), "body{}").unwrap();
        let app = fixture_router(dir.path());

        let (status, body) = request(&app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>ok</h1>"));
        assert!(body.contains(RELOAD_SCRIPT_TAG));
        let script_at = body.find(RELOAD_SCRIPT_TAG).unwrap();
        let body_close_at = body.find("</body>").unwrap();
        assert!(script_at < body_close_at);

        let (status, css) = request(&app, "/assets/css/main.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(css, "body{}");
        assert!(!css.contains(RELOAD_SCRIPT_TAG));
    }

    #[tokio::test]
    async fn extensionless_routes_find_their_documents() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("guide.html"),
            "<html><body>guide</body></html>",
        )
        .unwrap();
        let app = fixture_router(dir.path());

        let (status, body) = request(&app, "/guide").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("guide"));
        assert!(body.contains(RELOAD_SCRIPT_TAG));
    }

    #[tokio::test]
    async fn missing_documents_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = fixture_router(dir.path());

        let (status, _) = request(&app, "/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reload_script_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let app = fixture_router(dir.path());

        let (status, body) = request(&app, "/__reload.js").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("refresh_css"));
    }
}
