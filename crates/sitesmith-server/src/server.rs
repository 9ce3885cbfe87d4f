//! Preview server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use sitesmith_template::{Escaping, WebsiteRequest, ALLOWED_WEBSITE_TYPES};

use crate::watcher::{FileWatcher, WatchEvent};
use crate::websocket::{reload_client_script, ReloadHub, ReloadMessage};

/// Path of the live reload WebSocket endpoint.
pub const RELOAD_PATH: &str = "/__reload";

/// Regenerates the output directory when watched files change.
pub trait SiteRebuilder: Send + Sync + 'static {
    /// Rebuild all sites. Called on the blocking thread pool.
    fn rebuild(&self) -> Result<(), String>;

    /// Escaping the generate API should use after the last successful
    /// rebuild. `None` keeps the current mode.
    fn escaping(&self) -> Option<Escaping> {
        None
    }
}

/// Configuration for the preview server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Directory with built sites
    pub output_dir: PathBuf,

    /// Files or directories that trigger a rebuild
    pub watch_paths: Vec<PathBuf>,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,

    /// Escaping used by the generate API until a rebuild changes it
    pub escaping: Escaping,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dist"),
            watch_paths: vec![PathBuf::from("sitesmith.toml")],
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: true,
            escaping: Escaping::None,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),
}

/// Shared server state.
struct ServerState {
    config: DevServerConfig,
    escaping: RwLock<Escaping>,
    hub: ReloadHub,
    rebuilder: Option<Arc<dyn SiteRebuilder>>,
}

impl ServerState {
    fn new(config: DevServerConfig, rebuilder: Option<Arc<dyn SiteRebuilder>>) -> Self {
        Self {
            escaping: RwLock::new(config.escaping),
            config,
            hub: ReloadHub::new(),
            rebuilder,
        }
    }

    fn escaping(&self) -> Escaping {
        match self.escaping.read() {
            Ok(escaping) => *escaping,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_escaping(&self, escaping: Escaping) {
        match self.escaping.write() {
            Ok(mut current) => *current = escaping,
            Err(poisoned) => *poisoned.into_inner() = escaping,
        }
    }
}

/// Preview server with a generation API and live reload.
pub struct DevServer {
    config: DevServerConfig,
    rebuilder: Option<Arc<dyn SiteRebuilder>>,
}

impl DevServer {
    /// Create a new preview server.
    pub fn new(config: DevServerConfig) -> Self {
        Self {
            config,
            rebuilder: None,
        }
    }

    /// Rebuild with `rebuilder` whenever a watched path changes.
    pub fn with_rebuilder(mut self, rebuilder: impl SiteRebuilder) -> Self {
        self.rebuilder = Some(Arc::new(rebuilder));
        self
    }

    /// Build the router without binding or watching.
    pub fn router(&self) -> Router {
        app(Arc::new(self.state()))
    }

    fn state(&self) -> ServerState {
        ServerState::new(self.config.clone(), self.rebuilder.clone())
    }

    /// Start the preview server.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ServerError::InvalidAddress(e.to_string()))?;

        let state = Arc::new(self.state());

        let (watcher, mut rx) = FileWatcher::new(&self.config.watch_paths)
            .map_err(|e| ServerError::WatchError(e.to_string()))?;

        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = app(state);

        tracing::info!("Starting preview server at http://{}", addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

fn app(state: Arc<ServerState>) -> Router {
    let api = Router::new()
        .route("/types", get(types_handler))
        .route("/generate", get(generate_query_handler).post(generate_json_handler))
        .layer(CorsLayer::permissive());

    let output_dir = state.config.output_dir.clone();

    Router::new()
        .nest("/api", api)
        .route(RELOAD_PATH, get(ws_handler))
        .route("/__reload.js", get(reload_script_handler))
        .fallback_service(ServeDir::new(output_dir))
        .with_state(state)
}

/// Rebuild after a change, then tell clients to reload.
async fn handle_watch_event(state: &Arc<ServerState>, event: WatchEvent) {
    tracing::info!("Changed: {}", event.path().display());

    if let Some(rebuilder) = state.rebuilder.clone() {
        let rebuild = move || rebuilder.rebuild().map(|()| rebuilder.escaping());

        match tokio::task::spawn_blocking(rebuild).await {
            Ok(Ok(escaping)) => {
                if let Some(escaping) = escaping {
                    state.set_escaping(escaping);
                }
                tracing::info!("Rebuilt sites");
            }
            Ok(Err(e)) => {
                tracing::warn!("Rebuild failed: {}", e);
                return;
            }
            Err(e) => {
                tracing::warn!("Rebuild task failed: {}", e);
                return;
            }
        }
    }

    state.hub.send(ReloadMessage::Reload);
}

/// Handler listing the website type allow-list.
async fn types_handler() -> Json<Vec<&'static str>> {
    Json(ALLOWED_WEBSITE_TYPES.to_vec())
}

/// Handler generating a site from query parameters.
async fn generate_query_handler(
    State(state): State<Arc<ServerState>>,
    Query(request): Query<WebsiteRequest>,
) -> Html<String> {
    Html(request.generate_with(state.escaping()))
}

/// Handler generating a site from a JSON body.
async fn generate_json_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<WebsiteRequest>,
) -> Html<String> {
    Html(request.generate_with(state.escaping()))
}

/// Handler for the live reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.hub.subscribe();

    if send_message(&mut socket, &ReloadMessage::Connected).await.is_err() {
        return;
    }

    while let Ok(msg) = rx.recv().await {
        if send_message(&mut socket, &msg).await.is_err() {
            break;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}

/// Handler for the live reload client script.
async fn reload_script_handler() -> impl IntoResponse {
    let script = reload_client_script(RELOAD_PATH);
    ([("content-type", "application/javascript")], script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tempfile::tempdir;
    use tower::ServiceExt;

    struct CountingRebuilder(std::sync::atomic::AtomicUsize);

    impl SiteRebuilder for Arc<CountingRebuilder> {
        fn rebuild(&self) -> Result<(), String> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingRebuilder;

    impl SiteRebuilder for FailingRebuilder {
        fn rebuild(&self) -> Result<(), String> {
            Err("broken config".to_string())
        }
    }

    struct EscapingRebuilder;

    impl SiteRebuilder for EscapingRebuilder {
        fn rebuild(&self) -> Result<(), String> {
            Ok(())
        }

        fn escaping(&self) -> Option<Escaping> {
            Some(Escaping::Html)
        }
    }

    fn test_state(rebuilder: Option<Arc<dyn SiteRebuilder>>) -> Arc<ServerState> {
        Arc::new(ServerState::new(DevServerConfig::default(), rebuilder))
    }

    #[test]
    fn creates_server_with_default_config() {
        let server = DevServer::new(DevServerConfig::default());
        assert_eq!(server.config.port, 7777);
        assert!(server.rebuilder.is_none());
        let _router = server.router();
    }

    #[tokio::test]
    async fn lists_allowed_types() {
        let Json(types) = types_handler().await;
        assert_eq!(types, vec!["portfolio", "saas", "restaurant", "ecommerce"]);
    }

    #[tokio::test]
    async fn generates_from_query() {
        let state = test_state(None);
        let request = WebsiteRequest::new("Nova Studio", "", "");

        let Html(html) = generate_query_handler(State(state), Query(request)).await;

        assert!(html.contains("<h1>Nova Studio</h1>"));
        assert!(html.contains("Welcome to our business"));
    }

    #[tokio::test]
    async fn generates_from_json_with_configured_escaping() {
        let state = Arc::new(ServerState::new(
            DevServerConfig {
                escaping: Escaping::Html,
                ..Default::default()
            },
            None,
        ));
        let request = WebsiteRequest::new("<b>Acme</b>", "blog", "");

        let Html(html) = generate_json_handler(State(state), Json(request)).await;

        assert!(html.contains("<h1>&lt;b&gt;Acme"));
        assert!(html.contains("Welcome to our blog"));
    }

    #[tokio::test]
    async fn rebuilds_then_reloads_on_change() {
        let counter = Arc::new(CountingRebuilder(Default::default()));
        let state = test_state(Some(Arc::new(Arc::clone(&counter))));
        let mut rx = state.hub.subscribe();

        handle_watch_event(&state, WatchEvent::Modified(PathBuf::from("sitesmith.toml"))).await;

        assert_eq!(counter.0.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(rx.try_recv().unwrap(), ReloadMessage::Reload);
    }

    #[tokio::test]
    async fn rebuild_updates_api_escaping() {
        let state = test_state(Some(Arc::new(EscapingRebuilder)));
        let request = WebsiteRequest::new("<b>Acme</b>", "", "");

        let Html(before) =
            generate_query_handler(State(Arc::clone(&state)), Query(request.clone())).await;
        assert!(before.contains("<h1><b>Acme</b></h1>"));

        handle_watch_event(&state, WatchEvent::Modified(PathBuf::from("sitesmith.toml"))).await;

        let Html(after) = generate_query_handler(State(state), Query(request)).await;
        assert!(after.contains("<h1>&lt;b&gt;Acme"));
    }

    #[tokio::test]
    async fn failed_rebuild_skips_reload() {
        let state = test_state(Some(Arc::new(FailingRebuilder)));
        let mut rx = state.hub.subscribe();

        handle_watch_event(&state, WatchEvent::Modified(PathBuf::from("sitesmith.toml"))).await;

        assert!(rx.try_recv().is_err());
    }

    async fn send_get(router: Router, uri: &str) -> (StatusCode, header::HeaderMap, String) {
        let request = Request::builder()
            .uri(uri)
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn router_serves_type_list() {
        let router = DevServer::new(DevServerConfig::default()).router();

        let (status, headers, body) = send_get(router, "/api/types").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"["portfolio","saas","restaurant","ecommerce"]"#);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn router_generates_with_missing_params() {
        let router = DevServer::new(DevServerConfig::default()).router();

        let (status, headers, body) =
            send_get(router, "/api/generate?business_name=Nova%20Studio").await;

        assert_eq!(status, StatusCode::OK);
        assert!(headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert!(body.contains("<h1>Nova Studio</h1>"));
        assert!(body.contains("Welcome to our business"));
        assert!(body.contains("contact@novastudio.com"));
    }

    #[tokio::test]
    async fn router_generates_from_json_body() {
        let router = DevServer::new(DevServerConfig::default()).router();

        let request = Request::builder()
            .method("POST")
            .uri("/api/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"business_name":"Blue Fin","website_type":"restaurant"}"#))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Welcome to our restaurant"));
    }

    #[tokio::test]
    async fn router_serves_reload_script() {
        let router = DevServer::new(DevServerConfig::default()).router();

        let (status, headers, body) = send_get(router, "/__reload.js").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "application/javascript");
        assert!(body.contains(RELOAD_PATH));
    }

    #[tokio::test]
    async fn router_falls_back_to_output_dir() {
        let temp = tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("nova")).unwrap();
        std::fs::write(temp.path().join("nova/index.html"), "<h1>Nova</h1>").unwrap();

        let router = DevServer::new(DevServerConfig {
            output_dir: temp.path().to_path_buf(),
            ..Default::default()
        })
        .router();

        let (status, _, body) = send_get(router.clone(), "/nova/index.html").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>Nova</h1>");

        let (status, _, _) = send_get(router, "/missing/index.html").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
