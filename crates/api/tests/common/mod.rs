#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use userdir_api::config::ServerConfig;
use userdir_api::engine::TaskServices;
use userdir_api::router::build_app_router;
use userdir_api::state::AppState;
use userdir_api::ws::WsManager;
use userdir_core::dataset::UserDirectory;
use userdir_core::user::User;

/// Build a test `ServerConfig` with safe defaults.
///
/// Tasks complete after 20 ms and the stream has no meaningful pause, so
/// tests stay fast.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        dataset_size: 60,
        dataset_seed: 7,
        task_delay_ms: 20,
        stream_chunk_size: 64,
        stream_interval_ms: 1,
    }
}

/// A hand-written member.
pub fn member(id: u32, first: &str, last: &str, age: u32, nationality: &str, hobbies: &[&str]) -> User {
    User {
        id: format!("user-{id}"),
        avatar: format!("https://i.pravatar.cc/150?u=user-{id}"),
        first_name: first.to_string(),
        last_name: last.to_string(),
        age,
        nationality: nationality.to_string(),
        hobbies: hobbies.iter().map(|h| h.to_string()).collect(),
    }
}

/// Six known members for filter assertions.
pub fn known_directory() -> UserDirectory {
    UserDirectory::new(vec![
        member(1, "Ada", "Lovelace", 36, "British", &["Chess", "Reading"]),
        member(2, "Alan", "Turing", 41, "British", &["Running"]),
        member(3, "Grace", "Hopper", 85, "American", &["Chess"]),
        member(4, "John", "Smith", 25, "American", &[]),
        member(5, "Johnny", "Cash", 70, "American", &["Music"]),
        member(6, "Marie", "Curie", 66, "French", &["Reading", "Gardening"]),
    ])
}

/// Build `AppState` around `directory` and start the task services that
/// feed it. Must be called inside a Tokio runtime.
pub fn build_test_backend(directory: UserDirectory) -> (AppState, TaskServices) {
    let config = test_config();
    let ws_manager = Arc::new(WsManager::new());
    let services = TaskServices::start(
        Arc::clone(&ws_manager),
        Duration::from_millis(config.task_delay_ms),
        CancellationToken::new(),
    );

    let state = AppState {
        directory: Arc::new(directory),
        config: Arc::new(config),
        ws_manager,
        task_queue: services.queue(),
    };
    (state, services)
}

/// [`build_test_backend`] for tests that never stop the services.
pub fn build_test_state(directory: UserDirectory) -> AppState {
    build_test_backend(directory).0
}

/// Build the full application router with all middleware layers.
///
/// Uses the same builder as `main.rs` so tests exercise the production
/// middleware stack.
pub fn build_test_app(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

/// Serve the app on an ephemeral local port and return its address.
pub async fn serve(state: AppState) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_test_app(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri).await
}

pub async fn post(app: Router, uri: &str) -> Response {
    send(app, Method::POST, uri).await
}

async fn send(app: Router, method: Method, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
