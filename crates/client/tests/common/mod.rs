#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use userdir_api::config::ServerConfig;
use userdir_api::engine::TaskServices;
use userdir_api::router::build_app_router;
use userdir_api::state::AppState;
use userdir_api::ws::WsManager;
use userdir_client::error::ClientError;
use userdir_client::local::LocalDirectory;
use userdir_client::service::QueryService;
use userdir_core::dataset::UserDirectory;
use userdir_core::filter::FilterCriteria;
use userdir_core::pagination::ResultPage;
use userdir_core::user::User;

/// A hand-written member.
pub fn member(id: u32, first: &str, last: &str, age: u32, nationality: &str) -> User {
    User {
        id: format!("user-{id}"),
        avatar: format!("https://picsum.photos/seed/{id}/200"),
        first_name: first.to_string(),
        last_name: last.to_string(),
        age,
        nationality: nationality.to_string(),
        hobbies: Vec::new(),
    }
}

/// 500 members, exactly three of whom match the search "john".
pub fn directory_with_three_johns() -> UserDirectory {
    let mut users: Vec<User> = (1..=497)
        .map(|i| member(i, "Ada", &format!("Member{i}"), 30, "British"))
        .collect();
    users.push(member(498, "John", "Smith", 25, "American"));
    users.push(member(499, "Johnny", "Cash", 70, "American"));
    users.push(member(500, "Elton", "Johnson", 60, "British"));
    UserDirectory::new(users)
}

// ---------------------------------------------------------------------------
// Scripted service: every call waits for the test to answer it
// ---------------------------------------------------------------------------

type Reply = Result<ResultPage<User>, ClientError>;

/// A query the controller made, waiting for its response.
pub struct PendingCall {
    pub criteria: FilterCriteria,
    pub page: u32,
    reply: oneshot::Sender<Reply>,
}

impl PendingCall {
    /// Answer from `directory` as a real backend would.
    pub fn answer(self, directory: &UserDirectory) {
        let page = directory.query(&self.criteria, self.page);
        self.respond(Ok(page));
    }

    pub fn respond(self, reply: Reply) {
        let _ = self.reply.send(reply);
    }
}

/// [`QueryService`] that hands every call to the test through a channel.
pub struct ScriptedService {
    calls: mpsc::UnboundedSender<PendingCall>,
}

impl ScriptedService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PendingCall>) {
        let (calls, rx) = mpsc::unbounded_channel();
        (Self { calls }, rx)
    }
}

#[async_trait]
impl QueryService for ScriptedService {
    type Record = User;

    async fn query(&self, criteria: &FilterCriteria, page: u32) -> Reply {
        let (reply, rx) = oneshot::channel();
        self.calls
            .send(PendingCall {
                criteria: criteria.clone(),
                page,
                reply,
            })
            .map_err(|_| ClientError::Transport("script closed".into()))?;
        rx.await
            .map_err(|_| ClientError::Transport("call was never answered".into()))?
    }
}

// ---------------------------------------------------------------------------
// Counting service: local answers, call count, optional failures
// ---------------------------------------------------------------------------

/// [`LocalDirectory`] that counts calls and fails every call from the
/// `fail_after`-th onwards (0-based).
pub struct CountingDirectory {
    inner: LocalDirectory,
    calls: AtomicUsize,
    fail_after: AtomicUsize,
}

impl CountingDirectory {
    pub fn new(directory: UserDirectory) -> Arc<Self> {
        Arc::new(Self {
            inner: LocalDirectory::new(directory),
            calls: AtomicUsize::new(0),
            fail_after: AtomicUsize::new(usize::MAX),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_after(&self, call: usize) {
        self.fail_after.store(call, Ordering::SeqCst);
    }

    pub fn fail_always(&self) {
        self.fail_after(0);
    }

    pub fn recover(&self) {
        self.fail_after(usize::MAX);
    }
}

#[async_trait]
impl QueryService for CountingDirectory {
    type Record = User;

    async fn query(&self, criteria: &FilterCriteria, page: u32) -> Reply {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call >= self.fail_after.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("connection refused".into()));
        }
        self.inner.query(criteria, page).await
    }
}

// ---------------------------------------------------------------------------
// Live backend
// ---------------------------------------------------------------------------

/// Serve the real backend around `directory` on an ephemeral port.
///
/// Tasks complete after 20 ms. Must be called inside a Tokio runtime.
pub async fn spawn_backend(directory: UserDirectory) -> SocketAddr {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: Vec::new(),
        request_timeout_secs: 30,
        dataset_size: directory.len(),
        dataset_seed: 1,
        task_delay_ms: 20,
        stream_chunk_size: 16,
        stream_interval_ms: 1,
    };

    let ws_manager = Arc::new(WsManager::new());
    let services = TaskServices::start(
        Arc::clone(&ws_manager),
        Duration::from_millis(config.task_delay_ms),
        CancellationToken::new(),
    );

    let app = build_app_router(
        AppState {
            directory: Arc::new(directory),
            config: Arc::new(config.clone()),
            ws_manager,
            task_queue: services.queue(),
        },
        &config,
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
