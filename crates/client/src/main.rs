//! Command-line walk through the directory backend.
//!
//! Loads the first screen of members, scrolls to the bottom of the list,
//! runs the task board over the task socket and replays the text stream.
//! Connection settings come from `USERDIR_*` environment variables.

use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use userdir_client::config::ClientConfig;
use userdir_client::directory::{DirectoryView, ViewConfig};
use userdir_client::http::DirectoryApi;
use userdir_client::service::DispatchService;
use userdir_client::socket::SocketDispatcher;
use userdir_client::task_board::TaskBoard;
use userdir_client::terminal::{StreamTerminal, TerminalConfig};
use userdir_core::filter::FilterCriteria;
use userdir_core::tasks::{TaskStatus, DEFAULT_TASK_DELAY_MS};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "userdir_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(api_url = %config.api_url, ws_url = %config.ws_url, "Loaded client configuration");

    // --- Directory ---
    let api = DirectoryApi::from_config(&config)?;
    let facets = api.facets().await.context("Failed to load facets")?;
    tracing::info!(
        nationalities = facets.nationalities.len(),
        hobbies = facets.hobbies.len(),
        "Loaded filter options",
    );

    let search = std::env::args().nth(1).unwrap_or_default();
    let mut view = DirectoryView::new(api, ViewConfig::default());
    let mut frame = view
        .apply_filters(FilterCriteria::default().with_search(search))
        .await
        .context("Initial load failed")?;
    tracing::info!(
        loaded = frame.snapshot.records.len(),
        total = frame.snapshot.total_matching,
        rendered_rows = frame.rows.len(),
        "First screen",
    );

    while !frame.snapshot.is_exhausted() {
        let before = frame.snapshot.records.len();
        frame = view.scroll_to(frame.window.total_height).await;
        tracing::info!(loaded = frame.snapshot.records.len(), total = frame.snapshot.total_matching, "Scrolled to bottom");
        if frame.snapshot.records.len() == before {
            if let Some(e) = &frame.snapshot.soft_error {
                tracing::warn!(error = %e, "Stopped scrolling after a failed page");
            }
            break;
        }
    }

    // --- Task board ---
    let dispatcher = SocketDispatcher::connect(&config)
        .await
        .context("Failed to open the task socket")?;
    let mut completions = dispatcher.subscribe();
    let mut board = TaskBoard::default();
    let failures = board.dispatch_all(&dispatcher).await;
    if !failures.is_empty() {
        tracing::warn!(failed = failures.len(), "Some tasks could not be dispatched");
    }
    board
        .await_completions(
            &mut completions,
            Duration::from_millis(DEFAULT_TASK_DELAY_MS * 3),
        )
        .await;
    tracing::info!(
        completed = board.count(TaskStatus::Completed),
        pending = board.count(TaskStatus::Pending),
        "Task board settled",
    );
    dispatcher.shutdown().await;

    // --- Stream ---
    let stream_api = DirectoryApi::from_config(&config)?;
    let input = stream_api.open_stream().await.context("Failed to open the stream")?;
    let (terminal, _updates) = StreamTerminal::new(TerminalConfig::default());
    let finished = terminal.run(input).await;
    println!("{}", finished.text);

    Ok(())
}
