//! Chunked plain-text streaming demo.

use std::convert::Infallible;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use futures::StreamExt;
use userdir_core::stream::{chunk_text, demo_text};

use crate::state::AppState;

/// GET /api/stream
///
/// Writes the demo text in fixed-size chunks with a pause before each one.
/// No content length is set, so the body goes out chunked.
pub async fn stream_text(State(state): State<AppState>) -> impl IntoResponse {
    let chunks = chunk_text(&demo_text(), state.config.stream_chunk_size);
    let interval = Duration::from_millis(state.config.stream_interval_ms);
    tracing::debug!(chunks = chunks.len(), "Starting text stream");

    let body = futures::stream::iter(chunks).then(move |chunk| async move {
        tokio::time::sleep(interval).await;
        Ok::<_, Infallible>(chunk)
    });

    (
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(body),
    )
}
