//! Integration tests for the chunked `/api/stream` endpoint.

mod common;

use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::StatusCode;
use common::{body_bytes, build_test_app, build_test_state, get, known_directory};
use userdir_core::stream::demo_text;

// ---------------------------------------------------------------------------
// Test: the stream is plain text with no content length
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stream_is_plain_text_without_length() {
    let app = build_test_app(build_test_state(known_directory()));
    let response = get(app, "/api/stream").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "text/plain; charset=utf-8"
    );
    assert!(response.headers().get(CONTENT_LENGTH).is_none());
}

// ---------------------------------------------------------------------------
// Test: the chunks reassemble to the full demo text
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stream_body_is_full_demo_text() {
    let app = build_test_app(build_test_state(known_directory()));
    let response = get(app, "/api/stream").await;

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(body, demo_text());
}
