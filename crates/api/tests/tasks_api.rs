//! Integration tests for REST task dispatch.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, build_test_backend, build_test_state, get, known_directory, post,
};
use userdir_core::tasks::RESULT_TEXTS;

// ---------------------------------------------------------------------------
// Test: dispatch answers 202 with a pending acknowledgement
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dispatch_returns_accepted() {
    let app = build_test_app(build_test_state(known_directory()));
    let response = post(app, "/api/tasks/3/dispatch").await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["taskId"], 3);
    assert_eq!(json["data"]["status"], "pending");
}

// ---------------------------------------------------------------------------
// Test: a REST dispatch completes without an originating socket
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dispatched_task_completes_on_event_bus() {
    let (state, services) = build_test_backend(known_directory());
    let mut events = services.subscribe();

    let response = post(build_test_app(state), "/api/tasks/11/dispatch").await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("completion should arrive")
        .unwrap();
    assert_eq!(event.completion.task_id, 11);
    assert!(event.origin.is_none());
    assert!(RESULT_TEXTS.contains(&event.completion.result.as_str()));
}

// ---------------------------------------------------------------------------
// Test: invalid ids are rejected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_task_ids_return_400() {
    let state = build_test_state(known_directory());

    let response = post(build_test_app(state.clone()), "/api/tasks/0/dispatch").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");

    let response = post(build_test_app(state), "/api/tasks/abc/dispatch").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: dispatch is POST-only
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_dispatch_is_method_not_allowed() {
    let app = build_test_app(build_test_state(known_directory()));
    let response = get(app, "/api/tasks/3/dispatch").await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
