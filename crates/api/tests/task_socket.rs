//! End-to-end tests for the task WebSocket over a real TCP listener.

mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use common::{build_test_backend, build_test_state, known_directory, serve};
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use userdir_core::tasks::{parse_server_message, ServerMessage, TaskStatus};

type Socket =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect() -> Socket {
    connect_to(serve(build_test_state(known_directory())).await).await
}

async fn connect_to(addr: std::net::SocketAddr) -> Socket {
    let (socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/api/ws"))
        .await
        .expect("websocket handshake");
    socket
}

async fn next_frame(socket: &mut Socket) -> ServerMessage {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("frame should arrive")
            .expect("socket open")
            .expect("valid frame");
        if let Message::Text(text) = msg {
            return parse_server_message(&text).expect("known server frame");
        }
    }
}

// ---------------------------------------------------------------------------
// Test: dispatch is acknowledged, then completed on the same socket
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dispatch_is_accepted_then_completed() {
    let mut socket = connect().await;

    socket
        .send(Message::Text(r#"{"type":"dispatch_task","taskId":4}"#.into()))
        .await
        .unwrap();

    match next_frame(&mut socket).await {
        ServerMessage::TaskAccepted(ack) => {
            assert_eq!(ack.task_id, 4);
            assert_eq!(ack.status, TaskStatus::Pending);
        }
        other => panic!("expected task_accepted, got {other:?}"),
    }

    match next_frame(&mut socket).await {
        ServerMessage::TaskResult(completion) => assert_eq!(completion.task_id, 4),
        other => panic!("expected task_result, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: unknown frames get an error reply and the socket stays usable
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_frame_gets_error_reply() {
    let mut socket = connect().await;

    socket
        .send(Message::Text(r#"{"type":"cancel_task","taskId":4}"#.into()))
        .await
        .unwrap();
    assert_matches!(
        next_frame(&mut socket).await,
        ServerMessage::Error { task_id: None, .. }
    );

    socket
        .send(Message::Text(r#"{"type":"dispatch_task","taskId":2}"#.into()))
        .await
        .unwrap();
    assert_matches!(
        next_frame(&mut socket).await,
        ServerMessage::TaskAccepted(ack) if ack.task_id == 2
    );
}

// ---------------------------------------------------------------------------
// Test: task 0 is rejected on the socket like it is over REST
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dispatch_of_task_zero_is_rejected() {
    let mut socket = connect().await;

    socket
        .send(Message::Text(r#"{"type":"dispatch_task","taskId":0}"#.into()))
        .await
        .unwrap();
    assert_matches!(
        next_frame(&mut socket).await,
        ServerMessage::Error { task_id: Some(0), message } if message == "task id must be positive"
    );

    // Nothing was queued, so the next frame is the ack for a real dispatch.
    socket
        .send(Message::Text(r#"{"type":"dispatch_task","taskId":5}"#.into()))
        .await
        .unwrap();
    assert_matches!(
        next_frame(&mut socket).await,
        ServerMessage::TaskAccepted(ack) if ack.task_id == 5
    );
}

// ---------------------------------------------------------------------------
// Test: stopping the task services closes sockets that outlive the server
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stop_closes_open_sockets_and_drains_router() {
    let (state, services) = build_test_backend(known_directory());
    let mut socket = connect_to(serve(state).await).await;

    socket
        .send(Message::Text(r#"{"type":"dispatch_task","taskId":4}"#.into()))
        .await
        .unwrap();
    assert_matches!(next_frame(&mut socket).await, ServerMessage::TaskAccepted(_));

    // The connected socket still holds a state clone while this runs.
    let drained = tokio::time::timeout(Duration::from_secs(2), services.stop())
        .await
        .expect("stop should finish well inside its grace period");
    assert!(drained);

    tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(msg) = socket.next().await {
            if matches!(msg, Ok(Message::Close(_)) | Err(_)) {
                break;
            }
        }
    })
    .await
    .expect("server should close the socket");
}
