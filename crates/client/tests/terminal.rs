//! Paced reveal of a chunked text stream.

use std::time::Duration;

use futures::stream;
use userdir_client::error::ClientError;
use userdir_client::terminal::{StreamTerminal, TerminalConfig, TerminalPhase};

fn fast() -> TerminalConfig {
    TerminalConfig {
        tick: Duration::from_millis(1),
        chars_per_tick: 3,
    }
}

// ---------------------------------------------------------------------------
// Test: every character is revealed, including one split across chunks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reveals_full_text_and_finishes() {
    let text = "Hello, wörld! Streaming text arrives in pieces.";
    let bytes = text.as_bytes();
    // Split inside the two-byte 'ö' (bytes 8..10).
    let chunks: Vec<Result<Vec<u8>, ClientError>> = vec![
        Ok(bytes[..9].to_vec()),
        Ok(bytes[9..20].to_vec()),
        Ok(bytes[20..].to_vec()),
    ];

    let (terminal, updates) = StreamTerminal::new(fast());
    assert_eq!(updates.borrow().phase, TerminalPhase::Idle);

    let finished = terminal.run(stream::iter(chunks)).await;

    assert_eq!(finished.text, text);
    assert_eq!(finished.chunks, 3);
    assert_eq!(finished.progress, 100);
    assert_eq!(finished.phase, TerminalPhase::Finished);
    assert_eq!(*updates.borrow(), finished);
}

// ---------------------------------------------------------------------------
// Test: progress stays below 100 until the input ends
// ---------------------------------------------------------------------------

#[tokio::test]
async fn progress_is_capped_while_streaming() {
    let chunks: Vec<Result<Vec<u8>, ClientError>> =
        (0..50).map(|_| Ok(b"ab".to_vec())).collect();

    let (terminal, mut updates) = StreamTerminal::new(TerminalConfig {
        tick: Duration::from_millis(1),
        chars_per_tick: 1,
    });

    let watcher = tokio::spawn(async move {
        let mut max_while_streaming = 0;
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if state.phase == TerminalPhase::Finished {
                break;
            }
            max_while_streaming = max_while_streaming.max(state.progress);
        }
        max_while_streaming
    });

    let finished = terminal.run(stream::iter(chunks)).await;
    assert_eq!(finished.text.len(), 100);
    assert_eq!(finished.progress, 100);

    let max_while_streaming = watcher.await.unwrap();
    assert!(max_while_streaming <= 99);
}

// ---------------------------------------------------------------------------
// Test: a stream error ends the input but keeps what arrived
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stream_error_ends_input() {
    let chunks: Vec<Result<Vec<u8>, ClientError>> = vec![
        Ok(b"partial ".to_vec()),
        Err(ClientError::Transport("connection reset".into())),
        Ok(b"never shown".to_vec()),
    ];

    let (terminal, _updates) = StreamTerminal::new(fast());
    let finished = terminal.run(stream::iter(chunks)).await;

    assert_eq!(finished.text, "partial ");
    assert_eq!(finished.chunks, 1);
    assert_eq!(finished.phase, TerminalPhase::Finished);
}
