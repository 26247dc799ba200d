//! Streaming terminal: a chunked text stream revealed at a steady pace.
//!
//! Incoming chunks are decoded into a character queue as fast as they
//! arrive. A fixed-rate ticker drains at most `chars_per_tick` characters per
//! tick into the display buffer, so the reveal rate does not depend on the
//! network. Observers follow progress through a [`watch`] channel.

use std::collections::VecDeque;
use std::time::Duration;

use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio::sync::watch;

use crate::error::ClientError;

/// Progress added per received chunk, before input ends.
const PROGRESS_PER_CHUNK: u8 = 3;

/// Progress ceiling while input is still arriving.
const PROGRESS_CAP: u8 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalPhase {
    Idle,
    Streaming,
    Finished,
}

/// What the terminal currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalState {
    /// Characters revealed so far.
    pub text: String,
    /// 0..=100.
    pub progress: u8,
    pub phase: TerminalPhase,
    /// Chunks received.
    pub chunks: usize,
}

impl Default for TerminalState {
    fn default() -> Self {
        Self {
            text: String::new(),
            progress: 0,
            phase: TerminalPhase::Idle,
            chunks: 0,
        }
    }
}

/// Pace of the reveal.
#[derive(Debug, Clone, Copy)]
pub struct TerminalConfig {
    pub tick: Duration,
    pub chars_per_tick: usize,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(16),
            chars_per_tick: 4,
        }
    }
}

/// Drives one stream into a [`TerminalState`].
pub struct StreamTerminal {
    config: TerminalConfig,
    state: watch::Sender<TerminalState>,
}

impl StreamTerminal {
    /// Create a terminal and a receiver that observes every update.
    pub fn new(config: TerminalConfig) -> (Self, watch::Receiver<TerminalState>) {
        let (state, rx) = watch::channel(TerminalState::default());
        (Self { config, state }, rx)
    }

    /// Consume `input` until it ends and every character is revealed.
    ///
    /// A stream error is logged and treated as end of input.
    pub async fn run<S, B>(&self, mut input: S) -> TerminalState
    where
        S: Stream<Item = Result<B, ClientError>> + Unpin,
        B: AsRef<[u8]>,
    {
        let mut decoder = Utf8Decoder::default();
        let mut queue: VecDeque<char> = VecDeque::new();
        let mut input_done = false;
        let mut ticker = tokio::time::interval(self.config.tick.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        self.state.send_modify(|s| {
            *s = TerminalState {
                phase: TerminalPhase::Streaming,
                ..TerminalState::default()
            }
        });
        tracing::debug!("Terminal stream started");

        loop {
            tokio::select! {
                chunk = input.next(), if !input_done => match chunk {
                    Some(Ok(bytes)) => {
                        decoder.push(bytes.as_ref(), &mut queue);
                        self.state.send_modify(|s| {
                            s.chunks += 1;
                            s.progress = s.progress.saturating_add(PROGRESS_PER_CHUNK).min(PROGRESS_CAP);
                        });
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Stream failed, treating as end of input");
                        decoder.finish(&mut queue);
                        input_done = true;
                    }
                    None => {
                        decoder.finish(&mut queue);
                        input_done = true;
                    }
                },
                _ = ticker.tick() => {
                    let take = self.config.chars_per_tick.max(1).min(queue.len());
                    if take > 0 {
                        let revealed: String = queue.drain(..take).collect();
                        self.state.send_modify(|s| s.text.push_str(&revealed));
                    }
                    if input_done && queue.is_empty() {
                        break;
                    }
                }
            }
        }

        self.state.send_modify(|s| {
            s.progress = 100;
            s.phase = TerminalPhase::Finished;
        });
        let finished = self.state.borrow().clone();
        tracing::debug!(chars = finished.text.chars().count(), chunks = finished.chunks, "Terminal stream finished");
        finished
    }
}

/// Incremental UTF-8 decoder that carries split sequences across chunks.
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn push(&mut self, bytes: &[u8], out: &mut VecDeque<char>) {
        self.pending.extend_from_slice(bytes);
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.extend(text.chars());
                    self.pending.clear();
                    return;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.extend(
                        std::str::from_utf8(&self.pending[..valid])
                            .unwrap_or_default()
                            .chars(),
                    );
                    match e.error_len() {
                        Some(bad) => {
                            out.push_back(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more.
                            self.pending.drain(..valid);
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Flush a sequence the input never completed.
    fn finish(&mut self, out: &mut VecDeque<char>) {
        if !self.pending.is_empty() {
            out.push_back(char::REPLACEMENT_CHARACTER);
            self.pending.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(chunks: &[&[u8]]) -> String {
        let mut decoder = Utf8Decoder::default();
        let mut out = VecDeque::new();
        for chunk in chunks {
            decoder.push(chunk, &mut out);
        }
        decoder.finish(&mut out);
        out.into_iter().collect()
    }

    #[test]
    fn split_multibyte_sequence_is_reassembled() {
        let bytes = "wörld".as_bytes();
        // 'ö' is two bytes at 1..3; split between them.
        assert_eq!(decode(&[&bytes[..2], &bytes[2..]]), "wörld");
    }

    #[test]
    fn invalid_bytes_become_replacement_characters() {
        assert_eq!(decode(&[&b"a\xFFb"[..]]), "a\u{FFFD}b");
    }

    #[test]
    fn truncated_sequence_at_end_is_flagged() {
        let euro = "€".as_bytes();
        assert_eq!(decode(&[&b"x"[..], &euro[..2]]), "x\u{FFFD}");
    }
}
