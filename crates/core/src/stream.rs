//! Text source for the chunked streaming demo.

/// Characters per chunk written by the streaming endpoint.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// Pause between chunks, in milliseconds.
pub const DEFAULT_CHUNK_INTERVAL_MS: u64 = 30;

const BANNER: &str = "Streaming data from the directory backend... ";

const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ";

const LOREM_REPEAT: usize = 50;

/// The full text the streaming endpoint sends.
pub fn demo_text() -> String {
    let mut text = String::with_capacity(BANNER.len() + LOREM.len() * LOREM_REPEAT);
    text.push_str(BANNER);
    for _ in 0..LOREM_REPEAT {
        text.push_str(LOREM);
    }
    text
}

/// Split `text` into chunks of at most `chunk_size` characters.
///
/// Splits on character boundaries so every chunk is valid UTF-8. A zero
/// chunk size is treated as one.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let size = chunk_size.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}
