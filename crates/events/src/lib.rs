//! In-process event fan-out.
//!
//! [`EventBus`] is a publish/subscribe hub backed by
//! `tokio::sync::broadcast`. The backend uses it to hand task completions
//! from the worker to the WebSocket router; the client dispatch adapters use
//! it to deliver completions to every registered listener.

pub mod bus;

pub use bus::EventBus;
