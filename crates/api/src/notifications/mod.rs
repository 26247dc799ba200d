//! Completion delivery.
//!
//! The [`CompletionRouter`] subscribes to the event bus and pushes each
//! `task_result` frame to the socket that dispatched the task.

pub mod router;

pub use router::CompletionRouter;
