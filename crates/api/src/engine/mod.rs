//! Simulated task execution engine.
//!
//! Dispatched tasks are queued to a single background [`TaskWorker`], which
//! completes each one after a fixed delay and publishes a [`TaskEvent`] on
//! the event bus. [`TaskServices`] owns the worker, the bus and the
//! completion router for the life of the server.

pub mod services;
pub mod worker;

pub use services::TaskServices;
pub use worker::{TaskEvent, TaskJob, TaskQueue, TaskWorker};
