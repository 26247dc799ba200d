//! UserDirectory reference backend library.
//!
//! Exposes the core building blocks (config, state, error handling, routes,
//! WebSocket infrastructure, task engine) so integration tests and the
//! binary entrypoint can both access them.

pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod notifications;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
