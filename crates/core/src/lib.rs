//! Domain building blocks for the user directory.
//!
//! Everything here is free of I/O so both the reference backend and the
//! client library can share it: filter semantics, page slicing, the seeded
//! demo dataset, viewport windowing, and the task wire protocol.

pub mod dataset;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod stream;
pub mod tasks;
pub mod types;
pub mod user;
pub mod windowing;
