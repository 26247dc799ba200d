//! Client side of the member directory.
//!
//! [`controller::PaginationController`] keeps an accumulated, filterable
//! result set in step with a backend [`service::QueryService`];
//! [`directory::DirectoryView`] couples it to viewport windowing so the next
//! page is fetched exactly when the view reaches the end of the list.
//!
//! Adapters: [`http::DirectoryApi`] (HTTP), [`socket::SocketDispatcher`]
//! (task socket), and [`local`] in-process stand-ins for both services.

pub mod config;
pub mod controller;
pub mod directory;
pub mod error;
pub mod http;
pub mod local;
pub mod reconnect;
pub mod service;
pub mod socket;
pub mod task_board;
pub mod terminal;
