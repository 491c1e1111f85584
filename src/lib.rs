//! userdesk - user records over a key-value table
//!
//! Create, list, read and delete users through one handler that takes an
//! explicit request and returns a uniform response envelope.

pub mod api;
pub mod cli;
pub mod config;
pub mod http_server;
pub mod logging;
pub mod store;
pub mod user;
pub mod validation;
