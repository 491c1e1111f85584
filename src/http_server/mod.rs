//! # HTTP Server Module
//!
//! Serves the user API over HTTP for local runs. The handler behind it
//! is the same one the `invoke` command drives with gateway events.

pub mod config;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
