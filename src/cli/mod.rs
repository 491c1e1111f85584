//! CLI module for userdesk
//!
//! Provides command-line interface for:
//! - serve: run the HTTP server
//! - invoke: handle one gateway event from stdin

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, ServiceArgs};
pub use commands::{invoke, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_event, write_envelope};
