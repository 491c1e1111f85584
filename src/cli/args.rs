//! CLI argument definitions using clap
//!
//! Commands:
//! - userdesk serve [--host <host>] [--port <port>]
//! - userdesk invoke < event.json
//!
//! Service options can also come from the environment.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{AppConfig, ConfigError, LogFormat};

/// userdesk - user records over a key-value table
#[derive(Parser, Debug)]
#[command(name = "userdesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the user API over HTTP
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to bind to
        #[arg(long, env = "PORT", default_value_t = 3001)]
        port: u16,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Handle one gateway event read from stdin and print the response
    Invoke {
        #[command(flatten)]
        service: ServiceArgs,
    },
}

/// Options shared by every command; unset values fall back to the environment
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// Table holding the user records
    #[arg(long, env = "TABLE_NAME")]
    pub table_name: Option<String>,

    /// Path prefix stripped before routing
    #[arg(long, env = "BASE_PATH")]
    pub base_path: Option<String>,

    /// Directory for file-backed tables (in-memory when unset)
    #[arg(long, env = "DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,
}

impl ServiceArgs {
    /// Layer the flags over `base` and validate the result
    pub fn apply(self, base: AppConfig) -> Result<AppConfig, ConfigError> {
        let mut config = base;
        if let Some(table_name) = self.table_name {
            config.table_name = table_name;
        }
        if let Some(base_path) = self.base_path {
            config.base_path = base_path;
        }
        if let Some(data_dir) = self.data_dir {
            config.data_dir = Some(data_dir);
        }
        if let Some(log_format) = self.log_format {
            config.log_format = log_format;
        }
        config.validate()?;
        Ok(config)
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
