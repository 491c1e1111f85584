//! CLI command implementations
//!
//! Both commands build the handler once, then either serve it over HTTP
//! or feed it a single event.

use crate::api::{ApiError, Request, UserHandler};
use crate::config::AppConfig;
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::logging;

use super::args::{Command, ServiceArgs};
use super::errors::{CliError, CliResult};
use super::io::{read_stdin_event, write_stdout_envelope};

/// Main CLI entry point
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve {
            host,
            port,
            service,
        } => serve(HttpServerConfig::new(host, port), service),
        Command::Invoke { service } => invoke(service),
    }
}

fn load_config(service: ServiceArgs) -> CliResult<AppConfig> {
    let config = service.apply(AppConfig::from_env()?)?;
    logging::init(config.log_format);
    Ok(config)
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Run the HTTP server until a shutdown signal arrives
pub fn serve(http: HttpServerConfig, service: ServiceArgs) -> CliResult<()> {
    let config = load_config(service)?;
    let handler = UserHandler::from_config(&config);
    let server = HttpServer::new(handler, http);

    let rt = runtime()?;
    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Handle one event from stdin and print its envelope
///
/// A malformed event still produces an envelope (400); only I/O
/// failures end the command with an error.
pub fn invoke(service: ServiceArgs) -> CliResult<()> {
    let config = load_config(service)?;
    let handler = UserHandler::from_config(&config);
    let input = read_stdin_event()?;

    let rt = runtime()?;
    let envelope = rt.block_on(async {
        match Request::from_event_str(&input) {
            Ok(request) => handler.handle(request).await,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected malformed event");
                ApiError::from(e).into_envelope()
            }
        }
    });

    write_stdout_envelope(&envelope)
}
