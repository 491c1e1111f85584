//! # HTTP Server
//!
//! Axum adapter around [`UserHandler`]. Every request, whatever its
//! method or path, is converted into an API [`Request`] and answered
//! with the handler's envelope, so routing lives in one place.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, Uri};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::config::HttpServerConfig;
use crate::api::{ApiError, Envelope, Request, UserHandler};

/// HTTP server for the user API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(handler: UserHandler, config: HttpServerConfig) -> Self {
        let router = Self::build_router(Arc::new(handler));
        Self { config, router }
    }

    /// Build the router: one fallback that forwards everything
    pub fn build_router(handler: Arc<UserHandler>) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(handler)
            .layer(TraceLayer::new_for_http())
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Start the HTTP server; returns after a shutdown signal
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid socket address '{}': {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "User API listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn dispatch(
    State(handler): State<Arc<UserHandler>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Envelope {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return ApiError::bad_request(rejection.body_text()).into_envelope(),
    };
    let body = match body {
        Ok(body) if body.is_empty() => None,
        Ok(body) => Some(body),
        Err(rejection) => return ApiError::bad_request(rejection.body_text()).into_envelope(),
    };

    let request = Request {
        method,
        path: uri.path().to_string(),
        query,
        headers,
        body,
    };
    handler.handle(request).await
}

/// Wait for Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
