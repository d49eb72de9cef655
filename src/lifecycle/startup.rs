//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated configuration into a ready [`HttpServer`]
//! - Start background exporters (metrics)
//! - Bind the listener (plain TCP or TLS) and serve
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::TargetError;

/// Reasons the gateway cannot start.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid upstream: {0}")]
    Upstream(#[from] TargetError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Build the server, bind its listener and serve until `shutdown` fires.
pub async fn launch(config: GatewayConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.listener.bind_address.clone();
    let tls = config.listener.tls.clone();
    let server = HttpServer::new(config)?;

    match tls {
        Some(tls) => {
            let addr: SocketAddr = address.parse().map_err(|e| StartupError::Bind {
                address: address.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
            })?;
            server
                .run_tls(addr, &tls, shutdown.subscribe())
                .await
                .map_err(StartupError::Serve)
        }
        None => {
            let listener = TcpListener::bind(&address)
                .await
                .map_err(|source| StartupError::Bind {
                    address: address.clone(),
                    source,
                })?;
            server
                .run(listener, shutdown.subscribe())
                .await
                .map_err(StartupError::Serve)
        }
    }
}
