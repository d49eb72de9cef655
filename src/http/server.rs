//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, access gate)
//! - Build the upstream HTTP client
//! - Bind server to listener (plain or TLS)

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::schema::TlsConfig;
use crate::config::{GatewayConfig, SessionConfig};
use crate::http::auth;
use crate::http::middleware::access_gate_middleware;
use crate::http::proxy::forward;
use crate::http::request::MakeRequestUuidV4;
use crate::lifecycle::startup::StartupError;
use crate::net::tls::load_tls_config;
use crate::routing::Upstream;
use crate::security::AccessGate;

/// How long in-flight requests get to finish on a TLS listener.
const TLS_DRAIN_SECS: u64 = 10;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<Upstream>,
    pub client: reqwest::Client,
    pub gate: Arc<AccessGate>,
    pub session: Arc<SessionConfig>,
    pub max_body_size: usize,
}

/// HTTP server for the dashboard gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let upstream = Upstream::from_config(&config.upstream)?;
        if upstream.is_unrestricted() {
            tracing::warn!(
                base_url = %upstream.base(),
                "No upstream.allowed_resources configured; every resource is proxied"
            );
        }

        // Redirects are never followed so a 3xx surfaces as an error.
        let mut client = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(secs) = config.upstream.timeout_secs {
            client = client.timeout(Duration::from_secs(secs));
        }

        let state = AppState {
            upstream: Arc::new(upstream),
            client: client.build()?,
            gate: Arc::new(AccessGate::from_config(&config.gate)),
            session: Arc::new(config.session.clone()),
            max_body_size: config.upstream.max_body_size,
        };

        tracing::info!(
            base_url = %state.upstream.base(),
            protected_pages = state.gate.table().len(),
            "Gateway configured"
        );

        Ok(Self {
            router: Self::build_router(&config, state),
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let router = Router::new()
            .route(
                "/api/proxy/{*path}",
                get(forward)
                    .post(forward)
                    .put(forward)
                    .patch(forward)
                    .delete(forward),
            )
            .route("/api/auth/login", post(auth::login))
            .route("/api/auth/logout", post(auth::logout))
            .route("/api/health", get(auth::health));

        let router = match &config.pages.static_dir {
            Some(dir) => router.fallback_service(ServeDir::new(dir)),
            None => router.fallback(page_not_found),
        };

        router
            .layer(middleware::from_fn_with_state(
                state.clone(),
                access_gate_middleware,
            ))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// The fully layered router, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: &TlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let rustls = load_tls_config(Path::new(&tls.cert_path), Path::new(&tls.key_path)).await?;
        let handle = axum_server::Handle::new();

        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        tracing::info!(address = %addr, "HTTPS server starting");
        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

async fn page_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Page not found")
}
