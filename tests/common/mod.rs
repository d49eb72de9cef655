//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;

use tutor_admin_gateway::{GatewayConfig, HttpServer, Shutdown};

/// A request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path and query, e.g. `/a/b?x=1`.
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

type Responder = Arc<dyn Fn(&RecordedRequest) -> (StatusCode, String) + Send + Sync>;

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responder: Responder,
}

/// Handle on a running mock upstream.
#[derive(Clone)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> RecordedRequest {
        self.requests().pop().expect("upstream received no request")
    }
}

/// Start a programmable upstream that records every request it receives.
pub async fn start_upstream<F>(responder: F) -> MockUpstream
where
    F: Fn(&RecordedRequest) -> (StatusCode, String) + Send + Sync + 'static,
{
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        requests: requests.clone(),
        responder: Arc::new(responder),
    };

    let app = Router::new().fallback(record).with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, requests }
}

/// Upstream that always answers `200 {"ok":true}`.
pub async fn start_json_upstream() -> MockUpstream {
    start_upstream(|_| (StatusCode::OK, r#"{"ok":true}"#.to_string())).await
}

async fn record(State(state): State<MockState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    let recorded = RecordedRequest {
        method: parts.method,
        uri: parts.uri.to_string(),
        headers: parts.headers,
        body,
    };

    let (status, reply) = (state.responder)(&recorded);
    state.requests.lock().unwrap().push(recorded);

    (status, [(header::CONTENT_TYPE, "application/json")], reply).into_response()
}

/// Gateway configuration pointed at `base_url`.
pub fn gateway_config(base_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.base_url = base_url.to_string();
    config
}

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
