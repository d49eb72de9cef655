//! Same-origin proxy to the remote PHP service.
//!
//! `ANY /api/proxy/<rest>?<query>` is forwarded to `<base>/<rest>?<query>`
//! with the same method. Successful JSON replies are relayed unchanged;
//! every failure becomes a [`GatewayError`] envelope.

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::body::BodyKind;
use crate::http::request::{request_id, X_REQUEST_ID};
use crate::http::response::{upstream_detail, GatewayError};
use crate::http::server::AppState;
use crate::observability::metrics;

/// Path prefix the proxy is mounted under.
pub const PROXY_PREFIX: &str = "/api/proxy";

/// Inbound headers relayed to the upstream service.
const FORWARDED_HEADERS: [header::HeaderName; 3] = [
    header::AUTHORIZATION,
    header::ACCEPT,
    header::ACCEPT_LANGUAGE,
];

/// Methods the proxy forwards.
const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE";

/// Main proxy handler.
pub async fn forward(State(state): State<AppState>, request: Request<Body>) -> Response {
    // axum routes HEAD to GET handlers; the upstream only speaks JSON bodies.
    if request.method() == Method::HEAD {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS))],
        )
            .into_response();
    }

    let start = Instant::now();
    let method = request.method().clone();
    let request_id = request_id(request.headers());

    let response = match relay(&state, request, &request_id).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                error = %e,
                "Proxy request failed"
            );
            e.into_response()
        }
    };

    metrics::record_proxy_request(method.as_str(), response.status().as_u16(), start);
    response
}

async fn relay(
    state: &AppState,
    request: Request<Body>,
    request_id: &str,
) -> Result<Response, GatewayError> {
    let (parts, body) = request.into_parts();

    let rest = parts
        .uri
        .path()
        .strip_prefix(PROXY_PREFIX)
        .unwrap_or_default();
    let target = state.upstream.resolve(rest, parts.uri.query())?;

    // Decide the body shape before the body is touched.
    let kind = BodyKind::classify(&parts.method, &parts.headers);
    let outbound = kind.read(body, state.max_body_size).await?;

    tracing::info!(
        request_id = %request_id,
        method = %parts.method,
        target_url = %target,
        body = outbound.label(),
        body_bytes = outbound.len(),
        "Forwarding to upstream"
    );

    let no_store = parts.method == Method::GET;
    let mut builder = state
        .client
        .request(parts.method.clone(), target)
        .headers(forwarded_headers(&parts.headers, request_id));
    if no_store {
        builder = builder
            .header(header::CACHE_CONTROL, "no-store")
            .header(header::PRAGMA, "no-cache");
    }

    let upstream = outbound
        .attach(builder)
        .send()
        .await
        .map_err(|e| GatewayError::Connect(e.without_url()))?;

    let (status, json) = read_json(upstream).await?;

    tracing::debug!(request_id = %request_id, status = %status, "Upstream responded");

    let mut response = json_response(status, json);
    if no_store {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }
    Ok(response)
}

/// Read an upstream reply, insisting on a 2xx status and a JSON body.
pub async fn read_json(response: reqwest::Response) -> Result<(StatusCode, Bytes), GatewayError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| GatewayError::ReadResponse(e.without_url()))?;

    if !status.is_success() {
        return Err(GatewayError::UpstreamStatus {
            status,
            detail: upstream_detail(&bytes),
        });
    }

    serde_json::from_slice::<serde::de::IgnoredAny>(&bytes)?;
    Ok((status, bytes))
}

/// Relay validated JSON bytes as-is.
pub fn json_response(status: StatusCode, json: Bytes) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        json,
    )
        .into_response()
}

fn forwarded_headers(inbound: &HeaderMap, request_id: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in FORWARDED_HEADERS {
        for value in inbound.get_all(&name) {
            headers.append(name.clone(), value.clone());
        }
    }
    if let Ok(value) = HeaderValue::from_str(request_id) {
        headers.insert(X_REQUEST_ID, value);
    }
    headers
}
