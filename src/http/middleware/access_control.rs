//! Access gate middleware.
//! Redirects page navigations the gate does not allow.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::http::response::GatewayError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::matcher::canonical_path;
use crate::routing::TargetError;
use crate::security::session::{clear_cookies, Session};

pub async fn access_gate_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // 0. Gate the path as the file server resolves it.
    let Some(path) = canonical_path(request.uri().path()) else {
        let raw = request.uri().path().to_owned();
        tracing::debug!(path = %raw, "Navigation path rejected");
        return GatewayError::Target(TargetError::InvalidPath(raw)).into_response();
    };

    // 1. API routes and assets pass straight through.
    if !state.gate.governs(&path) {
        return next.run(request).await;
    }

    // 2. Classify cookies and decide.
    let session = Session::from_headers(request.headers(), &state.session);
    let decision = state.gate.evaluate(&path, &session);
    metrics::record_gate_decision(decision.label());

    let Some(target) = state.gate.redirect_target(&decision) else {
        return next.run(request).await;
    };

    tracing::debug!(
        path = %path,
        session = ?session,
        decision = decision.label(),
        location = %target,
        "Navigation redirected"
    );

    // 3. Redirect; a half-valid session is also cleared.
    let mut response = Redirect::temporary(target).into_response();
    if session == Session::Unrecognized {
        match clear_cookies(&state.session) {
            Ok(cookies) => {
                for cookie in cookies {
                    response.headers_mut().append(header::SET_COOKIE, cookie);
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to build clearing cookies"),
        }
    }
    response
}
