//! Session endpoints.
//!
//! Login is relayed to the upstream service; when it hands back a token and
//! a recognized role the gateway stores both in the cookies the access gate
//! reads. Logout expires them.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::proxy::{json_response, read_json};
use crate::http::request::{request_id, X_REQUEST_ID};
use crate::http::response::GatewayError;
use crate::http::server::AppState;
use crate::security::access_control::Role;
use crate::security::session::{clear_cookies, issue_cookies};

/// Fields the gateway looks for in the upstream login reply.
#[derive(Debug, Deserialize)]
struct LoginReply {
    token: Option<String>,
    role: Option<String>,
}

#[derive(Serialize)]
pub struct SystemStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let request_id = request_id(&headers);
    let target = state.upstream.resource(&state.session.login_resource)?;

    tracing::info!(request_id = %request_id, target_url = %target, "Forwarding login");

    let mut builder = state
        .client
        .post(target)
        .header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .body(body);
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        builder = builder.header(X_REQUEST_ID, value);
    }

    let upstream = builder
        .send()
        .await
        .map_err(|e| GatewayError::Connect(e.without_url()))?;
    let (status, json) = read_json(upstream).await?;

    // Replies without a session (e.g. `{"success":false,...}`) go back untouched.
    let reply = serde_json::from_slice::<LoginReply>(&json).ok();
    let (token, role) = match reply {
        Some(LoginReply {
            token: Some(token),
            role: Some(role),
        }) if !token.is_empty() => (token, role),
        _ => {
            tracing::info!(request_id = %request_id, "Login reply carried no session");
            return Ok(json_response(status, json));
        }
    };

    let role: Role = role.parse()?;
    let cookies = issue_cookies(&state.session, &token, role)?;

    tracing::info!(request_id = %request_id, role = %role, "Session issued");

    let mut response = json_response(status, json);
    for cookie in cookies {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

/// `POST /api/auth/logout`
pub async fn logout(State(state): State<AppState>) -> Result<Response, GatewayError> {
    let cookies = clear_cookies(&state.session)?;
    let mut response = Json(serde_json::json!({ "success": true })).into_response();
    for cookie in cookies {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

/// `GET /api/health`
pub async fn health() -> Json<SystemStatus> {
    Json(SystemStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
