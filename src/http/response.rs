//! Error responses returned to the browser.
//!
//! # Design Decisions
//! - Every failure leaves as a JSON envelope `{error, message?, status?}`
//! - Anything that went wrong upstream is a 500; the upstream status rides
//!   along in the envelope instead of being passed through
//! - Upstream URLs are stripped from error details before they reach clients

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::routing::TargetError;
use crate::security::access_control::UnknownRole;
use crate::security::session::CookieError;

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// Failures inside the proxy and session handlers.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("failed to read request body: {0}")]
    RequestBody(axum::Error),

    #[error("upstream connection failed: {0}")]
    Connect(reqwest::Error),

    #[error("upstream responded with status {status}")]
    UpstreamStatus {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("failed to read upstream response: {0}")]
    ReadResponse(reqwest::Error),

    #[error("upstream returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error(transparent)]
    UnknownRole(#[from] UnknownRole),

    #[error(transparent)]
    Cookie(#[from] CookieError),
}

impl GatewayError {
    /// Status code returned to the browser.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Target(TargetError::ResourceNotAllowed(_)) => StatusCode::FORBIDDEN,
            GatewayError::Target(_) | GatewayError::RequestBody(_) => StatusCode::BAD_REQUEST,
            GatewayError::UnknownRole(_) => StatusCode::FORBIDDEN,
            GatewayError::Connect(_)
            | GatewayError::UpstreamStatus { .. }
            | GatewayError::ReadResponse(_)
            | GatewayError::InvalidJson(_)
            | GatewayError::Cookie(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Envelope sent to the browser.
    pub fn envelope(&self) -> ErrorEnvelope {
        let (error, message, status) = match self {
            GatewayError::Target(TargetError::ResourceNotAllowed(_)) => {
                ("Resource not available", Some(self.to_string()), None)
            }
            GatewayError::Target(_) => ("Invalid request path", Some(self.to_string()), None),
            GatewayError::RequestBody(_) => {
                ("Failed to read request body", Some(self.to_string()), None)
            }
            GatewayError::Connect(e) | GatewayError::ReadResponse(e) => {
                ("Failed to connect to server", Some(e.to_string()), None)
            }
            GatewayError::UpstreamStatus { status, detail } => (
                "Server request failed",
                Some(detail.clone().unwrap_or_else(|| status.to_string())),
                Some(status.as_u16()),
            ),
            GatewayError::InvalidJson(e) => {
                ("Invalid response from server", Some(e.to_string()), None)
            }
            GatewayError::UnknownRole(e) => ("Unsupported role", Some(e.to_string()), None),
            GatewayError::Cookie(e) => ("Invalid response from server", Some(e.to_string()), None),
        };

        ErrorEnvelope {
            error: error.to_string(),
            message,
            status,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.envelope())).into_response()
    }
}

/// Pull a human-readable message out of an upstream error body.
pub fn upstream_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key)?.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_becomes_500_with_status_field() {
        let err = GatewayError::UpstreamStatus {
            status: StatusCode::NOT_FOUND,
            detail: Some("record not found".into()),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.envelope(),
            ErrorEnvelope {
                error: "Server request failed".into(),
                message: Some("record not found".into()),
                status: Some(404),
            }
        );
    }

    #[test]
    fn status_text_used_without_detail() {
        let err = GatewayError::UpstreamStatus {
            status: StatusCode::BAD_GATEWAY,
            detail: None,
        };
        assert_eq!(err.envelope().message.as_deref(), Some("502 Bad Gateway"));
    }

    #[test]
    fn invalid_json_envelope() {
        let err: GatewayError = serde_json::from_str::<serde_json::Value>("<html>")
            .unwrap_err()
            .into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.envelope().error, "Invalid response from server");
    }

    #[test]
    fn target_errors_map_to_client_errors() {
        let denied = GatewayError::from(TargetError::ResourceNotAllowed("x.php".into()));
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        let invalid = GatewayError::from(TargetError::InvalidPath("..".into()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn envelope_omits_absent_fields() {
        let json = serde_json::to_value(ErrorEnvelope {
            error: "Failed to connect to server".into(),
            message: None,
            status: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"error": "Failed to connect to server"}));
    }

    #[test]
    fn detail_prefers_message_then_error() {
        assert_eq!(
            upstream_detail(br#"{"message":"bad id","error":"x"}"#).as_deref(),
            Some("bad id")
        );
        assert_eq!(upstream_detail(br#"{"error":"denied"}"#).as_deref(), Some("denied"));
        assert_eq!(upstream_detail(b"plain text"), None);
        assert_eq!(upstream_detail(br#"{"message":5}"#), None);
    }
}
