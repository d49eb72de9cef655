//! Session cookies.
//!
//! # Responsibilities
//! - Read the token and role cookies from a `Cookie` header
//! - Classify them into a [`Session`] at the boundary
//! - Build `Set-Cookie` values for login and logout
//!
//! # Design Decisions
//! - Role strings are validated here; downstream code only sees [`Role`]
//! - A token without a recognizable role is its own state, never "anonymous"

use axum::http::{header, HeaderMap, HeaderValue};
use thiserror::Error;

use crate::config::SessionConfig;
use crate::security::access_control::Role;

/// Credentials as found on an incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// No token cookie.
    Anonymous,
    /// Token cookie plus a recognized role.
    Authenticated(Role),
    /// Token cookie, but the role cookie is missing or garbled.
    Unrecognized,
}

impl Session {
    /// Classify raw cookie values.
    pub fn classify(token: Option<&str>, role: Option<&str>) -> Self {
        match token.filter(|t| !t.is_empty()) {
            None => Session::Anonymous,
            Some(_) => match role.and_then(|r| r.parse::<Role>().ok()) {
                Some(role) => Session::Authenticated(role),
                None => Session::Unrecognized,
            },
        }
    }

    /// Read the session from request headers.
    pub fn from_headers(headers: &HeaderMap, config: &SessionConfig) -> Self {
        let token = cookie_value(headers, &config.token_cookie);
        let role = cookie_value(headers, &config.role_cookie);
        Self::classify(token.as_deref(), role.as_deref())
    }
}

/// A value that cannot be stored in a cookie verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("value for cookie `{0}` contains characters outside the cookie-octet set")]
pub struct CookieError(pub String);

/// Find a cookie by name across every `Cookie` header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| value.trim().trim_matches('"').to_string())
        })
}

/// `Set-Cookie` values issued after a successful login.
pub fn issue_cookies(
    config: &SessionConfig,
    token: &str,
    role: Role,
) -> Result<[HeaderValue; 2], CookieError> {
    Ok([
        set_cookie(config, &config.token_cookie, token, config.max_age_secs)?,
        set_cookie(config, &config.role_cookie, role.as_str(), config.max_age_secs)?,
    ])
}

/// `Set-Cookie` values that expire both session cookies.
pub fn clear_cookies(config: &SessionConfig) -> Result<[HeaderValue; 2], CookieError> {
    Ok([
        set_cookie(config, &config.token_cookie, "", 0)?,
        set_cookie(config, &config.role_cookie, "", 0)?,
    ])
}

fn set_cookie(
    config: &SessionConfig,
    name: &str,
    value: &str,
    max_age: u64,
) -> Result<HeaderValue, CookieError> {
    if !value.bytes().all(is_cookie_octet) {
        return Err(CookieError(name.to_string()));
    }
    let mut cookie = format!("{name}={value}; Path=/; Max-Age={max_age}; SameSite=Lax");
    if config.secure_cookies {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|_| CookieError(name.to_string()))
}

/// RFC 6265 `cookie-octet`.
fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}
