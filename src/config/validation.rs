//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the upstream origin and value ranges
//! - Check the permission table's path and role invariants
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.base_url `{0}` is not an http(s) URL")]
    InvalidBaseUrl(String),

    #[error("{field} `{path}` must be absolute without a trailing slash")]
    InvalidPath { field: &'static str, path: String },

    #[error("gate.permissions `{0}` has no roles")]
    EmptyRoleSet(String),

    #[error("session cookie names must be non-empty and distinct")]
    InvalidCookieNames,

    #[error("session.max_age_secs must be greater than zero")]
    ZeroMaxAge,

    #[error("upstream.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("upstream.allowed_resources entry `{0}` must be a single path segment")]
    InvalidResource(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::InvalidBaseUrl(
            config.upstream.base_url.clone(),
        )),
    }

    if config.upstream.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    for resource in &config.upstream.allowed_resources {
        if resource.is_empty() || resource.contains('/') || resource == "." || resource == ".." {
            errors.push(ValidationError::InvalidResource(resource.clone()));
        }
    }

    let gate = &config.gate;
    for (field, path) in [
        ("gate.login_path", &gate.login_path),
        ("gate.landing_path", &gate.landing_path),
        ("gate.unauthorized_path", &gate.unauthorized_path),
    ] {
        if !is_page_path(path) {
            errors.push(ValidationError::InvalidPath {
                field,
                path: path.clone(),
            });
        }
    }

    for prefix in &gate.excluded_prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPath {
                field: "gate.excluded_prefixes",
                path: prefix.clone(),
            });
        }
    }

    for (path, roles) in &gate.permissions {
        if !is_page_path(path) {
            errors.push(ValidationError::InvalidPath {
                field: "gate.permissions",
                path: path.clone(),
            });
        }
        if roles.is_empty() {
            errors.push(ValidationError::EmptyRoleSet(path.clone()));
        }
    }

    let session = &config.session;
    if session.token_cookie.is_empty()
        || session.role_cookie.is_empty()
        || session.token_cookie == session.role_cookie
    {
        errors.push(ValidationError::InvalidCookieNames);
    }
    if session.max_age_secs == 0 {
        errors.push(ValidationError::ZeroMaxAge);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Absolute, and no trailing slash unless it is the root.
fn is_page_path(path: &str) -> bool {
    path.starts_with('/') && (path == "/" || !path.ends_with('/'))
}
