//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::security::access_control::Role;

/// Environment variable that overrides `upstream.base_url`.
pub const BASE_URL_ENV: &str = "API_BASE_URL";

/// Origin used when neither the environment nor the config file names one.
pub const FALLBACK_BASE_URL: &str = "http://127.0.0.1:8000";

/// Root configuration for the dashboard gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Remote PHP service the proxy forwards to.
    pub upstream: UpstreamConfig,

    /// Page access gate settings.
    pub gate: GateConfig,

    /// Session cookie settings.
    pub session: SessionConfig,

    /// Static page bundle served behind the gate.
    pub pages: PagesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Upstream service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base origin, optionally with a path prefix (e.g., "https://host/api").
    pub base_url: String,

    /// First path segments the proxy may forward to. Empty means any.
    pub allowed_resources: Vec<String>,

    /// Client-side timeout for upstream calls. Unset waits indefinitely.
    pub timeout_secs: Option<u64>,

    /// Largest request body buffered for forwarding, in bytes.
    pub max_body_size: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: FALLBACK_BASE_URL.to_string(),
            allowed_resources: Vec::new(),
            timeout_secs: None,
            max_body_size: 20 * 1024 * 1024, // 20MB, file uploads included
        }
    }
}

/// What the gate does with paths that have no permission entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedPolicy {
    /// Any authenticated role may view the page.
    #[default]
    Allow,
    /// Only administrators may view the page.
    AdminOnly,
}

/// Access gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GateConfig {
    /// Public login page.
    pub login_path: String,

    /// Where authenticated users land when they open the login page.
    pub landing_path: String,

    /// Page shown when the role lacks permission.
    pub unauthorized_path: String,

    /// Extra path prefixes the gate never governs.
    pub excluded_prefixes: Vec<String>,

    /// Policy for paths absent from `permissions`.
    pub unmapped_policy: UnmappedPolicy,

    /// Page path to the roles allowed to view it.
    pub permissions: BTreeMap<String, Vec<Role>>,
}

impl Default for GateConfig {
    fn default() -> Self {
        let admin_only = [
            "/users",
            "/notifications",
            "/ads",
            "/delivery",
            "/exams",
            "/links",
            "/materials",
            "/transactions",
            "/settings",
        ];
        let mut permissions: BTreeMap<String, Vec<Role>> = admin_only
            .iter()
            .map(|path| (path.to_string(), vec![Role::Admin]))
            .collect();
        permissions.insert("/print".to_string(), vec![Role::Admin, Role::Printer]);

        Self {
            login_path: "/login".to_string(),
            landing_path: "/dashboard".to_string(),
            unauthorized_path: "/unauthorized".to_string(),
            excluded_prefixes: Vec::new(),
            unmapped_policy: UnmappedPolicy::Allow,
            permissions,
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Cookie holding the bearer token.
    pub token_cookie: String,

    /// Cookie holding the role identifier.
    pub role_cookie: String,

    /// Cookie lifetime in seconds.
    pub max_age_secs: u64,

    /// Upstream resource that authenticates credentials.
    pub login_resource: String,

    /// Add the `Secure` attribute to issued cookies.
    pub secure_cookies: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_cookie: "authToken".to_string(),
            role_cookie: "userRole".to_string(),
            max_age_secs: 8 * 60 * 60,
            login_resource: "login.php".to_string(),
            secure_cookies: false,
        }
    }
}

/// Static page bundle configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PagesConfig {
    /// Directory with the exported dashboard pages.
    pub static_dir: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.upstream.base_url, FALLBACK_BASE_URL);
        assert_eq!(config.session.max_age_secs, 28_800);
        assert_eq!(config.gate.permissions["/users"], vec![Role::Admin]);
        assert_eq!(
            config.gate.permissions["/print"],
            vec![Role::Admin, Role::Printer]
        );
        assert!(!config.gate.permissions.contains_key("/dashboard"));
    }

    #[test]
    fn permissions_parse_from_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [gate]
            unmapped_policy = "admin_only"

            [gate.permissions]
            "/reports" = ["admin", "printer"]
            "#,
        )
        .unwrap();
        assert_eq!(config.gate.unmapped_policy, UnmappedPolicy::AdminOnly);
        assert_eq!(config.gate.permissions.len(), 1);
        assert_eq!(
            config.gate.permissions["/reports"],
            vec![Role::Admin, Role::Printer]
        );
    }

    #[test]
    fn unknown_role_is_a_parse_error() {
        let parsed: Result<GatewayConfig, _> = toml::from_str(
            r#"
            [gate.permissions]
            "/users" = ["superuser"]
            "#,
        );
        assert!(parsed.is_err());
    }
}
