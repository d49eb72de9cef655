//! Upstream target resolution.
//!
//! # Responsibilities
//! - Join the configured base origin with the proxied path remainder
//! - Carry the original query string through verbatim
//! - Refuse resources outside the allow-list
//!
//! # Design Decisions
//! - The base origin is parsed once; resolution is a pure function
//! - Dot segments are rejected so the path cannot climb above the base

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;

/// Why a proxied path could not be turned into an upstream URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("invalid upstream path `{0}`")]
    InvalidPath(String),

    #[error("resource `{0}` is not exposed through the proxy")]
    ResourceNotAllowed(String),

    #[error("invalid upstream URL: {0}")]
    InvalidUrl(String),
}

/// Immutable description of the remote service.
#[derive(Debug, Clone)]
pub struct Upstream {
    base: String,
    allowed: HashSet<String>,
}

impl Upstream {
    /// Build from validated configuration.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, TargetError> {
        Self::new(&config.base_url, config.allowed_resources.iter().cloned())
    }

    pub fn new(
        base_url: &str,
        allowed: impl IntoIterator<Item = String>,
    ) -> Result<Self, TargetError> {
        let parsed = Url::parse(base_url).map_err(|e| TargetError::InvalidUrl(e.to_string()))?;
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(TargetError::InvalidUrl(format!(
                "{base_url} must not carry a query or fragment"
            )));
        }

        Ok(Self {
            base: base_url.trim_end_matches('/').to_string(),
            allowed: allowed.into_iter().collect(),
        })
    }

    /// The base origin with no trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// True when every resource may be forwarded.
    pub fn is_unrestricted(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Resolve `rest` (the path after the proxy prefix) and the raw query.
    pub fn resolve(&self, rest: &str, query: Option<&str>) -> Result<Url, TargetError> {
        let rest = rest.trim_start_matches('/');
        if rest.is_empty() {
            return Err(TargetError::InvalidPath(rest.to_string()));
        }

        if rest.split('/').any(is_dot_segment) {
            return Err(TargetError::InvalidPath(rest.to_string()));
        }

        let resource = rest.split('/').next().unwrap_or_default();

        if !self.allowed.is_empty() && !self.allowed.contains(resource) {
            return Err(TargetError::ResourceNotAllowed(resource.to_string()));
        }

        let mut target = format!("{}/{}", self.base, rest);
        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }

        Url::parse(&target).map_err(|e| TargetError::InvalidUrl(e.to_string()))
    }

    /// Resolve a fixed resource name, bypassing the allow-list.
    pub fn resource(&self, name: &str) -> Result<Url, TargetError> {
        let name = name.trim_matches('/');
        Url::parse(&format!("{}/{}", self.base, name))
            .map_err(|e| TargetError::InvalidUrl(e.to_string()))
    }
}

/// Segments the URL parser would collapse, encoded forms included.
fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}
