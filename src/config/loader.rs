//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, BASE_URL_ENV};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;
    finalize(config, std::env::var(BASE_URL_ENV).ok())
}

/// Resolve the process configuration once at startup.
///
/// Without a file every section falls back to its defaults. The
/// `API_BASE_URL` environment variable wins over both.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => finalize(GatewayConfig::default(), std::env::var(BASE_URL_ENV).ok()),
    }
}

/// Apply the environment override, then validate.
pub fn finalize(
    mut config: GatewayConfig,
    base_url_env: Option<String>,
) -> Result<GatewayConfig, ConfigError> {
    if let Some(base_url) = base_url_env.filter(|v| !v.trim().is_empty()) {
        config.upstream.base_url = base_url.trim().to_string();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::FALLBACK_BASE_URL;

    #[test]
    fn env_override_wins() {
        let config = finalize(
            GatewayConfig::default(),
            Some("https://api.example.edu/v1".into()),
        )
        .unwrap();
        assert_eq!(config.upstream.base_url, "https://api.example.edu/v1");
    }

    #[test]
    fn blank_env_keeps_fallback() {
        let config = finalize(GatewayConfig::default(), Some("  ".into())).unwrap();
        assert_eq!(config.upstream.base_url, FALLBACK_BASE_URL);
    }

    #[test]
    fn invalid_override_reported() {
        let err = finalize(GatewayConfig::default(), Some("not a url".into())).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/gateway.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
