//! Client configuration.
//!
//! Values come from environment variables with defaults from
//! [`blotter_core::defaults`]:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BLOTTER_API_URL` | `http://localhost:8000/api` | Backend base URL |
//! | `BLOTTER_TIMEOUT_SECS` | `15` | Per-request timeout |
//! | `BLOTTER_REFRESH_SECS` | `30` | Auto-refresh interval |
//! | `BLOTTER_AUTH_TOKEN` | unset | Sent as `Authorization: Bearer <token>` |

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use blotter_core::defaults;
use blotter_core::{EntityKind, Error, Result};

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Interval between timed refreshes in seconds.
    pub refresh_interval_secs: u64,
    /// Optional bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_URL.to_string(),
            timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            refresh_interval_secs: defaults::REFRESH_INTERVAL_SECS,
            auth_token: None,
        }
    }
}

impl ClientConfig {
    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("BLOTTER_API_URL").unwrap_or_else(|_| defaults::API_URL.to_string());

        let timeout_secs = std::env::var("BLOTTER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::REQUEST_TIMEOUT_SECS);

        let refresh_interval_secs = std::env::var("BLOTTER_REFRESH_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::REFRESH_INTERVAL_SECS);

        let auth_token = std::env::var("BLOTTER_AUTH_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        debug!(
            base_url = %base_url,
            timeout_secs,
            refresh_interval_secs,
            auth = auth_token.is_some(),
            "Loaded client config from environment"
        );

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            refresh_interval_secs,
            auth_token,
        }
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Override the refresh interval.
    pub fn with_refresh_interval_secs(mut self, secs: u64) -> Self {
        self.refresh_interval_secs = secs;
        self
    }

    /// Attach a bearer token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::Config("base_url cannot be empty".to_string()));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_string()));
        }

        if self.refresh_interval_secs == 0 {
            return Err(Error::Config(
                "refresh_interval_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Full URL of an entity collection endpoint.
    pub fn collection_url(&self, kind: EntityKind) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            kind.collection_path()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_collection_url() {
        let config = ClientConfig::default().with_base_url("http://records.local/api/");
        assert_eq!(
            config.collection_url(EntityKind::Case),
            "http://records.local/api/crimes/"
        );
        assert_eq!(
            config.collection_url(EntityKind::Evidence),
            "http://records.local/api/criminal-evidence/"
        );
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let config = ClientConfig::default().with_base_url("ftp://records.local");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http:// or https://"));
    }

    #[test]
    fn test_validate_rejects_empty_and_zero() {
        assert!(ClientConfig::default().with_base_url("").validate().is_err());
        assert!(ClientConfig::default()
            .with_timeout_secs(0)
            .validate()
            .is_err());
        assert!(ClientConfig::default()
            .with_refresh_interval_secs(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_auth_token_not_serialized_when_absent() {
        let json = serde_json::to_value(ClientConfig::default()).unwrap();
        assert!(json.get("auth_token").is_none());
    }
}
