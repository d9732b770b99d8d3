//! Configuration for the custody import client

use crate::error::{Error, Result};

/// Default bounded timeout for each network phase, in seconds.
///
/// Sensitive material must never be held pending an indefinitely hung call.
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Configuration options for the custody service client
#[derive(Debug, Clone)]
pub struct CustodyConfig {
    /// Base URL of the custody provider's import API
    pub base_url: String,

    /// Application id registered with the custody provider
    pub app_id: String,

    /// Header name the provider expects the application id under
    pub app_id_header: String,

    /// Timeout in seconds for each network phase
    pub timeout_seconds: Option<u64>,
}

impl CustodyConfig {
    /// Creates a new CustodyConfig for the given API base URL and app id
    pub fn new(base_url: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            app_id: app_id.into(),
            app_id_header: "x-app-id".to_string(),
            timeout_seconds: Some(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    /// Sets the header name carrying the application id
    pub fn with_app_id_header(mut self, header: &str) -> Self {
        self.app_id_header = header.to_string();
        self
    }

    /// Sets the per-phase network timeout
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Validates the configuration for required fields
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::Config("custody base URL is not set".to_string()));
        }
        if self.app_id.is_empty() {
            return Err(Error::Config("custody app id is not set".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_missing_app_id_is_config_error() {
        let config = CustodyConfig::new("https://custody.example/v1/wallets/import", "");
        assert_matches!(config.validate(), Err(Error::Config(_)));
    }

    #[test]
    fn test_builder_overrides() {
        let config = CustodyConfig::new("https://custody.example", "app-123")
            .with_app_id_header("x-provider-app-id")
            .with_timeout_seconds(5);
        assert_eq!(config.app_id_header, "x-provider-app-id");
        assert_eq!(config.timeout_seconds, Some(5));
        assert!(config.validate().is_ok());
    }
}
