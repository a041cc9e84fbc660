//! Video API client configuration.

use std::time::Duration;

use url::Url;

use crate::error::{ApiError, ApiResult};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Configuration for the video API client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60), // uploads can be large
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl ApiClientConfig {
    /// Create config for a base URL with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base(base_url.into()),
            ..Self::default()
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: normalize_base(
                std::env::var("VIDBOX_API_BASE").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            ),
            timeout: Duration::from_secs(
                std::env::var("VIDBOX_API_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            connect_timeout: Duration::from_secs(
                std::env::var("VIDBOX_API_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        }
    }

    /// Check that the base URL is an absolute http(s) URL.
    pub fn validate(&self) -> ApiResult<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::invalid_config(format!("{}: {}", self.base_url, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ApiError::invalid_config(format!(
                "unsupported scheme '{}' in {}",
                other, self.base_url
            ))),
        }
    }
}

fn normalize_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ApiClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_trailing_slashes_trimmed() {
        let config = ApiClientConfig::new("http://api.local/v1//");
        assert_eq!(config.base_url, "http://api.local/v1");
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        assert!(ApiClientConfig::new("not a url").validate().is_err());
        assert!(matches!(
            ApiClientConfig::new("ftp://host").validate(),
            Err(ApiError::InvalidConfig(_))
        ));
    }
}
