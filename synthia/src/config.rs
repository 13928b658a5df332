//! Request configuration for the completion client.
//!
//! Configuration is an explicit value passed into [`ClientBuilder`], so the
//! client stays testable without mutating the process environment;
//! [`RequestConfig::from_env`] is the one place env vars are read.
//!
//! [`ClientBuilder`]: crate::client::ClientBuilder

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "OPENAI_API_REQUEST_TIMEOUT";

/// Sentinel API key accepted by local vLLM-style backends.
pub const DEFAULT_API_KEY: &str = "EMPTY";

/// Default timeout in seconds, effectively "no timeout".
pub const DEFAULT_TIMEOUT_SECS: u64 = 99_999;

/// Configuration for the completion client.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl RequestConfig {
    /// Read configuration from the process environment.
    ///
    /// Missing or unparseable values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let api_key =
            std::env::var(API_KEY_ENV).unwrap_or_else(|_| DEFAULT_API_KEY.to_string());
        let timeout_secs = std::env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            api_key,
            timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RequestConfig::default();
        assert_eq!(config.api_key, "EMPTY");
        assert_eq!(config.timeout_secs, 99_999);
    }
}
