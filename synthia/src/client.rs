//! Client for OpenAI-compatible chat completion backends.

use crate::completion::CompletionModel;
use crate::config::RequestConfig;
use crate::error::{ClientError, ErrorKind};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::sync::Arc;

/// Default base URL, pointing at a local vLLM-style server.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8030/v1";

/// Client for an OpenAI-compatible chat completions endpoint.
///
/// Works against any backend speaking the Chat Completions wire format:
/// vLLM, local proxies, third-party providers.
///
/// # Example
///
/// ```rust,ignore
/// use synthia::{Client, RequestConfig};
///
/// let client = Client::builder()
///     .config(RequestConfig::from_env())
///     .base_url("http://127.0.0.1:8030/v1")
///     .build()?;
/// let model = client.completion_model("Tesslate/Synthia-S1-27b");
/// ```
#[derive(Clone)]
pub struct Client {
    http_client: reqwest::Client,
    api_key: Arc<str>,
    base_url: Arc<str>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client for `base_url` with environment-sourced configuration.
    ///
    /// Reads `OPENAI_API_KEY` (default `"EMPTY"`) and
    /// `OPENAI_API_REQUEST_TIMEOUT` (default 99999 seconds).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn from_env(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder()
            .config(RequestConfig::from_env())
            .base_url(base_url)
            .build()
    }

    /// Create a completion model bound to this client.
    #[must_use]
    pub fn completion_model(&self, model_id: impl Into<String>) -> CompletionModel {
        CompletionModel::new(self.clone(), model_id)
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    pub(crate) fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(2);

        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        headers
    }
}

/// Builder for [`Client`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl ClientBuilder {
    /// Set the API key.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the endpoint base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub const fn timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = Some(timeout);
        self
    }

    /// Apply a [`RequestConfig`] (API key and timeout).
    #[must_use]
    pub fn config(self, config: RequestConfig) -> Self {
        self.api_key(config.api_key).timeout_secs(config.timeout_secs)
    }

    /// Build the client.
    ///
    /// Unset fields fall back to the sentinel key `"EMPTY"` and
    /// [`DEFAULT_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn build(self) -> Result<Client, ClientError> {
        let api_key = self
            .api_key
            .unwrap_or_else(|| crate::config::DEFAULT_API_KEY.to_string());
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(timeout));
        }
        let http_client = builder
            .build()
            .map_err(|e| ClientError::with_source(ErrorKind::Network, e.to_string(), e))?;

        Ok(Client {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = Client::builder()
            .api_key("test-key")
            .base_url("http://localhost:8030/v1")
            .timeout_secs(30)
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "http://localhost:8030/v1");
    }

    #[test]
    fn test_default_base_url_and_key() {
        let client = Client::builder().build().unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);

        let auth = client.auth_headers();
        assert_eq!(
            auth.get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer EMPTY")
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = Client::builder().api_key("sk-secret").build().unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-secret"));
    }
}
