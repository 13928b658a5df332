//! Chat completion wire types and the single-request path.
//!
//! [`CompletionModel::request`] sends exactly one request and never retries.
//! Failures are classified into [`ErrorKind`]s, each of which carries a
//! cooldown that is slept *before* the error surfaces, so a higher-level
//! batch driver can retry immediately on [`ClientError`] without stacking
//! its own backoff. The one non-exceptional failure path is a context-length
//! rejection, which comes back as data ([`Completion::Truncated`]) rather
//! than as an error.

use crate::client::Client;
use crate::config::RequestConfig;
use crate::error::{BoxedCause, ClientError, ErrorKind};
use crate::prompt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Substring identifying a context-length rejection in upstream messages.
const CONTEXT_LENGTH_MARKER: &str = "maximum context length";

/// End reason reported when generation was cut short by the context limit.
pub const MAX_LENGTH_END_REASON: &str = "max length exceeded";

/// Role tag on a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Fixed instruction message steering model behavior.
    System,
    /// The caller's query.
    User,
    /// Model-generated content.
    Assistant,
}

/// A role-tagged message in the chat completions wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role token, serialized lowercase.
    pub role: MessageRole,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Request body for `POST {base_url}/chat/completions`.
///
/// Built fresh for every call and immutable once constructed. The message
/// sequence is always exactly two entries: the fixed system prompt, then the
/// user query. Sampling parameters are fixed constants; the `top_k`, `min_p`
/// and `repetition_penalty` fields are vLLM extensions that OpenAI-compatible
/// servers accept alongside the standard parameters.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Provider-recognized model identifier.
    pub model: String,
    /// System prompt followed by the user query.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling cutoff.
    pub top_p: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Top-k sampling cutoff.
    pub top_k: u32,
    /// Minimum probability cutoff.
    pub min_p: f32,
    /// Repetition penalty.
    pub repetition_penalty: f32,
}

impl ChatRequest {
    /// Build the canonical two-message request for `query`.
    #[must_use]
    pub fn new(model: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage::system(prompt::SYSTEM_PROMPT),
                ChatMessage::user(query),
            ],
            temperature: prompt::TEMPERATURE,
            top_p: prompt::TOP_P,
            max_tokens: prompt::MAX_TOKENS,
            top_k: prompt::TOP_K,
            min_p: prompt::MIN_P,
            repetition_penalty: prompt::REPETITION_PENALTY,
        }
    }
}

/// Assistant message inside a response choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Generated text; absent on malformed responses.
    #[serde(default)]
    pub content: Option<String>,
}

/// One generated choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// The generated message; absent on malformed responses.
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    /// Why generation stopped, as reported by the backend.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ChatUsage {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    /// Tokens in the completion.
    #[serde(default)]
    pub completion_tokens: Option<u64>,
    /// Total tokens.
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

/// Chat completion response, deserialized leniently so that malformed
/// objects still decode and can be classified.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Response choices.
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    /// Message some backends attach to otherwise-empty objects.
    #[serde(default)]
    pub message: Option<String>,
    /// Token usage.
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

/// Error detail inside the OpenAI-style error envelope.
#[derive(Debug, Clone, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Error envelope returned by OpenAI-compatible backends on non-2xx
/// statuses: `{"error": {"message": ...}}`, with `{"message": ...}` as a
/// fallback shape.
#[derive(Debug, Clone, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<ApiErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

/// Pull the upstream message out of an error response body.
///
/// Falls back to the raw body when it is not a recognizable envelope.
fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(envelope) => envelope
            .error
            .and_then(|e| e.message)
            .or(envelope.message)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}

/// Outcome of a completion request that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Generated text, returned verbatim from the first choice.
    Text(String),
    /// Generation was cut short by the backend's context-length limit.
    ///
    /// Callers key on `end_reason` to decide whether to resubmit with a
    /// shorter prompt.
    Truncated {
        /// Always [`MAX_LENGTH_END_REASON`].
        end_reason: &'static str,
    },
}

impl Completion {
    /// The truncation sentinel.
    #[must_use]
    pub const fn truncated() -> Self {
        Self::Truncated {
            end_reason: MAX_LENGTH_END_REASON,
        }
    }

    /// Generated text, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Truncated { .. } => None,
        }
    }

    /// Whether generation was cut short by the context limit.
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}

/// Sleep the kind's cooldown, then build the error.
async fn surface(kind: ErrorKind, message: String, source: Option<BoxedCause>) -> ClientError {
    let cooldown = kind.cooldown();
    debug!(
        ?kind,
        cooldown_secs = cooldown.as_secs_f64(),
        "cooling down before surfacing error"
    );
    tokio::time::sleep(cooldown).await;

    ClientError {
        kind,
        message,
        source,
    }
}

/// Chat completion model bound to a [`Client`] and a model identifier.
#[derive(Clone)]
pub struct CompletionModel {
    client: Client,
    model_id: String,
}

impl std::fmt::Debug for CompletionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionModel")
            .field("model_id", &self.model_id)
            .finish_non_exhaustive()
    }
}

impl CompletionModel {
    pub(crate) fn new(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    /// The model identifier this model sends with every request.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Send one completion request and classify the outcome.
    ///
    /// On success the first choice's message content is returned verbatim,
    /// with no post-processing and no validation of the prompt's delimiter
    /// markers. A context-length rejection comes back as
    /// [`Completion::Truncated`].
    ///
    /// # Errors
    ///
    /// All other failures surface as [`ClientError`] after the kind's
    /// cooldown: connectivity errors and HTTP 429 as
    /// [`ErrorKind::Network`] / [`ErrorKind::RateLimited`], responses missing
    /// the expected structure as [`ErrorKind::MalformedResponse`], and every
    /// remaining backend error as [`ErrorKind::Api`].
    #[instrument(skip(self, query), fields(model = %self.model_id))]
    pub async fn request(&self, query: impl Into<String>) -> Result<Completion, ClientError> {
        let body = ChatRequest::new(&self.model_id, query);
        let url = format!("{}/chat/completions", self.client.base_url());
        debug!(url = %url, "sending chat completion request");

        let response = match self
            .client
            .http_client()
            .post(&url)
            .headers(self.client.auth_headers())
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let message = e.to_string();
                return Err(surface(ErrorKind::Network, message, Some(Box::new(e))).await);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body);

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(surface(ErrorKind::RateLimited, message, None).await);
            }
            if message.contains(CONTEXT_LENGTH_MARKER) {
                warn!(error = %message, "max length exceeded");
                return Ok(Completion::truncated());
            }
            return Err(surface(ErrorKind::Api, message, None).await);
        }

        let parsed: ChatResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                return Err(
                    surface(ErrorKind::MalformedResponse, String::new(), Some(Box::new(e))).await,
                );
            }
        };

        if let Some(usage) = parsed.usage {
            debug!(
                prompt_tokens = ?usage.prompt_tokens,
                completion_tokens = ?usage.completion_tokens,
                "received chat completion response"
            );
        }

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content);

        match content {
            Some(text) => Ok(Completion::Text(text)),
            None => {
                // The completion object came back without the expected
                // structure; carry whatever message it had, or nothing.
                let message = parsed.message.unwrap_or_default();
                Err(surface(ErrorKind::MalformedResponse, message, None).await)
            }
        }
    }
}

/// One-shot convenience wrapper: environment-sourced configuration, one
/// request, one classified outcome.
///
/// # Errors
///
/// Returns a [`ClientError`] on any unrecoverable upstream failure; see
/// [`CompletionModel::request`].
pub async fn request_completion(
    query: &str,
    base_url: &str,
    model_name: &str,
) -> Result<Completion, ClientError> {
    let client = Client::builder()
        .config(RequestConfig::from_env())
        .base_url(base_url)
        .build()?;

    client.completion_model(model_name).request(query).await
}
