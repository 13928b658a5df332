//! Error types for completion client operations.

use std::time::Duration;
use thiserror::Error;

/// Boxed upstream cause, kept for diagnostics.
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Categories of upstream failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Connection could not be established, or the request timed out.
    Network,
    /// Backend rejected the request due to rate limiting.
    RateLimited,
    /// A response arrived but lacked the expected structure.
    MalformedResponse,
    /// Any other error reported by the backend.
    Api,
}

impl ErrorKind {
    /// Cooldown slept before an error of this kind is surfaced.
    ///
    /// Connectivity, rate-limit and malformed-response failures all point at
    /// an overloaded or misbehaving backend, so they share a randomized
    /// pause uniform in [25, 35) seconds; the jitter keeps concurrently
    /// running client instances from hammering a shared endpoint in
    /// lockstep. Other API errors get a fixed one-second pause.
    #[must_use]
    pub fn cooldown(self) -> Duration {
        match self {
            Self::Network | Self::RateLimited | Self::MalformedResponse => {
                Duration::from_secs_f64(25.0 + fastrand::f64() * 10.0)
            }
            Self::Api => Duration::from_secs(1),
        }
    }
}

/// Error returned when a completion request fails.
///
/// The display form is the upstream error message verbatim (possibly empty
/// for malformed responses that carried no message). No retry state is kept;
/// each request is independent and retrying is the caller's job.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ClientError {
    /// The failure category.
    pub kind: ErrorKind,
    /// Upstream error message, verbatim.
    pub message: String,
    /// Original cause, if one exists.
    #[source]
    pub source: Option<BoxedCause>,
}

impl ClientError {
    /// Create an error with no underlying cause.
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping an upstream cause.
    pub(crate) fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl Into<BoxedCause>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(source.into()),
        }
    }
}
