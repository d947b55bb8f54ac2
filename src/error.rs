//! Error types for the request engine.
//!
//! The taxonomy mirrors how a dispatch can end:
//!
//! ```text
//! Error
//! ├── Transport        - connection/timeout/malformed-response faults, never retried
//! ├── RateLimited      - 429 after the retry budget is spent (or with no retry_after)
//! ├── Api              - any other 4xx, carries the decoded response body
//! ├── UnexpectedStatus - 3xx/5xx/anomalous codes, body intentionally undecoded
//! ├── Encode           - request body serialization failed before any I/O
//! └── InvalidAuthorization - credential not representable as a header value
//! ```
//!
//! All variants are `Send + Sync + 'static` so errors cross task boundaries
//! freely.

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias for all engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum length for error messages carried inside variants.
const MAX_ERROR_MESSAGE_LEN: usize = 1024;

/// Truncates a message to [`MAX_ERROR_MESSAGE_LEN`], marking the cut.
pub(crate) fn truncate_message(mut msg: String) -> String {
    if msg.len() > MAX_ERROR_MESSAGE_LEN {
        msg.truncate(MAX_ERROR_MESSAGE_LEN);
        msg.push_str("... (truncated)");
    }
    msg
}

/// Decoded body of a `429 Too Many Requests` response.
///
/// Deserialized leniently: a 429 whose body is missing, empty, or not the
/// expected shape decodes to the default value, which has no `retry_after`
/// and therefore never schedules a retry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RateLimitBody {
    /// Human-readable description from the server.
    #[serde(default)]
    pub message: String,
    /// Seconds to wait before retrying. Absent or non-positive means the
    /// dispatch must not retry.
    #[serde(default)]
    pub retry_after: Option<f64>,
    /// Whether the limit applies across the whole API rather than one route.
    #[serde(default)]
    pub global: bool,
}

impl RateLimitBody {
    /// Returns the server-mandated wait, if one was named and is positive.
    pub fn retry_delay(&self) -> Option<Duration> {
        let secs = self.retry_after.filter(|secs| *secs > 0.0)?;
        // ceil to whole milliseconds, matching the wire contract's resolution
        Some(Duration::from_millis((secs * 1000.0).ceil() as u64))
    }
}

/// The primary error type for the request engine.
///
/// # Example
///
/// ```rust
/// use discord_rest::Error;
///
/// let err = Error::UnexpectedStatus(502);
/// assert_eq!(err.status(), Some(502));
/// assert!(!err.is_transport());
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Transport-layer fault: no interpretable status code was obtained.
    #[error("transport fault: {0}")]
    Transport(#[from] TransportError),

    /// Rate limited (status 429) with the retry budget exhausted, or with a
    /// body that named no positive `retry_after`.
    #[error("rate limited after {attempts} attempt(s): {}", .body.message)]
    RateLimited {
        /// Decoded body of the final 429 response.
        body: RateLimitBody,
        /// Number of 429 responses observed during the dispatch.
        attempts: u32,
    },

    /// Client error (4xx other than 429) with its decoded body.
    #[error("API error: status {status}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, JSON-decoded where possible, raw text otherwise.
        body: Value,
    },

    /// Any status outside 2xx/4xx. The body is not decoded because its
    /// shape is undefined for these codes.
    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),

    /// The request body could not be serialized to JSON.
    #[error("request body encoding failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The credential's header value contains bytes not permitted in an
    /// HTTP header.
    #[error("authorization header contains invalid characters")]
    InvalidAuthorization,
}

impl Error {
    /// Creates an [`Error::Api`] from a status code and decoded body.
    pub fn api(status: u16, body: Value) -> Self {
        Self::Api { status, body }
    }

    /// Creates an [`Error::RateLimited`] from the final 429 body and the
    /// attempt count.
    pub fn rate_limited(body: RateLimitBody, attempts: u32) -> Self {
        Self::RateLimited { body, attempts }
    }

    /// The HTTP status code this error carries, if it reached that far.
    ///
    /// Transport faults and encoding failures happen before or instead of a
    /// status line and return `None`.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::Api { status, .. } => Some(*status),
            Self::UnexpectedStatus(status) => Some(*status),
            Self::Transport(_) | Self::Encode(_) | Self::InvalidAuthorization => None,
        }
    }

    /// Whether this is a transport-layer fault.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether this is a terminal rate-limit failure.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// The server-mandated wait carried by a terminal rate-limit failure.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { body, .. } => body.retry_delay(),
            _ => None,
        }
    }
}
