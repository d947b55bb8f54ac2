//! Transport layer: one HTTPS round trip per invocation.
//!
//! The [`Transport`] trait is the seam between the dispatcher and the
//! network. An implementation performs exactly one outbound request for a
//! fully-formed [`TransportRequest`], streams the response body to
//! completion, and resolves to the raw status code plus raw body text. It
//! never interprets content and never retries; every fault is a distinct
//! terminal [`TransportError`].

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use crate::error::truncate_message;

/// Default `User-Agent` sent by [`HttpsTransport`].
pub const USER_AGENT: &str = concat!("discord-rest/", env!("CARGO_PKG_VERSION"));

/// Raw outcome of one round trip: status code plus unparsed body text.
///
/// `body` is `None` when the response carried no payload. A response with
/// no obtainable status code never reaches this type; that case is a
/// [`TransportError::UnknownResponse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Full response body, concatenated from all received chunks.
    pub body: Option<String>,
}

/// A fully-formed request handed to a [`Transport`].
#[derive(Debug)]
pub struct TransportRequest<'a> {
    /// Absolute target URL.
    pub url: &'a str,
    /// HTTP method.
    pub method: Method,
    /// Complete header set; the transport adds nothing semantic.
    pub headers: &'a HeaderMap,
    /// Budget for the whole round trip.
    pub timeout: Duration,
    /// Encoded body text, if the request carries one.
    pub body: Option<&'a str>,
}

/// Terminal transport faults. None of these is retried at this layer.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    /// No status code could be obtained from the remote peer.
    #[error("unknown response: {0}")]
    UnknownResponse(String),

    /// The response stream ended without completing normally.
    #[error("response error: {0}")]
    Incomplete(String),

    /// The round trip exceeded the configured timeout.
    #[error("request timeout")]
    Timeout,

    /// Connection-level failure (socket, DNS, TLS).
    #[error("connection failed: {0}")]
    Connection(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connection(truncate_message(e.to_string()))
        } else if e.is_body() || e.is_decode() {
            TransportError::Incomplete(truncate_message(e.to_string()))
        } else {
            TransportError::UnknownResponse(truncate_message(e.to_string()))
        }
    }
}

/// Performs one network round trip for a fully-formed request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues the request and resolves once the response body has been
    /// received in full.
    ///
    /// # Errors
    ///
    /// Rejects with a [`TransportError`] on any connection, timeout, or
    /// malformed-response condition. No partial response is ever delivered.
    async fn perform(
        &self,
        request: TransportRequest<'_>,
    ) -> std::result::Result<RawResponse, TransportError>;
}

/// Production transport backed by `reqwest`.
///
/// Each `perform` call is one logical connection; any pooling underneath is
/// an internal optimization with no observable semantics.
#[derive(Debug)]
pub struct HttpsTransport {
    client: Client,
}

impl HttpsTransport {
    /// Creates a transport with the default user agent.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connection`] if the underlying client
    /// cannot be constructed (for example, no TLS backend available).
    pub fn new() -> std::result::Result<Self, TransportError> {
        Self::with_user_agent(USER_AGENT)
    }

    /// Creates a transport with a custom user agent.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connection`] if the underlying client
    /// cannot be constructed.
    pub fn with_user_agent(user_agent: &str) -> std::result::Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::Connection(truncate_message(e.to_string())))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpsTransport {
    async fn perform(
        &self,
        request: TransportRequest<'_>,
    ) -> std::result::Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url)
            .headers(request.headers.clone())
            .timeout(request.timeout);

        if let Some(body) = request.body {
            builder = builder.body(body.to_owned());
        }

        let response = builder.send().await.map_err(|e| {
            let fault = TransportError::from(e);
            error!(error = %fault, "request send failed");
            fault
        })?;

        let status = response.status().as_u16();

        let mut stream = response.bytes_stream();
        let mut data = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| TransportError::Incomplete(truncate_message(e.to_string())))?;
            data.extend_from_slice(&chunk);
        }

        debug!(status, body_length = data.len(), "response received");

        let body = if data.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&data).into_owned())
        };

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_creation() {
        assert!(HttpsTransport::new().is_ok());
        assert!(HttpsTransport::with_user_agent("custom-agent/0.1").is_ok());
    }

    #[test]
    fn transport_error_display() {
        assert_eq!(TransportError::Timeout.to_string(), "request timeout");
        assert_eq!(
            TransportError::Incomplete("stream reset".to_string()).to_string(),
            "response error: stream reset"
        );
        assert!(
            TransportError::Connection("refused".to_string())
                .to_string()
                .contains("refused")
        );
    }

    #[test]
    fn raw_response_equality() {
        let a = RawResponse {
            status: 200,
            body: Some("{}".to_string()),
        };
        let b = a.clone();
        assert_eq!(a, b);
    }
}
