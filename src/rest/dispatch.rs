//! The dispatch state machine.
//!
//! `Building -> Sending -> {Success, ClientError, RateLimited, Fatal}`,
//! where `RateLimited -> Sending` forms the retry loop. 429 is the only
//! status that is ever retried: the server names the exact wait, so the
//! loop sleeps `ceil(retry_after * 1000)` milliseconds and re-sends, at
//! most `retry_count` times. Transport faults and every other non-2xx
//! status are terminal on first sight.

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

use crate::codec::{self, Body};
use crate::error::{Error, RateLimitBody, Result};
use crate::transport::TransportRequest;

use super::client::RestClient;
use super::config::{DEFAULT_CONNECTION_TIMEOUT, RequestOptions};

impl RestClient {
    /// Executes one logical API call through to a single resolution.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP verb
    /// * `path` - fully-formed resource path (query string included),
    ///   appended verbatim to the configured base URL
    /// * `options` - per-call settings; unset fields fall back to the
    ///   client defaults, then to crate defaults
    /// * `body` - structured value to JSON-encode, or pre-encoded form text
    ///
    /// # Errors
    ///
    /// * [`Error::Transport`] - connection, timeout, or malformed-response
    ///   fault; never retried
    /// * [`Error::RateLimited`] - 429 with the retry budget spent, or whose
    ///   body named no positive `retry_after`
    /// * [`Error::Api`] - any other 4xx, with its decoded body
    /// * [`Error::UnexpectedStatus`] - anything outside 2xx/4xx
    /// * [`Error::Encode`] - the body could not be serialized
    #[instrument(
        name = "dispatch",
        skip(self, options, body),
        fields(method = %method, path = %path)
    )]
    pub async fn dispatch(
        &self,
        method: Method,
        path: &str,
        options: Option<&RequestOptions>,
        body: Option<Body>,
    ) -> Result<Value> {
        let resolved = match options {
            Some(options) => options.merged(&self.defaults),
            None => self.defaults.clone(),
        };
        let timeout = resolved
            .connection_timeout
            .unwrap_or(DEFAULT_CONNECTION_TIMEOUT);
        let policy = resolved.rate_limit.clone().unwrap_or_default();

        // Building: the body is encoded once and reused verbatim on retries
        let encoded = match &body {
            Some(body) => Some(codec::encode(body)?),
            None => None,
        };

        let mut headers = HeaderMap::new();
        if let Some(encoded) = &encoded {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(encoded.content_type));
            headers.insert(CONTENT_LENGTH, HeaderValue::from(encoded.content_length()));
        }
        if let Some(auth) = &resolved.authorization {
            let value = HeaderValue::from_str(auth.header_value())
                .map_err(|_| Error::InvalidAuthorization)?;
            headers.insert(AUTHORIZATION, value);
        }

        let url = format!("{}{}", self.config.base_url, path);
        debug!(
            timeout_ms = timeout.as_millis() as u64,
            retry_count = policy.retry_count,
            has_body = encoded.is_some(),
            "request built"
        );

        let mut attempts: u32 = 0;

        // Sending: one transport round trip per loop iteration
        loop {
            if let Some(limiter) = &self.limiter {
                limiter.wait().await;
            }

            let request = TransportRequest {
                url: &url,
                method: method.clone(),
                headers: &headers,
                timeout,
                body: encoded.as_ref().map(|encoded| encoded.text.as_str()),
            };
            // A transport fault fails the whole dispatch; retries are only
            // for server-paced rate limiting
            let response = self.transport.perform(request).await.map_err(|fault| {
                error!(error = %fault, "transport fault");
                Error::Transport(fault)
            })?;

            match response.status {
                status @ 200..=299 => {
                    debug!(status, attempts, "dispatch succeeded");
                    return Ok(codec::decode(response.body.as_deref()));
                }
                429 => {
                    let decoded = codec::decode(response.body.as_deref());
                    let limit: RateLimitBody =
                        serde_json::from_value(decoded).unwrap_or_default();

                    attempts += 1;
                    if let Some(callback) = &policy.callback {
                        callback(&limit, attempts);
                    }

                    match limit.retry_delay() {
                        Some(delay) if attempts <= policy.retry_count => {
                            warn!(
                                attempt = attempts,
                                retry_count = policy.retry_count,
                                delay_ms = delay.as_millis() as u64,
                                global = limit.global,
                                "rate limited, retrying after server-named delay"
                            );
                            sleep(delay).await;
                        }
                        _ => {
                            error!(
                                attempts,
                                retry_count = policy.retry_count,
                                "rate limited, not retrying"
                            );
                            return Err(Error::rate_limited(limit, attempts));
                        }
                    }
                }
                status @ 400..=499 => {
                    let decoded = codec::decode(response.body.as_deref());
                    error!(status, "client error");
                    return Err(Error::api(status, decoded));
                }
                status => {
                    // 1xx/3xx/5xx and anomalous codes: the body shape is
                    // undefined here, so it is not decoded
                    error!(status, "unexpected status");
                    return Err(Error::UnexpectedStatus(status));
                }
            }
        }
    }
}
