//! Client configuration and per-call request options.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::Authorization;
use crate::error::RateLimitBody;

/// Root of the REST API. Every dispatch path is appended to this verbatim.
pub const API_BASE: &str = "https://discord.com/api/v10/";

/// Round-trip budget applied when no per-call or client default is set.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_millis(5000);

/// Rate-limit retry budget applied when no policy is set.
pub const DEFAULT_RETRY_COUNT: u32 = 5;

/// Client-level configuration.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// API base the opaque path string is concatenated onto.
    pub base_url: String,
    /// `User-Agent` header value for the built-in transport.
    pub user_agent: String,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE.to_string(),
            user_agent: crate::transport::USER_AGENT.to_string(),
        }
    }
}

impl RestConfig {
    /// Configuration pointing at a non-default base URL (proxies, mocks).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// Observer invoked once per 429 response with the decoded body and the
/// attempt count. Purely informational; its return cannot alter the retry
/// decision.
pub type RateLimitCallback = Arc<dyn Fn(&RateLimitBody, u32) + Send + Sync>;

/// How a dispatch reacts to 429 responses.
#[derive(Clone)]
pub struct RateLimitPolicy {
    /// Maximum number of retries performed before the dispatch fails with
    /// the last decoded 429 body.
    pub retry_count: u32,
    /// Optional per-attempt observer.
    pub callback: Option<RateLimitCallback>,
}

impl RateLimitPolicy {
    /// Policy with a custom retry budget and no observer.
    pub fn with_retry_count(retry_count: u32) -> Self {
        Self {
            retry_count,
            callback: None,
        }
    }

    /// Attaches an observer.
    #[must_use]
    pub fn with_callback(mut self, callback: RateLimitCallback) -> Self {
        self.callback = Some(callback);
        self
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            retry_count: DEFAULT_RETRY_COUNT,
            callback: None,
        }
    }
}

impl fmt::Debug for RateLimitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimitPolicy")
            .field("retry_count", &self.retry_count)
            .field("callback", &self.callback.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Per-call settings, consumed entirely within one dispatch.
///
/// Every field is optional. Unset fields fall back to the client's default
/// options, then to the crate defaults (5000 ms timeout, 5 retries, no
/// credential).
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Credential whose header value is attached to the request.
    pub authorization: Option<Authorization>,
    /// Budget for each network round trip.
    pub connection_timeout: Option<Duration>,
    /// Reaction to 429 responses.
    pub rate_limit: Option<RateLimitPolicy>,
}

impl RequestOptions {
    /// Empty options: every field falls back to defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the credential.
    #[must_use]
    pub fn with_authorization(mut self, authorization: Authorization) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// Sets the round-trip timeout.
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = Some(timeout);
        self
    }

    /// Sets the rate-limit policy.
    #[must_use]
    pub fn with_rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limit = Some(policy);
        self
    }

    /// Field-by-field fallback onto `defaults`: a field set here wins, an
    /// unset field takes the default's value.
    pub(crate) fn merged(&self, defaults: &RequestOptions) -> RequestOptions {
        RequestOptions {
            authorization: self
                .authorization
                .clone()
                .or_else(|| defaults.authorization.clone()),
            connection_timeout: self.connection_timeout.or(defaults.connection_timeout),
            rate_limit: self.rate_limit.clone().or_else(|| defaults.rate_limit.clone()),
        }
    }
}
