//! Client construction and the verb helpers the endpoint catalog calls.

use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;

use crate::codec::Body;
use crate::error::Result;
use crate::rate_limiter::RateLimiter;
use crate::transport::{HttpsTransport, Transport};

use super::config::{RequestOptions, RestConfig};

/// The request engine.
///
/// Owns the API base, the transport, client-level default options, and an
/// optional send pacer. One instance serves any number of concurrent
/// dispatches; each dispatch is an independent state machine.
pub struct RestClient {
    pub(super) config: RestConfig,
    pub(super) transport: Arc<dyn Transport>,
    pub(super) defaults: RequestOptions,
    pub(super) limiter: Option<RateLimiter>,
}

impl RestClient {
    /// Creates a client with the built-in HTTPS transport.
    ///
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be constructed.
    pub fn new(config: RestConfig) -> Result<Self> {
        let transport = HttpsTransport::with_user_agent(&config.user_agent)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a client over an injected [`Transport`].
    ///
    /// This is the seam tests use to script responses without a network.
    pub fn with_transport(config: RestConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            defaults: RequestOptions::default(),
            limiter: None,
        }
    }

    /// Replaces the client-level default options.
    ///
    /// Per-call options override these field-by-field; a per-call field left
    /// unset takes the default's value.
    pub fn set_default_options(&mut self, options: RequestOptions) {
        self.defaults = options;
    }

    /// Current client-level default options.
    pub fn default_options(&self) -> &RequestOptions {
        &self.defaults
    }

    /// Attaches a shared send pacer.
    ///
    /// Every dispatch then waits for a token before each send. The pacer
    /// never changes how a dispatch classifies responses or retries.
    pub fn set_rate_limiter(&mut self, limiter: RateLimiter) {
        self.limiter = Some(limiter);
    }

    /// Client configuration.
    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Dispatches a GET request.
    pub async fn get(&self, path: &str, options: Option<&RequestOptions>) -> Result<Value> {
        self.dispatch(Method::GET, path, options, None).await
    }

    /// Dispatches a POST request.
    pub async fn post(
        &self,
        path: &str,
        options: Option<&RequestOptions>,
        body: Option<Body>,
    ) -> Result<Value> {
        self.dispatch(Method::POST, path, options, body).await
    }

    /// Dispatches a PUT request.
    pub async fn put(
        &self,
        path: &str,
        options: Option<&RequestOptions>,
        body: Option<Body>,
    ) -> Result<Value> {
        self.dispatch(Method::PUT, path, options, body).await
    }

    /// Dispatches a PATCH request.
    pub async fn patch(
        &self,
        path: &str,
        options: Option<&RequestOptions>,
        body: Option<Body>,
    ) -> Result<Value> {
        self.dispatch(Method::PATCH, path, options, body).await
    }

    /// Dispatches a DELETE request.
    pub async fn delete(&self, path: &str, options: Option<&RequestOptions>) -> Result<Value> {
        self.dispatch(Method::DELETE, path, options, None).await
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("config", &self.config)
            .field("defaults", &self.defaults)
            .field("limiter", &self.limiter.is_some())
            .finish_non_exhaustive()
    }
}
