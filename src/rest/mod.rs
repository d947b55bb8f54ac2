//! The request engine core.
//!
//! Turns a logical API call (method, path, optional body, optional per-call
//! settings) into a completed response or a definitive failure:
//!
//! - headers are built from the encoded body and the resolved credential,
//! - one [`Transport`](crate::transport::Transport) round trip per attempt,
//! - the status code is classified, and 429 responses drive a bounded,
//!   server-paced retry loop.
//!
//! # Example
//!
//! ```rust,no_run
//! use discord_rest::{Authorization, RequestOptions, RestClient, RestConfig};
//!
//! # async fn example() -> discord_rest::Result<()> {
//! let mut client = RestClient::new(RestConfig::default())?;
//! client.set_default_options(
//!     RequestOptions::new().with_authorization(Authorization::bot("token")),
//! );
//!
//! let channel = client.get("channels/1012", None).await?;
//! println!("{channel}");
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod dispatch;


pub use client::RestClient;
pub use config::{
    API_BASE, DEFAULT_CONNECTION_TIMEOUT, DEFAULT_RETRY_COUNT, RateLimitCallback, RateLimitPolicy,
    RequestOptions, RestConfig,
};
