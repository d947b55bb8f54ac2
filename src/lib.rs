//! Discord REST request engine.
//!
//! Turns a logical API call (method, path, optional body, optional per-call
//! settings) into a completed response or a definitive failure, handling
//! authorization, body encoding, transport faults, and server-imposed rate
//! limiting with bounded, server-paced retries.
//!
//! # Design
//!
//! - **Credential** ([`auth`]): token scheme plus secret, with the formatted
//!   `Authorization` header value cached and secrets wiped on drop.
//! - **Transport** ([`transport`]): one HTTPS round trip per invocation
//!   behind a trait, so tests script responses without a network.
//! - **Dispatcher** ([`rest`]): builds headers, classifies status codes, and
//!   drives the 429 retry loop. Only 429 is retried: the server names the
//!   exact wait, every other failure is terminal on first sight.
//! - **Codec** ([`codec`]): JSON or form encoding, lenient decoding that
//!   never fails.
//!
//! # Example
//!
//! ```rust,no_run
//! use discord_rest::prelude::*;
//!
//! # async fn example() -> discord_rest::Result<()> {
//! let mut client = RestClient::new(RestConfig::default())?;
//! client.set_default_options(
//!     RequestOptions::new().with_authorization(Authorization::bot("token")),
//! );
//!
//! let me = client.get("users/@me", None).await?;
//! println!("{me}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Global suppressions: these lints apply broadly and local annotations
// would outnumber the code they annotate.
// - module_name_repetitions: RestClient/RestConfig live in rest, etc.
// - missing_errors_doc / missing_panics_doc: documented where non-obvious
// - must_use_candidate: not every accessor needs #[must_use]
// - cast_possible_truncation / cast_sign_loss: millisecond conversions on
//   values bounded far below the truncation point
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

// Re-exports of external dependencies callers need at the API surface
pub use reqwest::Method;
pub use serde_json;

pub mod auth;
pub mod codec;
pub mod error;
pub mod logging;
pub mod rate_limiter;
pub mod rest;
pub mod transport;

pub use auth::{Authorization, TokenType};
pub use codec::{Body, EncodedBody};
pub use error::{Error, RateLimitBody, Result};
pub use rate_limiter::{RateLimiter, RateLimiterConfig};
pub use rest::{
    API_BASE, DEFAULT_CONNECTION_TIMEOUT, DEFAULT_RETRY_COUNT, RateLimitCallback, RateLimitPolicy,
    RequestOptions, RestClient, RestConfig,
};
pub use transport::{HttpsTransport, RawResponse, Transport, TransportError, TransportRequest};

/// Prelude module for convenient imports.
///
/// ```rust
/// use discord_rest::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{Authorization, TokenType};
    pub use crate::codec::Body;
    pub use crate::error::{Error, RateLimitBody, Result};
    pub use crate::logging::{LogConfig, LogFormat, LogLevel, init_logging, try_init_logging};
    pub use crate::rate_limiter::{RateLimiter, RateLimiterConfig};
    pub use crate::rest::{RateLimitPolicy, RequestOptions, RestClient, RestConfig};
    pub use crate::transport::{Transport, TransportError};
    pub use reqwest::Method;
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_and_name() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "discord-rest");
    }
}
