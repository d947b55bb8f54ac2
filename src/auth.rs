//! Authorization credentials.
//!
//! An [`Authorization`] owns a secret token and a token scheme, and keeps
//! the formatted `Authorization` header value cached so building a request
//! never re-formats it. The cache is recomputed synchronously on every
//! mutation, so a read after a set always observes the new value.
//!
//! Secret material (the token and the cached header, which embeds it) is
//! wiped from memory on drop, and `Debug`/`Display` output is redacted so
//! tokens cannot leak through logging.
//!
//! # Example
//!
//! ```rust
//! use discord_rest::{Authorization, TokenType};
//!
//! let mut auth = Authorization::bot("abc123");
//! assert_eq!(auth.header_value(), "Bot abc123");
//!
//! auth.set_token_type(TokenType::Bearer);
//! assert_eq!(auth.header_value(), "Bearer abc123");
//!
//! println!("{auth:?}"); // [REDACTED]
//! ```

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Scheme prefix of the `Authorization` header.
///
/// The "no scheme" case is a proper variant rather than an empty string, so
/// the bare-token form cannot be produced by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenType {
    /// `Bot <token>` - bot tokens.
    #[default]
    Bot,
    /// `Bearer <token>` - OAuth2 bearer tokens.
    Bearer,
    /// Bare token with no scheme prefix.
    None,
}

impl TokenType {
    /// The scheme text placed before the token, if any.
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            TokenType::Bot => Some("Bot"),
            TokenType::Bearer => Some("Bearer"),
            TokenType::None => None,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix().unwrap_or(""))
    }
}

/// A secret token plus its scheme, with the formatted header value cached.
///
/// Owned by a single caller context; concurrent mutation from multiple call
/// sites is the caller's responsibility to serialize.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Authorization {
    #[zeroize(skip)]
    token_type: TokenType,
    token: String,
    header: String,
}

impl Authorization {
    /// Creates a credential with an explicit scheme.
    pub fn new(token: impl Into<String>, token_type: TokenType) -> Self {
        let mut auth = Self {
            token_type,
            token: token.into(),
            header: String::new(),
        };
        auth.refresh();
        auth
    }

    /// Creates a `Bot`-scheme credential.
    pub fn bot(token: impl Into<String>) -> Self {
        Self::new(token, TokenType::Bot)
    }

    /// Creates a `Bearer`-scheme credential.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new(token, TokenType::Bearer)
    }

    /// Recomputes the cached header value from the current scheme and token.
    fn refresh(&mut self) {
        // zeroize before reassigning so the old formatted value (which
        // embeds the token) does not linger in a dropped buffer
        self.header.zeroize();
        self.header = match self.token_type.prefix() {
            Some(prefix) => format!("{prefix} {}", self.token),
            None => self.token.clone(),
        };
    }

    /// Current token scheme.
    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    /// Current secret token.
    ///
    /// Use the returned reference immediately; do not persist it.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The formatted `Authorization` header value.
    ///
    /// Equals the bare token when the scheme is [`TokenType::None`],
    /// otherwise `"{scheme} {token}"`. Never stale relative to the last
    /// `set_token_type`/`set_token` call.
    pub fn header_value(&self) -> &str {
        &self.header
    }

    /// Replaces the scheme and recomputes the header value.
    pub fn set_token_type(&mut self, token_type: TokenType) {
        self.token_type = token_type;
        self.refresh();
    }

    /// Replaces the token and recomputes the header value.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token.zeroize();
        self.token = token.into();
        self.refresh();
    }
}

// Prevent accidental logging of the token
impl fmt::Debug for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
