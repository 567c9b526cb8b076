//! Authentication module
//!
//! Trello authenticates with an API key and token passed as query
//! parameters on every request. The platform hands us both packed into a
//! single keyring string of the form `key=<api_key>&token=<token>`; the
//! parser here is the one place in the crate that string is taken apart.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;


static KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"key=([^&]+)").expect("valid regex"));
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"token=([^&]+)").expect("valid regex"));

/// Parsed Trello credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Trello API key
    pub api_key: String,
    /// Trello member token
    pub token: String,
}

impl Credentials {
    /// Create credentials from already-separated parts
    pub fn new(api_key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            token: token.into(),
        }
    }

    /// Parse a connection-data key string of the form
    /// `key=<api_key>&token=<token>`.
    ///
    /// Order of the two parameters does not matter; anything missing
    /// either parameter fails with [`Error::InvalidKeyFormat`].
    pub fn parse(key_string: &str) -> Result<Self> {
        let api_key = KEY_RE
            .captures(key_string)
            .and_then(|c| c.get(1))
            .ok_or(Error::InvalidKeyFormat)?;
        let token = TOKEN_RE
            .captures(key_string)
            .and_then(|c| c.get(1))
            .ok_or(Error::InvalidKeyFormat)?;

        Ok(Self {
            api_key: api_key.as_str().to_string(),
            token: token.as_str().to_string(),
        })
    }

    /// Query parameters carrying these credentials
    pub fn query_params(&self) -> [(&'static str, &str); 2] {
        [("key", self.api_key.as_str()), ("token", self.token.as_str())]
    }
}
