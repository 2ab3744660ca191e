//! Bearer credentials for the HTTP store clients
//!
//! Tokens are obtained elsewhere; these types only attach them to requests.

use appenv_core::Result;
use async_trait::async_trait;
use std::fmt;

/// Supplies the `Authorization` header value for a request
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn authorization(&self) -> Result<String>;
}

/// A token that was already acquired
#[derive(Clone)]
pub struct StaticTokenProvider {
    header: String,
}

impl StaticTokenProvider {
    /// Accepts either a raw token or a full `Bearer ...` value
    pub fn new(token: impl AsRef<str>) -> Self {
        let trimmed = token.as_ref().trim();
        let header = if trimmed.to_ascii_lowercase().starts_with("bearer ") {
            trimmed.to_string()
        } else {
            format!("Bearer {trimmed}")
        };
        Self { header }
    }
}

impl fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("header", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn authorization(&self) -> Result<String> {
        Ok(self.header.clone())
    }
}
