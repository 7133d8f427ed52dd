//! Process-wide bearer token holder for the X API
//!
//! Starts empty, is populated by the first successful client-credentials
//! exchange, and is reused until the process exits. There is no TTL.
//! Concurrent callers that arrive while the first exchange is in flight wait
//! on it instead of starting their own; a failed exchange leaves the cache
//! empty so the next caller retries.

use std::future::Future;

use tokio::sync::OnceCell;

#[derive(Debug, Default)]
pub struct BearerTokenCache {
    token: OnceCell<String>,
}

impl BearerTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache that is already populated, so no exchange ever runs.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: OnceCell::new_with(Some(token.into())),
        }
    }

    pub fn cached(&self) -> Option<&str> {
        self.token.get().map(String::as_str)
    }

    /// Return the cached token, running `fetch` only if none is held yet.
    pub async fn get_or_fetch<F, Fut, E>(&self, fetch: F) -> Result<&str, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        self.token
            .get_or_try_init(fetch)
            .await
            .map(String::as_str)
    }
}
