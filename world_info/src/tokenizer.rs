//! Token counting seam.
//!
//! The engine never tokenizes text itself; callers inject a [`TokenCounter`].
//! Two implementations ship with the crate: a character heuristic for tests
//! and offline use, and a memoizing wrapper for expensive counters.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::error::TokenizerError;

/// Asynchronous token counting oracle.
#[async_trait]
pub trait TokenCounter: Send + Sync {
    /// Count the tokens in `text`.
    async fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError>;
}

/// Estimates 1 token per 4 characters, rounding up.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenCounter;

impl HeuristicTokenCounter {
    pub fn estimate(text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}

#[async_trait]
impl TokenCounter for HeuristicTokenCounter {
    async fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError> {
        Ok(Self::estimate(text))
    }
}

/// Memoizes the counts of an inner counter.
///
/// The cache belongs to the caller; share one instance across generations to
/// avoid recounting unchanged entries.
pub struct CachedTokenCounter<C> {
    inner: C,
    cache: Mutex<HashMap<String, usize>>,
}

impl<C: TokenCounter> CachedTokenCounter<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached texts.
    pub async fn cached_len(&self) -> usize {
        self.cache.lock().await.len()
    }
}

#[async_trait]
impl<C: TokenCounter> TokenCounter for CachedTokenCounter<C> {
    async fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError> {
        if let Some(count) = self.cache.lock().await.get(text) {
            return Ok(*count);
        }

        // Failures are not cached.
        let count = self.inner.count_tokens(text).await?;
        self.cache.lock().await.insert(text.to_string(), count);
        Ok(count)
    }
}
