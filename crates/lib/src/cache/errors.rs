//! Cache error type.

use std::sync::Arc;

use thiserror::Error;

use super::retry::Retryable;

/// A fetch that failed after exhausting its retries.
///
/// The underlying error is shared, so every caller that waited on the same
/// fetch receives the same failure.
#[derive(Debug, Error)]
#[error("Fetch for {key} failed after {attempts} attempt(s)")]
pub struct CacheError<E: std::error::Error + 'static> {
    /// Debug rendering of the key.
    pub key: String,
    pub attempts: u32,
    #[source]
    source: Arc<E>,
}

impl<E: std::error::Error + 'static> CacheError<E> {
    pub fn new(key: String, attempts: u32, source: E) -> Self {
        Self {
            key,
            attempts,
            source: Arc::new(source),
        }
    }

    /// The error returned by the last attempt.
    pub fn source_error(&self) -> &E {
        &self.source
    }
}

impl<E: std::error::Error + Retryable + 'static> CacheError<E> {
    /// Whether the last failure was transient.
    pub fn is_transient(&self) -> bool {
        self.source.is_retryable()
    }
}

impl<E: std::error::Error + 'static> Clone for CacheError<E> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            attempts: self.attempts,
            source: Arc::clone(&self.source),
        }
    }
}
