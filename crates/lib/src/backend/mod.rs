//! Remote data backend.
//!
//! The dashboard's data lives in a spreadsheet exposed through an Apps Script
//! web app. This module names the calls it supports ([`Operation`]), performs
//! them ([`AppsScriptClient`]), and gives typed views over the responses
//! ([`records`]). [`BackendCache`] puts a [`FetchCache`] in front of any
//! [`DataSource`].

pub mod client;
pub mod errors;
pub mod operation;
pub mod records;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

pub use client::{AppsScriptClient, DataSource, upstream_error};
pub use errors::BackendError;
pub use operation::Operation;
pub use records::{LeaderboardEntry, MonthlyBreakdown, RepDetail, Transaction, UserRecord};

use crate::{
    cache::{FetchCache, Fetcher},
    clock::Clock,
    config::CacheConfig,
};

/// Adapts a [`DataSource`] to the cache's [`Fetcher`] interface.
#[derive(Clone)]
pub struct SourceFetcher {
    source: Arc<dyn DataSource>,
}

impl SourceFetcher {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Fetcher for SourceFetcher {
    type Key = Operation;
    type Value = Arc<Value>;
    type Error = BackendError;

    async fn fetch(&self, operation: &Operation) -> Result<Arc<Value>, BackendError> {
        self.source.fetch(operation).await.map(Arc::new)
    }
}

/// Cache of backend responses keyed by operation.
pub type BackendCache = FetchCache<SourceFetcher>;

pub fn backend_cache(
    source: Arc<dyn DataSource>,
    config: &CacheConfig,
    clock: Arc<dyn Clock>,
) -> BackendCache {
    FetchCache::new(SourceFetcher::new(source), config, clock)
}
