//! Aspect listing, lookup, and the upstream sync.

use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::ports::{AspectRepo, RepoError, UpstreamError, WynncraftPort};
use wynnpool_domain::{Aspect, AspectClass, AspectFilter};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Aspect operations.
///
/// The unfiltered listing is cached for a fixed wall-clock TTL (24 h in
/// production); any non-empty filter bypasses the cache and hits the store
/// directly. The key space is the filter tuple, so in practice the cache
/// holds a single entry.
pub struct AspectOps {
    repo: Arc<dyn AspectRepo>,
    wynncraft: Arc<dyn WynncraftPort>,
    cache: TtlCache<AspectFilter, Vec<Aspect>>,
}

impl AspectOps {
    pub fn new(
        repo: Arc<dyn AspectRepo>,
        wynncraft: Arc<dyn WynncraftPort>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            repo,
            wynncraft,
            cache: TtlCache::new(cache_ttl),
        }
    }

    /// List aspects, serving the unfiltered listing from cache.
    pub async fn list(&self, filter: AspectFilter) -> Result<Vec<Aspect>, RepoError> {
        if !filter.is_empty() {
            return self.repo.list(filter).await;
        }
        self.cache
            .get_or_try_insert_with(filter, || self.repo.list(filter))
            .await
    }

    pub async fn get(&self, name: &str) -> Result<Option<Aspect>, RepoError> {
        self.repo.get(name).await
    }

    /// Pull the aspect database for every class from the official API and
    /// replace the stored set. Returns how many aspects were synced.
    pub async fn sync(&self) -> Result<usize, SyncError> {
        let mut all = Vec::new();
        for class in AspectClass::all() {
            let mut aspects = self.wynncraft.get_aspects(class).await?;
            tracing::info!(class = %class, count = aspects.len(), "Fetched aspects");
            all.append(&mut aspects);
        }
        self.repo.replace_all(&all).await?;
        self.cache.invalidate(&AspectFilter::default()).await;
        Ok(all.len())
    }

    pub async fn purge_expired(&self) -> usize {
        self.cache.purge_expired().await
    }
}
