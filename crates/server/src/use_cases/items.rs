//! Item database proxy.
//!
//! The server never owns item data; it forwards lookups and searches to the
//! official API and caches responses for a configurable TTL.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::ports::{UpstreamError, WynncraftPort};

pub struct ItemOps {
    wynncraft: Arc<dyn WynncraftPort>,
    cache: TtlCache<String, Value>,
}

impl ItemOps {
    pub fn new(wynncraft: Arc<dyn WynncraftPort>, cache_ttl: Duration) -> Self {
        Self {
            wynncraft,
            cache: TtlCache::new(cache_ttl),
        }
    }

    pub async fn get(&self, name: &str) -> Result<Value, UpstreamError> {
        let key = format!("item:{}", name.to_ascii_lowercase());
        self.cache
            .get_or_try_insert_with(key, || self.wynncraft.get_item(name))
            .await
    }

    pub async fn search(&self, query: &str) -> Result<Value, UpstreamError> {
        let key = format!("search:{}", query.to_ascii_lowercase());
        self.cache
            .get_or_try_insert_with(key, || self.wynncraft.search_items(query))
            .await
    }

    pub async fn purge_expired(&self) -> usize {
        self.cache.purge_expired().await
    }
}
