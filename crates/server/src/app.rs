//! Application state and composition.

use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::ports::{
    AspectRepo, ChangelogArchive, ClockPort, PoolPort, WeightRepo, WynncraftPort,
};
use crate::use_cases::{AspectOps, ChangelogOps, ItemOps, PoolOps, StatsOps, WeightOps};

/// Cache lifetimes for the proxy layers.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// Unfiltered aspect listings change only at game updates.
    pub aspect_ttl: Duration,
    /// Item lookups and searches proxied from the official API.
    pub item_ttl: Duration,
    /// Guild and player stats; short, these change while people play.
    pub stats_ttl: Duration,
    /// Pool responses; short, so a mid-week tracker correction shows up.
    pub pool_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            aspect_ttl: Duration::from_secs(24 * 60 * 60),
            item_ttl: Duration::from_secs(60 * 60),
            stats_ttl: Duration::from_secs(5 * 60),
            pool_ttl: Duration::from_secs(5 * 60),
        }
    }
}

/// Main application state.
///
/// Holds all use cases, passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub aspects: AspectOps,
    pub items: ItemOps,
    pub pools: PoolOps,
    pub weights: WeightOps,
    pub changelog: ChangelogOps,
    pub stats: StatsOps,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        weight_repo: Arc<dyn WeightRepo>,
        aspect_repo: Arc<dyn AspectRepo>,
        wynncraft: Arc<dyn WynncraftPort>,
        pool_api: Arc<dyn PoolPort>,
        archive: Arc<dyn ChangelogArchive>,
        clock: Arc<dyn ClockPort>,
        cache: CacheConfig,
    ) -> Self {
        Self {
            use_cases: UseCases {
                aspects: AspectOps::new(aspect_repo, wynncraft.clone(), cache.aspect_ttl),
                items: ItemOps::new(wynncraft.clone(), cache.item_ttl),
                pools: PoolOps::new(pool_api, clock.clone(), cache.pool_ttl),
                weights: WeightOps::new(weight_repo, clock),
                changelog: ChangelogOps::new(archive, wynncraft.clone()),
                stats: StatsOps::new(wynncraft, cache.stats_ttl),
            },
        }
    }

    /// Drop expired cache entries across all use cases. Returns the number
    /// of entries removed.
    pub async fn purge_expired_caches(&self) -> usize {
        self.use_cases.aspects.purge_expired().await
            + self.use_cases.items.purge_expired().await
            + self.use_cases.pools.purge_expired().await
            + self.use_cases.stats.purge_expired().await
    }
}
