//! Lootpool and raidpool queries.
//!
//! Pool contents come from the community tracker; the rotation week and its
//! window are computed locally and stamped onto every response. The upstream
//! timestamp is only cross-checked against the computed window.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::ports::{ClockPort, PoolPort, UpstreamError};
use wynnpool_domain::{rotation, DomainError, Lootpool, PoolWindow, Raidpool};

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// The current lootpool across all lootrun camps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LootpoolView {
    pub window: PoolWindow,
    pub regions: Vec<Lootpool>,
}

/// The current raidpool across all raids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaidpoolView {
    pub window: PoolWindow,
    pub raids: Vec<Raidpool>,
}

pub struct PoolOps {
    pool_api: Arc<dyn PoolPort>,
    clock: Arc<dyn ClockPort>,
    lootpool_cache: TtlCache<u32, LootpoolView>,
    raidpool_cache: TtlCache<u32, RaidpoolView>,
}

impl PoolOps {
    pub fn new(pool_api: Arc<dyn PoolPort>, clock: Arc<dyn ClockPort>, cache_ttl: Duration) -> Self {
        Self {
            pool_api,
            clock,
            lootpool_cache: TtlCache::new(cache_ttl),
            raidpool_cache: TtlCache::new(cache_ttl),
        }
    }

    pub async fn lootpool(&self) -> Result<LootpoolView, PoolError> {
        let window = self.current_window()?;
        self.lootpool_cache
            .get_or_try_insert_with(window.week, || async {
                let fetch = self.pool_api.lootpool().await?;
                check_upstream_window("lootpool", &window, fetch.upstream_timestamp);
                Ok(LootpoolView {
                    window,
                    regions: fetch.pools,
                })
            })
            .await
    }

    pub async fn raidpool(&self) -> Result<RaidpoolView, PoolError> {
        let window = self.current_window()?;
        self.raidpool_cache
            .get_or_try_insert_with(window.week, || async {
                let fetch = self.pool_api.raidpool().await?;
                check_upstream_window("raidpool", &window, fetch.upstream_timestamp);
                Ok(RaidpoolView {
                    window,
                    raids: fetch.pools,
                })
            })
            .await
    }

    fn current_window(&self) -> Result<PoolWindow, DomainError> {
        let week = rotation::current_week(self.clock.now())?;
        Ok(rotation::week_window(week))
    }

    pub async fn purge_expired(&self) -> usize {
        self.lootpool_cache.purge_expired().await + self.raidpool_cache.purge_expired().await
    }
}

/// The upstream timestamp is advisory; a mismatch means the tracker has not
/// caught up with the rotation yet and is worth a warning, nothing more.
fn check_upstream_window(
    kind: &str,
    window: &PoolWindow,
    upstream: Option<chrono::DateTime<chrono::Utc>>,
) {
    if let Some(ts) = upstream {
        if !window.contains(ts) {
            tracing::warn!(
                kind,
                week = window.week,
                upstream_timestamp = %ts,
                window_start = %window.start,
                "Upstream pool timestamp falls outside the computed rotation window"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{LootpoolFetch, MockPoolPort, RaidpoolFetch};
    use wynnpool_domain::PoolItems;

    fn clock_in_week(week: u32) -> Arc<FixedClock> {
        let t = rotation::week_window(week).start + chrono::Duration::hours(2);
        Arc::new(FixedClock(t))
    }

    fn lootpool_fetch() -> LootpoolFetch {
        LootpoolFetch {
            pools: vec![Lootpool {
                region: "Silent Expanse Expedition".to_string(),
                items: PoolItems {
                    mythic: vec!["Warp".to_string()],
                    ..PoolItems::default()
                },
            }],
            upstream_timestamp: None,
        }
    }

    #[tokio::test]
    async fn lootpool_is_stamped_with_the_current_week() {
        let mut pool_api = MockPoolPort::new();
        pool_api
            .expect_lootpool()
            .times(1)
            .returning(|| Ok(lootpool_fetch()));

        let ops = PoolOps::new(Arc::new(pool_api), clock_in_week(12), Duration::from_secs(300));

        let view = ops.lootpool().await.expect("lootpool");
        assert_eq!(view.window.week, 12);
        assert_eq!(view.window, rotation::week_window(12));
        assert_eq!(view.regions.len(), 1);
    }

    #[tokio::test]
    async fn lootpool_is_cached_per_week() {
        let mut pool_api = MockPoolPort::new();
        pool_api
            .expect_lootpool()
            .times(1)
            .returning(|| Ok(lootpool_fetch()));

        let ops = PoolOps::new(Arc::new(pool_api), clock_in_week(12), Duration::from_secs(300));
        ops.lootpool().await.expect("first");
        ops.lootpool().await.expect("cached");
    }

    #[tokio::test]
    async fn raidpool_carries_aspects() {
        let mut pool_api = MockPoolPort::new();
        pool_api.expect_raidpool().times(1).returning(|| {
            Ok(RaidpoolFetch {
                pools: vec![Raidpool {
                    raid: "The Nameless Anomaly".to_string(),
                    aspects: vec!["Aspect of the Void".to_string()],
                    items: PoolItems::default(),
                }],
                upstream_timestamp: None,
            })
        });

        let ops = PoolOps::new(Arc::new(pool_api), clock_in_week(3), Duration::from_secs(300));
        let view = ops.raidpool().await.expect("raidpool");
        assert_eq!(view.raids[0].aspects.len(), 1);
    }

    #[tokio::test]
    async fn clock_before_anchor_is_an_error() {
        let pool_api = MockPoolPort::new();
        let before = rotation::rotation_anchor() - chrono::Duration::days(1);
        let ops = PoolOps::new(
            Arc::new(pool_api),
            Arc::new(FixedClock(before)),
            Duration::from_secs(300),
        );

        assert!(matches!(
            ops.lootpool().await,
            Err(PoolError::Domain(DomainError::BeforeRotationAnchor { .. }))
        ));
    }

    #[tokio::test]
    async fn upstream_failure_propagates_and_is_not_cached() {
        let mut pool_api = MockPoolPort::new();
        pool_api
            .expect_lootpool()
            .times(2)
            .returning(|| Err(UpstreamError::RequestFailed("tracker down".to_string())));

        let ops = PoolOps::new(Arc::new(pool_api), clock_in_week(1), Duration::from_secs(300));
        assert!(ops.lootpool().await.is_err());
        assert!(ops.lootpool().await.is_err());
    }
}
