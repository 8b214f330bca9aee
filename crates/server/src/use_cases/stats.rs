//! Guild and player stats proxy.
//!
//! Same shape as the item proxy: the official API owns the data, the server
//! forwards lookups and caches responses briefly to absorb page refreshes.

use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::ports::{UpstreamError, WynncraftPort};
use wynnpool_domain::{Guild, PlayerStats};

pub struct StatsOps {
    wynncraft: Arc<dyn WynncraftPort>,
    guild_cache: TtlCache<String, Guild>,
    player_cache: TtlCache<String, PlayerStats>,
}

impl StatsOps {
    pub fn new(wynncraft: Arc<dyn WynncraftPort>, cache_ttl: Duration) -> Self {
        Self {
            wynncraft,
            guild_cache: TtlCache::new(cache_ttl),
            player_cache: TtlCache::new(cache_ttl),
        }
    }

    pub async fn guild(&self, name: &str) -> Result<Guild, UpstreamError> {
        let key = format!("name:{}", name.to_ascii_lowercase());
        self.guild_cache
            .get_or_try_insert_with(key, || self.wynncraft.get_guild(name))
            .await
    }

    pub async fn guild_by_prefix(&self, prefix: &str) -> Result<Guild, UpstreamError> {
        let key = format!("prefix:{}", prefix.to_ascii_lowercase());
        self.guild_cache
            .get_or_try_insert_with(key, || self.wynncraft.get_guild_by_prefix(prefix))
            .await
    }

    pub async fn player(&self, name: &str) -> Result<PlayerStats, UpstreamError> {
        self.player_cache
            .get_or_try_insert_with(name.to_ascii_lowercase(), || {
                self.wynncraft.get_player(name)
            })
            .await
    }

    pub async fn purge_expired(&self) -> usize {
        self.guild_cache.purge_expired().await + self.player_cache.purge_expired().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockWynncraftPort;
    use mockall::predicate::*;
    use serde_json::json;

    fn guild(name: &str) -> Guild {
        serde_json::from_value(json!({
            "name": name,
            "prefix": "ICo",
            "level": 100,
            "territories": 12,
            "wars": 4000,
            "members": {}
        }))
        .expect("valid guild json")
    }

    #[tokio::test]
    async fn guild_lookups_by_name_and_prefix_cache_separately() {
        let mut wynncraft = MockWynncraftPort::new();
        wynncraft
            .expect_get_guild()
            .with(eq("ICo"))
            .times(1)
            .returning(|name| Ok(guild(name)));
        wynncraft
            .expect_get_guild_by_prefix()
            .with(eq("ICo"))
            .times(1)
            .returning(|_| Ok(guild("Imperial Courier")));

        let ops = StatsOps::new(Arc::new(wynncraft), Duration::from_secs(60));
        // A guild named like another guild's prefix must not collide.
        let by_name = ops.guild("ICo").await.expect("by name");
        let by_prefix = ops.guild_by_prefix("ICo").await.expect("by prefix");
        assert_eq!(by_name.name, "ICo");
        assert_eq!(by_prefix.name, "Imperial Courier");

        // Repeats come from cache.
        ops.guild("ico").await.expect("cached by name");
        ops.guild_by_prefix("ico").await.expect("cached by prefix");
    }

    #[tokio::test]
    async fn player_lookup_is_cached_case_insensitively() {
        let mut wynncraft = MockWynncraftPort::new();
        wynncraft
            .expect_get_player()
            .times(1)
            .returning(|name| {
                Ok(serde_json::from_value(json!({
                    "username": name,
                    "online": true,
                    "rank": "Player"
                }))
                .expect("valid player json"))
            });

        let ops = StatsOps::new(Arc::new(wynncraft), Duration::from_secs(60));
        ops.player("Salted").await.expect("first fetch");
        let cached = ops.player("salted").await.expect("cached");
        assert_eq!(cached.username, "Salted");
    }

    #[tokio::test]
    async fn upstream_not_found_is_not_cached() {
        let mut wynncraft = MockWynncraftPort::new();
        wynncraft
            .expect_get_player()
            .times(2)
            .returning(|_| Err(UpstreamError::NotFound));

        let ops = StatsOps::new(Arc::new(wynncraft), Duration::from_secs(60));
        assert!(ops.player("ghost").await.is_err());
        assert!(ops.player("ghost").await.is_err());
    }
}
