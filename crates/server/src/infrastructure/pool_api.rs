//! Community pool API client.
//!
//! The community tracker publishes the current lootpool and raidpool as one
//! JSON document per pool kind, keyed by region/raid with PascalCase rarity
//! buckets and a unix timestamp of the rotation it was scraped in.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::infrastructure::ports::{LootpoolFetch, PoolPort, RaidpoolFetch, UpstreamError};
use wynnpool_domain::{Lootpool, PoolItems, Raidpool, ShinyItem};

/// Client for the community pool tracker API.
#[derive(Clone)]
pub struct PoolApiClient {
    client: Client,
    base_url: String,
}

impl PoolApiClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, path: &str) -> Result<PoolDocument, UpstreamError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(|e| UpstreamError::RequestFailed(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(UpstreamError::NotFound),
            status if status.is_success() => response
                .json()
                .await
                .map_err(|e| UpstreamError::InvalidResponse(e.to_string())),
            status => Err(UpstreamError::RequestFailed(format!(
                "pool api returned {status}"
            ))),
        }
    }
}

#[async_trait]
impl PoolPort for PoolApiClient {
    async fn lootpool(&self) -> Result<LootpoolFetch, UpstreamError> {
        let doc = self.fetch("/lootpool").await?;
        let upstream_timestamp = doc.timestamp();
        let pools = doc
            .loot
            .into_iter()
            .map(|(region, buckets)| Lootpool {
                region,
                items: buckets.into_items(),
            })
            .collect();
        Ok(LootpoolFetch {
            pools,
            upstream_timestamp,
        })
    }

    async fn raidpool(&self) -> Result<RaidpoolFetch, UpstreamError> {
        let doc = self.fetch("/raidpool").await?;
        let upstream_timestamp = doc.timestamp();
        let pools = doc
            .loot
            .into_iter()
            .map(|(raid, mut buckets)| Raidpool {
                raid,
                aspects: std::mem::take(&mut buckets.aspects),
                items: buckets.into_items(),
            })
            .collect();
        Ok(RaidpoolFetch {
            pools,
            upstream_timestamp,
        })
    }
}

// =============================================================================
// Upstream DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
struct PoolDocument {
    #[serde(rename = "Loot", default)]
    loot: BTreeMap<String, BucketsDto>,
    #[serde(rename = "Timestamp", default)]
    timestamp: Option<i64>,
}

impl PoolDocument {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .and_then(|unix| Utc.timestamp_opt(unix, 0).single())
    }
}

#[derive(Debug, Deserialize)]
struct BucketsDto {
    #[serde(rename = "Shiny", default)]
    shiny: Option<ShinyDto>,
    #[serde(rename = "Aspects", default)]
    aspects: Vec<String>,
    #[serde(rename = "Mythic", default)]
    mythic: Vec<String>,
    #[serde(rename = "Fabled", default)]
    fabled: Vec<String>,
    #[serde(rename = "Legendary", default)]
    legendary: Vec<String>,
    #[serde(rename = "Rare", default)]
    rare: Vec<String>,
    #[serde(rename = "Unique", default)]
    unique: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ShinyDto {
    #[serde(rename = "Item")]
    item: String,
    #[serde(rename = "Tracker")]
    tracker: String,
}

impl BucketsDto {
    fn into_items(self) -> PoolItems {
        PoolItems {
            shiny: self.shiny.map(|s| ShinyItem {
                item: s.item,
                tracker: s.tracker,
            }),
            mythic: self.mythic,
            fabled: self.fabled,
            legendary: self.legendary,
            rare: self.rare,
            unique: self.unique,
        }
    }
}
