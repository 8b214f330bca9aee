//! Wynncraft public API client (v3).

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::infrastructure::ports::{UpstreamError, WynncraftPort};
use wynnpool_domain::{Aspect, AspectClass, AspectTier, Guild, ItemSnapshot, PlayerStats};

/// Default base URL of the official API.
pub const DEFAULT_WYNNCRAFT_BASE_URL: &str = "https://api.wynncraft.com";

/// Client for the official Wynncraft API.
#[derive(Clone)]
pub struct WynncraftClient {
    client: Client,
    base_url: String,
}

impl WynncraftClient {
    pub fn new(base_url: &str) -> Self {
        // Upstream answers quickly or not at all; keep the timeout short.
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json(&self, path: &str) -> Result<Value, UpstreamError> {
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
                "wynncraft api returned {status}"
            ))),
        }
    }
}

#[async_trait]
impl WynncraftPort for WynncraftClient {
    async fn get_item(&self, name: &str) -> Result<Value, UpstreamError> {
        // The v3 item API only exposes search; an exact lookup is a search
        // whose result map contains the requested name as a key.
        let results = self.search_items(name).await?;
        let matched = results
            .as_object()
            .and_then(|map| {
                map.iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, item)| item.clone())
            });
        matched.ok_or(UpstreamError::NotFound)
    }

    async fn search_items(&self, query: &str) -> Result<Value, UpstreamError> {
        self.get_json(&format!("/v3/item/search/{}", encode_segment(query)))
            .await
    }

    async fn item_database(&self) -> Result<ItemSnapshot, UpstreamError> {
        let value = self.get_json("/v3/item/database?fullResult").await?;
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(UpstreamError::InvalidResponse(format!(
                "expected an item map, got {other}"
            ))),
        }
    }

    async fn get_aspects(&self, class: AspectClass) -> Result<Vec<Aspect>, UpstreamError> {
        let value = self
            .get_json(&format!("/v3/aspects/{}", class.api_name()))
            .await?;
        let map: BTreeMap<String, AspectDto> = serde_json::from_value(value)
            .map_err(|e| UpstreamError::InvalidResponse(e.to_string()))?;
        Ok(map
            .into_iter()
            .map(|(name, dto)| dto.into_aspect(name, class))
            .collect())
    }

    async fn get_guild(&self, name: &str) -> Result<Guild, UpstreamError> {
        let value = self
            .get_json(&format!("/v3/guild/{}", encode_segment(name)))
            .await?;
        serde_json::from_value(value).map_err(|e| UpstreamError::InvalidResponse(e.to_string()))
    }

    async fn get_guild_by_prefix(&self, prefix: &str) -> Result<Guild, UpstreamError> {
        let value = self
            .get_json(&format!("/v3/guild/prefix/{}", encode_segment(prefix)))
            .await?;
        serde_json::from_value(value).map_err(|e| UpstreamError::InvalidResponse(e.to_string()))
    }

    async fn get_player(&self, name: &str) -> Result<PlayerStats, UpstreamError> {
        let value = self
            .get_json(&format!("/v3/player/{}?fullResult", encode_segment(name)))
            .await?;
        serde_json::from_value(value).map_err(|e| UpstreamError::InvalidResponse(e.to_string()))
    }
}

/// Percent-encode a path segment. Names and queries come from user input and
/// may contain spaces or apostrophes.
fn encode_segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

// =============================================================================
// Upstream DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
struct AspectDto {
    rarity: String,
    #[serde(default)]
    icon: Option<Value>,
    #[serde(default, rename = "requiredAbility")]
    required_ability: Option<String>,
    #[serde(default)]
    tiers: BTreeMap<String, AspectTierDto>,
}

#[derive(Debug, Deserialize)]
struct AspectTierDto {
    #[serde(default)]
    threshold: Option<u32>,
    #[serde(default)]
    description: Value,
}

impl AspectDto {
    fn into_aspect(self, name: String, class: AspectClass) -> Aspect {
        let rarity = self.rarity.parse().unwrap_or_else(|_| {
            tracing::warn!(aspect = %name, rarity = %self.rarity, "Unknown aspect rarity, defaulting to Legendary");
            wynnpool_domain::AspectRarity::Legendary
        });

        let mut tiers: Vec<AspectTier> = self
            .tiers
            .into_iter()
            .enumerate()
            .map(|(index, (_, tier))| AspectTier {
                threshold: tier.threshold.unwrap_or(index as u32 + 1),
                description: render_description(tier.description),
            })
            .collect();
        tiers.sort_by_key(|t| t.threshold);

        Aspect {
            name,
            class,
            rarity,
            icon: self.icon.and_then(icon_name),
            required_ability: self.required_ability,
            tiers,
        }
    }
}

/// Tier descriptions arrive either as a plain string or a list of lines.
fn render_description(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Array(lines) => lines
            .into_iter()
            .filter_map(|line| match line {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

/// Icons arrive either as a plain texture name or a nested attribute object.
fn icon_name(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Object(map) => map
            .get("value")
            .and_then(|v| v.get("name"))
            .or_else(|| map.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}
