//! Weekly rotating loot and raid reward pools.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The rotation week a pool belongs to. Half-open: `start <= t < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolWindow {
    pub week: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PoolWindow {
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

/// The week's shiny mythic and the stat it tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShinyItem {
    pub item: String,
    pub tracker: String,
}

/// Obtainable items for one region or raid, bucketed by rarity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolItems {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shiny: Option<ShinyItem>,
    #[serde(default)]
    pub mythic: Vec<String>,
    #[serde(default)]
    pub fabled: Vec<String>,
    #[serde(default)]
    pub legendary: Vec<String>,
    #[serde(default)]
    pub rare: Vec<String>,
    #[serde(default)]
    pub unique: Vec<String>,
}

/// One lootrun camp's pool for a given week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lootpool {
    pub region: String,
    pub items: PoolItems,
}

/// One raid's reward pool for a given week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Raidpool {
    pub raid: String,
    /// Aspect names obtainable from the raid this week.
    #[serde(default)]
    pub aspects: Vec<String>,
    pub items: PoolItems,
}
