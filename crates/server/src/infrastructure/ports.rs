//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the server. Everything else is concrete
//! types. Ports exist for:
//! - SQLite persistence (weights, aspects)
//! - The Wynncraft public API (could swap mirrors)
//! - The community pool API
//! - The changelog snapshot archive (filesystem today)
//! - Clock (for testing)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use wynnpool_domain::{
    Aspect, AspectClass, AspectFilter, ChangelogSummary, Guild, ItemSnapshot, Lootpool,
    PlayerStats, Raidpool, Weight, WeightId,
};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Not found")]
    NotFound,
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepoError {
    pub fn database(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Database(format!("{context}: {err}"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Upstream answered 404 for the requested resource.
    #[error("Not found upstream")]
    NotFound,
    #[error("Upstream request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("No archived version {0}")]
    VersionNotFound(String),
    #[error("Archive I/O error: {0}")]
    Io(String),
    #[error("Malformed snapshot {version}: {message}")]
    Malformed { version: String, message: String },
}

// =============================================================================
// Infrastructure Types
// =============================================================================

/// A pool fetch with the upstream's own rotation timestamp, when it sent one.
/// The server computes the authoritative week window itself; the upstream
/// timestamp is only cross-checked.
#[derive(Debug, Clone)]
pub struct LootpoolFetch {
    pub pools: Vec<Lootpool>,
    pub upstream_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct RaidpoolFetch {
    pub pools: Vec<Raidpool>,
    pub upstream_timestamp: Option<DateTime<Utc>>,
}

// =============================================================================
// Database Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeightRepo: Send + Sync {
    async fn get(&self, id: WeightId) -> Result<Option<Weight>, RepoError>;
    async fn list(&self) -> Result<Vec<Weight>, RepoError>;
    async fn list_for_item(&self, item_name: &str) -> Result<Vec<Weight>, RepoError>;
    async fn insert(&self, weight: &Weight) -> Result<(), RepoError>;
    async fn update(&self, weight: &Weight) -> Result<(), RepoError>;
    /// Errors with [`RepoError::NotFound`] when the id does not exist.
    async fn delete(&self, id: WeightId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AspectRepo: Send + Sync {
    async fn list(&self, filter: AspectFilter) -> Result<Vec<Aspect>, RepoError>;
    async fn get(&self, name: &str) -> Result<Option<Aspect>, RepoError>;
    /// Replace the whole aspect set atomically (sync path).
    async fn replace_all(&self, aspects: &[Aspect]) -> Result<(), RepoError>;
}

// =============================================================================
// Upstream API Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WynncraftPort: Send + Sync {
    /// Exact-name item lookup.
    async fn get_item(&self, name: &str) -> Result<Value, UpstreamError>;
    /// Upstream fuzzy search, response passed through.
    async fn search_items(&self, query: &str) -> Result<Value, UpstreamError>;
    /// The full item database, keyed by item name.
    async fn item_database(&self) -> Result<ItemSnapshot, UpstreamError>;
    async fn get_aspects(&self, class: AspectClass) -> Result<Vec<Aspect>, UpstreamError>;
    async fn get_guild(&self, name: &str) -> Result<Guild, UpstreamError>;
    async fn get_guild_by_prefix(&self, prefix: &str) -> Result<Guild, UpstreamError>;
    async fn get_player(&self, name: &str) -> Result<PlayerStats, UpstreamError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoolPort: Send + Sync {
    async fn lootpool(&self) -> Result<LootpoolFetch, UpstreamError>;
    async fn raidpool(&self) -> Result<RaidpoolFetch, UpstreamError>;
}

// =============================================================================
// Changelog Archive Port
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChangelogArchive: Send + Sync {
    /// Available versions, newest label first.
    async fn list_versions(&self) -> Result<Vec<ChangelogSummary>, ArchiveError>;
    async fn load(&self, version: &str) -> Result<ItemSnapshot, ArchiveError>;
    async fn store(&self, version: &str, snapshot: &ItemSnapshot) -> Result<(), ArchiveError>;
}

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
