//! HTTP routes.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use uuid::Uuid;

use crate::app::App;
use crate::infrastructure::ports::{ArchiveError, RepoError, UpstreamError};
use crate::use_cases::{
    aspects::SyncError, changelog::ChangelogError, pools::PoolError, weights::WeightError,
};
use wynnpool_domain::{
    Aspect, AspectClass, AspectFilter, AspectRarity, ChangelogDiff, ChangelogSummary, Guild,
    ItemSnapshot, PlayerStats, ScoreBreakdown, Weight, WeightDraft, WeightId,
};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/aspects", get(list_aspects))
        .route("/api/aspects/sync", post(sync_aspects))
        .route("/api/aspects/{name}", get(get_aspect))
        .route("/api/items/{name}", get(get_item))
        .route("/api/items/search/{query}", get(search_items))
        .route("/api/lootpool", get(get_lootpool))
        .route("/api/raidpool", get(get_raidpool))
        .route("/api/weights", get(list_weights).post(create_weight))
        .route("/api/weights/item/{item_name}", get(list_weights_for_item))
        .route(
            "/api/weights/{id}",
            get(get_weight).put(update_weight).delete(delete_weight),
        )
        .route("/api/weights/{id}/score", post(score_weight))
        .route("/api/changelog", get(list_changelog))
        .route("/api/changelog/capture/{version}", post(capture_changelog))
        .route("/api/changelog/diff/{from}/{to}", get(diff_changelog))
        .route("/api/changelog/{version}", get(get_changelog))
        .route("/api/guild/prefix/{prefix}", get(get_guild_by_prefix))
        .route("/api/guild/{name}", get(get_guild))
        .route("/api/player/{name}", get(get_player))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Aspects
// =============================================================================

#[derive(serde::Deserialize)]
struct AspectQuery {
    class: Option<String>,
    rarity: Option<String>,
}

impl AspectQuery {
    fn into_filter(self) -> Result<AspectFilter, ApiError> {
        let class = self
            .class
            .map(|c| AspectClass::from_str(&c))
            .transpose()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let rarity = self
            .rarity
            .map(|r| AspectRarity::from_str(&r))
            .transpose()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        Ok(AspectFilter { class, rarity })
    }
}

async fn list_aspects(
    State(app): State<Arc<App>>,
    Query(query): Query<AspectQuery>,
) -> Result<Json<Vec<Aspect>>, ApiError> {
    let filter = query.into_filter()?;
    let aspects = app.use_cases.aspects.list(filter).await?;
    Ok(Json(aspects))
}

async fn get_aspect(
    State(app): State<Arc<App>>,
    Path(name): Path<String>,
) -> Result<Json<Aspect>, ApiError> {
    let aspect = app
        .use_cases
        .aspects
        .get(&name)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(aspect))
}

#[derive(serde::Serialize)]
struct SyncResult {
    synced: usize,
}

async fn sync_aspects(State(app): State<Arc<App>>) -> Result<Json<SyncResult>, ApiError> {
    let synced = app.use_cases.aspects.sync().await?;
    Ok(Json(SyncResult { synced }))
}

// =============================================================================
// Items
// =============================================================================

async fn get_item(
    State(app): State<Arc<App>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let item = app.use_cases.items.get(&name).await?;
    Ok(Json(item))
}

async fn search_items(
    State(app): State<Arc<App>>,
    Path(query): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let results = app.use_cases.items.search(&query).await?;
    Ok(Json(results))
}

// =============================================================================
// Pools
// =============================================================================

async fn get_lootpool(
    State(app): State<Arc<App>>,
) -> Result<Json<crate::use_cases::pools::LootpoolView>, ApiError> {
    let view = app.use_cases.pools.lootpool().await?;
    Ok(Json(view))
}

async fn get_raidpool(
    State(app): State<Arc<App>>,
) -> Result<Json<crate::use_cases::pools::RaidpoolView>, ApiError> {
    let view = app.use_cases.pools.raidpool().await?;
    Ok(Json(view))
}

// =============================================================================
// Weights
// =============================================================================

async fn list_weights(State(app): State<Arc<App>>) -> Result<Json<Vec<Weight>>, ApiError> {
    Ok(Json(app.use_cases.weights.list().await?))
}

async fn list_weights_for_item(
    State(app): State<Arc<App>>,
    Path(item_name): Path<String>,
) -> Result<Json<Vec<Weight>>, ApiError> {
    Ok(Json(app.use_cases.weights.list_for_item(&item_name).await?))
}

async fn get_weight(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Weight>, ApiError> {
    let weight = app.use_cases.weights.get(WeightId::from_uuid(id)).await?;
    Ok(Json(weight))
}

async fn create_weight(
    State(app): State<Arc<App>>,
    Json(draft): Json<WeightDraft>,
) -> Result<Json<Weight>, ApiError> {
    let weight = app.use_cases.weights.create(draft).await?;
    Ok(Json(weight))
}

async fn update_weight(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(draft): Json<WeightDraft>,
) -> Result<Json<Weight>, ApiError> {
    let weight = app
        .use_cases
        .weights
        .update(WeightId::from_uuid(id), draft)
        .await?;
    Ok(Json(weight))
}

async fn delete_weight(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, ApiError> {
    app.use_cases.weights.delete(WeightId::from_uuid(id)).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

async fn score_weight(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(qualities): Json<BTreeMap<String, f64>>,
) -> Result<Json<ScoreBreakdown>, ApiError> {
    let breakdown = app
        .use_cases
        .weights
        .score(WeightId::from_uuid(id), &qualities)
        .await?;
    Ok(Json(breakdown))
}

// =============================================================================
// Changelog
// =============================================================================

async fn list_changelog(
    State(app): State<Arc<App>>,
) -> Result<Json<Vec<ChangelogSummary>>, ApiError> {
    Ok(Json(app.use_cases.changelog.list().await?))
}

async fn get_changelog(
    State(app): State<Arc<App>>,
    Path(version): Path<String>,
) -> Result<Json<ItemSnapshot>, ApiError> {
    Ok(Json(app.use_cases.changelog.get(&version).await?))
}

async fn diff_changelog(
    State(app): State<Arc<App>>,
    Path((from, to)): Path<(String, String)>,
) -> Result<Json<ChangelogDiff>, ApiError> {
    Ok(Json(app.use_cases.changelog.diff(&from, &to).await?))
}

#[derive(serde::Serialize)]
struct CaptureResult {
    version: String,
    items: usize,
}

async fn capture_changelog(
    State(app): State<Arc<App>>,
    Path(version): Path<String>,
) -> Result<Json<CaptureResult>, ApiError> {
    let items = app.use_cases.changelog.capture(&version).await?;
    Ok(Json(CaptureResult { version, items }))
}

// =============================================================================
// Guild / Player
// =============================================================================

/// Guild passthrough plus the member count summed across rank maps, so
/// clients do not have to re-derive it around the upstream `total` quirk.
#[derive(serde::Serialize)]
struct GuildResponse {
    member_count: usize,
    #[serde(flatten)]
    guild: Guild,
}

impl From<Guild> for GuildResponse {
    fn from(guild: Guild) -> Self {
        Self {
            member_count: guild.member_count(),
            guild,
        }
    }
}

async fn get_guild(
    State(app): State<Arc<App>>,
    Path(name): Path<String>,
) -> Result<Json<GuildResponse>, ApiError> {
    Ok(Json(app.use_cases.stats.guild(&name).await?.into()))
}

async fn get_guild_by_prefix(
    State(app): State<Arc<App>>,
    Path(prefix): Path<String>,
) -> Result<Json<GuildResponse>, ApiError> {
    Ok(Json(
        app.use_cases.stats.guild_by_prefix(&prefix).await?.into(),
    ))
}

async fn get_player(
    State(app): State<Arc<App>>,
    Path(name): Path<String>,
) -> Result<Json<PlayerStats>, ApiError> {
    Ok(Json(app.use_cases.stats.player(&name).await?))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    Validation(String),
    Upstream(String),
    Internal(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::NotFound => {
                (axum::http::StatusCode::NOT_FOUND, "Not found").into_response()
            }
            ApiError::BadRequest(msg) => {
                (axum::http::StatusCode::BAD_REQUEST, msg).into_response()
            }
            ApiError::Validation(msg) => {
                (axum::http::StatusCode::UNPROCESSABLE_ENTITY, msg).into_response()
            }
            ApiError::Upstream(msg) => {
                tracing::warn!(error = %msg, "Upstream request failed");
                (axum::http::StatusCode::BAD_GATEWAY, "Upstream error").into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error",
                )
                    .into_response()
            }
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound => ApiError::NotFound,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(e: UpstreamError) -> Self {
        match e {
            UpstreamError::NotFound => ApiError::NotFound,
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<WeightError> for ApiError {
    fn from(e: WeightError) -> Self {
        match e {
            WeightError::NotFound => ApiError::NotFound,
            WeightError::Domain(d) => ApiError::Validation(d.to_string()),
            WeightError::Repo(r) => r.into(),
        }
    }
}

impl From<PoolError> for ApiError {
    fn from(e: PoolError) -> Self {
        match e {
            PoolError::Upstream(u) => u.into(),
            // The rotation clock predating the anchor is a deployment problem.
            PoolError::Domain(d) => ApiError::Internal(d.to_string()),
        }
    }
}

impl From<ChangelogError> for ApiError {
    fn from(e: ChangelogError) -> Self {
        match e {
            ChangelogError::Archive(ArchiveError::VersionNotFound(_)) => ApiError::NotFound,
            ChangelogError::Archive(other) => ApiError::Internal(other.to_string()),
            ChangelogError::Upstream(u) => u.into(),
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Upstream(u) => u.into(),
            SyncError::Repo(r) => r.into(),
        }
    }
}
