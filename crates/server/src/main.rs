//! Wynnpool server - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod infrastructure;
mod use_cases;

use app::{App, CacheConfig};
use infrastructure::{
    archive::FileChangelogArchive,
    clock::SystemClock,
    pool_api::PoolApiClient,
    sqlite::{SqliteAspectRepo, SqliteWeightRepo},
    wynncraft::{WynncraftClient, DEFAULT_WYNNCRAFT_BASE_URL},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wynnpool_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Wynnpool server");

    // Load configuration
    let wynncraft_url = std::env::var("WYNNCRAFT_API_URL")
        .unwrap_or_else(|_| DEFAULT_WYNNCRAFT_BASE_URL.into());
    let pool_api_url = std::env::var("POOL_API_URL")
        .unwrap_or_else(|_| "https://nori.fish/api".into());
    let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "wynnpool.db".into());
    let changelog_dir = std::env::var("CHANGELOG_DIR").unwrap_or_else(|_| "changelog".into());
    let server_host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let server_port: u16 = std::env::var("SERVER_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .unwrap_or(3000);

    // Storage
    tracing::info!("Opening SQLite database at {}", database_path);
    let weight_repo = Arc::new(SqliteWeightRepo::new(&database_path).await?);
    let aspect_repo = Arc::new(SqliteAspectRepo::new(&database_path).await?);
    let archive = Arc::new(FileChangelogArchive::new(&changelog_dir).await?);

    // Upstream clients
    let wynncraft = Arc::new(WynncraftClient::new(&wynncraft_url));
    let pool_api = Arc::new(PoolApiClient::new(&pool_api_url));

    // Create application
    let app = Arc::new(App::new(
        weight_repo,
        aspect_repo,
        wynncraft,
        pool_api,
        archive,
        Arc::new(SystemClock),
        CacheConfig::default(),
    ));

    // Spawn the cache janitor
    let janitor_app = app.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(10 * 60)).await;
            let purged = janitor_app.purge_expired_caches().await;
            if purged > 0 {
                tracing::debug!(purged, "Dropped expired cache entries");
            }
        }
    });

    // Build router
    let mut router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer_from_env() {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = format!("{server_host}:{server_port}").parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer_from_env() -> Option<CorsLayer> {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let allowed_origins = allowed_origins?;

    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
