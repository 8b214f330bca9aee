//! SQLite-backed repositories.
//!
//! The document-store role of the service: weights and aspects live as JSON
//! text columns beside the few fields worth indexing.

mod aspect_repo;
mod weight_repo;

pub use aspect_repo::SqliteAspectRepo;
pub use weight_repo::SqliteWeightRepo;

use sqlx::SqlitePool;

use crate::infrastructure::ports::RepoError;

pub(crate) async fn connect(db_path: &str, context: &str) -> Result<SqlitePool, RepoError> {
    SqlitePool::connect(&format!("sqlite:{db_path}?mode=rwc"))
        .await
        .map_err(|e| RepoError::database(context, e))
}
