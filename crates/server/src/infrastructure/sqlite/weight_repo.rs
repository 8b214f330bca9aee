//! SQLite-backed weight storage.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::infrastructure::ports::{RepoError, WeightRepo};
use wynnpool_domain::{Weight, WeightId};

/// SQLite implementation for community weight storage.
pub struct SqliteWeightRepo {
    pool: SqlitePool,
}

impl SqliteWeightRepo {
    pub async fn new(db_path: &str) -> Result<Self, RepoError> {
        let pool = super::connect(db_path, "weights").await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS weights (
                id TEXT PRIMARY KEY,
                item_name TEXT NOT NULL COLLATE NOCASE,
                weight_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("weights", e))?;

        Ok(Self { pool })
    }

    fn row_to_weight(row: &sqlx::sqlite::SqliteRow) -> Result<Weight, RepoError> {
        let json: String = row.get("weight_json");
        serde_json::from_str(&json).map_err(|e| RepoError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl WeightRepo for SqliteWeightRepo {
    async fn get(&self, id: WeightId) -> Result<Option<Weight>, RepoError> {
        let row = sqlx::query("SELECT weight_json FROM weights WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("weights", e))?;

        row.as_ref().map(Self::row_to_weight).transpose()
    }

    async fn list(&self) -> Result<Vec<Weight>, RepoError> {
        let rows = sqlx::query(
            "SELECT weight_json FROM weights ORDER BY item_name, updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("weights", e))?;

        rows.iter().map(Self::row_to_weight).collect()
    }

    async fn list_for_item(&self, item_name: &str) -> Result<Vec<Weight>, RepoError> {
        let rows = sqlx::query(
            "SELECT weight_json FROM weights WHERE item_name = ? ORDER BY updated_at DESC",
        )
        .bind(item_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("weights", e))?;

        rows.iter().map(Self::row_to_weight).collect()
    }

    async fn insert(&self, weight: &Weight) -> Result<(), RepoError> {
        let json =
            serde_json::to_string(weight).map_err(|e| RepoError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO weights (id, item_name, weight_json, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(weight.id.to_string())
        .bind(&weight.item_name)
        .bind(json)
        .bind(weight.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("weights", e))?;

        Ok(())
    }

    async fn update(&self, weight: &Weight) -> Result<(), RepoError> {
        let json =
            serde_json::to_string(weight).map_err(|e| RepoError::Serialization(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE weights
            SET item_name = ?, weight_json = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&weight.item_name)
        .bind(json)
        .bind(weight.updated_at.to_rfc3339())
        .bind(weight.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("weights", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: WeightId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM weights WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("weights", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
