//! SQLite-backed aspect storage.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::infrastructure::ports::{AspectRepo, RepoError};
use wynnpool_domain::{Aspect, AspectFilter};

/// SQLite implementation for the synced aspect database.
pub struct SqliteAspectRepo {
    pool: SqlitePool,
}

impl SqliteAspectRepo {
    pub async fn new(db_path: &str) -> Result<Self, RepoError> {
        let pool = super::connect(db_path, "aspects").await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS aspects (
                name TEXT PRIMARY KEY COLLATE NOCASE,
                class TEXT NOT NULL,
                rarity TEXT NOT NULL,
                aspect_json TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("aspects", e))?;

        Ok(Self { pool })
    }

    fn row_to_aspect(row: &sqlx::sqlite::SqliteRow) -> Result<Aspect, RepoError> {
        let json: String = row.get("aspect_json");
        serde_json::from_str(&json).map_err(|e| RepoError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl AspectRepo for SqliteAspectRepo {
    async fn list(&self, filter: AspectFilter) -> Result<Vec<Aspect>, RepoError> {
        let mut query = String::from("SELECT aspect_json FROM aspects WHERE 1 = 1");
        if filter.class.is_some() {
            query.push_str(" AND class = ?");
        }
        if filter.rarity.is_some() {
            query.push_str(" AND rarity = ?");
        }
        query.push_str(" ORDER BY name");

        let mut q = sqlx::query(&query);
        if let Some(class) = filter.class {
            q = q.bind(class.api_name());
        }
        if let Some(rarity) = filter.rarity {
            q = q.bind(rarity.api_name());
        }

        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("aspects", e))?;

        rows.iter().map(Self::row_to_aspect).collect()
    }

    async fn get(&self, name: &str) -> Result<Option<Aspect>, RepoError> {
        let row = sqlx::query("SELECT aspect_json FROM aspects WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("aspects", e))?;

        row.as_ref().map(Self::row_to_aspect).transpose()
    }

    async fn replace_all(&self, aspects: &[Aspect]) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("aspects", e))?;

        sqlx::query("DELETE FROM aspects")
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("aspects", e))?;

        for aspect in aspects {
            let json = serde_json::to_string(aspect)
                .map_err(|e| RepoError::Serialization(e.to_string()))?;
            sqlx::query(
                r#"
                INSERT INTO aspects (name, class, rarity, aspect_json)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(name) DO UPDATE SET
                    class = excluded.class,
                    rarity = excluded.rarity,
                    aspect_json = excluded.aspect_json
                "#,
            )
            .bind(&aspect.name)
            .bind(aspect.class.api_name())
            .bind(aspect.rarity.api_name())
            .bind(json)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("aspects", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::database("aspects", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wynnpool_domain::{AspectClass, AspectRarity, AspectTier};

    async fn repo() -> (SqliteAspectRepo, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("aspects.db");
        let repo = SqliteAspectRepo::new(path.to_str().expect("utf8 path"))
            .await
            .expect("open repo");
        (repo, dir)
    }

    fn aspect(name: &str, class: AspectClass, rarity: AspectRarity) -> Aspect {
        Aspect {
            name: name.to_string(),
            class,
            rarity,
            icon: None,
            required_ability: None,
            tiers: vec![AspectTier {
                threshold: 1,
                description: "Effect".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn replace_all_then_list_unfiltered() {
        let (repo, _dir) = repo().await;
        repo.replace_all(&[
            aspect("Aspect of the Hawk", AspectClass::Archer, AspectRarity::Fabled),
            aspect("Aspect of Infinity", AspectClass::Mage, AspectRarity::Mythic),
        ])
        .await
        .expect("replace");

        let all = repo.list(AspectFilter::default()).await.expect("list");
        assert_eq!(all.len(), 2);
        // Ordered by name.
        assert_eq!(all[0].name, "Aspect of Infinity");
    }

    #[tokio::test]
    async fn filters_narrow_by_class_and_rarity() {
        let (repo, _dir) = repo().await;
        repo.replace_all(&[
            aspect("Aspect of the Hawk", AspectClass::Archer, AspectRarity::Fabled),
            aspect("Aspect of Infinity", AspectClass::Mage, AspectRarity::Mythic),
            aspect("Aspect of Runes", AspectClass::Mage, AspectRarity::Fabled),
        ])
        .await
        .expect("replace");

        let mage = repo
            .list(AspectFilter {
                class: Some(AspectClass::Mage),
                rarity: None,
            })
            .await
            .expect("list");
        assert_eq!(mage.len(), 2);

        let mage_fabled = repo
            .list(AspectFilter {
                class: Some(AspectClass::Mage),
                rarity: Some(AspectRarity::Fabled),
            })
            .await
            .expect("list");
        assert_eq!(mage_fabled.len(), 1);
        assert_eq!(mage_fabled[0].name, "Aspect of Runes");
    }

    #[tokio::test]
    async fn get_is_case_insensitive() {
        let (repo, _dir) = repo().await;
        repo.replace_all(&[aspect(
            "Aspect of Infinity",
            AspectClass::Mage,
            AspectRarity::Mythic,
        )])
        .await
        .expect("replace");

        let found = repo.get("aspect of infinity").await.expect("get");
        assert!(found.is_some());
        assert_eq!(repo.get("Aspect of Nothing").await.expect("get"), None);
    }

    #[tokio::test]
    async fn replace_all_drops_stale_rows() {
        let (repo, _dir) = repo().await;
        repo.replace_all(&[aspect(
            "Aspect of the Hawk",
            AspectClass::Archer,
            AspectRarity::Fabled,
        )])
        .await
        .expect("replace");
        repo.replace_all(&[aspect(
            "Aspect of Infinity",
            AspectClass::Mage,
            AspectRarity::Mythic,
        )])
        .await
        .expect("replace");

        let all = repo.list(AspectFilter::default()).await.expect("list");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Aspect of Infinity");
    }
}
