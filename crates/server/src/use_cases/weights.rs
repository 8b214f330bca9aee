//! Community weight CRUD and scoring.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::infrastructure::ports::{ClockPort, RepoError, WeightRepo};
use wynnpool_domain::{DomainError, ScoreBreakdown, Weight, WeightDraft, WeightId};

#[derive(Debug, thiserror::Error)]
pub enum WeightError {
    #[error("Weight not found")]
    NotFound,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for WeightError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::NotFound,
            other => Self::Repo(other),
        }
    }
}

pub struct WeightOps {
    repo: Arc<dyn WeightRepo>,
    clock: Arc<dyn ClockPort>,
}

impl WeightOps {
    pub fn new(repo: Arc<dyn WeightRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { repo, clock }
    }

    pub async fn create(&self, draft: WeightDraft) -> Result<Weight, WeightError> {
        let weight = Weight::from_draft(draft, self.clock.now())?;
        self.repo.insert(&weight).await?;
        Ok(weight)
    }

    pub async fn get(&self, id: WeightId) -> Result<Weight, WeightError> {
        self.repo.get(id).await?.ok_or(WeightError::NotFound)
    }

    pub async fn update(&self, id: WeightId, draft: WeightDraft) -> Result<Weight, WeightError> {
        let mut weight = self.get(id).await?;
        weight.apply_draft(draft, self.clock.now())?;
        self.repo.update(&weight).await?;
        Ok(weight)
    }

    pub async fn delete(&self, id: WeightId) -> Result<(), WeightError> {
        Ok(self.repo.delete(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<Weight>, WeightError> {
        Ok(self.repo.list().await?)
    }

    pub async fn list_for_item(&self, item_name: &str) -> Result<Vec<Weight>, WeightError> {
        Ok(self.repo.list_for_item(item_name).await?)
    }

    /// Score a roll's qualities against a stored weight.
    pub async fn score(
        &self,
        id: WeightId,
        qualities: &BTreeMap<String, f64>,
    ) -> Result<ScoreBreakdown, WeightError> {
        let weight = self.get(id).await?;
        Ok(weight.score(qualities)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::MockWeightRepo;
    use chrono::{TimeZone, Utc};
    use mockall::predicate::*;

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
                .single()
                .expect("valid"),
        ))
    }

    fn draft() -> WeightDraft {
        WeightDraft {
            item_name: "Warp".to_string(),
            weight_name: "Spell".to_string(),
            author: "tester".to_string(),
            description: None,
            identifications: BTreeMap::from([
                ("walkSpeed".to_string(), 0.7),
                ("spellDamage".to_string(), 0.3),
            ]),
        }
    }

    #[tokio::test]
    async fn create_stamps_clock_time_and_persists() {
        let mut repo = MockWeightRepo::new();
        repo.expect_insert()
            .times(1)
            .withf(|w: &Weight| w.item_name == "Warp" && w.created_at == w.updated_at)
            .returning(|_| Ok(()));

        let ops = WeightOps::new(Arc::new(repo), fixed_clock());
        let weight = ops.create(draft()).await.expect("create");
        assert_eq!(weight.created_at, fixed_clock().0);
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_store() {
        let repo = MockWeightRepo::new(); // no expectations: insert must not run

        let mut bad = draft();
        bad.identifications.insert("mana".to_string(), 0.5);

        let ops = WeightOps::new(Arc::new(repo), fixed_clock());
        assert!(matches!(
            ops.create(bad).await,
            Err(WeightError::Domain(DomainError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn get_missing_maps_to_not_found() {
        let id = WeightId::new();
        let mut repo = MockWeightRepo::new();
        repo.expect_get().with(eq(id)).returning(|_| Ok(None));

        let ops = WeightOps::new(Arc::new(repo), fixed_clock());
        assert!(matches!(ops.get(id).await, Err(WeightError::NotFound)));
    }

    #[tokio::test]
    async fn update_replaces_contents_and_bumps_updated_at() {
        let existing = Weight::from_draft(
            draft(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
                .single()
                .expect("valid"),
        )
        .expect("valid draft");
        let id = existing.id;

        let mut repo = MockWeightRepo::new();
        let stored = existing.clone();
        repo.expect_get()
            .with(eq(id))
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_update()
            .times(1)
            .withf(move |w: &Weight| w.id == id && w.author == "editor" && w.updated_at > w.created_at)
            .returning(|_| Ok(()));

        let mut edited = draft();
        edited.author = "editor".to_string();

        let ops = WeightOps::new(Arc::new(repo), fixed_clock());
        let updated = ops.update(id, edited).await.expect("update");
        assert_eq!(updated.author, "editor");
        assert_eq!(updated.created_at, existing.created_at);
    }

    #[tokio::test]
    async fn delete_maps_repo_not_found() {
        let id = WeightId::new();
        let mut repo = MockWeightRepo::new();
        repo.expect_delete()
            .with(eq(id))
            .returning(|_| Err(RepoError::NotFound));

        let ops = WeightOps::new(Arc::new(repo), fixed_clock());
        assert!(matches!(ops.delete(id).await, Err(WeightError::NotFound)));
    }

    #[tokio::test]
    async fn score_uses_the_stored_weight() {
        let weight = Weight::from_draft(draft(), fixed_clock().0).expect("valid draft");
        let id = weight.id;

        let mut repo = MockWeightRepo::new();
        repo.expect_get()
            .with(eq(id))
            .returning(move |_| Ok(Some(weight.clone())));

        let ops = WeightOps::new(Arc::new(repo), fixed_clock());
        let breakdown = ops
            .score(
                id,
                &BTreeMap::from([
                    ("walkSpeed".to_string(), 1.0),
                    ("spellDamage".to_string(), 0.5),
                ]),
            )
            .await
            .expect("score");
        assert_eq!(breakdown.score, 85.0);
    }
}
