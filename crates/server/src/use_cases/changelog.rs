//! Changelog archive browsing and structural diffing between item dumps.

use std::sync::Arc;

use tracing::info;

use crate::infrastructure::ports::{ArchiveError, ChangelogArchive, UpstreamError, WynncraftPort};
use wynnpool_domain::{diff_values, ChangelogDiff, ChangelogSummary, DiffOptions, ItemSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum ChangelogError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

pub struct ChangelogOps {
    archive: Arc<dyn ChangelogArchive>,
    wynncraft: Arc<dyn WynncraftPort>,
    options: DiffOptions,
}

impl ChangelogOps {
    pub fn new(archive: Arc<dyn ChangelogArchive>, wynncraft: Arc<dyn WynncraftPort>) -> Self {
        Self {
            archive,
            wynncraft,
            options: DiffOptions::default(),
        }
    }

    /// Archived versions, newest first.
    pub async fn list(&self) -> Result<Vec<ChangelogSummary>, ChangelogError> {
        Ok(self.archive.list_versions().await?)
    }

    /// Full item snapshot for one archived version.
    pub async fn get(&self, version: &str) -> Result<ItemSnapshot, ChangelogError> {
        Ok(self.archive.load(version).await?)
    }

    /// Structural diff between two archived versions.
    ///
    /// Items present only in `to` are listed as added, items present only in
    /// `from` as removed. Items present in both diff field by field; volatile
    /// bookkeeping fields are excluded, and items whose remaining fields are
    /// identical are dropped from the result.
    pub async fn diff(&self, from: &str, to: &str) -> Result<ChangelogDiff, ChangelogError> {
        let before = self.archive.load(from).await?;
        let after = self.archive.load(to).await?;

        let mut result = ChangelogDiff::default();
        for name in after.keys() {
            if !before.contains_key(name) {
                result.added.push(name.clone());
            }
        }
        for name in before.keys() {
            if !after.contains_key(name) {
                result.removed.push(name.clone());
            }
        }
        for (name, old) in &before {
            let Some(new) = after.get(name) else { continue };
            if let Some(node) = diff_values(old, new, &self.options) {
                result.modified.insert(name.clone(), node);
            }
        }
        Ok(result)
    }

    /// Pull the live item database and archive it under `version`.
    ///
    /// Returns the number of items captured.
    pub async fn capture(&self, version: &str) -> Result<usize, ChangelogError> {
        let snapshot = self.wynncraft.item_database().await?;
        let count = snapshot.len();
        self.archive.store(version, &snapshot).await?;
        info!(version, items = count, "captured item database snapshot");
        Ok(count)
    }
}
