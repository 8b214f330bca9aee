//! File-based changelog archive.
//!
//! Each archived version is one `<version>.json` file holding a full item
//! database snapshot. Version labels are release timestamps, so descending
//! lexicographic order is newest-first.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::infrastructure::ports::{ArchiveError, ChangelogArchive};
use wynnpool_domain::{ChangelogSummary, ItemSnapshot};

pub struct FileChangelogArchive {
    dir: PathBuf,
}

impl FileChangelogArchive {
    /// Open an archive rooted at `dir`, creating the directory if needed.
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ArchiveError::Io(e.to_string()))?;
        Ok(Self { dir })
    }

    fn snapshot_path(&self, version: &str) -> Result<PathBuf, ArchiveError> {
        // Version labels become file names; reject anything that could
        // escape the archive directory.
        if version.is_empty()
            || !version
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(ArchiveError::VersionNotFound(version.to_string()));
        }
        Ok(self.dir.join(format!("{version}.json")))
    }
}

#[async_trait]
impl ChangelogArchive for FileChangelogArchive {
    async fn list_versions(&self) -> Result<Vec<ChangelogSummary>, ArchiveError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| ArchiveError::Io(e.to_string()))?;

        let mut versions = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ArchiveError::Io(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(version) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Snapshot files are small in number; counting items per listing
            // keeps the archive free of sidecar metadata.
            let snapshot = load_snapshot(&path, version).await?;
            versions.push(ChangelogSummary {
                version: version.to_string(),
                item_count: snapshot.len(),
            });
        }

        versions.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(versions)
    }

    async fn load(&self, version: &str) -> Result<ItemSnapshot, ArchiveError> {
        let path = self.snapshot_path(version)?;
        if !tokio::fs::try_exists(&path)
            .await
            .map_err(|e| ArchiveError::Io(e.to_string()))?
        {
            return Err(ArchiveError::VersionNotFound(version.to_string()));
        }
        load_snapshot(&path, version).await
    }

    async fn store(&self, version: &str, snapshot: &ItemSnapshot) -> Result<(), ArchiveError> {
        let path = self.snapshot_path(version)?;
        let json = serde_json::to_vec_pretty(snapshot).map_err(|e| ArchiveError::Malformed {
            version: version.to_string(),
            message: e.to_string(),
        })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| ArchiveError::Io(e.to_string()))
    }
}

async fn load_snapshot(path: &Path, version: &str) -> Result<ItemSnapshot, ArchiveError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ArchiveError::Io(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ArchiveError::Malformed {
        version: version.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(names: &[&str]) -> ItemSnapshot {
        names
            .iter()
            .map(|n| ((*n).to_string(), json!({"name": n, "tier": "rare"})))
            .collect()
    }

    #[tokio::test]
    async fn store_then_load_roundtrips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = FileChangelogArchive::new(dir.path()).await.expect("open");

        let snap = snapshot(&["Warp", "Sessile"]);
        archive.store("2025.06.20", &snap).await.expect("store");

        let loaded = archive.load("2025.06.20").await.expect("load");
        assert_eq!(loaded, snap);
    }

    #[tokio::test]
    async fn listing_is_newest_first_with_counts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = FileChangelogArchive::new(dir.path()).await.expect("open");

        archive
            .store("2025.01.10", &snapshot(&["Warp"]))
            .await
            .expect("store");
        archive
            .store("2025.06.20", &snapshot(&["Warp", "Sessile"]))
            .await
            .expect("store");

        let versions = archive.list_versions().await.expect("list");
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].version, "2025.06.20");
        assert_eq!(versions[0].item_count, 2);
        assert_eq!(versions[1].version, "2025.01.10");
    }

    #[tokio::test]
    async fn missing_version_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = FileChangelogArchive::new(dir.path()).await.expect("open");

        assert!(matches!(
            archive.load("2099.01.01").await,
            Err(ArchiveError::VersionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn path_escapes_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = FileChangelogArchive::new(dir.path()).await.expect("open");

        assert!(archive.load("../outside").await.is_err());
        assert!(archive.store("a/b", &snapshot(&[])).await.is_err());
    }

    #[tokio::test]
    async fn malformed_snapshot_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = FileChangelogArchive::new(dir.path()).await.expect("open");
        tokio::fs::write(dir.path().join("2025.03.01.json"), b"not json")
            .await
            .expect("write");

        assert!(matches!(
            archive.load("2025.03.01").await,
            Err(ArchiveError::Malformed { .. })
        ));
    }
}
