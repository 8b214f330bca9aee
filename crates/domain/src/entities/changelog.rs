//! Changelog archive types.
//!
//! A changelog version is a full item-database snapshot taken at a game data
//! update. Diffing two snapshots classifies items as added, removed, or
//! modified, with the per-item detail produced by [`crate::diff`].

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::diff::DiffNode;

/// A full item-database snapshot: item name -> item document.
pub type ItemSnapshot = BTreeMap<String, Value>;

/// Listing entry for one archived version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogSummary {
    /// Release timestamp label, e.g. `2025.06.20-18.00`.
    pub version: String,
    pub item_count: usize,
}

/// Item-level diff between two archived versions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangelogDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Item name -> structural diff of its document. Items whose diff is
    /// empty after key exclusions do not appear here.
    pub modified: BTreeMap<String, DiffNode>,
}

impl ChangelogDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}
