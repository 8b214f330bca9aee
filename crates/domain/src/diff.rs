//! Structural diff over item JSON.
//!
//! Compares two JSON-like values and reports what was added, removed, or
//! changed, keyed by property path. Built for the changelog viewer's item
//! identification blocks, so it is deliberately coarse for arrays: they are
//! compared by serialized equality only, never element-wise.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

/// Keys skipped at every nesting level of the default item diff.
///
/// These are bookkeeping fields on item documents (internal ids, snapshot
/// timestamps, release-status markers) whose churn is not a real change.
pub const DEFAULT_EXCLUDED_KEYS: &[&str] = &["internalId", "lastModified", "status", "changelog"];

/// Options controlling a structural diff.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Object keys ignored at every level.
    pub excluded_keys: BTreeSet<String>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            excluded_keys: DEFAULT_EXCLUDED_KEYS
                .iter()
                .map(|k| (*k).to_string())
                .collect(),
        }
    }
}

impl DiffOptions {
    /// Options with no excluded keys.
    pub fn unfiltered() -> Self {
        Self {
            excluded_keys: BTreeSet::new(),
        }
    }

    pub fn with_excluded_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

/// One node of the diff tree.
///
/// `Object` carries child nodes keyed by property name; all other variants
/// are leaves. Equal subtrees produce no node at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiffNode {
    /// Absent (or null) before, present after.
    Added { value: Value },
    /// Present before, absent (or null) after.
    Removed { value: Value },
    /// Present on both sides with different contents.
    Changed { before: Value, after: Value },
    /// An object whose keys differ; only differing keys appear.
    Object { fields: BTreeMap<String, DiffNode> },
}

/// Diff two JSON values.
///
/// Returns `None` when the values are equal under the given options
/// (`diff_values(x, x, ..)` is always `None`). Null is treated the same as
/// absence, so `null -> value` is an addition and `value -> null` a removal.
pub fn diff_values(before: &Value, after: &Value, options: &DiffOptions) -> Option<DiffNode> {
    match (before, after) {
        (Value::Null, Value::Null) => None,
        (Value::Null, other) => Some(DiffNode::Added {
            value: other.clone(),
        }),
        (other, Value::Null) => Some(DiffNode::Removed {
            value: other.clone(),
        }),
        (Value::Object(before_map), Value::Object(after_map)) => {
            diff_objects(before_map, after_map, options)
        }
        // Arrays compare by serialized equality only; element-wise diffing is
        // out of contract.
        (Value::Array(_), Value::Array(_)) => {
            if serialized_equal(before, after) {
                None
            } else {
                Some(DiffNode::Changed {
                    before: before.clone(),
                    after: after.clone(),
                })
            }
        }
        // Primitives, and any type mismatch (e.g. string -> object).
        (b, a) => {
            if b == a {
                None
            } else {
                Some(DiffNode::Changed {
                    before: b.clone(),
                    after: a.clone(),
                })
            }
        }
    }
}

fn diff_objects(
    before: &serde_json::Map<String, Value>,
    after: &serde_json::Map<String, Value>,
    options: &DiffOptions,
) -> Option<DiffNode> {
    let keys: BTreeSet<&String> = before
        .keys()
        .chain(after.keys())
        .filter(|k| !options.excluded_keys.contains(k.as_str()))
        .collect();

    let mut fields = BTreeMap::new();
    for key in keys {
        let b = before.get(key).unwrap_or(&Value::Null);
        let a = after.get(key).unwrap_or(&Value::Null);
        if let Some(node) = diff_values(b, a, options) {
            fields.insert(key.clone(), node);
        }
    }

    if fields.is_empty() {
        None
    } else {
        Some(DiffNode::Object { fields })
    }
}

fn serialized_equal(a: &Value, b: &Value) -> bool {
    // serde_json writes map keys in map order; item documents come out of
    // serde_json::Map which preserves a stable order per input, so equality of
    // the serialized form is deterministic for our inputs.
    match (serde_json::to_string(a), serde_json::to_string(b)) {
        (Ok(sa), Ok(sb)) => sa == sb,
        _ => false,
    }
}
