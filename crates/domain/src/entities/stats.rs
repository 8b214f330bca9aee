//! Guild and player statistics as served by the Wynncraft public API.
//!
//! The server is a read-through proxy for these, so only the fields the site
//! actually renders are typed; everything else the upstream sends is kept in
//! the flattened `extra` map and passed along untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One guild member. The member's name is the key in the surrounding rank
/// map, not a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildMember {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub contributed: u64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guild {
    pub name: String,
    pub prefix: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub territories: u32,
    #[serde(default)]
    pub wars: u64,
    /// Rank name -> members at that rank, as the upstream nests them.
    /// The upstream puts a scalar `total` beside the rank maps; it is dropped
    /// here and recomputed by [`Guild::member_count`].
    #[serde(default, deserialize_with = "rank_maps")]
    pub members: BTreeMap<String, BTreeMap<String, GuildMember>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Guild {
    /// Total member count across all ranks.
    pub fn member_count(&self) -> usize {
        self.members.values().map(BTreeMap::len).sum()
    }
}

/// Deserialize the `members` object, skipping non-object entries like the
/// upstream's `total` counter.
fn rank_maps<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, BTreeMap<String, GuildMember>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: BTreeMap<String, Value> = BTreeMap::deserialize(deserializer)?;
    let mut members = BTreeMap::new();
    for (rank, value) in raw {
        if value.is_object() {
            let parsed: BTreeMap<String, GuildMember> =
                serde_json::from_value(value).map_err(serde::de::Error::custom)?;
            members.insert(rank, parsed);
        }
    }
    Ok(members)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub username: String,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub guild: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn guild_keeps_unknown_fields() {
        let guild: Guild = serde_json::from_value(json!({
            "name": "Example Guild",
            "prefix": "EG",
            "level": 90,
            "banner": {"base": "BLACK"},
        }))
        .expect("deserializes");
        assert_eq!(guild.extra.get("banner"), Some(&json!({"base": "BLACK"})));

        let back = serde_json::to_value(&guild).expect("serializes");
        assert_eq!(back.get("banner"), Some(&json!({"base": "BLACK"})));
    }

    #[test]
    fn member_count_sums_ranks_and_skips_the_total_counter() {
        let guild: Guild = serde_json::from_value(json!({
            "name": "Example Guild",
            "prefix": "EG",
            "members": {
                "total": 3,
                "owner": {"Alice": {"contributed": 100, "online": true}},
                "recruit": {
                    "Bob": {},
                    "Carol": {"uuid": "c14e9d0a-0000-0000-0000-000000000000"},
                },
            },
        }))
        .expect("deserializes");
        assert_eq!(guild.member_count(), 3);
        assert!(!guild.members.contains_key("total"));
    }
}
