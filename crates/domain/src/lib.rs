extern crate self as wynnpool_domain;

pub mod diff;
pub mod entities;
pub mod error;
pub mod ids;
pub mod rotation;

// Re-export all entities (explicit list in entities/mod.rs)
pub use entities::{
    Aspect, AspectClass, AspectFilter, AspectRarity, AspectTier, ChangelogDiff, ChangelogSummary,
    Guild, GuildMember, ItemSnapshot, Lootpool, PlayerStats, PoolItems, PoolWindow, Raidpool,
    ScoreBreakdown, ShinyItem, Weight, WeightDraft,
};

pub use diff::{diff_values, DiffNode, DiffOptions};
pub use error::DomainError;
pub use ids::WeightId;
pub use rotation::{current_week, rotation_anchor, week_number, week_window, ROTATION_ANCHOR_UNIX};
