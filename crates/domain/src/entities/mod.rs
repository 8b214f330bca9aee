//! Domain entities.

mod aspect;
mod changelog;
mod pool;
mod stats;
mod weight;

pub use aspect::{Aspect, AspectClass, AspectFilter, AspectRarity, AspectTier};
pub use changelog::{ChangelogDiff, ChangelogSummary, ItemSnapshot};
pub use pool::{Lootpool, PoolItems, PoolWindow, Raidpool, ShinyItem};
pub use stats::{Guild, GuildMember, PlayerStats};
pub use weight::{ScoreBreakdown, Weight, WeightDraft};
