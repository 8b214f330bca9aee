//! Use cases - one module per feature area.
//!
//! Use cases orchestrate ports (repositories, upstream clients, the archive)
//! and the domain's pure logic; HTTP handlers stay thin.

pub mod aspects;
pub mod changelog;
pub mod items;
pub mod pools;
pub mod stats;
pub mod weights;

pub use aspects::AspectOps;
pub use changelog::ChangelogOps;
pub use items::ItemOps;
pub use pools::PoolOps;
pub use stats::StatsOps;
pub use weights::WeightOps;
