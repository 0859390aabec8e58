//! Loot: layered tables, resolution into a bounded entry list, and
//! distribution into containers
//!
//! ```text
//! LootTables ──resolve()──> Vec<LootEntry> ──distribute()──> containers
//!   building                 split, deduped,                 cupboard / ovens /
//!   difficulty               trimmed to target               fridges / lockers
//!   weekday | default                                        first, then boxes
//! ```

mod distribute;
mod resolve;
mod table;

pub use distribute::{distribute, DistributionReport, LootTargets, SlotRange};
pub use resolve::{resolve, LootEntry, LootRequest, LootSource};
pub use table::{LootItem, LootTables};
