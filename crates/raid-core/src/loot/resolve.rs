//! Turning layered tables into a bounded list of entries
//!
//! Sources are pulled in order (building, difficulty, weekday-or-default),
//! a later layer only when the pool is still short of the target. Each
//! pull shuffles its source. With `prioritize` the building table is taken
//! whole and protected, and later layers take only what is still needed.
//! Entries are materialized as they are pulled: amounts rolled,
//! names resolved against the catalog, and oversized stacks split. Split
//! and substring-resolved entries are flagged `modified` and survive the
//! duplicate filter.
//!
//! When the pool still exceeds the target it is shuffled and trimmed from
//! the end. Protected entries are skipped by the trim, so a building table
//! larger than the target stays above it.

use crate::host::{ItemCatalog, ItemCategory, ItemDefinition};
use crate::kind::Difficulty;
use crate::rng::RaidRng;
use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::table::{LootItem, LootTables};

/// Which table an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LootSource {
    Building,
    Difficulty,
    Fallback,
}

/// A concrete item to spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub shortname: String,
    pub amount: u32,
    pub skin: u64,
    pub blueprint: bool,
    /// Stack-split or substring-resolved
    pub modified: bool,
    /// Exempt from quota trimming
    pub protected: bool,
    pub source: LootSource,
    pub category: ItemCategory,
    pub cookable: bool,
    pub max_stack: u32,
}

impl LootEntry {
    fn same_item(&self, other: &LootEntry) -> bool {
        self.shortname == other.shortname
            && self.skin == other.skin
            && self.blueprint == other.blueprint
    }
}

/// Parameters of one resolution
#[derive(Debug, Clone)]
pub struct LootRequest<'a> {
    /// Building profile key
    pub building: &'a str,
    pub difficulty: Difficulty,
    /// Weekday whose table replaces the default one, when enabled
    pub weekday: Option<Weekday>,
    pub target: usize,
    pub allow_duplicates: bool,
    pub prioritize: bool,
}

/// Resolve tables into at most `request.target` entries, plus any protected overflow
pub fn resolve(
    tables: &LootTables,
    request: &LootRequest<'_>,
    catalog: &dyn ItemCatalog,
    rng: &mut RaidRng,
) -> Vec<LootEntry> {
    let layers = [
        (LootSource::Building, tables.building(request.building)),
        (LootSource::Difficulty, tables.difficulty(request.difficulty)),
        (LootSource::Fallback, tables.fallback(request.weekday)),
    ];

    let mut pool: Vec<LootEntry> = Vec::new();
    for (source, items) in layers {
        if pool.len() >= request.target {
            break;
        }
        pull(&mut pool, items, source, request, catalog, rng);
    }

    if pool.len() > request.target {
        rng.shuffle(&mut pool);
        trim(&mut pool, request.target);
    }
    pool
}

fn pull(
    pool: &mut Vec<LootEntry>,
    items: &[LootItem],
    source: LootSource,
    request: &LootRequest<'_>,
    catalog: &dyn ItemCatalog,
    rng: &mut RaidRng,
) {
    let mut shuffled = items.to_vec();
    rng.shuffle(&mut shuffled);
    let protect = request.prioritize && source == LootSource::Building;
    let capped = request.prioritize && !protect;

    for item in &shuffled {
        if capped && pool.len() >= request.target {
            break;
        }
        for entry in materialize(item, source, protect, catalog, rng) {
            if capped && pool.len() >= request.target {
                break;
            }
            if !request.allow_duplicates
                && !entry.modified
                && pool.iter().any(|e| e.same_item(&entry))
            {
                continue;
            }
            pool.push(entry);
        }
    }
}

/// Roll the amount, resolve the definition and split oversized stacks
fn materialize(
    item: &LootItem,
    source: LootSource,
    protected: bool,
    catalog: &dyn ItemCatalog,
    rng: &mut RaidRng,
) -> Vec<LootEntry> {
    let amount = match item.amount_min {
        Some(min) if min < item.amount => rng.range_u32(min, item.amount),
        _ => item.amount,
    };
    if amount == 0 {
        return Vec::new();
    }

    let (definition, mut modified): (ItemDefinition, bool) = match catalog.find(&item.shortname) {
        Some(def) => (def, false),
        None => match catalog.search(&item.shortname) {
            Some(def) => {
                log::debug!(
                    "loot item '{}' resolved to '{}'",
                    item.shortname,
                    def.shortname
                );
                (def, true)
            }
            None => {
                log::warn!("loot item '{}' is unknown, skipped", item.shortname);
                return Vec::new();
            }
        },
    };

    let max_stack = definition.max_stack.max(1);
    let mut entries = Vec::new();
    let mut remaining = amount;
    if remaining > max_stack {
        modified = true;
    }
    while remaining > 0 {
        let stack = remaining.min(max_stack);
        remaining -= stack;
        entries.push(LootEntry {
            shortname: definition.shortname.clone(),
            amount: stack,
            skin: item.skin,
            blueprint: item.blueprint,
            modified,
            protected,
            source,
            category: definition.category,
            cookable: definition.cookable,
            max_stack,
        });
    }
    entries
}

/// Remove unprotected entries from the end until the target is met
fn trim(pool: &mut Vec<LootEntry>, target: usize) {
    let mut i = pool.len();
    while pool.len() > target && i > 0 {
        i -= 1;
        if !pool[i].protected {
            pool.remove(i);
        }
    }
}
