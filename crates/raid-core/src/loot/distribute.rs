//! Placing resolved entries into containers
//!
//! Every entry first tries its category-specific destination (resources
//! to the cupboard, cookables to ovens, food to fridges, gear to locker
//! slot ranges). Only then does it go to a loot box: either filling one
//! box after another, or round-robin over every box when dividing.

use crate::config::LootSettings;
use crate::host::{Inventory, ItemCategory};
use crate::identity::EntityId;
use crate::rng::RaidRng;
use serde::{Deserialize, Serialize};

use super::resolve::LootEntry;

/// Half-open range of container slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRange {
    pub start: usize,
    pub end: usize,
}

impl SlotRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, slot: usize) -> bool {
        slot >= self.start && slot < self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Locker rows reserved for attire
const LOCKER_APPAREL: [SlotRange; 3] = [
    SlotRange::new(0, 7),
    SlotRange::new(13, 20),
    SlotRange::new(26, 33),
];

/// Locker rows reserved for weapons, ammunition and medical items
const LOCKER_BELT: [SlotRange; 3] = [
    SlotRange::new(7, 13),
    SlotRange::new(20, 26),
    SlotRange::new(33, 39),
];

/// Containers of one event, by role
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LootTargets {
    pub boxes: Vec<EntityId>,
    pub cupboard: Option<EntityId>,
    pub ovens: Vec<EntityId>,
    /// Fridges and barbecues
    pub fridges: Vec<EntityId>,
    pub lockers: Vec<EntityId>,
}

/// What a distribution achieved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionReport {
    pub requested: usize,
    /// Entries placed into loot boxes
    pub spawned: usize,
    /// Entries placed into category containers
    pub diverted: usize,
    /// Entries that fit nowhere
    pub discarded: usize,
    /// Box emptied to make room
    pub cleared: Option<EntityId>,
}

impl DistributionReport {
    pub fn placed(&self) -> usize {
        self.spawned + self.diverted
    }
}

/// Spread `entries` over `targets`
pub fn distribute(
    inventory: &mut dyn Inventory,
    entries: &[LootEntry],
    targets: &LootTargets,
    divide: bool,
    routes: &LootSettings,
    rng: &mut RaidRng,
) -> DistributionReport {
    let mut report = DistributionReport {
        requested: entries.len(),
        ..DistributionReport::default()
    };

    if divide {
        divide_round_robin(inventory, entries, targets, routes, &mut report);
    } else {
        fill_sequentially(inventory, entries, targets, routes, rng, &mut report);
    }

    if report.discarded > 0 {
        log::warn!(
            "loot: {} of {} entries fit in no container",
            report.discarded,
            report.requested
        );
    }
    if report.requested > 0 && report.placed() == 0 {
        log::warn!("loot: nothing spawned ({} boxes)", targets.boxes.len());
    }
    report
}

fn fill_sequentially(
    inventory: &mut dyn Inventory,
    entries: &[LootEntry],
    targets: &LootTargets,
    routes: &LootSettings,
    rng: &mut RaidRng,
    report: &mut DistributionReport,
) {
    let mut open: Vec<EntityId> = targets
        .boxes
        .iter()
        .copied()
        .filter(|b| inventory.has_space(*b))
        .collect();
    rng.shuffle(&mut open);

    if open.is_empty() {
        if let Some(&victim) = rng.pick(&targets.boxes) {
            log::debug!("loot: every box full, clearing {}", victim);
            inventory.clear(victim);
            report.cleared = Some(victim);
            open.push(victim);
        }
    }

    let mut current = 0;
    for entry in entries {
        if divert(inventory, entry, targets, routes) {
            report.diverted += 1;
            continue;
        }
        let mut placed = false;
        while current < open.len() {
            let container = open[current];
            if inventory.has_space(container) && inventory.insert(container, entry, None) {
                placed = true;
                break;
            }
            current += 1;
        }
        if placed {
            report.spawned += 1;
        } else {
            report.discarded += 1;
        }
    }
}

fn divide_round_robin(
    inventory: &mut dyn Inventory,
    entries: &[LootEntry],
    targets: &LootTargets,
    routes: &LootSettings,
    report: &mut DistributionReport,
) {
    let mut open: Vec<EntityId> = targets
        .boxes
        .iter()
        .copied()
        .filter(|b| inventory.has_space(*b))
        .collect();

    let mut cursor = 0;
    for entry in entries {
        // Diverted entries keep the cursor on the same box
        if divert(inventory, entry, targets, routes) {
            report.diverted += 1;
            continue;
        }
        let mut placed = false;
        while !open.is_empty() {
            let slot = cursor % open.len();
            let container = open[slot];
            if inventory.has_space(container) && inventory.insert(container, entry, None) {
                placed = true;
                cursor = slot + 1;
                break;
            }
            open.remove(slot);
            cursor = slot;
        }
        if placed {
            report.spawned += 1;
        } else {
            report.discarded += 1;
        }
    }
}

/// Try the category-specific destinations
fn divert(
    inventory: &mut dyn Inventory,
    entry: &LootEntry,
    targets: &LootTargets,
    routes: &LootSettings,
) -> bool {
    if entry.category == ItemCategory::Resource && routes.route_resources_to_cupboard {
        if let Some(cupboard) = targets.cupboard {
            if inventory.has_space(cupboard) && inventory.insert(cupboard, entry, None) {
                return true;
            }
        }
    }

    if entry.cookable && routes.route_cookables_to_ovens && insert_any(inventory, &targets.ovens, entry) {
        return true;
    }

    if entry.category == ItemCategory::Food
        && routes.route_food_to_fridges
        && insert_any(inventory, &targets.fridges, entry)
    {
        return true;
    }

    if routes.route_gear_to_lockers {
        let ranges: &[SlotRange] = match entry.category {
            ItemCategory::Attire => &LOCKER_APPAREL,
            ItemCategory::Weapon | ItemCategory::Ammunition | ItemCategory::Medical => &LOCKER_BELT,
            _ => &[],
        };
        for &locker in &targets.lockers {
            for &range in ranges {
                if inventory.insert(locker, entry, Some(range)) {
                    return true;
                }
            }
        }
    }
    false
}

fn insert_any(inventory: &mut dyn Inventory, containers: &[EntityId], entry: &LootEntry) -> bool {
    containers
        .iter()
        .any(|&c| inventory.has_space(c) && inventory.insert(c, entry, None))
}
