//! Loot table records

use crate::kind::Difficulty;
use chrono::Weekday;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One line of a loot table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootItem {
    pub shortname: String,
    /// Fixed amount, or the upper bound when `amount_min` is set
    pub amount: u32,
    #[serde(default)]
    pub amount_min: Option<u32>,
    #[serde(default)]
    pub skin: u64,
    /// Spawn the blueprint of the item rather than the item itself
    #[serde(default)]
    pub blueprint: bool,
}

impl LootItem {
    pub fn new(shortname: impl Into<String>, amount: u32) -> Self {
        Self {
            shortname: shortname.into(),
            amount,
            amount_min: None,
            skin: 0,
            blueprint: false,
        }
    }

    pub fn ranged(shortname: impl Into<String>, min: u32, max: u32) -> Self {
        Self {
            amount_min: Some(min),
            ..Self::new(shortname, max)
        }
    }
}

/// Every configured loot source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LootTables {
    /// Keyed by building profile name
    pub buildings: IndexMap<String, Vec<LootItem>>,
    pub difficulties: IndexMap<Difficulty, Vec<LootItem>>,
    pub weekdays: IndexMap<Weekday, Vec<LootItem>>,
    pub default: Vec<LootItem>,
}

impl LootTables {
    pub fn building(&self, key: &str) -> &[LootItem] {
        self.buildings.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn difficulty(&self, difficulty: Difficulty) -> &[LootItem] {
        self.difficulties
            .get(&difficulty)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The weekday table when asked for and present, else the default table
    pub fn fallback(&self, weekday: Option<Weekday>) -> &[LootItem] {
        weekday
            .and_then(|day| self.weekdays.get(&day))
            .filter(|items| !items.is_empty())
            .map(Vec::as_slice)
            .unwrap_or(&self.default)
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.values().all(Vec::is_empty)
            && self.difficulties.values().all(Vec::is_empty)
            && self.weekdays.values().all(Vec::is_empty)
            && self.default.is_empty()
    }
}
