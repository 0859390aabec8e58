//! Building profiles and the fairness rotation
//!
//! A profile describes one pasteable blueprint (plus alternates sharing the
//! same rules). Selection filters by tier, category, weekday, PVP gate and
//! blueprint existence, then - when the rotation is enabled - skips every
//! profile of the tier that has already been used this cycle. A tier's
//! cycle clears once all of its eligible profiles have had a turn. A
//! request by name is served even when that profile already had its turn,
//! and it leaves the cycle as it was.

use crate::error::{Error, Result};
use crate::kind::{Difficulty, DifficultyFilter, RaidCategory};
use crate::rng::RaidRng;
use chrono::Weekday;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Loot rules of a building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootPolicy {
    pub allow_duplicates: bool,
    /// Spread loot round-robin over all containers instead of filling one at a time
    pub divide_loot: bool,
    /// Fill the quota from the building table first and protect those entries
    pub prioritize: bool,
    /// Target number of loot entries
    pub treasure_amount: usize,
}

impl Default for LootPolicy {
    fn default() -> Self {
        Self {
            allow_duplicates: false,
            divide_loot: true,
            prioritize: false,
            treasure_amount: 30,
        }
    }
}

/// Hostile actors spawned with the building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcPolicy {
    pub enabled: bool,
    pub amount_min: u32,
    pub amount_max: u32,
}

impl Default for NpcPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            amount_min: 2,
            amount_max: 4,
        }
    }
}

/// Which automatic categories may pick this building. Manual requests always may.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryGate {
    pub maintained: bool,
    pub scheduled: bool,
    pub purchased: bool,
}

impl Default for CategoryGate {
    fn default() -> Self {
        Self {
            maintained: true,
            scheduled: true,
            purchased: true,
        }
    }
}

impl CategoryGate {
    pub fn allows(&self, category: RaidCategory) -> bool {
        match category {
            RaidCategory::Manual | RaidCategory::GridManual => true,
            RaidCategory::Maintained => self.maintained,
            RaidCategory::Scheduled => self.scheduled,
            RaidCategory::Purchased => self.purchased,
        }
    }
}

/// Configuration of one pasteable building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingProfile {
    /// Primary blueprint name, also the registry key.
    /// Keyed record files may leave it empty and let the key fill it in.
    #[serde(default)]
    pub name: String,
    pub difficulty: Difficulty,
    /// Protection radius around the placed building
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default)]
    pub allow_pvp: bool,
    #[serde(default)]
    pub loot: LootPolicy,
    #[serde(default)]
    pub npc: NpcPolicy,
    /// Other blueprints sharing these rules
    #[serde(default)]
    pub alternates: Vec<String>,
    /// Days the profile may open; empty means every day
    #[serde(default)]
    pub days: Vec<Weekday>,
    #[serde(default)]
    pub categories: CategoryGate,
    /// Separation override for this building
    #[serde(default)]
    pub separation: Option<f32>,
    /// Named spawn file; without one the world grid is used
    #[serde(default)]
    pub spawns: Option<String>,
}

fn default_radius() -> f32 {
    50.0
}

impl BuildingProfile {
    pub fn new(name: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            name: name.into(),
            difficulty,
            radius: default_radius(),
            allow_pvp: false,
            loot: LootPolicy::default(),
            npc: NpcPolicy::default(),
            alternates: Vec::new(),
            days: Vec::new(),
            categories: CategoryGate::default(),
            separation: None,
            spawns: None,
        }
    }

    pub fn open_on(&self, day: Weekday) -> bool {
        self.days.is_empty() || self.days.contains(&day)
    }

    /// Primary blueprint followed by alternates
    pub fn blueprints(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.alternates.iter().map(String::as_str))
    }

    pub fn answers_to(&self, name: &str) -> bool {
        self.blueprints().any(|b| b.eq_ignore_ascii_case(name))
    }
}

/// Whether PVP and PVE profiles may be picked for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PvpGate {
    pub include_pvp: bool,
    pub include_pve: bool,
}

impl PvpGate {
    pub const ANY: PvpGate = PvpGate {
        include_pvp: true,
        include_pve: true,
    };

    fn allows(&self, allow_pvp: bool) -> bool {
        if allow_pvp {
            self.include_pvp
        } else {
            self.include_pve
        }
    }
}

/// Context of one selection
pub struct SelectionContext<'a> {
    pub weekday: Weekday,
    pub pvp: PvpGate,
    pub blueprint_exists: &'a dyn Fn(&str) -> bool,
}

/// The outcome of a selection
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileChoice {
    pub key: String,
    /// Blueprint actually pasted (primary or an alternate)
    pub blueprint: String,
    pub difficulty: Difficulty,
    /// This selection took a rotation slot that was free
    pub fresh: bool,
}

/// Per-tier memory of profiles used this cycle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub enabled: bool,
    used: IndexMap<Difficulty, IndexSet<String>>,
}

impl Rotation {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            used: IndexMap::new(),
        }
    }

    pub fn is_used(&self, difficulty: Difficulty, key: &str) -> bool {
        self.enabled
            && self
                .used
                .get(&difficulty)
                .is_some_and(|set| set.contains(key))
    }

    pub fn mark(&mut self, difficulty: Difficulty, key: &str) {
        if self.enabled {
            self.used
                .entry(difficulty)
                .or_default()
                .insert(key.to_string());
        }
    }

    /// Give a slot back (the event never materialized)
    pub fn unmark(&mut self, difficulty: Difficulty, key: &str) {
        if let Some(set) = self.used.get_mut(&difficulty) {
            set.shift_remove(key);
        }
    }

    pub fn clear(&mut self, difficulty: Difficulty) {
        self.used.shift_remove(&difficulty);
    }

    pub fn used_count(&self, difficulty: Difficulty) -> usize {
        self.used.get(&difficulty).map(IndexSet::len).unwrap_or(0)
    }
}

/// All known building profiles
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: IndexMap<String, BuildingProfile>,
    rotation: Rotation,
    active_refs: HashMap<String, usize>,
}

impl ProfileRegistry {
    pub fn new(rotation_enabled: bool) -> Self {
        Self {
            profiles: IndexMap::new(),
            rotation: Rotation::new(rotation_enabled),
            active_refs: HashMap::new(),
        }
    }

    pub fn from_profiles(
        profiles: impl IntoIterator<Item = BuildingProfile>,
        rotation_enabled: bool,
    ) -> Self {
        let mut registry = Self::new(rotation_enabled);
        for profile in profiles {
            registry.profiles.insert(profile.name.clone(), profile);
        }
        registry
    }

    pub fn get(&self, key: &str) -> Option<&BuildingProfile> {
        self.profiles.get(key)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildingProfile> {
        self.profiles.values()
    }

    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    pub fn rotation_mut(&mut self) -> &mut Rotation {
        &mut self.rotation
    }

    /// Administrative add; replaces a profile of the same name
    pub fn add(&mut self, profile: BuildingProfile) -> Option<BuildingProfile> {
        log::info!(
            "profile {} added ({})",
            profile.name,
            profile.difficulty
        );
        self.profiles.insert(profile.name.clone(), profile)
    }

    /// Administrative removal, refused while an event uses the profile
    pub fn remove(&mut self, key: &str) -> Result<BuildingProfile> {
        if self.references(key) > 0 {
            return Err(Error::ProfileInUse(key.to_string()));
        }
        let profile = self
            .profiles
            .shift_remove(key)
            .ok_or_else(|| Error::ProfileNotFound(key.to_string()))?;
        self.rotation.unmark(profile.difficulty, key);
        log::info!("profile {} removed", key);
        Ok(profile)
    }

    /// An event started using the profile
    pub fn acquire(&mut self, key: &str) {
        *self.active_refs.entry(key.to_string()).or_default() += 1;
    }

    /// An event stopped using the profile
    pub fn release(&mut self, key: &str) {
        if let Some(count) = self.active_refs.get_mut(key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.active_refs.remove(key);
            }
        }
    }

    pub fn references(&self, key: &str) -> usize {
        self.active_refs.get(key).copied().unwrap_or(0)
    }

    /// Pick a profile for a new event and mark it in the rotation
    pub fn select(
        &mut self,
        rng: &mut RaidRng,
        category: RaidCategory,
        requested: DifficultyFilter,
        explicit: Option<&str>,
        ctx: &SelectionContext<'_>,
    ) -> Result<ProfileChoice> {
        let eligible: Vec<&BuildingProfile> = self
            .profiles
            .values()
            .filter(|p| requested.matches(p.difficulty))
            .filter(|p| p.categories.allows(category))
            .filter(|p| p.open_on(ctx.weekday))
            .filter(|p| ctx.pvp.allows(p.allow_pvp))
            .filter(|p| p.blueprints().any(|b| (ctx.blueprint_exists)(b)))
            .collect();

        if eligible.is_empty() {
            return Err(Error::Unavailable(format!(
                "no {} profile available for {} today",
                match requested {
                    DifficultyFilter::Any => "enabled".to_string(),
                    DifficultyFilter::Only(d) => d.to_string(),
                },
                category
            )));
        }

        // Tiers whose every eligible profile has been used start a new cycle
        let mut exhausted: Vec<Difficulty> = Vec::new();
        for profile in &eligible {
            let tier = profile.difficulty;
            if exhausted.contains(&tier) {
                continue;
            }
            let all_used = eligible
                .iter()
                .filter(|p| p.difficulty == tier)
                .all(|p| self.rotation.is_used(tier, &p.name));
            if all_used {
                exhausted.push(tier);
            }
        }

        // A named request bypasses the rotation but never resets it
        let candidates: Vec<&BuildingProfile> = match explicit {
            Some(name) => {
                let named: Vec<_> = eligible
                    .into_iter()
                    .filter(|p| p.answers_to(name))
                    .collect();
                if named.is_empty() {
                    return Err(Error::ProfileNotFound(name.to_string()));
                }
                named
            }
            None => eligible
                .into_iter()
                .filter(|p| {
                    exhausted.contains(&p.difficulty)
                        || !self.rotation.is_used(p.difficulty, &p.name)
                })
                .collect(),
        };

        let chosen = *rng
            .pick(&candidates)
            .ok_or_else(|| Error::Unavailable("no profile left in rotation".to_string()))?;

        let existing: Vec<&str> = chosen
            .blueprints()
            .filter(|b| (ctx.blueprint_exists)(b))
            .collect();
        let blueprint = match explicit {
            Some(name) if existing.iter().any(|b| b.eq_ignore_ascii_case(name)) => existing
                .iter()
                .find(|b| b.eq_ignore_ascii_case(name))
                .copied()
                .unwrap_or(chosen.name.as_str()),
            _ => rng.pick(&existing).copied().unwrap_or(chosen.name.as_str()),
        }
        .to_string();

        let tier = chosen.difficulty;
        let key = chosen.name.clone();
        if exhausted.contains(&tier) && explicit.is_none() {
            log::debug!("rotation for {} cleared", tier);
            self.rotation.clear(tier);
        }
        let fresh = self.rotation.enabled && !self.rotation.is_used(tier, &key);
        self.rotation.mark(tier, &key);
        Ok(ProfileChoice {
            key,
            blueprint,
            difficulty: tier,
            fresh,
        })
    }
}
