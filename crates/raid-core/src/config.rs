//! Settings - everything an operator can tune, loaded from RON
//!
//! Every field carries a serde default so a partial file (or an empty
//! `()`) yields a working configuration.
//!
//! ```
//! use raid_core::Settings;
//!
//! let settings = Settings::from_ron("(placement: (max_attempts: 250))").unwrap();
//! assert_eq!(settings.placement.max_attempts, 250);
//! assert_eq!(settings.lifecycle.despawn_batch, 15);
//! ```

use crate::error::Result;
use crate::kind::{Difficulty, RaidCategory};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub placement: PlacementSettings,
    pub grid: GridSettings,
    pub lifecycle: LifecycleSettings,
    pub loot: LootSettings,
    pub scheduler: SchedulerSettings,
    pub purchase: PurchaseSettings,
    pub rewards: RewardSettings,
    pub lockout: LockoutSettings,
    pub pvp: PvpSettings,
    pub allies: AllySettings,
    pub hogging: HoggingSettings,
    pub profiles: ProfileSettings,
    /// Fixed RNG seed; `None` seeds from the wall clock
    pub seed: Option<u64>,
}

impl Settings {
    /// Parse settings from a RON string
    pub fn from_ron(content: &str) -> Result<Self> {
        Ok(ron::from_str(content)?)
    }
}

/// Placement search limits and obstruction rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementSettings {
    /// Candidates drawn before giving up
    pub max_attempts: u32,
    /// Minimum ground distance between two events, unless a profile asks for more
    pub separation_distance: f32,
    /// Step by which an unsatisfiable anchor distance is relaxed
    pub anchor_relax_step: f32,
    /// Rocks larger than this block a site
    pub max_rock_size: f32,
    /// Water deeper than this above terrain marks a candidate submerged
    pub water_tolerance: f32,
    pub block_sleeping_players: bool,
    pub block_connected_players: bool,
    pub block_unowned_structures: bool,
    pub allow_roads: bool,
    pub allow_rivers: bool,
    pub allow_monuments: bool,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            max_attempts: 1000,
            separation_distance: 100.0,
            anchor_relax_step: 100.0,
            max_rock_size: 8.0,
            water_tolerance: 0.5,
            block_sleeping_players: true,
            block_connected_players: true,
            block_unowned_structures: true,
            allow_roads: false,
            allow_rivers: false,
            allow_monuments: false,
        }
    }
}

/// Dense world-grid fallback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Lattice spacing
    pub step: f32,
    /// Distance kept from the world edge
    pub edge_margin: f32,
    /// Radius of the flatness sampling ring
    pub ring_radius: f32,
    /// Samples taken around the ring (plus the centre)
    pub ring_samples: u32,
    /// Max-minus-min height above which a cell is rejected
    pub max_elevation_delta: f32,
    /// Cells examined per tick
    pub cells_per_tick: u32,
    /// Radius hint stored on grid candidates
    pub candidate_radius: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            step: 50.0,
            edge_margin: 150.0,
            ring_radius: 20.0,
            ring_samples: 8,
            max_elevation_delta: 2.5,
            cells_per_tick: 75,
            candidate_radius: 50.0,
        }
    }
}

/// Per-event timers and teardown pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleSettings {
    /// Pasted entities classified per tick during setup
    pub setup_batch: usize,
    /// Entities destroyed per tick during teardown
    pub despawn_batch: usize,
    /// Maximum lifetime once open; `0` disables
    pub lifetime_secs: f64,
    /// Extra time granted when the lifetime ends while an engaged event is occupied
    pub engaged_extension_secs: f64,
    /// Delay between completion and teardown
    pub despawn_after_completion_secs: f64,
    pub inactivity_despawn: bool,
    pub inactivity_secs: f64,
    /// Only start the inactivity timer once a player has engaged the event
    pub inactivity_requires_engaged: bool,
    /// Owner absence after which ownership is released; `0` disables
    pub owner_reset_secs: f64,
    /// Buyer absence after which a pay-lock is released; `0` disables
    pub pay_lock_reset_secs: f64,
    /// Delay before turrets power down once the event is empty
    pub turret_power_off_secs: f64,
    pub completion_check_interval: f64,
    /// Restrict damage and looting to the owner and allies
    pub lock_to_owner: bool,
    /// The access-control container must also be emptied
    pub require_cupboard_looted: bool,
    pub eject_locked_out: bool,
    pub block_teleport_entry: bool,
    pub max_events: usize,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            setup_batch: 1,
            despawn_batch: 15,
            lifetime_secs: 3600.0,
            engaged_extension_secs: 300.0,
            despawn_after_completion_secs: 30.0,
            inactivity_despawn: true,
            inactivity_secs: 1800.0,
            inactivity_requires_engaged: false,
            owner_reset_secs: 600.0,
            pay_lock_reset_secs: 0.0,
            turret_power_off_secs: 30.0,
            completion_check_interval: 1.0,
            lock_to_owner: true,
            require_cupboard_looted: false,
            eject_locked_out: true,
            block_teleport_entry: true,
            max_events: 30,
        }
    }
}

/// Loot table resolution and overflow routing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LootSettings {
    /// Prefer the weekday table over the default table when one exists
    pub use_weekday_tables: bool,
    pub route_resources_to_cupboard: bool,
    pub route_cookables_to_ovens: bool,
    pub route_food_to_fridges: bool,
    pub route_gear_to_lockers: bool,
}

impl Default for LootSettings {
    fn default() -> Self {
        Self {
            use_weekday_tables: false,
            route_resources_to_cupboard: true,
            route_cookables_to_ovens: true,
            route_food_to_fridges: true,
            route_gear_to_lockers: true,
        }
    }
}

/// Automatic event loops
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    pub maintained: MaintainedSettings,
    pub scheduled: ScheduledSettings,
    /// Automatic events wait until this many players are online
    pub min_online_players: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintainedSettings {
    pub enabled: bool,
    /// Keep this many maintained events alive
    pub max_events: usize,
    pub interval_secs: f64,
    pub include_pvp: bool,
    pub include_pve: bool,
}

impl Default for MaintainedSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            max_events: 1,
            interval_secs: 60.0,
            include_pvp: true,
            include_pve: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduledSettings {
    pub enabled: bool,
    pub interval_min_secs: f64,
    pub interval_max_secs: f64,
    pub max_per_burst: u32,
    /// Gap between two events of the same burst
    pub spacing_secs: f64,
    /// Upper bound on live scheduled events
    pub max_events: usize,
    pub include_pvp: bool,
    pub include_pve: bool,
}

impl Default for ScheduledSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_min_secs: 3600.0,
            interval_max_secs: 7200.0,
            max_per_burst: 3,
            spacing_secs: 30.0,
            max_events: 10,
            include_pvp: true,
            include_pve: true,
        }
    }
}

/// Player purchases
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseSettings {
    pub enabled: bool,
    /// Pay in reward points instead of currency
    pub use_points: bool,
    pub costs: IndexMap<Difficulty, f64>,
    /// Bought events are placed at least this far from the buyer
    pub min_distance_from_buyer: f32,
    pub include_pvp: bool,
    pub include_pve: bool,
}

impl Default for PurchaseSettings {
    fn default() -> Self {
        let costs = IndexMap::from([
            (Difficulty::Easy, 500.0),
            (Difficulty::Medium, 1000.0),
            (Difficulty::Hard, 2500.0),
            (Difficulty::Expert, 5000.0),
            (Difficulty::Nightmare, 10000.0),
        ]);
        Self {
            enabled: false,
            use_points: false,
            costs,
            min_distance_from_buyer: 150.0,
            include_pvp: true,
            include_pve: true,
        }
    }
}

/// Payouts to raiders of a looted event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardSettings {
    pub currency: IndexMap<Difficulty, f64>,
    pub points: IndexMap<Difficulty, i64>,
}

/// Re-entry cooldowns after a successful raid
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LockoutSettings {
    /// Seconds of lockout per tier; missing or zero means no lockout
    pub durations_secs: IndexMap<Difficulty, i64>,
}

impl LockoutSettings {
    pub fn duration(&self, difficulty: Difficulty) -> i64 {
        self.durations_secs.get(&difficulty).copied().unwrap_or(0)
    }
}

/// Per-category PVP resolution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PvpSettings {
    /// Forced value for a category, overriding the profile flag
    pub overrides: IndexMap<RaidCategory, bool>,
    /// Chance that a PVP-capable profile actually opens as PVP
    pub chance: IndexMap<RaidCategory, f64>,
    /// Seconds a player stays attackable after leaving a PVP event; `0` disables
    pub delay_secs: f64,
}

/// Which social links count as "allied"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AllySettings {
    pub team: bool,
    pub clan: bool,
    pub friends: bool,
}

impl Default for AllySettings {
    fn default() -> Self {
        Self {
            team: true,
            clan: true,
            friends: false,
        }
    }
}

/// Preventing one group from holding several events at once
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoggingSettings {
    pub enabled: bool,
    pub check_team: bool,
    pub check_clan: bool,
    pub check_friends: bool,
}

impl Default for HoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            check_team: true,
            check_clan: false,
            check_friends: false,
        }
    }
}

/// Building selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    /// Use every profile of a tier once before repeating any
    pub fairness_rotation: bool,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            fairness_rotation: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ron_yields_defaults() {
        let settings = Settings::from_ron("()").unwrap();
        assert_eq!(settings.placement.max_attempts, 1000);
        assert_eq!(settings.grid.cells_per_tick, 75);
        assert_eq!(settings.lifecycle.despawn_batch, 15);
        assert!(settings.seed.is_none());
    }

    #[test]
    fn test_partial_override() {
        let content = r#"
        (
            lockout: (durations_secs: { Easy: 600, Hard: 3600 }),
            pvp: (overrides: { Purchased: false }, delay_secs: 10.0),
            seed: Some(42),
        )
        "#;
        let settings = Settings::from_ron(content).unwrap();
        assert_eq!(settings.lockout.duration(Difficulty::Easy), 600);
        assert_eq!(settings.lockout.duration(Difficulty::Medium), 0);
        assert_eq!(
            settings.pvp.overrides.get(&RaidCategory::Purchased),
            Some(&false)
        );
        assert_eq!(settings.seed, Some(42));
    }

    #[test]
    fn test_bad_ron_is_config_error() {
        let err = Settings::from_ron("(placement: 5)").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
