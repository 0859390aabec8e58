//! The raid event: one placed building and everything attached to it
//!
//! ```text
//! Loading ──> Open ──> Completed ──> Despawning ──> Destroyed
//!    │                                   ▲
//!    └───────────────────────────────────┘  (teardown while classifying)
//! ```
//!
//! States only move forward. `PayLocked` and `Engaged` are flags layered
//! on `Open`.

mod access;
mod setup;
mod teardown;

pub use access::{hogging_conflict, is_ally, DamageVerdict, EntryRefusal, EntryVerdict};
pub use setup::{classify, Roles, SetupCursor, SetupProgress};
pub use teardown::DespawnCursor;

use crate::clock::Seconds;
use crate::geometry::Vec3;
use crate::identity::{ActorId, EntityId, EventId, MarkerId, PasteTicket, PlayerId};
use crate::kind::{Difficulty, RaidCategory};
use crate::loot::{DistributionReport, LootTargets};
use crate::spawn::SpawnCandidate;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state, ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RaidState {
    Loading,
    Open,
    Completed,
    Despawning,
    Destroyed,
}

impl fmt::Display for RaidState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RaidState::Loading => "loading",
            RaidState::Open => "open",
            RaidState::Completed => "completed",
            RaidState::Despawning => "despawning",
            RaidState::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// Why an event ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    /// Every qualifying container emptied
    Looted,
    /// Lifetime ran out
    Expired,
    /// Nobody interacted for too long
    Inactive,
    /// Despawned by command
    Admin,
    /// The whole system is shutting down
    Unloaded,
}

/// Payment held for a bought event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub buyer: PlayerId,
    pub amount: f64,
    /// Paid in reward points rather than currency
    pub points: bool,
}

/// One live raid
#[derive(Debug, Clone)]
pub struct RaidEvent {
    pub id: EventId,
    pub category: RaidCategory,
    pub position: Vec3,
    pub rotation: f32,
    /// Profile key
    pub profile: String,
    pub blueprint: String,
    pub difficulty: Difficulty,
    pub radius: f32,
    pub separation: f32,
    pub allow_pvp: bool,
    /// Spawn index the position came from
    pub spawn_index: String,
    pub candidate: SpawnCandidate,
    pub ticket: PasteTicket,
    /// Holds a rotation slot to give back if the event never opens
    pub rotation_slot: bool,
    state: RaidState,
    pub owner: Option<PlayerId>,
    pub pay_locked: bool,
    pub engaged: bool,
    pub purchase: Option<Purchase>,
    pub intruders: IndexSet<PlayerId>,
    pub raiders: IndexSet<PlayerId>,
    pub entities: IndexMap<EntityId, Roles>,
    /// Entities that died before teardown
    pub destroyed: IndexSet<EntityId>,
    pub actors: IndexSet<ActorId>,
    pub marker: Option<MarkerId>,
    pub opened_at: Option<Seconds>,
    pub completion: Option<Completion>,
    pub loot_report: Option<DistributionReport>,
    pub setup: Option<SetupCursor>,
    pub despawn: Option<DespawnCursor>,
}

impl RaidEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EventId,
        category: RaidCategory,
        candidate: SpawnCandidate,
        rotation: f32,
        profile: String,
        blueprint: String,
        difficulty: Difficulty,
        radius: f32,
        separation: f32,
        allow_pvp: bool,
        spawn_index: String,
        ticket: PasteTicket,
    ) -> Self {
        Self {
            id,
            category,
            position: candidate.position,
            rotation,
            profile,
            blueprint,
            difficulty,
            radius,
            separation,
            allow_pvp,
            spawn_index,
            candidate,
            ticket,
            rotation_slot: true,
            state: RaidState::Loading,
            owner: None,
            pay_locked: false,
            engaged: false,
            purchase: None,
            intruders: IndexSet::new(),
            raiders: IndexSet::new(),
            entities: IndexMap::new(),
            destroyed: IndexSet::new(),
            actors: IndexSet::new(),
            marker: None,
            opened_at: None,
            completion: None,
            loot_report: None,
            setup: None,
            despawn: None,
        }
    }

    pub fn state(&self) -> RaidState {
        self.state
    }

    /// Move forward to `next`. Backward or repeated moves are ignored.
    pub fn advance(&mut self, next: RaidState) -> bool {
        if next <= self.state {
            log::debug!(
                "{}: ignoring transition {} -> {}",
                self.id,
                self.state,
                next
            );
            return false;
        }
        log::info!("{}: {} -> {}", self.id, self.state, next);
        self.state = next;
        true
    }

    pub fn is_open(&self) -> bool {
        self.state == RaidState::Open
    }

    /// Loading or open: the event still holds its position for placement purposes
    pub fn is_live(&self) -> bool {
        self.state < RaidState::Despawning
    }

    pub fn is_tearing_down(&self) -> bool {
        self.state >= RaidState::Despawning
    }

    /// Fix the owner by purchase
    pub fn pay_lock(&mut self, buyer: PlayerId) {
        self.owner = Some(buyer);
        self.pay_locked = true;
    }

    /// Drop ownership (and any pay-lock)
    pub fn reset_owner(&mut self) {
        if let Some(owner) = self.owner.take() {
            log::info!("{}: ownership of {} released", self.id, owner);
        }
        self.pay_locked = false;
    }

    /// Living entities carrying every role in `roles`
    pub fn entities_with(&self, roles: Roles) -> impl Iterator<Item = EntityId> + '_ {
        self.entities
            .iter()
            .filter(move |(id, r)| r.contains(roles) && !self.destroyed.contains(*id))
            .map(|(id, _)| *id)
    }

    /// Entities still standing
    pub fn living_entities(&self) -> Vec<EntityId> {
        self.entities
            .keys()
            .filter(|id| !self.destroyed.contains(*id))
            .copied()
            .collect()
    }

    pub fn roles_of(&self, entity: EntityId) -> Option<Roles> {
        self.entities.get(&entity).copied()
    }

    /// Containers grouped by their loot role
    pub fn loot_targets(&self) -> LootTargets {
        LootTargets {
            boxes: self.entities_with(Roles::LOOT).collect(),
            cupboard: self.entities_with(Roles::CUPBOARD).next(),
            ovens: self.entities_with(Roles::OVEN).collect(),
            fridges: self.entities_with(Roles::FRIDGE).collect(),
            lockers: self.entities_with(Roles::LOCKER).collect(),
        }
    }

    /// Containers whose emptiness decides completion, destroyed ones included
    pub fn completion_containers(&self, include_cupboard: bool) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, r)| {
                r.contains(Roles::LOOT) || (include_cupboard && r.contains(Roles::CUPBOARD))
            })
            .map(|(id, _)| *id)
            .collect()
    }
}
