//! Raid Core - placement, lifecycle and loot allocation for transient raid events
//!
//! This crate provides everything needed to run temporary raidable
//! buildings inside a host game world:
//! - Spawn candidate pools and the time-sliced world-grid builder
//! - Placement search with bounded retries and anchor relaxation
//! - Building profiles with a per-tier fairness rotation
//! - Layered loot tables, resolution and container distribution
//! - The raid event state machine, access rules and batched teardown
//! - Lockouts, statistics, timers and the automatic scheduler
//!
//! ## Host contracts
//!
//! The core never touches the world directly. The host implements the
//! traits in [`host`] and drives a [`RaidManager`] from its own loop:
//!
//! ```text
//! host loop ──tick(dt)──> RaidManager ──traits──> world / paste / economy
//!           <──on_*()───
//! ```
//!
//! Everything is single-threaded and deterministic for a fixed
//! [`Settings::seed`].

pub mod clock;
pub mod command;
pub mod config;
mod error;
pub mod geometry;
pub mod host;
pub mod identity;
pub mod kind;
pub mod lockout;
pub mod loot;
pub mod manager;
pub mod placement;
pub mod profile;
pub mod raid;
pub mod rng;
pub mod scheduler;
pub mod spawn;
pub mod stats;
pub mod timer;

#[cfg(test)]
mod testing;

pub use clock::{Clock, Seconds};
pub use command::{Command, CommandOutcome};
pub use config::Settings;
pub use error::{Error, Result};
pub use geometry::Vec3;
pub use host::Host;
pub use identity::{ActorId, EntityId, EventId, MarkerId, PasteTicket, PlayerId};
pub use kind::{Difficulty, DifficultyFilter, RaidCategory};
pub use lockout::{LockoutRecord, Lockouts};
pub use loot::{LootItem, LootTables};
pub use manager::{RaidManager, RequestOutcome, GRID_INDEX};
pub use profile::{BuildingProfile, ProfileRegistry};
pub use raid::{Completion, RaidEvent, RaidState};
pub use rng::RaidRng;
pub use scheduler::PlacementRequest;
pub use spawn::{SpawnCandidate, SpawnIndex};
pub use stats::RaidStats;
