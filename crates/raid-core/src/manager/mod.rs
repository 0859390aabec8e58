//! RaidManager - owns every registry and drives the event lifecycle
//!
//! The manager is the single owner of all mutable state: events, the
//! entity/actor/ticket registries, spawn indices, profiles, loot tables,
//! lockouts, statistics and timers. The host calls in from its event loop:
//!
//! - [`RaidManager::tick`] once per frame with the elapsed seconds;
//! - the `on_*` hooks when something happens in the world;
//! - [`RaidManager::request_placement`] / [`RaidManager::buy_event`] /
//!   [`RaidManager::execute`] for explicit requests.
//!
//! Long work (grid build, entity classification, teardown) advances a
//! bounded amount per tick. Registries are updated within one call so no
//! half-removed event is ever observable.

mod interaction;
mod lifecycle;

#[cfg(test)]
mod tests;

use crate::clock::{Clock, Seconds};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::host::Host;
use crate::identity::{ActorId, EntityId, EventId, PasteTicket};
use crate::kind::RaidCategory;
use crate::lockout::Lockouts;
use crate::loot::LootTables;
use crate::profile::{BuildingProfile, ProfileRegistry, Rotation};
use crate::raid::RaidEvent;
use crate::rng::RaidRng;
use crate::scheduler::{LiveCounts, Scheduler};
use crate::spawn::{GridBuilder, GridProgress, SpawnCandidate, SpawnIndex};
use crate::stats::RaidStats;
use crate::timer::Timers;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Name of the spawn index filled by the world-grid build
pub const GRID_INDEX: &str = "grid";

/// What happened to a placement request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Paste requested; the event is loading
    Loading(EventId),
    /// Waiting behind the paste gate or the grid build, at this queue position
    Queued(usize),
}

/// Orchestrator of all raid events
pub struct RaidManager {
    settings: Settings,
    clock: Clock,
    rng: RaidRng,
    profiles: ProfileRegistry,
    tables: LootTables,
    lockouts: Lockouts,
    stats: RaidStats,
    timers: Timers,
    scheduler: Scheduler,
    spawns: IndexMap<String, SpawnIndex>,
    grid: Option<GridBuilder>,
    events: IndexMap<EventId, RaidEvent>,
    entity_index: HashMap<EntityId, EventId>,
    actor_index: HashMap<ActorId, EventId>,
    tickets: HashMap<PasteTicket, EventId>,
    /// Event whose paste is in flight
    loading: Option<EventId>,
    next_event: u64,
    next_ticket: u64,
}

impl RaidManager {
    pub fn new(
        settings: Settings,
        profiles: Vec<BuildingProfile>,
        tables: LootTables,
        clock: Clock,
    ) -> Self {
        let rng = settings
            .seed
            .map(RaidRng::new)
            .unwrap_or_else(RaidRng::from_time);
        let profiles = ProfileRegistry::from_profiles(profiles, settings.profiles.fairness_rotation);
        log::info!(
            "raid manager ready: {} profiles, {} events max",
            profiles.len(),
            settings.lifecycle.max_events
        );
        Self {
            settings,
            clock,
            rng,
            profiles,
            tables,
            lockouts: Lockouts::new(),
            stats: RaidStats::default(),
            timers: Timers::new(),
            scheduler: Scheduler::new(),
            spawns: IndexMap::new(),
            grid: None,
            events: IndexMap::new(),
            entity_index: HashMap::new(),
            actor_index: HashMap::new(),
            tickets: HashMap::new(),
            loading: None,
            next_event: 1,
            next_ticket: 1,
        }
    }

    /// Restore persisted lockouts and statistics
    pub fn with_records(mut self, lockouts: Lockouts, stats: RaidStats) -> Self {
        self.lockouts = lockouts;
        self.stats = stats;
        self
    }

    /// Restore a persisted rotation; whether it is enabled stays a setting
    pub fn restore_rotation(&mut self, mut rotation: Rotation) {
        rotation.enabled = self.settings.profiles.fairness_rotation;
        *self.profiles.rotation_mut() = rotation;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn now(&self) -> Seconds {
        self.clock.now()
    }

    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    pub fn tables(&self) -> &LootTables {
        &self.tables
    }

    pub fn lockouts(&self) -> &Lockouts {
        &self.lockouts
    }

    pub fn stats(&self) -> &RaidStats {
        &self.stats
    }

    pub fn event(&self, id: EventId) -> Option<&RaidEvent> {
        self.events.get(&id)
    }

    pub fn events(&self) -> impl Iterator<Item = &RaidEvent> {
        self.events.values()
    }

    /// Events not yet tearing down
    pub fn live_count(&self) -> usize {
        self.events.values().filter(|e| e.is_live()).count()
    }

    pub fn event_of_entity(&self, entity: EntityId) -> Option<EventId> {
        self.entity_index.get(&entity).copied()
    }

    pub fn event_of_actor(&self, actor: ActorId) -> Option<EventId> {
        self.actor_index.get(&actor).copied()
    }

    /// A paste is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn is_grid_loading(&self) -> bool {
        self.grid.is_some()
    }

    pub fn spawn_index(&self, name: &str) -> Option<&SpawnIndex> {
        self.spawns.get(name)
    }

    pub fn pending_requests(&self) -> usize {
        self.scheduler.pending_len()
    }

    /// Register (or replace) a named spawn file
    pub fn load_spawn_file(&mut self, name: &str, candidates: Vec<SpawnCandidate>) -> usize {
        let index = SpawnIndex::from_candidates(name, candidates);
        let count = index.count();
        log::info!("spawn file '{}' loaded with {} positions", name, count);
        self.spawns.insert(name.to_string(), index);
        count
    }

    /// Start the time-sliced world-grid build
    pub fn start_grid_build(&mut self, host: &mut dyn Host) -> Result<()> {
        if self.grid.is_some() {
            return Err(Error::GridLoading);
        }
        let builder = GridBuilder::new(host.world().world_size(), &self.settings.grid);
        log::info!("grid build started: {} cells", builder.total_cells());
        self.spawns
            .insert(GRID_INDEX.to_string(), SpawnIndex::new(GRID_INDEX));
        self.grid = Some(builder);
        Ok(())
    }

    /// Administrative profile add
    pub fn add_profile(&mut self, profile: BuildingProfile) -> Option<BuildingProfile> {
        self.profiles.add(profile)
    }

    /// Administrative profile removal, refused while in use
    pub fn remove_profile(&mut self, key: &str) -> Result<BuildingProfile> {
        self.profiles.remove(key)
    }

    /// Advance time and every piece of sliced work
    pub fn tick(&mut self, host: &mut dyn Host, dt: Seconds) {
        self.clock.advance(dt);
        self.step_grid(host);
        self.step_setups(host);
        self.fire_timers(host);
        self.step_despawns(host);
        self.run_scheduler(host);
        let pruned = self.lockouts.prune(self.clock.epoch_secs());
        if pruned > 0 {
            log::debug!("pruned {} expired lockout records", pruned);
        }
    }

    /// Swap configuration, profiles and loot tables at runtime
    pub fn reinitialize(
        &mut self,
        settings: Settings,
        profiles: Vec<BuildingProfile>,
        tables: LootTables,
    ) {
        let mut rotation = self.profiles.rotation().clone();
        rotation.enabled = settings.profiles.fairness_rotation;
        let mut registry = ProfileRegistry::from_profiles(profiles, rotation.enabled);
        *registry.rotation_mut() = rotation;
        for event in self.events.values().filter(|e| !e.is_tearing_down()) {
            registry.acquire(&event.profile);
        }
        log::info!(
            "reinitialized: {} profiles, {} live events kept",
            registry.len(),
            self.live_count()
        );
        self.profiles = registry;
        self.tables = tables;
        self.settings = settings;
    }

    /// Cancel everything and destroy every event immediately
    pub fn unload(&mut self, host: &mut dyn Host) {
        let ids: Vec<EventId> = self.events.keys().copied().collect();
        for id in ids {
            self.begin_teardown(host, id, crate::raid::Completion::Unloaded);
        }
        let mut killed = 0;
        for (_, mut event) in self.events.drain(..) {
            if let Some(mut cursor) = event.despawn.take() {
                killed += cursor.drain(host.entities());
            }
            event.advance(crate::raid::RaidState::Destroyed);
        }
        self.timers.clear();
        self.scheduler.clear_pending();
        self.grid = None;
        self.loading = None;
        self.tickets.clear();
        self.entity_index.clear();
        self.actor_index.clear();
        log::info!("unloaded: {} entities destroyed", killed);
    }

    fn step_grid(&mut self, host: &mut dyn Host) {
        let Some(builder) = self.grid.as_mut() else {
            return;
        };
        let index = self
            .spawns
            .entry(GRID_INDEX.to_string())
            .or_insert_with(|| SpawnIndex::new(GRID_INDEX));
        let progress = builder.step(
            host.world(),
            index,
            &self.settings.grid,
            &self.settings.placement,
        );
        if let GridProgress::Finished { admitted, rejected } = progress {
            log::info!(
                "grid build finished: {} positions admitted, {} rejected",
                admitted,
                rejected
            );
            self.grid = None;
        }
    }

    fn live_counts(&self, online_players: usize) -> LiveCounts {
        let live = || self.events.values().filter(|e| e.is_live());
        LiveCounts {
            maintained: live()
                .filter(|e| e.category == RaidCategory::Maintained)
                .count(),
            scheduled: live()
                .filter(|e| e.category == RaidCategory::Scheduled)
                .count(),
            total: live().count(),
            online_players,
        }
    }

    fn run_scheduler(&mut self, host: &mut dyn Host) {
        let counts = self.live_counts(host.players().online_count());
        let due = self.scheduler.poll(
            &self.settings.scheduler,
            self.settings.lifecycle.max_events,
            self.clock.now(),
            counts,
            &mut self.rng,
        );
        for request in due {
            let category = request.category;
            if let Err(e) = self.request_placement(host, request) {
                log::warn!("scheduler: {} request failed: {}", category, e);
            }
        }

        if self.loading.is_some() || self.grid.is_some() {
            return;
        }
        if let Some(request) = self.scheduler.next_pending() {
            match self.try_place(host, &request) {
                Ok(id) => log::debug!("queued {} request placed as {}", request.category, id),
                Err(Error::LoadingGate) | Err(Error::GridLoading) => {
                    self.scheduler.retry_first(request)
                }
                Err(e) => log::warn!("queued {} request dropped: {}", request.category, e),
            }
        }
    }
}
