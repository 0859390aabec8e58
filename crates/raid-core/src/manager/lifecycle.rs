//! Opening, setting up, completing and tearing down events

use super::{RaidManager, RequestOutcome, GRID_INDEX};
use crate::error::{Error, Result};
use crate::geometry::Vec3;
use crate::host::{Host, PasteOptions, PasteRequest, PastedEntity};
use crate::identity::{EntityId, EventId, PasteTicket, PlayerId};
use crate::kind::{Difficulty, RaidCategory};
use crate::loot::{distribute, resolve, LootRequest};
use crate::placement::{Anchor, Occupied, PlacementQuery, PlacementSearch};
use crate::profile::{BuildingProfile, ProfileChoice, PvpGate, SelectionContext};
use crate::raid::{Completion, DespawnCursor, Purchase, RaidEvent, RaidState, Roles, SetupCursor, SetupProgress};
use crate::scheduler::PlacementRequest;
use crate::spawn::WithdrawReason;
use crate::timer::{TimerKind, TimerRecord};
use std::collections::HashSet;

impl RaidManager {
    /// Ask for a new event. Requests blocked by the paste gate or the grid
    /// build are queued and retried on later ticks.
    pub fn request_placement(
        &mut self,
        host: &mut dyn Host,
        request: PlacementRequest,
    ) -> Result<RequestOutcome> {
        match self.try_place(host, &request) {
            Ok(id) => Ok(RequestOutcome::Loading(id)),
            Err(Error::LoadingGate) | Err(Error::GridLoading) => {
                let position = self.scheduler.defer(request);
                log::debug!("placement request queued at position {}", position);
                Ok(RequestOutcome::Queued(position))
            }
            Err(e) => Err(e),
        }
    }

    /// Charge `buyer` and open an event owned by them, away from where they stand
    pub fn buy_event(
        &mut self,
        host: &mut dyn Host,
        buyer: PlayerId,
        difficulty: Difficulty,
    ) -> Result<EventId> {
        let purchase = &self.settings.purchase;
        if !purchase.enabled {
            return Err(Error::Unavailable("purchases are disabled".to_string()));
        }
        if self.loading.is_some() {
            return Err(Error::LoadingGate);
        }
        let cost = *purchase
            .costs
            .get(&difficulty)
            .ok_or_else(|| Error::Unavailable(format!("{} events are not for sale", difficulty)))?;
        let use_points = purchase.use_points;
        let min_distance = purchase.min_distance_from_buyer;

        let economy = host.economy().ok_or(Error::EconomyUnavailable)?;
        if use_points {
            let needed = cost.round() as i64;
            let available = economy.points(buyer);
            if available < needed || !economy.take_points(buyer, needed) {
                return Err(Error::InsufficientFunds {
                    needed: cost,
                    available: available as f64,
                });
            }
        } else {
            let available = economy.balance(buyer);
            if available < cost || !economy.withdraw(buyer, cost) {
                return Err(Error::InsufficientFunds {
                    needed: cost,
                    available,
                });
            }
        }

        let payment = Purchase {
            buyer,
            amount: cost,
            points: use_points,
        };
        let mut request = PlacementRequest::new(RaidCategory::Purchased, difficulty.into());
        request.anchor = host.players().position(buyer).map(|position| Anchor {
            position,
            min_distance,
        });
        request.requested_by = Some(buyer);
        request.purchase = Some(payment);

        match self.try_place(host, &request) {
            Ok(id) => {
                log::info!("{} bought {} ({})", buyer, id, difficulty);
                Ok(id)
            }
            Err(e) => {
                self.refund(host, payment);
                Err(e)
            }
        }
    }

    /// Select a profile, find a position and request the paste
    pub(super) fn try_place(
        &mut self,
        host: &mut dyn Host,
        request: &PlacementRequest,
    ) -> Result<EventId> {
        if self.loading.is_some() {
            return Err(Error::LoadingGate);
        }
        let live = self.live_count();
        if live >= self.settings.lifecycle.max_events {
            return Err(Error::Unavailable(format!(
                "event limit of {} reached",
                self.settings.lifecycle.max_events
            )));
        }

        let existing: HashSet<String> = {
            let paste = host.paste();
            self.profiles
                .iter()
                .flat_map(|p| p.blueprints())
                .filter(|b| paste.blueprint_exists(b))
                .map(str::to_string)
                .collect()
        };
        let exists = |name: &str| existing.contains(name);
        let ctx = SelectionContext {
            weekday: self.clock.weekday(),
            pvp: self.pvp_gate(request.category),
            blueprint_exists: &exists,
        };
        let choice = self.profiles.select(
            &mut self.rng,
            request.category,
            request.difficulty,
            request.building.as_deref(),
            &ctx,
        )?;
        let Some(profile) = self.profiles.get(&choice.key).cloned() else {
            return Err(Error::ProfileNotFound(choice.key));
        };

        let index_name = match (&profile.spawns, request.category) {
            (_, RaidCategory::GridManual) => GRID_INDEX.to_string(),
            (Some(name), _) if self.spawns.contains_key(name) => name.clone(),
            (Some(name), _) => {
                log::warn!(
                    "spawn file '{}' of {} is not loaded, using the grid",
                    name,
                    profile.name
                );
                GRID_INDEX.to_string()
            }
            (None, _) => GRID_INDEX.to_string(),
        };
        if index_name == GRID_INDEX {
            if self.grid.is_some() {
                self.unmark(&choice);
                return Err(Error::GridLoading);
            }
            if !self.spawns.contains_key(GRID_INDEX) {
                self.unmark(&choice);
                self.start_grid_build(host)?;
                return Err(Error::GridLoading);
            }
        }

        let separation = profile
            .separation
            .unwrap_or(self.settings.placement.separation_distance);
        let occupied: Vec<Occupied> = self
            .events
            .values()
            .filter(|e| e.is_live())
            .map(|e| Occupied {
                position: e.position,
                separation: e.separation,
            })
            .collect();
        let query = PlacementQuery {
            category: request.category,
            radius: profile.radius,
            separation,
            anchor: request.anchor,
            occupied: &occupied,
        };

        let found = {
            let search = PlacementSearch::new(&self.settings.placement, host.world(), host.claims());
            match self.spawns.get_mut(&index_name) {
                Some(index) => search.find(index, &mut self.rng, &query),
                None => None,
            }
        };
        let Some(placement) = found else {
            self.unmark(&choice);
            return Err(Error::ExhaustedSearch {
                attempts: self.settings.placement.max_attempts,
            });
        };

        let candidate = placement.candidate;
        if let Some(index) = self.spawns.get_mut(&index_name) {
            index.withdraw_near(
                candidate.position,
                profile.radius,
                WithdrawReason::Obstruction,
                Some(request.category),
            );
        }

        let allow_pvp = self.resolve_pvp(request.category, profile.allow_pvp);
        let id = EventId(self.next_event);
        self.next_event += 1;
        let ticket = PasteTicket(self.next_ticket);
        self.next_ticket += 1;
        let rotation = self.rng.range_f32(0.0, 360.0);

        let mut event = RaidEvent::new(
            id,
            request.category,
            candidate,
            rotation,
            choice.key.clone(),
            choice.blueprint.clone(),
            choice.difficulty,
            profile.radius,
            separation,
            allow_pvp,
            index_name.clone(),
            ticket,
        );
        event.rotation_slot = choice.fresh;
        if let Some(purchase) = request.purchase {
            event.pay_lock(purchase.buyer);
            event.purchase = Some(purchase);
        }

        let accepted = host.paste().paste(PasteRequest {
            ticket,
            position: candidate.position,
            rotation,
            blueprint: choice.blueprint.clone(),
            options: PasteOptions {
                auto_height: true,
                stability: false,
            },
        });
        if !accepted {
            self.release_position(&index_name, candidate.position, profile.radius);
            self.unmark(&choice);
            return Err(Error::Unavailable(format!(
                "paste service refused {}",
                choice.blueprint
            )));
        }

        self.profiles.acquire(&choice.key);
        self.tickets.insert(ticket, id);
        self.loading = Some(id);
        self.events.insert(id, event);
        log::info!(
            "{}: {} {} '{}' at {} after {} attempts{}",
            id,
            request.category,
            choice.difficulty,
            choice.blueprint,
            candidate.position,
            placement.attempts,
            if allow_pvp { " (pvp)" } else { "" }
        );
        Ok(id)
    }

    /// The paste service finished a request
    pub fn on_paste_complete(
        &mut self,
        host: &mut dyn Host,
        ticket: PasteTicket,
        entities: Vec<PastedEntity>,
    ) {
        let Some(id) = self.tickets.remove(&ticket) else {
            log::warn!("{} completed for no known event, undoing", ticket);
            let ids: Vec<EntityId> = entities.iter().map(|e| e.id).collect();
            host.paste().undo(&ids);
            return;
        };
        if self.loading == Some(id) {
            self.loading = None;
        }

        let still_loading = self
            .events
            .get(&id)
            .is_some_and(|e| e.state() == RaidState::Loading);
        if !still_loading {
            log::debug!("{}: paste finished after teardown, undoing", id);
            let ids: Vec<EntityId> = entities.iter().map(|e| e.id).collect();
            host.paste().undo(&ids);
            return;
        }
        if entities.is_empty() {
            log::warn!("{}: paste produced no entities", id);
            self.rollback(host, id);
            return;
        }

        for entity in &entities {
            self.entity_index.insert(entity.id, id);
        }
        if let Some(event) = self.events.get_mut(&id) {
            log::debug!("{}: pasted {} entities", id, entities.len());
            event.setup = Some(SetupCursor::new(entities));
        }
    }

    /// The paste service gave up on a request
    pub fn on_paste_failed(&mut self, host: &mut dyn Host, ticket: PasteTicket) {
        let Some(id) = self.tickets.remove(&ticket) else {
            log::debug!("{} failed for no known event", ticket);
            return;
        };
        if self.loading == Some(id) {
            self.loading = None;
        }
        log::warn!("{}: paste failed, rolling back", id);
        self.rollback(host, id);
    }

    /// Undo an event that never opened: no lockouts, no stats, slot returned
    fn rollback(&mut self, host: &mut dyn Host, id: EventId) {
        if self.events.get(&id).is_some_and(|e| e.is_tearing_down()) {
            // Teardown already released everything; despawn removes the event
            log::debug!("{}: already tearing down, nothing to roll back", id);
            return;
        }
        let Some(event) = self.events.shift_remove(&id) else {
            return;
        };
        self.tickets.remove(&event.ticket);
        self.entity_index.retain(|_, owner| *owner != id);
        self.actor_index.retain(|_, owner| *owner != id);
        self.timers.cancel_event(id);
        if self.loading == Some(id) {
            self.loading = None;
        }
        self.release_position(&event.spawn_index, event.position, event.radius);
        if event.rotation_slot {
            self.profiles
                .rotation_mut()
                .unmark(event.difficulty, &event.profile);
        }
        self.profiles.release(&event.profile);
        let pasted: Vec<EntityId> = event.entities.keys().copied().collect();
        if !pasted.is_empty() {
            host.paste().undo(&pasted);
        }
        if let Some(purchase) = event.purchase {
            self.refund(host, purchase);
        }
    }

    fn unmark(&mut self, choice: &ProfileChoice) {
        if choice.fresh {
            self.profiles
                .rotation_mut()
                .unmark(choice.difficulty, &choice.key);
        }
    }

    fn release_position(&mut self, index: &str, position: Vec3, radius: f32) {
        if let Some(index) = self.spawns.get_mut(index) {
            index.return_near(position, radius.max(1.0), WithdrawReason::Obstruction);
        }
    }

    fn refund(&mut self, host: &mut dyn Host, purchase: Purchase) {
        match host.economy() {
            Some(economy) if purchase.points => {
                economy.add_points(purchase.buyer, purchase.amount.round() as i64)
            }
            Some(economy) => economy.deposit(purchase.buyer, purchase.amount),
            None => {
                log::error!(
                    "cannot refund {} to {}: economy gone",
                    purchase.amount,
                    purchase.buyer
                );
                return;
            }
        }
        host.players()
            .message(purchase.buyer, "Your raid purchase was refunded.");
    }

    fn pvp_gate(&self, category: RaidCategory) -> PvpGate {
        let (include_pvp, include_pve) = match category {
            RaidCategory::Purchased => (
                self.settings.purchase.include_pvp,
                self.settings.purchase.include_pve,
            ),
            RaidCategory::Maintained => (
                self.settings.scheduler.maintained.include_pvp,
                self.settings.scheduler.maintained.include_pve,
            ),
            RaidCategory::Scheduled => (
                self.settings.scheduler.scheduled.include_pvp,
                self.settings.scheduler.scheduled.include_pve,
            ),
            RaidCategory::Manual | RaidCategory::GridManual => return PvpGate::ANY,
        };
        PvpGate {
            include_pvp,
            include_pve,
        }
    }

    fn resolve_pvp(&mut self, category: RaidCategory, profile_allows: bool) -> bool {
        if let Some(forced) = self.settings.pvp.overrides.get(&category) {
            return *forced;
        }
        let chance = self.settings.pvp.chance.get(&category).copied().unwrap_or(1.0);
        profile_allows && self.rng.chance(chance)
    }

    pub(super) fn step_setups(&mut self, host: &mut dyn Host) {
        let batch = self.settings.lifecycle.setup_batch;
        let mut ready = Vec::new();
        for (id, event) in self.events.iter_mut() {
            if event.state() != RaidState::Loading {
                continue;
            }
            let Some(mut cursor) = event.setup.take() else {
                continue;
            };
            match cursor.step(event, batch) {
                SetupProgress::Done => ready.push(*id),
                SetupProgress::Working { .. } => event.setup = Some(cursor),
            }
        }
        for id in ready {
            self.finish_setup(host, id);
        }
    }

    /// Classification done: loot, actors, marker, timers, then Open
    fn finish_setup(&mut self, host: &mut dyn Host, id: EventId) {
        let Some(event) = self.events.get(&id) else {
            return;
        };
        let profile = match self.profiles.get(&event.profile) {
            Some(profile) => profile.clone(),
            None => {
                log::error!("{}: profile {} vanished during setup", id, event.profile);
                let mut bare = BuildingProfile::new(event.profile.clone(), event.difficulty);
                bare.loot.treasure_amount = 0;
                bare.npc.enabled = false;
                bare
            }
        };

        let targets = event.loot_targets();
        let weekday = self
            .settings
            .loot
            .use_weekday_tables
            .then(|| self.clock.weekday());
        let request = LootRequest {
            building: &event.profile,
            difficulty: event.difficulty,
            weekday,
            target: profile.loot.treasure_amount,
            allow_duplicates: profile.loot.allow_duplicates,
            prioritize: profile.loot.prioritize,
        };
        let entries = resolve(&self.tables, &request, host.items(), &mut self.rng);
        if entries.is_empty() {
            log::warn!("{}: no loot configured for '{}'", id, event.profile);
        }
        if targets.boxes.is_empty() {
            log::warn!("{}: '{}' has no loot containers", id, event.blueprint);
        }
        let report = distribute(
            host.inventory(),
            &entries,
            &targets,
            profile.loot.divide_loot,
            &self.settings.loot,
            &mut self.rng,
        );

        let powered: Vec<EntityId> = event.entities_with(Roles::POWERED).collect();
        let position = event.position;
        let radius = event.radius;
        let label = format!("{} Raid", event.difficulty);
        let pay_locked = event.pay_locked;
        let difficulty = event.difficulty;

        for entity in powered {
            host.entities().set_powered(entity, false);
        }

        let mut actors = Vec::new();
        if profile.npc.enabled {
            let count = self
                .rng
                .range_u32(profile.npc.amount_min, profile.npc.amount_max);
            actors = host.actors().spawn(id, position, radius, count);
            for actor in &actors {
                host.actors().set_active(*actor, false);
                self.actor_index.insert(*actor, id);
            }
        }
        let marker = host
            .markers()
            .and_then(|markers| markers.create(id, position, radius, &label));

        let now = self.clock.now();
        let Some(event) = self.events.get_mut(&id) else {
            return;
        };
        event.actors.extend(actors);
        event.marker = marker;
        event.loot_report = Some(report.clone());
        event.opened_at = Some(now);
        event.advance(RaidState::Open);

        let lifecycle = &self.settings.lifecycle;
        if lifecycle.lifetime_secs > 0.0 {
            self.timers
                .arm(id, TimerKind::Lifetime, now, lifecycle.lifetime_secs);
        }
        if lifecycle.inactivity_despawn && !lifecycle.inactivity_requires_engaged {
            self.timers
                .arm(id, TimerKind::InactivityDespawn, now, lifecycle.inactivity_secs);
        }
        if pay_locked && lifecycle.pay_lock_reset_secs > 0.0 {
            self.timers
                .arm(id, TimerKind::PayLockReset, now, lifecycle.pay_lock_reset_secs);
        }
        self.stats.record_open(difficulty);
        log::info!(
            "{}: open with {} of {} loot entries placed",
            id,
            report.placed(),
            report.requested
        );
    }

    /// Move an open event to Completed and schedule its teardown
    pub(super) fn complete(&mut self, host: &mut dyn Host, id: EventId, reason: Completion) {
        let Some(event) = self.events.get_mut(&id) else {
            return;
        };
        if !event.is_open() {
            log::debug!("{}: completion ({:?}) ignored in state {}", id, reason, event.state());
            return;
        }
        event.advance(RaidState::Completed);
        event.completion = Some(reason);
        let inside: Vec<PlayerId> = event.intruders.iter().copied().collect();
        self.timers.cancel_event(id);

        if reason == Completion::Looted {
            self.award(host, id);
        }
        let text = match reason {
            Completion::Looted => "This raid has been completed.",
            _ => "This raid is ending.",
        };
        for player in inside {
            host.players().message(player, text);
        }

        let delay = self.settings.lifecycle.despawn_after_completion_secs;
        if delay > 0.0 {
            self.timers
                .arm(id, TimerKind::PostCompletionDespawn, self.clock.now(), delay);
        } else {
            self.begin_teardown(host, id, reason);
        }
    }

    fn award(&mut self, host: &mut dyn Host, id: EventId) {
        let Some(event) = self.events.get(&id) else {
            return;
        };
        let raiders: Vec<PlayerId> = event.raiders.iter().copied().collect();
        let difficulty = event.difficulty;
        let currency = self
            .settings
            .rewards
            .currency
            .get(&difficulty)
            .copied()
            .unwrap_or(0.0);
        let points = self
            .settings
            .rewards
            .points
            .get(&difficulty)
            .copied()
            .unwrap_or(0);

        if currency > 0.0 || points > 0 {
            match host.economy() {
                Some(economy) => {
                    for player in &raiders {
                        if currency > 0.0 {
                            economy.deposit(*player, currency);
                        }
                        if points > 0 {
                            economy.add_points(*player, points);
                        }
                    }
                }
                None => log::debug!("{}: no economy, rewards skipped", id),
            }
        }
        self.stats.record_completion(difficulty, &raiders);
        log::info!("{}: looted by {} raiders", id, raiders.len());
    }

    /// Administrative teardown. Idempotent: `false` when already tearing down.
    pub fn teardown(&mut self, host: &mut dyn Host, id: EventId) -> bool {
        self.begin_teardown(host, id, Completion::Admin)
    }

    /// Release everything the event holds in one go and start the batched kill
    pub(super) fn begin_teardown(
        &mut self,
        host: &mut dyn Host,
        id: EventId,
        reason: Completion,
    ) -> bool {
        let Some(event) = self.events.get_mut(&id) else {
            log::debug!("{}: teardown of unknown event ignored", id);
            return false;
        };
        if event.is_tearing_down() {
            log::debug!("{}: teardown already in progress", id);
            return false;
        }
        let was_loading = event.state() == RaidState::Loading;
        event.advance(RaidState::Despawning);
        let reason = *event.completion.get_or_insert(reason);
        let unclassified: Vec<EntityId> = event
            .setup
            .take()
            .map(|cursor| cursor.unclassified().collect())
            .unwrap_or_default();
        self.timers.cancel_event(id);

        let containers: Vec<EntityId> = event.entities_with(Roles::CONTAINER).collect();
        let actors: Vec<_> = event.actors.drain(..).collect();
        let marker = event.marker.take();
        let mut living = event.living_entities();
        living.extend(unclassified);
        let position = event.position;
        let radius = event.radius;
        let index = event.spawn_index.clone();
        let profile = event.profile.clone();
        let difficulty = event.difficulty;
        let rotation_slot = event.rotation_slot;
        let unpaid = if was_loading { event.purchase.take() } else { None };
        let mut qualifying: Vec<PlayerId> = event.raiders.iter().copied().collect();
        if let Some(owner) = event.owner {
            if !qualifying.contains(&owner) {
                qualifying.push(owner);
            }
        }
        event.despawn = Some(DespawnCursor::new(living));

        for container in containers {
            host.entities().set_drop_chance(container, 0.0);
        }
        for actor in actors {
            host.actors().kill(actor);
        }
        if let (Some(marker), Some(markers)) = (marker, host.markers()) {
            markers.remove(marker);
        }
        self.entity_index.retain(|_, owner| *owner != id);
        self.actor_index.retain(|_, owner| *owner != id);
        self.release_position(&index, position, radius);
        self.profiles.release(&profile);
        if was_loading && rotation_slot {
            // Never opened: the rotation slot was not used
            self.profiles.rotation_mut().unmark(difficulty, &profile);
        }
        if let Some(purchase) = unpaid {
            self.refund(host, purchase);
        }

        if reason == Completion::Looted {
            let duration = self.settings.lockout.duration(difficulty);
            let now = self.clock.epoch_secs();
            for player in &qualifying {
                self.lockouts.set(*player, difficulty, now, duration);
            }
        }
        log::info!("{}: teardown started ({:?})", id, reason);
        true
    }

    pub(super) fn step_despawns(&mut self, host: &mut dyn Host) {
        let batch = self.settings.lifecycle.despawn_batch;
        let mut finished = Vec::new();
        for (id, event) in self.events.iter_mut() {
            if event.state() != RaidState::Despawning {
                continue;
            }
            match event.despawn.as_mut() {
                Some(cursor) => {
                    cursor.step(host.entities(), batch);
                    if cursor.is_done() {
                        finished.push(*id);
                    }
                }
                None => finished.push(*id),
            }
        }
        for id in finished {
            if let Some(mut event) = self.events.shift_remove(&id) {
                event.advance(RaidState::Destroyed);
            }
        }
    }

    pub(super) fn fire_timers(&mut self, host: &mut dyn Host) {
        let now = self.clock.now();
        for timer in self.timers.take_due(now) {
            if !self.events.contains_key(&timer.event) {
                log::debug!("{:?} fired for gone {}", timer.kind, timer.event);
                continue;
            }
            self.on_timer(host, timer);
        }
    }

    /// Re-validate the event's state, then act
    fn on_timer(&mut self, host: &mut dyn Host, timer: TimerRecord) {
        let id = timer.event;
        let now = self.clock.now();
        let Some(event) = self.events.get_mut(&id) else {
            return;
        };
        let open = event.is_open();
        match timer.kind {
            TimerKind::OwnerReset => {
                if let Some(owner) = event.owner {
                    if open && !event.pay_locked && !event.intruders.contains(&owner) {
                        event.reset_owner();
                    }
                }
            }
            TimerKind::PayLockReset => {
                let away = event.owner.is_some_and(|o| !event.intruders.contains(&o));
                if open && event.pay_locked && away {
                    event.reset_owner();
                }
            }
            TimerKind::TurretPowerOff => {
                if open && event.intruders.is_empty() {
                    let powered: Vec<EntityId> = event.entities_with(Roles::POWERED).collect();
                    let actors: Vec<_> = event.actors.iter().copied().collect();
                    for entity in powered {
                        host.entities().set_powered(entity, false);
                    }
                    for actor in actors {
                        host.actors().set_active(actor, false);
                    }
                }
            }
            TimerKind::InactivityDespawn => {
                if open && self.settings.lifecycle.inactivity_despawn {
                    log::info!("{}: inactive", id);
                    self.complete(host, id, Completion::Inactive);
                }
            }
            TimerKind::Lifetime => {
                if !open {
                    return;
                }
                let extension = self.settings.lifecycle.engaged_extension_secs;
                if event.engaged && !event.intruders.is_empty() && extension > 0.0 {
                    log::debug!("{}: lifetime extended by {}s", id, extension);
                    self.timers.arm(id, TimerKind::Lifetime, now, extension);
                } else {
                    self.complete(host, id, Completion::Expired);
                }
            }
            TimerKind::CompletionCheck => {
                if !open {
                    return;
                }
                let occupied = !event.intruders.is_empty();
                if self.is_looted(host, id) {
                    self.complete(host, id, Completion::Looted);
                } else if occupied {
                    self.timers.arm(
                        id,
                        TimerKind::CompletionCheck,
                        now,
                        self.settings.lifecycle.completion_check_interval,
                    );
                }
            }
            TimerKind::PostCompletionDespawn => {
                if event.state() == RaidState::Completed {
                    let reason = event.completion.unwrap_or(Completion::Expired);
                    self.begin_teardown(host, id, reason);
                }
            }
            TimerKind::PvpGrace(player) => {
                log::debug!("{}: pvp grace of {} over", id, player);
            }
        }
    }

    /// Every qualifying container is empty (or destroyed)
    pub(super) fn is_looted(&self, host: &mut dyn Host, id: EventId) -> bool {
        let Some(event) = self.events.get(&id) else {
            return false;
        };
        let containers =
            event.completion_containers(self.settings.lifecycle.require_cupboard_looted);
        if containers.is_empty() {
            return false;
        }
        let inventory = host.inventory();
        containers
            .iter()
            .all(|c| event.destroyed.contains(c) || inventory.item_count(*c) == 0)
    }

    /// Tear down the closest event to `position`
    pub fn despawn_nearest(&mut self, host: &mut dyn Host, position: Vec3) -> Option<EventId> {
        let nearest = self
            .events
            .values()
            .filter(|e| !e.is_tearing_down())
            .min_by(|a, b| {
                a.position
                    .distance_xz_sq(position)
                    .total_cmp(&b.position.distance_xz_sq(position))
            })
            .map(|e| e.id)?;
        self.teardown(host, nearest).then_some(nearest)
    }

    /// Tear down every event; returns how many started tearing down
    pub fn despawn_all(&mut self, host: &mut dyn Host) -> usize {
        let ids: Vec<EventId> = self.events.keys().copied().collect();
        ids.into_iter()
            .filter(|id| self.teardown(host, *id))
            .count()
    }
}
