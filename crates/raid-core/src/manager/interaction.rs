//! Host hooks for players, damage and containers

use super::RaidManager;
use crate::host::Host;
use crate::identity::{ActorId, EntityId, EventId, PlayerId};
use crate::raid::{hogging_conflict, DamageVerdict, EntryRefusal, EntryVerdict, RaidState, Roles};
use crate::timer::TimerKind;

impl RaidManager {
    /// A player crossed into an event's protection volume
    pub fn on_player_enter(
        &mut self,
        host: &mut dyn Host,
        id: EventId,
        player: PlayerId,
        via_teleport: bool,
    ) -> EntryVerdict {
        let Some(event) = self.events.get(&id) else {
            return EntryVerdict::Ignored;
        };
        if !event.is_open() {
            return EntryVerdict::Ignored;
        }
        if event.intruders.contains(&player) {
            return EntryVerdict::AlreadyInside;
        }

        let lifecycle = &self.settings.lifecycle;
        let now = self.clock.epoch_secs();
        let refusal = if host.players().is_banned(player) {
            Some(EntryRefusal::Banned)
        } else if via_teleport && lifecycle.block_teleport_entry {
            Some(EntryRefusal::Teleported)
        } else if lifecycle.eject_locked_out
            && self.lockouts.has_lockout(player, event.difficulty, now)
        {
            Some(EntryRefusal::LockedOut {
                remaining_secs: self.lockouts.remaining(player, event.difficulty, now),
            })
        } else {
            hogging_conflict(
                player,
                id,
                self.events.values(),
                host.social(),
                &self.settings.hogging,
            )
            .map(EntryRefusal::Hogging)
        };

        if let Some(refusal) = refusal {
            let (center, radius) = (event.position, event.radius);
            log::info!("{}: {} ejected ({:?})", id, player, refusal);
            let players = host.players();
            players.eject(player, center, radius);
            players.message(player, &refusal_message(refusal));
            return EntryVerdict::Ejected(refusal);
        }

        let now = self.clock.now();
        let Some(event) = self.events.get_mut(&id) else {
            return EntryVerdict::Ignored;
        };
        event.intruders.insert(player);
        let first_occupant = event.intruders.len() == 1;
        let is_owner = event.owner == Some(player);
        let powered: Vec<EntityId> = if first_occupant {
            event.entities_with(Roles::POWERED).collect()
        } else {
            Vec::new()
        };
        let actors: Vec<ActorId> = if first_occupant {
            event.actors.iter().copied().collect()
        } else {
            Vec::new()
        };

        self.timers.cancel(id, TimerKind::PvpGrace(player));
        if is_owner {
            self.timers.cancel(id, TimerKind::OwnerReset);
            self.timers.cancel(id, TimerKind::PayLockReset);
        }
        if first_occupant {
            self.timers.cancel(id, TimerKind::TurretPowerOff);
            for entity in powered {
                host.entities().set_powered(entity, true);
            }
            for actor in actors {
                host.actors().set_active(actor, true);
            }
        }
        log::debug!("{}: {} entered at {:.0}s", id, player, now);
        EntryVerdict::Admitted { first_occupant }
    }

    /// A player left the protection volume
    pub fn on_player_exit(&mut self, id: EventId, player: PlayerId) {
        let now = self.clock.now();
        let Some(event) = self.events.get_mut(&id) else {
            return;
        };
        if !event.intruders.shift_remove(&player) || !event.is_open() {
            return;
        }
        let lifecycle = &self.settings.lifecycle;
        if event.intruders.is_empty() {
            self.timers
                .arm(id, TimerKind::TurretPowerOff, now, lifecycle.turret_power_off_secs);
        }
        if event.owner == Some(player) {
            if event.pay_locked {
                if lifecycle.pay_lock_reset_secs > 0.0 {
                    self.timers
                        .arm(id, TimerKind::PayLockReset, now, lifecycle.pay_lock_reset_secs);
                }
            } else if lifecycle.owner_reset_secs > 0.0 {
                self.timers
                    .arm(id, TimerKind::OwnerReset, now, lifecycle.owner_reset_secs);
            }
        }
        let delay = self.settings.pvp.delay_secs;
        if event.allow_pvp && delay > 0.0 {
            self.timers.arm(id, TimerKind::PvpGrace(player), now, delay);
        }
        log::debug!("{}: {} left", id, player);
    }

    /// Damage against a pasted entity. `attacker` is `None` for
    /// environmental damage.
    pub fn on_entity_damaged(
        &mut self,
        host: &mut dyn Host,
        entity: EntityId,
        attacker: Option<PlayerId>,
    ) -> DamageVerdict {
        let Some(id) = self.entity_index.get(&entity).copied() else {
            return DamageVerdict::NotOurs;
        };
        let roles = self
            .events
            .get(&id)
            .and_then(|e| e.roles_of(entity))
            .unwrap_or_default();
        self.authorize(host, id, attacker, roles)
    }

    /// Damage against a spawned hostile actor; actors count as capture targets
    pub fn on_actor_damaged(
        &mut self,
        host: &mut dyn Host,
        actor: ActorId,
        attacker: Option<PlayerId>,
    ) -> DamageVerdict {
        let Some(id) = self.actor_index.get(&actor).copied() else {
            return DamageVerdict::NotOurs;
        };
        self.authorize(host, id, attacker, Roles::CAPTURE)
    }

    fn authorize(
        &mut self,
        host: &mut dyn Host,
        id: EventId,
        attacker: Option<PlayerId>,
        roles: Roles,
    ) -> DamageVerdict {
        let Some(event) = self.events.get_mut(&id) else {
            return DamageVerdict::NotOurs;
        };
        let Some(attacker) = attacker else {
            return if event.state() < RaidState::Open {
                DamageVerdict::Blocked
            } else {
                DamageVerdict::Allowed { captured: false }
            };
        };
        let verdict = event.authorize_damage(
            attacker,
            roles,
            self.settings.lifecycle.lock_to_owner,
            host.social(),
            &self.settings.allies,
        );
        if let DamageVerdict::Allowed { captured } = verdict {
            if captured {
                host.players()
                    .message(attacker, "You now own this raid.");
            }
            self.touch(id);
        }
        verdict
    }

    /// May `player` open `container`
    pub fn can_loot(&self, host: &dyn Host, player: PlayerId, container: EntityId) -> bool {
        let Some(event) = self
            .entity_index
            .get(&container)
            .and_then(|id| self.events.get(id))
        else {
            return true;
        };
        match event.state() {
            RaidState::Open | RaidState::Completed => event.permits(
                player,
                self.settings.lifecycle.lock_to_owner,
                host.social(),
                &self.settings.allies,
            ),
            _ => false,
        }
    }

    /// An item left one of an event's containers
    pub fn on_item_removed(&mut self, container: EntityId, player: Option<PlayerId>) {
        let Some(id) = self.entity_index.get(&container).copied() else {
            return;
        };
        let now = self.clock.now();
        let Some(event) = self.events.get_mut(&id) else {
            return;
        };
        if !event.is_open() {
            return;
        }
        let counts = event
            .roles_of(container)
            .is_some_and(|r| r.contains(Roles::CONTAINER));
        if !counts {
            return;
        }
        if let Some(player) = player {
            if event.raiders.insert(player) {
                log::debug!("{}: {} is now a raider", id, player);
            }
        }
        if !self.timers.is_armed(id, TimerKind::CompletionCheck) {
            self.timers.arm(
                id,
                TimerKind::CompletionCheck,
                now,
                self.settings.lifecycle.completion_check_interval,
            );
        }
        if player.is_some() {
            self.touch(id);
        }
    }

    /// A pasted entity was destroyed outside of teardown
    pub fn on_entity_killed(&mut self, entity: EntityId) {
        let Some(id) = self.entity_index.remove(&entity) else {
            return;
        };
        let now = self.clock.now();
        let Some(event) = self.events.get_mut(&id) else {
            return;
        };
        event.destroyed.insert(entity);
        if let Some(cursor) = event.despawn.as_mut() {
            cursor.forget(entity);
        }
        let counts = event
            .roles_of(entity)
            .is_some_and(|r| r.intersects(Roles::LOOT | Roles::CUPBOARD));
        if event.is_open() && counts && !self.timers.is_armed(id, TimerKind::CompletionCheck) {
            self.timers.arm(
                id,
                TimerKind::CompletionCheck,
                now,
                self.settings.lifecycle.completion_check_interval,
            );
        }
    }

    /// A spawned actor died; returns the event it belonged to
    pub fn on_actor_killed(&mut self, actor: ActorId, killer: Option<PlayerId>) -> Option<EventId> {
        let id = self.actor_index.remove(&actor)?;
        let open = match self.events.get_mut(&id) {
            Some(event) => {
                event.actors.shift_remove(&actor);
                event.is_open()
            }
            None => false,
        };
        if open && killer.is_some() {
            self.touch(id);
        }
        Some(id)
    }

    /// May `attacker` hurt `victim`? `None` when no event is involved.
    ///
    /// A victim inside an event follows that event's PVP flag; a victim who
    /// recently left a PVP event stays attackable until the grace expires.
    pub fn pvp_verdict(&self, attacker: PlayerId, victim: PlayerId) -> Option<bool> {
        if let Some(event) = self
            .events
            .values()
            .find(|e| e.is_live() && e.intruders.contains(&victim))
        {
            let attacker_inside = event.intruders.contains(&attacker);
            return Some(event.allow_pvp && attacker_inside);
        }
        let in_grace = self
            .events
            .keys()
            .any(|id| self.timers.is_armed(*id, TimerKind::PvpGrace(victim)));
        in_grace.then_some(true)
    }

    /// Someone interacted: restart the inactivity countdown
    pub fn touch(&mut self, id: EventId) {
        let lifecycle = &self.settings.lifecycle;
        if !lifecycle.inactivity_despawn {
            return;
        }
        let Some(event) = self.events.get(&id) else {
            return;
        };
        if !event.is_open() || (lifecycle.inactivity_requires_engaged && !event.engaged) {
            return;
        }
        self.timers.arm(
            id,
            TimerKind::InactivityDespawn,
            self.clock.now(),
            lifecycle.inactivity_secs,
        );
    }
}

fn refusal_message(refusal: EntryRefusal) -> String {
    match refusal {
        EntryRefusal::Banned => "You are banned from raid events.".to_string(),
        EntryRefusal::Teleported => "You cannot teleport into a raid.".to_string(),
        EntryRefusal::LockedOut { remaining_secs } => format!(
            "You are locked out of this difficulty for another {}m.",
            (remaining_secs + 59) / 60
        ),
        EntryRefusal::Hogging(other) => format!("You are already raiding {}.", other),
    }
}
