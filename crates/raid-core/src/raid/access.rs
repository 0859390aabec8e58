//! Who may enter, damage and loot an event

use crate::config::{AllySettings, HoggingSettings};
use crate::host::SocialGraph;
use crate::identity::{EventId, PlayerId};

use super::{RaidEvent, Roles};

/// Answer to a player crossing into the protection volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryVerdict {
    Admitted { first_occupant: bool },
    AlreadyInside,
    Ejected(EntryRefusal),
    /// Unknown event or not open
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRefusal {
    Banned,
    Teleported,
    LockedOut { remaining_secs: i64 },
    /// Already holding another event
    Hogging(EventId),
}

/// Answer to damage against an event's entity or actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageVerdict {
    Allowed { captured: bool },
    /// Owned by someone else, or not open yet
    Blocked,
    /// Not part of any event
    NotOurs,
}

/// Allied per the enabled social links (a player is their own ally)
pub fn is_ally(social: &dyn SocialGraph, allies: &AllySettings, a: PlayerId, b: PlayerId) -> bool {
    a == b
        || (allies.team && social.same_team(a, b))
        || (allies.clan && social.same_clan(a, b))
        || (allies.friends && social.are_friends(a, b))
}

fn grouped(social: &dyn SocialGraph, hogging: &HoggingSettings, a: PlayerId, b: PlayerId) -> bool {
    a == b
        || (hogging.check_team && social.same_team(a, b))
        || (hogging.check_clan && social.same_clan(a, b))
        || (hogging.check_friends && social.are_friends(a, b))
}

/// Another open, unlocked event that `player` (or their group) already holds
pub fn hogging_conflict<'a>(
    player: PlayerId,
    entering: EventId,
    events: impl IntoIterator<Item = &'a RaidEvent>,
    social: &dyn SocialGraph,
    hogging: &HoggingSettings,
) -> Option<EventId> {
    if !hogging.enabled {
        return None;
    }
    events
        .into_iter()
        .filter(|e| e.id != entering && e.is_open() && !e.pay_locked)
        .find(|e| {
            let holds = e.owner == Some(player) || e.raiders.contains(&player);
            let group_inside = e.owner.is_some_and(|owner| grouped(social, hogging, owner, player))
                && e
                    .intruders
                    .iter()
                    .any(|i| grouped(social, hogging, *i, player));
            holds || group_inside
        })
        .map(|e| e.id)
}

impl RaidEvent {
    /// May `player` loot or damage an owned event
    pub fn permits(
        &self,
        player: PlayerId,
        lock_to_owner: bool,
        social: &dyn SocialGraph,
        allies: &AllySettings,
    ) -> bool {
        match self.owner {
            Some(owner) if lock_to_owner => is_ally(social, allies, owner, player),
            _ => true,
        }
    }

    /// Decide player damage against something this event owns.
    ///
    /// The first player to damage a capture target of an unowned, unlocked
    /// event becomes its owner; raiders not allied with them are dropped.
    pub fn authorize_damage(
        &mut self,
        attacker: PlayerId,
        target: Roles,
        lock_to_owner: bool,
        social: &dyn SocialGraph,
        allies: &AllySettings,
    ) -> DamageVerdict {
        if !self.is_open() {
            return if self.state() < super::RaidState::Open {
                DamageVerdict::Blocked
            } else {
                DamageVerdict::Allowed { captured: false }
            };
        }

        if self.owner.is_none() && !self.pay_locked && target.contains(Roles::CAPTURE) {
            self.owner = Some(attacker);
            self.engaged = true;
            self.raiders
                .retain(|r| is_ally(social, allies, attacker, *r));
            log::info!("{}: captured by {}", self.id, attacker);
            return DamageVerdict::Allowed { captured: true };
        }

        if self.permits(attacker, lock_to_owner, social, allies) {
            self.engaged = true;
            DamageVerdict::Allowed { captured: false }
        } else {
            DamageVerdict::Blocked
        }
    }
}
