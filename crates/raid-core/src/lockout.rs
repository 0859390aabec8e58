//! Per-player re-entry cooldowns
//!
//! A record stores, per difficulty, the epoch second at which the player
//! may profit from that tier again. Records with nothing left to wait for
//! are pruned.

use crate::identity::PlayerId;
use crate::kind::Difficulty;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Lockout expiry per tier, as epoch seconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockoutRecord {
    pub easy: i64,
    pub medium: i64,
    pub hard: i64,
    pub expert: i64,
    pub nightmare: i64,
}

impl LockoutRecord {
    pub fn until(&self, difficulty: Difficulty) -> i64 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
            Difficulty::Expert => self.expert,
            Difficulty::Nightmare => self.nightmare,
            Difficulty::Disabled => 0,
        }
    }

    fn slot(&mut self, difficulty: Difficulty) -> Option<&mut i64> {
        match difficulty {
            Difficulty::Easy => Some(&mut self.easy),
            Difficulty::Medium => Some(&mut self.medium),
            Difficulty::Hard => Some(&mut self.hard),
            Difficulty::Expert => Some(&mut self.expert),
            Difficulty::Nightmare => Some(&mut self.nightmare),
            Difficulty::Disabled => None,
        }
    }

    /// True when every tier has expired at `now`
    pub fn is_expired(&self, now: i64) -> bool {
        Difficulty::ACTIVE
            .iter()
            .all(|d| self.until(*d) - now <= 0)
    }
}

/// Every player's lockouts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lockouts {
    records: IndexMap<PlayerId, LockoutRecord>,
}

impl Lockouts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: IndexMap<PlayerId, LockoutRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &IndexMap<PlayerId, LockoutRecord> {
        &self.records
    }

    /// Lock `player` out of `difficulty` for `duration` seconds from `now`
    pub fn set(&mut self, player: PlayerId, difficulty: Difficulty, now: i64, duration: i64) {
        if duration <= 0 {
            return;
        }
        let record = self.records.entry(player).or_default();
        if let Some(slot) = record.slot(difficulty) {
            *slot = (*slot).max(now + duration);
            log::debug!(
                "{} locked out of {} for {}s",
                player,
                difficulty,
                duration
            );
        }
    }

    pub fn has_lockout(&self, player: PlayerId, difficulty: Difficulty, now: i64) -> bool {
        self.remaining(player, difficulty, now) > 0
    }

    /// Seconds left, zero when not locked out
    pub fn remaining(&self, player: PlayerId, difficulty: Difficulty, now: i64) -> i64 {
        self.records
            .get(&player)
            .map(|r| (r.until(difficulty) - now).max(0))
            .unwrap_or(0)
    }

    pub fn clear(&mut self, player: PlayerId) -> bool {
        self.records.shift_remove(&player).is_some()
    }

    /// Drop records with nothing left; returns how many were removed
    pub fn prune(&mut self, now: i64) -> usize {
        let before = self.records.len();
        self.records.retain(|_, r| !r.is_expired(now));
        before - self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
