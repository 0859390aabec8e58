//! Spawn candidate pools
//!
//! Every candidate lives in exactly one pool: `Active`, or one of the
//! withdrawn pools keyed by [`WithdrawReason`]. Moves always remove from
//! the old pool before inserting into the new one.
//!
//! A candidate handed out by [`SpawnIndex::take_random`] moves to the
//! `Obstruction` pool flagged *in use*. In-use entries are skipped by
//! [`SpawnIndex::refill_from_withdrawn`], so a position can only be issued
//! again after [`SpawnIndex::return_near`] (or [`SpawnIndex::reinstate`])
//! brings it back.

use crate::geometry::Vec3;
use crate::kind::RaidCategory;
use crate::rng::RaidRng;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a candidate is not currently eligible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WithdrawReason {
    /// Another structure (including a live event) is in the way
    Obstruction,
    /// Inside a player's claimed construction radius
    Claimed,
    /// Under water
    Submerged,
}

impl WithdrawReason {
    pub const ALL: [WithdrawReason; 3] = [
        WithdrawReason::Obstruction,
        WithdrawReason::Claimed,
        WithdrawReason::Submerged,
    ];
}

impl fmt::Display for WithdrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WithdrawReason::Obstruction => "obstruction",
            WithdrawReason::Claimed => "claimed",
            WithdrawReason::Submerged => "submerged",
        };
        f.write_str(name)
    }
}

/// Pool membership of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pool {
    Active,
    Withdrawn(WithdrawReason),
}

/// A validated world position with cached terrain data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnCandidate {
    pub position: Vec3,
    pub min_elevation: f32,
    pub max_elevation: f32,
    pub water_height: f32,
    pub terrain_height: f32,
    /// Largest building radius the site was validated for
    pub radius: f32,
}

impl SpawnCandidate {
    /// Candidate with flat terrain at the position's elevation
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            min_elevation: position.y,
            max_elevation: position.y,
            water_height: f32::MIN,
            terrain_height: position.y,
            radius: 0.0,
        }
    }

    pub fn elevation_delta(&self) -> f32 {
        self.max_elevation - self.min_elevation
    }
}

#[derive(Debug, Clone)]
struct WithdrawnEntry {
    candidate: SpawnCandidate,
    category: Option<RaidCategory>,
    in_use: bool,
}

/// Pools of spawn candidates for one source (a spawn file or the world grid)
#[derive(Debug, Clone)]
pub struct SpawnIndex {
    name: String,
    active: Vec<SpawnCandidate>,
    withdrawn: IndexMap<WithdrawReason, Vec<WithdrawnEntry>>,
}

impl SpawnIndex {
    pub fn new(name: impl Into<String>) -> Self {
        let withdrawn = WithdrawReason::ALL
            .iter()
            .map(|r| (*r, Vec::new()))
            .collect();
        Self {
            name: name.into(),
            active: Vec::new(),
            withdrawn,
        }
    }

    /// Build an index with every candidate active
    pub fn from_candidates(name: impl Into<String>, candidates: Vec<SpawnCandidate>) -> Self {
        let mut index = Self::new(name);
        for candidate in candidates {
            index.add(candidate, Pool::Active);
        }
        index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert a candidate into `pool`, first removing any entry at the same spot
    pub fn add(&mut self, candidate: SpawnCandidate, pool: Pool) {
        self.remove_spot(candidate.position);
        match pool {
            Pool::Active => self.active.push(candidate),
            Pool::Withdrawn(reason) => self.push_withdrawn(reason, candidate, None, false),
        }
    }

    /// Move every Active candidate within `radius` of `point` to the `reason` pool
    pub fn withdraw_near(
        &mut self,
        point: Vec3,
        radius: f32,
        reason: WithdrawReason,
        category: Option<RaidCategory>,
    ) -> usize {
        let (moved, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|c| c.position.within_xz(point, radius));
        self.active = kept;
        let count = moved.len();
        for candidate in moved {
            self.push_withdrawn(reason, candidate, category, false);
        }
        if count > 0 {
            log::debug!(
                "spawns {}: withdrew {} near {} ({})",
                self.name,
                count,
                point,
                reason
            );
        }
        count
    }

    /// Move one specific candidate (wherever it is) to the `reason` pool
    pub fn withdraw(&mut self, candidate: SpawnCandidate, reason: WithdrawReason) {
        self.remove_spot(candidate.position);
        self.push_withdrawn(reason, candidate, None, false);
    }

    /// Return every `reason` candidate within `radius` of `point` to Active,
    /// including in-use ones
    pub fn return_near(&mut self, point: Vec3, radius: f32, reason: WithdrawReason) -> usize {
        let pool = self.withdrawn.entry(reason).or_default();
        let (back, kept): (Vec<_>, Vec<_>) = std::mem::take(pool)
            .into_iter()
            .partition(|e| e.candidate.position.within_xz(point, radius));
        *pool = kept;
        let count = back.len();
        self.active.extend(back.into_iter().map(|e| e.candidate));
        count
    }

    /// Put a specific candidate straight back into Active
    pub fn reinstate(&mut self, candidate: SpawnCandidate) {
        self.add(candidate, Pool::Active);
    }

    /// Remove a uniformly random Active candidate and mark it in use
    pub fn take_random(&mut self, rng: &mut RaidRng) -> Option<SpawnCandidate> {
        let i = rng.index(self.active.len())?;
        let candidate = self.active.swap_remove(i);
        self.push_withdrawn(WithdrawReason::Obstruction, candidate, None, true);
        Some(candidate)
    }

    /// Re-admit withdrawn candidates of `reason` that are not in use
    pub fn refill_from_withdrawn(&mut self, reason: WithdrawReason) -> usize {
        let pool = self.withdrawn.entry(reason).or_default();
        let (back, kept): (Vec<_>, Vec<_>) =
            std::mem::take(pool).into_iter().partition(|e| !e.in_use);
        *pool = kept;
        let count = back.len();
        self.active.extend(back.into_iter().map(|e| e.candidate));
        if count > 0 {
            log::debug!(
                "spawns {}: refilled {} from {} pool",
                self.name,
                count,
                reason
            );
        }
        count
    }

    /// Total candidates across all pools
    pub fn count(&self) -> usize {
        self.active.len() + self.withdrawn.values().map(Vec::len).sum::<usize>()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn withdrawn_count(&self, reason: WithdrawReason) -> usize {
        self.withdrawn.get(&reason).map(Vec::len).unwrap_or(0)
    }

    pub fn in_use_count(&self) -> usize {
        self.withdrawn
            .values()
            .flat_map(|v| v.iter())
            .filter(|e| e.in_use)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Which pool holds the candidate at `position`, if any
    pub fn pool_of(&self, position: Vec3) -> Option<Pool> {
        if self.active.iter().any(|c| c.position.same_spot(position)) {
            return Some(Pool::Active);
        }
        self.withdrawn.iter().find_map(|(reason, entries)| {
            entries
                .iter()
                .any(|e| e.candidate.position.same_spot(position))
                .then_some(Pool::Withdrawn(*reason))
        })
    }

    /// Category that withdrew the candidate at `position`, if it was withdrawn by an event
    pub fn withdrawn_by(&self, position: Vec3) -> Option<RaidCategory> {
        self.withdrawn
            .values()
            .flat_map(|v| v.iter())
            .find(|e| e.candidate.position.same_spot(position))
            .and_then(|e| e.category)
    }

    /// Every candidate regardless of pool, for persistence
    pub fn all_candidates(&self) -> Vec<SpawnCandidate> {
        self.active
            .iter()
            .copied()
            .chain(
                self.withdrawn
                    .values()
                    .flat_map(|v| v.iter().map(|e| e.candidate)),
            )
            .collect()
    }

    fn push_withdrawn(
        &mut self,
        reason: WithdrawReason,
        candidate: SpawnCandidate,
        category: Option<RaidCategory>,
        in_use: bool,
    ) {
        self.withdrawn.entry(reason).or_default().push(WithdrawnEntry {
            candidate,
            category,
            in_use,
        });
    }

    fn remove_spot(&mut self, position: Vec3) {
        self.active.retain(|c| !c.position.same_spot(position));
        for entries in self.withdrawn.values_mut() {
            entries.retain(|e| !e.candidate.position.same_spot(position));
        }
    }
}
