//! Completion statistics

use crate::identity::PlayerId;
use crate::kind::Difficulty;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Completions of one player, per tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub completions: IndexMap<Difficulty, u32>,
}

impl PlayerStats {
    pub fn total(&self) -> u32 {
        self.completions.values().sum()
    }
}

/// Server-wide counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaidStats {
    pub players: IndexMap<PlayerId, PlayerStats>,
    /// Events opened per tier
    pub opened: IndexMap<Difficulty, u32>,
    /// Events completed by looting, per tier
    pub completed: IndexMap<Difficulty, u32>,
}

impl RaidStats {
    pub fn record_open(&mut self, difficulty: Difficulty) {
        *self.opened.entry(difficulty).or_default() += 1;
    }

    /// Credit one completion to the event and to each raider
    pub fn record_completion(&mut self, difficulty: Difficulty, raiders: &[PlayerId]) {
        *self.completed.entry(difficulty).or_default() += 1;
        for player in raiders {
            *self
                .players
                .entry(*player)
                .or_default()
                .completions
                .entry(difficulty)
                .or_default() += 1;
        }
    }

    pub fn completions(&self, player: PlayerId, difficulty: Difficulty) -> u32 {
        self.players
            .get(&player)
            .and_then(|s| s.completions.get(&difficulty))
            .copied()
            .unwrap_or(0)
    }

    /// Players ordered by total completions, best first
    pub fn leaderboard(&self, limit: usize) -> Vec<(PlayerId, u32)> {
        let mut board: Vec<(PlayerId, u32)> = self
            .players
            .iter()
            .map(|(id, s)| (*id, s.total()))
            .collect();
        board.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        board.truncate(limit);
        board
    }
}
