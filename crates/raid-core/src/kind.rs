//! Difficulty tiers and event categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Difficulty tier of a building profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
    Nightmare,
    /// Never selectable
    Disabled,
}

impl Difficulty {
    /// Every tier that can host an event
    pub const ACTIVE: [Difficulty; 5] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
        Difficulty::Nightmare,
    ];

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Difficulty::Disabled)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
            Difficulty::Nightmare => "Nightmare",
            Difficulty::Disabled => "Disabled",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = crate::Error;

    /// Accepts tier names (any case) or their index `0..=4`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "0" => Ok(Difficulty::Easy),
            "medium" | "1" => Ok(Difficulty::Medium),
            "hard" | "2" => Ok(Difficulty::Hard),
            "expert" | "3" => Ok(Difficulty::Expert),
            "nightmare" | "4" => Ok(Difficulty::Nightmare),
            other => Err(crate::Error::InvalidCommand(format!(
                "unknown difficulty '{}'",
                other
            ))),
        }
    }
}

/// Requested tier when opening an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DifficultyFilter {
    #[default]
    Any,
    Only(Difficulty),
}

impl DifficultyFilter {
    pub fn matches(&self, difficulty: Difficulty) -> bool {
        difficulty.is_enabled()
            && match self {
                DifficultyFilter::Any => true,
                DifficultyFilter::Only(d) => *d == difficulty,
            }
    }
}

impl From<Difficulty> for DifficultyFilter {
    fn from(d: Difficulty) -> Self {
        DifficultyFilter::Only(d)
    }
}

/// How an event came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RaidCategory {
    /// Opened by an administrator command
    Manual,
    /// Part of a periodic burst
    Scheduled,
    /// Bought by a player
    Purchased,
    /// Timed refill keeping a minimum number of events alive
    Maintained,
    /// Manual request placed on the dense world grid
    GridManual,
}

impl RaidCategory {
    pub fn name(&self) -> &'static str {
        match self {
            RaidCategory::Manual => "Manual",
            RaidCategory::Scheduled => "Scheduled",
            RaidCategory::Purchased => "Purchased",
            RaidCategory::Maintained => "Maintained",
            RaidCategory::GridManual => "GridManual",
        }
    }
}

impl fmt::Display for RaidCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
