//! Administrative and player commands
//!
//! ```text
//! spawn [grid] [difficulty] [building]
//! buy <difficulty>
//! despawn nearest|all
//! reload
//! ```
//!
//! Each command maps onto one manager entry point; `reload` is only
//! acknowledged here since loading files is the store's job.

use crate::error::{Error, Result};
use crate::host::Host;
use crate::identity::{EventId, PlayerId};
use crate::kind::{Difficulty, DifficultyFilter, RaidCategory};
use crate::manager::{RaidManager, RequestOutcome};
use crate::scheduler::PlacementRequest;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Spawn {
        /// Place on the dense world grid instead of the profile's spawn file
        grid: bool,
        difficulty: DifficultyFilter,
        building: Option<String>,
    },
    Buy {
        difficulty: Difficulty,
    },
    DespawnNearest,
    DespawnAll,
    Reload,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut words = s.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| Error::InvalidCommand("empty command".to_string()))?
            .to_ascii_lowercase();
        let mut rest: Vec<&str> = words.collect();

        match verb.as_str() {
            "spawn" => {
                let grid = rest.first().is_some_and(|w| w.eq_ignore_ascii_case("grid"));
                if grid || rest.first().is_some_and(|w| w.eq_ignore_ascii_case("manual")) {
                    rest.remove(0);
                }
                let mut difficulty = DifficultyFilter::Any;
                if let Some(d) = rest.first().and_then(|w| w.parse::<Difficulty>().ok()) {
                    difficulty = d.into();
                    rest.remove(0);
                }
                let building = match rest.as_slice() {
                    [] => None,
                    [name] => Some(name.to_string()),
                    _ => {
                        return Err(Error::InvalidCommand(format!(
                            "unexpected arguments: {}",
                            rest.join(" ")
                        )))
                    }
                };
                Ok(Command::Spawn {
                    grid,
                    difficulty,
                    building,
                })
            }
            "buy" => match rest.as_slice() {
                [tier] => Ok(Command::Buy {
                    difficulty: tier.parse()?,
                }),
                _ => Err(Error::InvalidCommand("usage: buy <difficulty>".to_string())),
            },
            "despawn" => match rest.as_slice() {
                [] => Ok(Command::DespawnNearest),
                [w] if w.eq_ignore_ascii_case("nearest") => Ok(Command::DespawnNearest),
                [w] if w.eq_ignore_ascii_case("all") => Ok(Command::DespawnAll),
                _ => Err(Error::InvalidCommand(
                    "usage: despawn nearest|all".to_string(),
                )),
            },
            "reload" => Ok(Command::Reload),
            other => Err(Error::InvalidCommand(format!("unknown command '{}'", other))),
        }
    }
}

/// What a command did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Requested(RequestOutcome),
    Bought(EventId),
    /// Number of events that started tearing down
    Despawned(usize),
    /// The caller should reload files and call [`RaidManager::reinitialize`]
    ReloadRequested,
}

impl RaidManager {
    /// Run a parsed command on behalf of `issuer` (`None` for the console)
    pub fn execute(
        &mut self,
        host: &mut dyn Host,
        issuer: Option<PlayerId>,
        command: Command,
    ) -> Result<CommandOutcome> {
        log::debug!("command from {:?}: {:?}", issuer, command);
        match command {
            Command::Spawn {
                grid,
                difficulty,
                building,
            } => {
                let category = if grid {
                    RaidCategory::GridManual
                } else {
                    RaidCategory::Manual
                };
                let mut request = PlacementRequest::new(category, difficulty);
                request.building = building;
                request.requested_by = issuer;
                self.request_placement(host, request)
                    .map(CommandOutcome::Requested)
            }
            Command::Buy { difficulty } => {
                let buyer = issuer.ok_or_else(|| {
                    Error::InvalidCommand("only players can buy events".to_string())
                })?;
                self.buy_event(host, buyer, difficulty)
                    .map(CommandOutcome::Bought)
            }
            Command::DespawnNearest => {
                let position = issuer
                    .and_then(|p| host.players().position(p))
                    .ok_or_else(|| {
                        Error::InvalidCommand("despawn nearest needs a player position".to_string())
                    })?;
                let count = usize::from(self.despawn_nearest(host, position).is_some());
                Ok(CommandOutcome::Despawned(count))
            }
            Command::DespawnAll => Ok(CommandOutcome::Despawned(self.despawn_all(host))),
            Command::Reload => Ok(CommandOutcome::ReloadRequested),
        }
    }
}
