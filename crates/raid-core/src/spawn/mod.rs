//! Spawn candidates: the pooled index and the world-grid builder that feeds it

mod grid;
mod index;

pub use grid::{topology_blocked, GridBuilder, GridProgress};
pub use index::{Pool, SpawnCandidate, SpawnIndex, WithdrawReason};
