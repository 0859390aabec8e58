//! Error types for raid-core
//!
//! Only conditions the caller can act on are errors. Setup shortfalls are
//! reported through [`crate::loot::DistributionReport`] and invariant
//! violations (a timer firing on a torn-down event, teardown requested
//! twice) are logged and ignored.

use crate::identity::EventId;
use thiserror::Error;

/// Result type for raid-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to whoever requested an operation
#[derive(Debug, Error)]
pub enum Error {
    /// No eligible profile or tier right now, or a collaborator is not ready
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Placement search gave up after its bounded retry budget
    #[error("no position found after {attempts} attempts")]
    ExhaustedSearch { attempts: u32 },

    /// Another blueprint paste is still in flight
    #[error("another raid is still loading")]
    LoadingGate,

    /// The world grid is being built and the request depends on it
    #[error("spawn grid is still loading")]
    GridLoading,

    #[error("event not found: {0}")]
    EventNotFound(EventId),

    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    /// Administrative removal refused while an event uses the profile
    #[error("profile {0} is referenced by an active event")]
    ProfileInUse(String),

    #[error("economy service unavailable")]
    EconomyUnavailable,

    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: f64, available: f64 },

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("config parse error: {0}")]
    Config(#[from] ron::error::SpannedError),
}

impl Error {
    /// True for conditions the caller may simply retry later
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Unavailable(_) | Error::LoadingGate | Error::GridLoading
        )
    }
}
