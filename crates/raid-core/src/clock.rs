//! Simulation time
//!
//! The host drives the manager with elapsed seconds per tick. Timers run
//! on the monotonic `now()`; lockouts and weekday tables need wall-clock
//! epoch seconds, derived from an origin captured at construction.

use chrono::{DateTime, Datelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Seconds on the manager's monotonic timeline
pub type Seconds = f64;

/// Monotonic clock plus the epoch it started at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clock {
    elapsed: Seconds,
    epoch_origin: i64,
}

impl Clock {
    /// Start a clock whose `epoch_secs()` begins at `epoch_origin`
    pub fn new(epoch_origin: i64) -> Self {
        Self {
            elapsed: 0.0,
            epoch_origin,
        }
    }

    /// Start at the current wall-clock time
    pub fn from_system() -> Self {
        Self::new(Utc::now().timestamp())
    }

    /// Advance by `dt` seconds; negative steps are ignored
    pub fn advance(&mut self, dt: Seconds) {
        if dt > 0.0 {
            self.elapsed += dt;
        }
    }

    pub fn now(&self) -> Seconds {
        self.elapsed
    }

    /// Unix timestamp for lockouts
    pub fn epoch_secs(&self) -> i64 {
        self.epoch_origin + self.elapsed.floor() as i64
    }

    /// Day of week in UTC, used for weekday loot tables and profile day gating
    pub fn weekday(&self) -> Weekday {
        DateTime::<Utc>::from_timestamp(self.epoch_secs(), 0)
            .map(|dt| dt.weekday())
            .unwrap_or(Weekday::Mon)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::from_system()
    }
}
