//! When to open events
//!
//! Two automatic loops feed the manager with [`PlacementRequest`]s:
//!
//! - **maintained**: every interval, top up to a fixed number of live
//!   maintained events;
//! - **scheduled**: after a random interval, a burst of events spaced a
//!   few seconds apart.
//!
//! Requests that hit the paste gate (or a grid still being built) wait in
//! a FIFO queue and are retried one per tick.

use crate::clock::Seconds;
use crate::config::SchedulerSettings;
use crate::identity::PlayerId;
use crate::kind::{DifficultyFilter, RaidCategory};
use crate::placement::Anchor;
use crate::raid::Purchase;
use crate::rng::RaidRng;
use std::collections::VecDeque;

/// A request to open one event
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRequest {
    pub category: RaidCategory,
    pub difficulty: DifficultyFilter,
    /// Explicit building name
    pub building: Option<String>,
    pub anchor: Option<Anchor>,
    pub requested_by: Option<PlayerId>,
    pub purchase: Option<Purchase>,
}

impl PlacementRequest {
    pub fn new(category: RaidCategory, difficulty: DifficultyFilter) -> Self {
        Self {
            category,
            difficulty,
            building: None,
            anchor: None,
            requested_by: None,
            purchase: None,
        }
    }

    pub fn with_building(mut self, building: impl Into<String>) -> Self {
        self.building = Some(building.into());
        self
    }
}

/// Live event counts the loops need
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveCounts {
    pub maintained: usize,
    pub scheduled: usize,
    pub total: usize,
    pub online_players: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    next_maintained: Seconds,
    next_burst: Option<Seconds>,
    burst_remaining: u32,
    next_in_burst: Seconds,
    pending: VecDeque<PlacementRequest>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests due at `now`
    pub fn poll(
        &mut self,
        settings: &SchedulerSettings,
        max_events: usize,
        now: Seconds,
        counts: LiveCounts,
        rng: &mut RaidRng,
    ) -> Vec<PlacementRequest> {
        let mut due = Vec::new();
        let enough_players = counts.online_players >= settings.min_online_players;
        let room = counts.total + self.pending.len() < max_events;

        let maintained = &settings.maintained;
        if maintained.enabled && now >= self.next_maintained {
            self.next_maintained = now + maintained.interval_secs.max(1.0);
            let queued = self.pending_of(RaidCategory::Maintained);
            if enough_players && room && counts.maintained + queued < maintained.max_events {
                log::debug!("scheduler: maintained refill ({} live)", counts.maintained);
                due.push(PlacementRequest::new(
                    RaidCategory::Maintained,
                    DifficultyFilter::Any,
                ));
            }
        }

        let scheduled = &settings.scheduled;
        if scheduled.enabled {
            let next_burst = *self.next_burst.get_or_insert_with(|| {
                now + rng.range_f64(scheduled.interval_min_secs, scheduled.interval_max_secs)
            });
            if self.burst_remaining == 0 && now >= next_burst {
                self.burst_remaining = rng.range_u32(1, scheduled.max_per_burst.max(1));
                self.next_in_burst = now;
                self.next_burst = Some(
                    now + rng.range_f64(scheduled.interval_min_secs, scheduled.interval_max_secs),
                );
                log::info!("scheduler: burst of {} events", self.burst_remaining);
            }
            if self.burst_remaining > 0 && now >= self.next_in_burst {
                let queued = self.pending_of(RaidCategory::Scheduled);
                if counts.scheduled + queued >= scheduled.max_events || !room {
                    log::debug!("scheduler: burst dropped, scheduled cap reached");
                    self.burst_remaining = 0;
                } else if enough_players {
                    self.burst_remaining -= 1;
                    self.next_in_burst = now + scheduled.spacing_secs;
                    due.push(PlacementRequest::new(
                        RaidCategory::Scheduled,
                        DifficultyFilter::Any,
                    ));
                }
            }
        } else {
            self.next_burst = None;
            self.burst_remaining = 0;
        }

        due
    }

    /// Park a request until the gate clears
    pub fn defer(&mut self, request: PlacementRequest) -> usize {
        self.pending.push_back(request);
        self.pending.len()
    }

    /// Put a request back at the head of the queue
    pub fn retry_first(&mut self, request: PlacementRequest) {
        self.pending.push_front(request);
    }

    pub fn next_pending(&mut self) -> Option<PlacementRequest> {
        self.pending.pop_front()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_of(&self, category: RaidCategory) -> usize {
        self.pending.iter().filter(|r| r.category == category).count()
    }

    pub fn clear_pending(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }
}
