//! Per-event timer records
//!
//! Timers are plain data keyed by event and kind. Arming a timer that
//! already exists replaces its deadline. The manager drains due timers each
//! tick and re-validates them against the event's current state before
//! acting, so a timer outliving its event is harmless.

use crate::clock::Seconds;
use crate::identity::{EventId, PlayerId};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Release ownership after the owner stayed away
    OwnerReset,
    /// Release a purchased pay-lock after the buyer stayed away
    PayLockReset,
    /// Power turrets down once nobody is inside
    TurretPowerOff,
    InactivityDespawn,
    /// Hard lifetime cap of an open event
    Lifetime,
    /// Re-run the looted test
    CompletionCheck,
    /// Delay between completion and teardown
    PostCompletionDespawn,
    /// Player stays attackable after leaving a PVP event
    PvpGrace(PlayerId),
}

/// A due timer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerRecord {
    pub event: EventId,
    pub kind: TimerKind,
    pub deadline: Seconds,
}

#[derive(Debug, Clone, Default)]
pub struct Timers {
    deadlines: IndexMap<(EventId, TimerKind), Seconds>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) a timer `delay` seconds after `now`
    pub fn arm(&mut self, event: EventId, kind: TimerKind, now: Seconds, delay: Seconds) {
        self.deadlines.insert((event, kind), now + delay.max(0.0));
    }

    pub fn cancel(&mut self, event: EventId, kind: TimerKind) -> bool {
        self.deadlines.shift_remove(&(event, kind)).is_some()
    }

    /// Drop every timer of an event
    pub fn cancel_event(&mut self, event: EventId) -> usize {
        let before = self.deadlines.len();
        self.deadlines.retain(|(id, _), _| *id != event);
        before - self.deadlines.len()
    }

    pub fn is_armed(&self, event: EventId, kind: TimerKind) -> bool {
        self.deadlines.contains_key(&(event, kind))
    }

    pub fn deadline(&self, event: EventId, kind: TimerKind) -> Option<Seconds> {
        self.deadlines.get(&(event, kind)).copied()
    }

    /// Remove and return every timer due at `now`, earliest first
    pub fn take_due(&mut self, now: Seconds) -> Vec<TimerRecord> {
        let mut due: Vec<TimerRecord> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|((event, kind), deadline)| TimerRecord {
                event: *event,
                kind: *kind,
                deadline: *deadline,
            })
            .collect();
        self.deadlines.retain(|_, deadline| *deadline > now);
        due.sort_by(|a, b| a.deadline.total_cmp(&b.deadline));
        due
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rearm_replaces_deadline() {
        let mut timers = Timers::new();
        let id = EventId(1);
        timers.arm(id, TimerKind::InactivityDespawn, 0.0, 10.0);
        timers.arm(id, TimerKind::InactivityDespawn, 5.0, 10.0);
        assert_eq!(timers.len(), 1);
        assert!(timers.take_due(10.0).is_empty());
        let due = timers.take_due(15.0);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].kind, TimerKind::InactivityDespawn);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_due_in_deadline_order() {
        let mut timers = Timers::new();
        timers.arm(EventId(1), TimerKind::Lifetime, 0.0, 30.0);
        timers.arm(EventId(2), TimerKind::OwnerReset, 0.0, 10.0);
        timers.arm(EventId(1), TimerKind::PvpGrace(PlayerId(4)), 0.0, 20.0);
        let kinds: Vec<_> = timers.take_due(60.0).into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TimerKind::OwnerReset,
                TimerKind::PvpGrace(PlayerId(4)),
                TimerKind::Lifetime
            ]
        );
    }

    #[test]
    fn test_cancel_event() {
        let mut timers = Timers::new();
        timers.arm(EventId(1), TimerKind::Lifetime, 0.0, 30.0);
        timers.arm(EventId(1), TimerKind::CompletionCheck, 0.0, 1.0);
        timers.arm(EventId(2), TimerKind::Lifetime, 0.0, 30.0);
        assert_eq!(timers.cancel_event(EventId(1)), 2);
        assert!(timers.is_armed(EventId(2), TimerKind::Lifetime));
        assert!(!timers.cancel(EventId(1), TimerKind::Lifetime));
    }
}
