//! Entity classification after a paste
//!
//! Each pasted entity is tagged once with a set of [`Roles`]; the rest of
//! the crate asks about capabilities, never about entity kinds. The pass
//! runs a small batch per tick through [`SetupCursor::step`].

use crate::host::{EntityKind, PastedEntity};
use crate::identity::EntityId;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::RaidEvent;

bitflags! {
    /// Capabilities of a pasted entity
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Roles: u32 {
        /// Part of the structure
        const BUILDING = 1 << 0;
        /// Holds items
        const CONTAINER = 1 << 1;
        /// Receives generated loot and counts toward completion
        const LOOT = 1 << 2;
        const CUPBOARD = 1 << 3;
        const OVEN = 1 << 4;
        const FRIDGE = 1 << 5;
        const LOCKER = 1 << 6;
        const TURRET = 1 << 7;
        const TRAP = 1 << 8;
        const LIGHT = 1 << 9;
        const LADDER = 1 << 10;
        /// Switched on and off with occupancy
        const POWERED = 1 << 11;
        /// Damaging it can capture ownership
        const CAPTURE = 1 << 12;
    }
}

/// Roles of a freshly pasted entity
pub fn classify(kind: EntityKind) -> Roles {
    match kind {
        EntityKind::BuildingBlock | EntityKind::Door => Roles::BUILDING | Roles::CAPTURE,
        EntityKind::LootBox => Roles::CONTAINER | Roles::LOOT | Roles::CAPTURE,
        EntityKind::Cupboard => Roles::CONTAINER | Roles::CUPBOARD | Roles::CAPTURE,
        EntityKind::Oven => Roles::CONTAINER | Roles::OVEN,
        EntityKind::Fridge | EntityKind::Barbecue => Roles::CONTAINER | Roles::FRIDGE,
        EntityKind::Locker => Roles::CONTAINER | Roles::LOCKER,
        EntityKind::Turret => Roles::TURRET | Roles::POWERED | Roles::CAPTURE,
        EntityKind::Trap => Roles::TRAP | Roles::CAPTURE,
        EntityKind::Light => Roles::LIGHT | Roles::POWERED,
        EntityKind::Ladder => Roles::LADDER,
        EntityKind::Deployable | EntityKind::Other => Roles::empty(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupProgress {
    Working { classified: usize, total: usize },
    Done,
}

/// Resumable classification pass
#[derive(Debug, Clone)]
pub struct SetupCursor {
    pending: Vec<PastedEntity>,
    next: usize,
}

impl SetupCursor {
    pub fn new(pending: Vec<PastedEntity>) -> Self {
        Self { pending, next: 0 }
    }

    pub fn total(&self) -> usize {
        self.pending.len()
    }

    pub fn is_done(&self) -> bool {
        self.next >= self.pending.len()
    }

    /// Pasted entities not classified yet
    pub fn unclassified(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.pending[self.next.min(self.pending.len())..]
            .iter()
            .map(|e| e.id)
    }

    /// Classify up to `batch` entities into `event`
    pub fn step(&mut self, event: &mut RaidEvent, batch: usize) -> SetupProgress {
        let end = (self.next + batch.max(1)).min(self.pending.len());
        for entity in &self.pending[self.next..end] {
            event.entities.insert(entity.id, classify(entity.kind));
        }
        self.next = end;
        if self.is_done() {
            SetupProgress::Done
        } else {
            SetupProgress::Working {
                classified: self.next,
                total: self.pending.len(),
            }
        }
    }
}
