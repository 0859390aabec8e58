//! Rate-limited destruction of an event's entities

use crate::host::EntityService;
use crate::identity::EntityId;

/// Entities still waiting to be killed
#[derive(Debug, Clone, Default)]
pub struct DespawnCursor {
    remaining: Vec<EntityId>,
}

impl DespawnCursor {
    pub fn new(entities: impl IntoIterator<Item = EntityId>) -> Self {
        let mut remaining: Vec<EntityId> = entities.into_iter().collect();
        // Popped from the back: keep pasted order
        remaining.reverse();
        Self { remaining }
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_done(&self) -> bool {
        self.remaining.is_empty()
    }

    /// The entity died on its own
    pub fn forget(&mut self, entity: EntityId) {
        self.remaining.retain(|e| *e != entity);
    }

    /// Kill up to `batch` entities; returns how many were killed
    pub fn step(&mut self, entities: &mut dyn EntityService, batch: usize) -> usize {
        let mut killed = 0;
        while killed < batch.max(1) {
            match self.remaining.pop() {
                Some(entity) => {
                    entities.kill(entity);
                    killed += 1;
                }
                None => break,
            }
        }
        killed
    }

    /// Kill everything at once
    pub fn drain(&mut self, entities: &mut dyn EntityService) -> usize {
        let count = self.remaining.len();
        while let Some(entity) = self.remaining.pop() {
            entities.kill(entity);
        }
        count
    }
}
