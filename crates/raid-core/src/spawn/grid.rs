//! Dense world-grid fallback
//!
//! Walks a fixed-step lattice over the whole world and admits every cell
//! that is flat enough and not on disallowed topology. The walk is far too
//! long for one tick, so [`GridBuilder::step`] examines a bounded number of
//! cells and keeps its cursor for the next call.

use super::index::{Pool, SpawnCandidate, SpawnIndex, WithdrawReason};
use crate::config::{GridSettings, PlacementSettings};
use crate::geometry::Vec3;
use crate::host::{Topology, WorldQuery};

/// Outcome of one grid step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridProgress {
    /// More cells remain
    Working { examined: usize, total: usize },
    Finished { admitted: usize, rejected: usize },
}

/// Resumable lattice walk
#[derive(Debug, Clone)]
pub struct GridBuilder {
    min: f32,
    cells_per_side: usize,
    step: f32,
    cursor: usize,
    admitted: usize,
    rejected: usize,
}

impl GridBuilder {
    /// Prepare a walk over a world of `world_size`
    pub fn new(world_size: f32, settings: &GridSettings) -> Self {
        let step = settings.step.max(1.0);
        let half = world_size / 2.0 - settings.edge_margin;
        let span = (2.0 * half).max(0.0);
        let cells_per_side = (span / step).floor() as usize + usize::from(span > 0.0);
        Self {
            min: -half,
            cells_per_side,
            step,
            cursor: 0,
            admitted: 0,
            rejected: 0,
        }
    }

    pub fn total_cells(&self) -> usize {
        self.cells_per_side * self.cells_per_side
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.total_cells()
    }

    /// Examine up to `settings.cells_per_tick` cells
    pub fn step(
        &mut self,
        world: &dyn WorldQuery,
        index: &mut SpawnIndex,
        grid: &GridSettings,
        placement: &PlacementSettings,
    ) -> GridProgress {
        let budget = grid.cells_per_tick.max(1) as usize;
        let end = (self.cursor + budget).min(self.total_cells());
        while self.cursor < end {
            let row = self.cursor / self.cells_per_side;
            let col = self.cursor % self.cells_per_side;
            self.cursor += 1;

            let x = self.min + col as f32 * self.step;
            let z = self.min + row as f32 * self.step;
            match survey_cell(world, x, z, grid, placement) {
                Some((candidate, pool)) => {
                    index.add(candidate, pool);
                    self.admitted += 1;
                }
                None => self.rejected += 1,
            }
        }

        if self.is_finished() {
            GridProgress::Finished {
                admitted: self.admitted,
                rejected: self.rejected,
            }
        } else {
            GridProgress::Working {
                examined: self.cursor,
                total: self.total_cells(),
            }
        }
    }
}

/// Sample the ring around a cell; `None` rejects it outright
fn survey_cell(
    world: &dyn WorldQuery,
    x: f32,
    z: f32,
    grid: &GridSettings,
    placement: &PlacementSettings,
) -> Option<(SpawnCandidate, Pool)> {
    if topology_blocked(world.topology(x, z), placement) {
        return None;
    }

    let center = world.terrain_height(x, z);
    let mut min = center;
    let mut max = center;
    let samples = grid.ring_samples.max(1);
    for i in 0..samples {
        let angle = i as f32 / samples as f32 * std::f32::consts::TAU;
        let sx = x + angle.cos() * grid.ring_radius;
        let sz = z + angle.sin() * grid.ring_radius;
        let h = world.terrain_height(sx, sz);
        min = min.min(h);
        max = max.max(h);
    }
    if max - min > grid.max_elevation_delta {
        return None;
    }

    let water = world.water_height(x, z);
    let candidate = SpawnCandidate {
        position: Vec3::new(x, center, z),
        min_elevation: min,
        max_elevation: max,
        water_height: water,
        terrain_height: center,
        radius: grid.candidate_radius,
    };
    let pool = if water - center > placement.water_tolerance {
        // Kept so the pool can heal if the water level drops
        Pool::Withdrawn(WithdrawReason::Submerged)
    } else {
        Pool::Active
    };
    Some((candidate, pool))
}

/// Topology the placement settings do not allow
pub fn topology_blocked(topology: Topology, settings: &PlacementSettings) -> bool {
    (topology.contains(Topology::ROAD) && !settings.allow_roads)
        || (topology.contains(Topology::RIVER) && !settings.allow_rivers)
        || (topology.contains(Topology::MONUMENT) && !settings.allow_monuments)
        || topology.contains(Topology::CLIFF)
}
