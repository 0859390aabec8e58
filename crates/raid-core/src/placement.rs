//! Placement search
//!
//! Draws candidates from a [`SpawnIndex`] until one satisfies every
//! constraint, within a fixed attempt budget. Candidates that fail a
//! check are withdrawn under the matching reason, so the index cleans
//! itself as the world changes:
//!
//! - too close to a live event, obstructed, bad topology -> `Obstruction`
//! - inside a claimed construction radius -> `Claimed`
//! - under water -> `Submerged`
//!
//! When an anchor distance is requested (purchased events keep away from
//! the buyer) and that filter alone has rejected more than half of what is
//! left, the distance is relaxed by a fixed step and the search restarts.

use crate::config::PlacementSettings;
use crate::geometry::Vec3;
use crate::host::{ClaimRegistry, ObjectKind, WorldQuery};
use crate::kind::RaidCategory;
use crate::rng::RaidRng;
use crate::spawn::{topology_blocked, SpawnCandidate, SpawnIndex, WithdrawReason};

/// A live event's footprint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occupied {
    pub position: Vec3,
    pub separation: f32,
}

/// Keep the result at least `min_distance` away from `position`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub position: Vec3,
    pub min_distance: f32,
}

/// What the caller is looking for
#[derive(Debug, Clone)]
pub struct PlacementQuery<'a> {
    pub category: RaidCategory,
    /// Protection radius of the building to be placed
    pub radius: f32,
    /// Minimum separation from other events
    pub separation: f32,
    pub anchor: Option<Anchor>,
    pub occupied: &'a [Occupied],
}

/// A successful search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub candidate: SpawnCandidate,
    pub attempts: u32,
}

/// Why a single candidate was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    ZeroPosition,
    TooClose,
    Claimed,
    Submerged,
    Topology,
    Player,
    Structure,
    Rock,
    StaticObject,
}

impl Rejection {
    fn pool(self) -> WithdrawReason {
        match self {
            Rejection::Claimed => WithdrawReason::Claimed,
            Rejection::Submerged => WithdrawReason::Submerged,
            _ => WithdrawReason::Obstruction,
        }
    }
}

enum Pass {
    Found(SpawnCandidate),
    Relax,
    Exhausted,
}

/// One search over the world, borrowing its collaborators
pub struct PlacementSearch<'a> {
    settings: &'a PlacementSettings,
    world: &'a dyn WorldQuery,
    claims: &'a dyn ClaimRegistry,
}

impl<'a> PlacementSearch<'a> {
    pub fn new(
        settings: &'a PlacementSettings,
        world: &'a dyn WorldQuery,
        claims: &'a dyn ClaimRegistry,
    ) -> Self {
        Self {
            settings,
            world,
            claims,
        }
    }

    /// Find a position, or `None` once the attempt budget is spent.
    ///
    /// On success the candidate stays in the index, in use, until the
    /// caller returns it.
    pub fn find(
        &self,
        index: &mut SpawnIndex,
        rng: &mut RaidRng,
        query: &PlacementQuery<'_>,
    ) -> Option<Placement> {
        self.withdraw_claimed(index, query);

        let mut attempts = 0u32;
        let mut min_distance = query.anchor.map(|a| a.min_distance).unwrap_or(0.0);
        let step = self.settings.anchor_relax_step.max(1.0);
        let max_restarts = (self.world.world_size() / step).ceil().max(0.0) as u32 + 1;

        for restart in 0..=max_restarts {
            match self.search_pass(index, rng, query, min_distance, &mut attempts) {
                Pass::Found(candidate) => {
                    log::debug!(
                        "placement for {}: {} after {} attempts",
                        query.category,
                        candidate.position,
                        attempts
                    );
                    return Some(Placement {
                        candidate,
                        attempts,
                    });
                }
                Pass::Relax => {
                    let relaxed = (min_distance - step).max(0.0);
                    log::debug!(
                        "placement for {}: relaxing anchor distance {:.0} -> {:.0} (restart {})",
                        query.category,
                        min_distance,
                        relaxed,
                        restart + 1
                    );
                    min_distance = relaxed;
                }
                Pass::Exhausted => break,
            }
        }

        log::warn!(
            "placement for {}: no position in index '{}' after {} attempts",
            query.category,
            index.name(),
            attempts
        );
        None
    }

    /// Check one position against every constraint except the anchor distance
    pub fn check(&self, position: Vec3, query: &PlacementQuery<'_>) -> Result<(), Rejection> {
        if position.is_zero() {
            return Err(Rejection::ZeroPosition);
        }

        for other in query.occupied {
            let separation = other.separation.max(query.separation);
            if position.within_xz(other.position, separation) {
                return Err(Rejection::TooClose);
            }
        }

        if self.claims.claim_at(position, query.radius).is_some() {
            return Err(Rejection::Claimed);
        }

        let terrain = self.world.terrain_height(position.x, position.z);
        let water = self.world.water_height(position.x, position.z);
        if water - terrain > self.settings.water_tolerance {
            return Err(Rejection::Submerged);
        }

        if topology_blocked(self.world.topology(position.x, position.z), self.settings) {
            return Err(Rejection::Topology);
        }

        self.scan_obstructions(position, query.radius)
    }

    fn scan_obstructions(&self, position: Vec3, radius: f32) -> Result<(), Rejection> {
        for object in self.world.overlap(position, radius) {
            match object.kind {
                ObjectKind::Player {
                    sleeping,
                    connected,
                } => {
                    if (sleeping && self.settings.block_sleeping_players)
                        || (connected && !sleeping && self.settings.block_connected_players)
                    {
                        return Err(Rejection::Player);
                    }
                }
                ObjectKind::Structure { owned } => {
                    if owned || self.settings.block_unowned_structures {
                        return Err(Rejection::Structure);
                    }
                }
                ObjectKind::Rock { size } => {
                    if size > self.settings.max_rock_size {
                        return Err(Rejection::Rock);
                    }
                }
                ObjectKind::Static { blocking } => {
                    if blocking {
                        return Err(Rejection::StaticObject);
                    }
                }
                ObjectKind::Other => {}
            }
        }
        Ok(())
    }

    fn search_pass(
        &self,
        index: &mut SpawnIndex,
        rng: &mut RaidRng,
        query: &PlacementQuery<'_>,
        min_distance: f32,
        attempts: &mut u32,
    ) -> Pass {
        let mut too_near_anchor: Vec<SpawnCandidate> = Vec::new();
        let mut refilled = false;

        let pass = loop {
            if *attempts >= self.settings.max_attempts {
                break Pass::Exhausted;
            }

            let candidate = match index.take_random(rng) {
                Some(c) => c,
                None if !refilled => {
                    refilled = true;
                    let healed: usize = WithdrawReason::ALL
                        .iter()
                        .map(|r| index.refill_from_withdrawn(*r))
                        .sum();
                    if healed == 0 {
                        break Pass::Exhausted;
                    }
                    self.withdraw_claimed(index, query);
                    continue;
                }
                None => break Pass::Exhausted,
            };
            *attempts += 1;

            if let Err(rejection) = self.check(candidate.position, query) {
                index.withdraw(candidate, rejection.pool());
                continue;
            }

            if let Some(anchor) = query.anchor {
                if min_distance > 0.0
                    && candidate.position.distance_xz(anchor.position) < min_distance
                {
                    too_near_anchor.push(candidate);
                    let seen = too_near_anchor.len() + index.active_count();
                    if too_near_anchor.len() * 2 > seen {
                        break Pass::Relax;
                    }
                    continue;
                }
            }

            break Pass::Found(candidate);
        };

        for candidate in too_near_anchor {
            index.reinstate(candidate);
        }
        pass
    }

    fn withdraw_claimed(&self, index: &mut SpawnIndex, query: &PlacementQuery<'_>) {
        for claim in self.claims.claims() {
            index.withdraw_near(
                claim.position,
                claim.radius + query.radius,
                WithdrawReason::Claimed,
                Some(query.category),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Claim, WorldObject};
    use crate::identity::PlayerId;
    use crate::spawn::Pool;
    use crate::testing::{MockClaims, MockWorld};

    fn query<'a>(occupied: &'a [Occupied], anchor: Option<Anchor>) -> PlacementQuery<'a> {
        PlacementQuery {
            category: RaidCategory::Manual,
            radius: 20.0,
            separation: 100.0,
            anchor,
            occupied,
        }
    }

    fn candidate(x: f32, z: f32) -> SpawnCandidate {
        SpawnCandidate::at(Vec3::flat(x, z))
    }

    #[test]
    fn test_claimed_candidate_is_withdrawn_and_far_one_returned() {
        let world = MockWorld::flat(4000.0);
        let claims = MockClaims {
            claims: vec![Claim {
                position: Vec3::flat(10.0, 0.0),
                radius: 5.0,
                owner: PlayerId(2),
            }],
        };
        let settings = PlacementSettings::default();
        let search = PlacementSearch::new(&settings, &world, &claims);

        for seed in 1..20 {
            let mut rng = RaidRng::new(seed);
            let mut index = SpawnIndex::from_candidates(
                "test",
                vec![candidate(100.0, 0.0), candidate(10.0, 0.0)],
            );
            let anchor = Anchor {
                position: Vec3::flat(0.0, 0.0),
                min_distance: 50.0,
            };
            let found = search.find(&mut index, &mut rng, &query(&[], Some(anchor)));
            let found = found.expect("C1 should be found");
            assert!(found.candidate.position.same_spot(Vec3::flat(100.0, 0.0)));
            assert_eq!(
                index.pool_of(Vec3::flat(10.0, 0.0)),
                Some(Pool::Withdrawn(WithdrawReason::Claimed))
            );
            assert_eq!(index.in_use_count(), 1);
        }
    }

    #[test]
    fn test_separation_from_live_events() {
        let world = MockWorld::flat(4000.0);
        let claims = MockClaims::default();
        let settings = PlacementSettings::default();
        let search = PlacementSearch::new(&settings, &world, &claims);
        let mut rng = RaidRng::new(9);
        let mut index = SpawnIndex::from_candidates(
            "test",
            vec![candidate(500.0, 0.0), candidate(550.0, 0.0), candidate(900.0, 0.0)],
        );
        let occupied = [Occupied {
            position: Vec3::flat(520.0, 0.0),
            separation: 150.0,
        }];
        let found = search
            .find(&mut index, &mut rng, &query(&occupied, None))
            .unwrap();
        assert!(found.candidate.position.same_spot(Vec3::flat(900.0, 0.0)));
    }

    #[test]
    fn test_obstructions_reject() {
        let mut world = MockWorld::flat(4000.0);
        world.objects.push(WorldObject {
            kind: ObjectKind::Player {
                sleeping: true,
                connected: false,
            },
            position: Vec3::flat(300.0, 0.0),
        });
        world.objects.push(WorldObject {
            kind: ObjectKind::Rock { size: 20.0 },
            position: Vec3::flat(600.0, 0.0),
        });
        world.objects.push(WorldObject {
            kind: ObjectKind::Rock { size: 2.0 },
            position: Vec3::flat(900.0, 0.0),
        });
        let claims = MockClaims::default();
        let settings = PlacementSettings::default();
        let search = PlacementSearch::new(&settings, &world, &claims);
        let q = query(&[], None);

        assert_eq!(
            search.check(Vec3::flat(300.0, 0.0), &q),
            Err(Rejection::Player)
        );
        assert_eq!(search.check(Vec3::flat(600.0, 0.0), &q), Err(Rejection::Rock));
        assert_eq!(search.check(Vec3::flat(900.0, 0.0), &q), Ok(()));
        assert_eq!(search.check(Vec3::ZERO, &q), Err(Rejection::ZeroPosition));
    }

    #[test]
    fn test_exhaustion_returns_none_and_keeps_pools_consistent() {
        let mut world = MockWorld::flat(4000.0);
        for x in [100.0, 200.0, 300.0] {
            world.objects.push(WorldObject {
                kind: ObjectKind::Structure { owned: true },
                position: Vec3::flat(x, 0.0),
            });
        }
        let claims = MockClaims::default();
        let settings = PlacementSettings::default();
        let search = PlacementSearch::new(&settings, &world, &claims);
        let mut rng = RaidRng::new(4);
        let mut index = SpawnIndex::from_candidates(
            "test",
            vec![candidate(100.0, 0.0), candidate(200.0, 0.0), candidate(300.0, 0.0)],
        );
        assert!(search.find(&mut index, &mut rng, &query(&[], None)).is_none());
        assert_eq!(index.count(), 3);
        assert_eq!(index.in_use_count(), 0);
        assert_eq!(index.withdrawn_count(WithdrawReason::Obstruction), 3);
    }

    #[test]
    fn test_anchor_distance_relaxes() {
        let world = MockWorld::flat(4000.0);
        let claims = MockClaims::default();
        let settings = PlacementSettings::default();
        let search = PlacementSearch::new(&settings, &world, &claims);
        let mut rng = RaidRng::new(21);
        let mut index = SpawnIndex::from_candidates(
            "test",
            vec![candidate(50.0, 0.0), candidate(0.0, 80.0), candidate(-100.0, 0.0)],
        );
        let anchor = Anchor {
            position: Vec3::flat(0.0, 0.0),
            min_distance: 500.0,
        };
        let found = search
            .find(&mut index, &mut rng, &query(&[], Some(anchor)))
            .expect("relaxation should eventually accept a candidate");
        assert!(found.candidate.position.distance_xz(Vec3::ZERO) <= 100.0);
        // Everything not chosen went back to Active
        assert_eq!(index.active_count(), 2);
        assert_eq!(index.in_use_count(), 1);
    }
}
