//! In-memory collaborators for unit tests

use crate::geometry::Vec3;
use crate::host::{
    ActorService, Claim, ClaimRegistry, Economy, EntityKind, EntityService, Host, Inventory,
    ItemCatalog, ItemCategory, ItemDefinition, MarkerService, PasteRequest, PasteService,
    PastedEntity, Players, SocialGraph, Topology, WorldObject, WorldQuery,
};
use crate::identity::{ActorId, EntityId, EventId, MarkerId, PlayerId};
use crate::loot::{LootEntry, SlotRange};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Flat terrain at height zero with optional features
#[derive(Debug, Clone)]
pub struct MockWorld {
    pub size: f32,
    /// Columns raising the terrain to a height within 5 units of a point
    pub spikes: Vec<(Vec3, f32)>,
    pub water_level: f32,
    /// Points where water stands 5 units above the terrain
    pub sunken: Vec<Vec3>,
    pub objects: Vec<WorldObject>,
    pub regions: Vec<(Vec3, f32, Topology)>,
}

impl MockWorld {
    pub fn flat(size: f32) -> Self {
        Self {
            size,
            spikes: Vec::new(),
            water_level: -10.0,
            sunken: Vec::new(),
            objects: Vec::new(),
            regions: Vec::new(),
        }
    }
}

impl WorldQuery for MockWorld {
    fn world_size(&self) -> f32 {
        self.size
    }

    fn terrain_height(&self, x: f32, z: f32) -> f32 {
        let point = Vec3::flat(x, z);
        self.spikes
            .iter()
            .find(|(at, _)| at.within_xz(point, 5.0))
            .map(|(_, height)| *height)
            .unwrap_or(0.0)
    }

    fn water_height(&self, x: f32, z: f32) -> f32 {
        let point = Vec3::flat(x, z);
        if self.sunken.iter().any(|at| at.within_xz(point, 5.0)) {
            self.terrain_height(x, z) + 5.0
        } else {
            self.water_level
        }
    }

    fn topology(&self, x: f32, z: f32) -> Topology {
        let point = Vec3::flat(x, z);
        self.regions
            .iter()
            .filter(|(at, radius, _)| at.within_xz(point, *radius))
            .fold(Topology::empty(), |acc, (_, _, t)| acc | *t)
    }

    fn overlap(&self, point: Vec3, radius: f32) -> Vec<WorldObject> {
        self.objects
            .iter()
            .filter(|o| o.position.within_xz(point, radius))
            .copied()
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockClaims {
    pub claims: Vec<Claim>,
}

impl ClaimRegistry for MockClaims {
    fn claims(&self) -> Vec<Claim> {
        self.claims.clone()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockSocial {
    pub teams: Vec<(PlayerId, PlayerId)>,
    pub clans: Vec<(PlayerId, PlayerId)>,
    pub friends: Vec<(PlayerId, PlayerId)>,
}

fn linked(pairs: &[(PlayerId, PlayerId)], a: PlayerId, b: PlayerId) -> bool {
    pairs
        .iter()
        .any(|(x, y)| (*x == a && *y == b) || (*x == b && *y == a))
}

impl SocialGraph for MockSocial {
    fn same_team(&self, a: PlayerId, b: PlayerId) -> bool {
        linked(&self.teams, a, b)
    }

    fn same_clan(&self, a: PlayerId, b: PlayerId) -> bool {
        linked(&self.clans, a, b)
    }

    fn are_friends(&self, a: PlayerId, b: PlayerId) -> bool {
        linked(&self.friends, a, b)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    pub items: Vec<ItemDefinition>,
}

impl MockCatalog {
    pub fn standard() -> Self {
        let def = |name: &str, category, max_stack, cookable| ItemDefinition {
            shortname: name.to_string(),
            category,
            max_stack,
            cookable,
        };
        Self {
            items: vec![
                def("rifle", ItemCategory::Weapon, 1, false),
                def("bandage", ItemCategory::Medical, 10, false),
                def("scrap", ItemCategory::Resource, 1000, false),
                def("metal.ore", ItemCategory::Resource, 1000, true),
                def("apple", ItemCategory::Food, 10, false),
                def("hoodie", ItemCategory::Attire, 1, false),
                def("ammo", ItemCategory::Ammunition, 128, false),
                def("note", ItemCategory::Misc, 1, false),
            ],
        }
    }
}

impl ItemCatalog for MockCatalog {
    fn find(&self, shortname: &str) -> Option<ItemDefinition> {
        self.items.iter().find(|d| d.shortname == shortname).cloned()
    }

    fn search(&self, fragment: &str) -> Option<ItemDefinition> {
        self.items
            .iter()
            .find(|d| d.shortname.contains(fragment))
            .cloned()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockContainer {
    pub capacity: usize,
    pub slots: BTreeMap<usize, LootEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct MockInventory {
    pub containers: HashMap<EntityId, MockContainer>,
}

impl MockInventory {
    pub fn add_container(&mut self, id: EntityId, capacity: usize) {
        self.containers.insert(
            id,
            MockContainer {
                capacity,
                slots: BTreeMap::new(),
            },
        );
    }

    pub fn slots_of(&self, id: EntityId) -> Vec<usize> {
        self.containers
            .get(&id)
            .map(|c| c.slots.keys().copied().collect())
            .unwrap_or_default()
    }

    /// A player takes one item out
    pub fn take_one(&mut self, id: EntityId) -> Option<LootEntry> {
        let container = self.containers.get_mut(&id)?;
        let slot = *container.slots.keys().next()?;
        container.slots.remove(&slot)
    }

    pub fn empty(&mut self, id: EntityId) {
        if let Some(c) = self.containers.get_mut(&id) {
            c.slots.clear();
        }
    }
}

impl Inventory for MockInventory {
    fn capacity(&self, container: EntityId) -> usize {
        self.containers.get(&container).map(|c| c.capacity).unwrap_or(0)
    }

    fn item_count(&self, container: EntityId) -> usize {
        self.containers
            .get(&container)
            .map(|c| c.slots.len())
            .unwrap_or(0)
    }

    fn insert(&mut self, container: EntityId, entry: &LootEntry, slots: Option<SlotRange>) -> bool {
        let Some(c) = self.containers.get_mut(&container) else {
            return false;
        };
        let range = slots.unwrap_or(SlotRange::new(0, c.capacity));
        let end = range.end.min(c.capacity);
        match (range.start..end).find(|s| !c.slots.contains_key(s)) {
            Some(slot) => {
                c.slots.insert(slot, entry.clone());
                true
            }
            None => false,
        }
    }

    fn clear(&mut self, container: EntityId) {
        self.empty(container);
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockEconomy {
    pub balances: HashMap<PlayerId, f64>,
    pub points: HashMap<PlayerId, i64>,
}

impl Economy for MockEconomy {
    fn balance(&self, player: PlayerId) -> f64 {
        self.balances.get(&player).copied().unwrap_or(0.0)
    }

    fn withdraw(&mut self, player: PlayerId, amount: f64) -> bool {
        let balance = self.balances.entry(player).or_default();
        if *balance < amount {
            return false;
        }
        *balance -= amount;
        true
    }

    fn deposit(&mut self, player: PlayerId, amount: f64) {
        *self.balances.entry(player).or_default() += amount;
    }

    fn points(&self, player: PlayerId) -> i64 {
        self.points.get(&player).copied().unwrap_or(0)
    }

    fn add_points(&mut self, player: PlayerId, amount: i64) {
        *self.points.entry(player).or_default() += amount;
    }

    fn take_points(&mut self, player: PlayerId, amount: i64) -> bool {
        let points = self.points.entry(player).or_default();
        if *points < amount {
            return false;
        }
        *points -= amount;
        true
    }
}

/// Host double recording every side effect
#[derive(Debug, Default)]
pub struct MockHost {
    pub world: MockWorld,
    pub claims: MockClaims,
    pub catalog: MockCatalog,
    pub inventory: MockInventory,
    pub social: MockSocial,
    pub blueprints: HashSet<String>,
    pub refuse_paste: bool,
    pub paste_requests: Vec<PasteRequest>,
    pub undone: Vec<EntityId>,
    pub killed: Vec<EntityId>,
    pub powered: HashMap<EntityId, bool>,
    pub drop_chance: HashMap<EntityId, f32>,
    pub next_id: u64,
    pub actors_spawned: Vec<ActorId>,
    pub actors_killed: Vec<ActorId>,
    pub actor_active: HashMap<ActorId, bool>,
    pub positions: HashMap<PlayerId, Vec3>,
    pub online: usize,
    pub banned: HashSet<PlayerId>,
    pub ejected: Vec<PlayerId>,
    pub messages: Vec<(PlayerId, String)>,
    pub markers_enabled: bool,
    pub markers: Vec<MarkerId>,
    pub economy: Option<MockEconomy>,
}

impl Default for MockWorld {
    fn default() -> Self {
        Self::flat(4000.0)
    }
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            catalog: MockCatalog::standard(),
            online: 10,
            next_id: 1000,
            ..Self::default()
        }
    }

    pub fn with_blueprints(names: &[&str]) -> Self {
        let mut host = Self::new();
        host.blueprints = names.iter().map(|n| n.to_string()).collect();
        host
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Entities of a small base: walls, two loot boxes, a cupboard, a turret
    pub fn build_base(&mut self, at: Vec3) -> Vec<PastedEntity> {
        let kinds = [
            EntityKind::BuildingBlock,
            EntityKind::BuildingBlock,
            EntityKind::Door,
            EntityKind::LootBox,
            EntityKind::LootBox,
            EntityKind::Cupboard,
            EntityKind::Turret,
        ];
        kinds
            .iter()
            .map(|kind| {
                let id = EntityId(self.next());
                match kind {
                    EntityKind::LootBox => self.inventory.add_container(id, 12),
                    EntityKind::Cupboard => self.inventory.add_container(id, 24),
                    _ => {}
                }
                PastedEntity {
                    id,
                    kind: *kind,
                    position: at,
                }
            })
            .collect()
    }

    pub fn last_paste(&self) -> Option<&PasteRequest> {
        self.paste_requests.last()
    }
}

impl PasteService for MockHost {
    fn blueprint_exists(&self, name: &str) -> bool {
        self.blueprints.contains(name)
    }

    fn paste(&mut self, request: PasteRequest) -> bool {
        if self.refuse_paste {
            return false;
        }
        self.paste_requests.push(request);
        true
    }

    fn undo(&mut self, entities: &[EntityId]) {
        self.undone.extend_from_slice(entities);
    }
}

impl EntityService for MockHost {
    fn kill(&mut self, entity: EntityId) {
        self.killed.push(entity);
    }

    fn set_powered(&mut self, entity: EntityId, powered: bool) {
        self.powered.insert(entity, powered);
    }

    fn set_drop_chance(&mut self, entity: EntityId, chance: f32) {
        self.drop_chance.insert(entity, chance);
    }
}

impl ActorService for MockHost {
    fn spawn(&mut self, _event: EventId, _position: Vec3, _radius: f32, count: u32) -> Vec<ActorId> {
        let actors: Vec<ActorId> = (0..count).map(|_| ActorId(self.next())).collect();
        self.actors_spawned.extend(&actors);
        actors
    }

    fn kill(&mut self, actor: ActorId) {
        self.actors_killed.push(actor);
    }

    fn set_active(&mut self, actor: ActorId, active: bool) {
        self.actor_active.insert(actor, active);
    }
}

impl Players for MockHost {
    fn position(&self, player: PlayerId) -> Option<Vec3> {
        self.positions.get(&player).copied()
    }

    fn online_count(&self) -> usize {
        self.online
    }

    fn is_banned(&self, player: PlayerId) -> bool {
        self.banned.contains(&player)
    }

    fn eject(&mut self, player: PlayerId, _center: Vec3, _radius: f32) {
        self.ejected.push(player);
    }

    fn message(&mut self, player: PlayerId, text: &str) {
        self.messages.push((player, text.to_string()));
    }
}

impl MarkerService for MockHost {
    fn create(&mut self, _event: EventId, _position: Vec3, _radius: f32, _label: &str) -> Option<MarkerId> {
        let marker = MarkerId(self.next());
        self.markers.push(marker);
        Some(marker)
    }

    fn remove(&mut self, marker: MarkerId) {
        self.markers.retain(|m| *m != marker);
    }
}

impl Host for MockHost {
    fn world(&self) -> &dyn WorldQuery {
        &self.world
    }

    fn claims(&self) -> &dyn ClaimRegistry {
        &self.claims
    }

    fn paste(&mut self) -> &mut dyn PasteService {
        self
    }

    fn entities(&mut self) -> &mut dyn EntityService {
        self
    }

    fn inventory(&mut self) -> &mut dyn Inventory {
        &mut self.inventory
    }

    fn items(&self) -> &dyn ItemCatalog {
        &self.catalog
    }

    fn actors(&mut self) -> &mut dyn ActorService {
        self
    }

    fn social(&self) -> &dyn SocialGraph {
        &self.social
    }

    fn players(&mut self) -> &mut dyn Players {
        self
    }

    fn markers(&mut self) -> Option<&mut dyn MarkerService> {
        if self.markers_enabled {
            Some(self as &mut dyn MarkerService)
        } else {
            None
        }
    }

    fn economy(&mut self) -> Option<&mut dyn Economy> {
        self.economy.as_mut().map(|e| e as &mut dyn Economy)
    }
}
