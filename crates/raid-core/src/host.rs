//! Host contracts - the narrow interfaces through which the core talks to
//! the game world and third-party services
//!
//! The core never reaches into the world directly. Everything it needs
//! (terrain samples, overlap queries, pasting blueprints, inventories,
//! economy) goes through one of these traits, and the host hands them out
//! through [`Host`].
//!
//! ```text
//! RaidManager ──> Host
//!                  ├── WorldQuery      terrain, water, topology, overlaps
//!                  ├── ClaimRegistry   player building-claim radii
//!                  ├── PasteService    blueprint paste / undo (async)
//!                  ├── EntityService   kill, power, drop chance
//!                  ├── Inventory       container slots
//!                  ├── ItemCatalog     item definitions
//!                  ├── ActorService    hostile NPCs
//!                  ├── SocialGraph     team / clan / friends
//!                  ├── Players         positions, ejection, messages
//!                  ├── MarkerService   (optional) map markers
//!                  └── Economy         (optional) currency and points
//! ```

use crate::geometry::Vec3;
use crate::identity::{ActorId, EntityId, EventId, MarkerId, PasteTicket, PlayerId};
use crate::loot::{LootEntry, SlotRange};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Terrain topology at a point
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Topology: u32 {
        const ROAD = 1 << 0;
        const RIVER = 1 << 1;
        const MONUMENT = 1 << 2;
        const CLIFF = 1 << 3;
        const OCEAN = 1 << 4;
        const LAKE = 1 << 5;
        const BEACH = 1 << 6;
    }
}

/// Category tag of an object returned by an overlap query
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectKind {
    Player { sleeping: bool, connected: bool },
    /// A building block or deployable; `owned` when it belongs to a player
    Structure { owned: bool },
    Rock { size: f32 },
    /// Other static world furniture; `blocking` when it must keep a site clear
    Static { blocking: bool },
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldObject {
    pub kind: ObjectKind,
    pub position: Vec3,
}

/// Read-only view of the world used by placement and grid building
pub trait WorldQuery {
    /// Side length of the square world, centred on the origin
    fn world_size(&self) -> f32;

    fn terrain_height(&self, x: f32, z: f32) -> f32;

    fn water_height(&self, x: f32, z: f32) -> f32;

    fn topology(&self, x: f32, z: f32) -> Topology;

    /// Objects within `radius` of `point`
    fn overlap(&self, point: Vec3, radius: f32) -> Vec<WorldObject>;
}

/// A player's claimed construction radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Claim {
    pub position: Vec3,
    pub radius: f32,
    pub owner: PlayerId,
}

pub trait ClaimRegistry {
    fn claims(&self) -> Vec<Claim>;

    /// First claim whose radius reaches within `radius` of `point`
    fn claim_at(&self, point: Vec3, radius: f32) -> Option<Claim> {
        self.claims()
            .into_iter()
            .find(|c| c.position.within_xz(point, c.radius + radius))
    }
}

/// Options forwarded to the paste service
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PasteOptions {
    pub auto_height: bool,
    pub stability: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PasteRequest {
    pub ticket: PasteTicket,
    pub position: Vec3,
    pub rotation: f32,
    pub blueprint: String,
    pub options: PasteOptions,
}

/// Kind tag of a pasted entity, reported once by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Wall, floor, foundation and the like
    BuildingBlock,
    Door,
    LootBox,
    /// Access-control container (tool cupboard)
    Cupboard,
    Oven,
    Fridge,
    Barbecue,
    Locker,
    Turret,
    Trap,
    Light,
    Ladder,
    Deployable,
    Other,
}

/// An entity the paste service created
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PastedEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec3,
}

/// Blueprint paste/undo. Pasting is asynchronous: the host later calls
/// [`crate::RaidManager::on_paste_complete`] or
/// [`crate::RaidManager::on_paste_failed`] with the request's ticket.
pub trait PasteService {
    fn blueprint_exists(&self, name: &str) -> bool;

    /// Start a paste; `false` when the service refuses the request outright
    fn paste(&mut self, request: PasteRequest) -> bool;

    fn undo(&mut self, entities: &[EntityId]);
}

pub trait EntityService {
    fn kill(&mut self, entity: EntityId);

    fn set_powered(&mut self, entity: EntityId, powered: bool);

    /// Chance that the entity drops its contents when destroyed
    fn set_drop_chance(&mut self, entity: EntityId, chance: f32);
}

/// Container slots
pub trait Inventory {
    fn capacity(&self, container: EntityId) -> usize;

    /// Occupied slots
    fn item_count(&self, container: EntityId) -> usize;

    /// Insert one entry, optionally restricted to a slot range.
    /// `false` when it does not fit.
    fn insert(&mut self, container: EntityId, entry: &LootEntry, slots: Option<SlotRange>) -> bool;

    fn clear(&mut self, container: EntityId);

    fn has_space(&self, container: EntityId) -> bool {
        self.item_count(container) < self.capacity(container)
    }
}

/// Broad item category used for overflow routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Resource,
    Food,
    Attire,
    Weapon,
    Ammunition,
    Medical,
    Tool,
    Construction,
    Component,
    Misc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub shortname: String,
    pub category: ItemCategory,
    pub max_stack: u32,
    /// Can be smelted or cooked in an oven
    pub cookable: bool,
}

pub trait ItemCatalog {
    fn find(&self, shortname: &str) -> Option<ItemDefinition>;

    /// Definition whose shortname contains `fragment`, for misspelt table entries
    fn search(&self, fragment: &str) -> Option<ItemDefinition>;
}

pub trait ActorService {
    /// Spawn up to `count` hostile actors around `position`
    fn spawn(&mut self, event: EventId, position: Vec3, radius: f32, count: u32) -> Vec<ActorId>;

    fn kill(&mut self, actor: ActorId);

    fn set_active(&mut self, actor: ActorId, active: bool);
}

pub trait SocialGraph {
    fn same_team(&self, a: PlayerId, b: PlayerId) -> bool;

    fn same_clan(&self, a: PlayerId, b: PlayerId) -> bool;

    fn are_friends(&self, a: PlayerId, b: PlayerId) -> bool;
}

pub trait Players {
    fn position(&self, player: PlayerId) -> Option<Vec3>;

    fn online_count(&self) -> usize;

    /// Barred from raid events by an administrator
    fn is_banned(&self, player: PlayerId) -> bool;

    /// Move the player just outside the protection volume
    fn eject(&mut self, player: PlayerId, center: Vec3, radius: f32);

    fn message(&mut self, player: PlayerId, text: &str);
}

pub trait MarkerService {
    fn create(&mut self, event: EventId, position: Vec3, radius: f32, label: &str) -> Option<MarkerId>;

    fn remove(&mut self, marker: MarkerId);
}

/// Currency and reward points. Absent economy disables purchases only.
pub trait Economy {
    fn balance(&self, player: PlayerId) -> f64;

    fn withdraw(&mut self, player: PlayerId, amount: f64) -> bool;

    fn deposit(&mut self, player: PlayerId, amount: f64);

    fn points(&self, player: PlayerId) -> i64;

    fn add_points(&mut self, player: PlayerId, amount: i64);

    fn take_points(&mut self, player: PlayerId, amount: i64) -> bool;
}

/// Everything the manager needs from its host
pub trait Host {
    fn world(&self) -> &dyn WorldQuery;

    fn claims(&self) -> &dyn ClaimRegistry;

    fn paste(&mut self) -> &mut dyn PasteService;

    fn entities(&mut self) -> &mut dyn EntityService;

    fn inventory(&mut self) -> &mut dyn Inventory;

    fn items(&self) -> &dyn ItemCatalog;

    fn actors(&mut self) -> &mut dyn ActorService;

    fn social(&self) -> &dyn SocialGraph;

    fn players(&mut self) -> &mut dyn Players;

    fn markers(&mut self) -> Option<&mut dyn MarkerService> {
        None
    }

    fn economy(&mut self) -> Option<&mut dyn Economy> {
        None
    }
}
