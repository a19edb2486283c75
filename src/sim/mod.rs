//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (behind [`CombatRules`])
//! - Stable iteration order (slot map order)
//! - No rendering or platform dependencies beyond the input trait

pub mod bbox;
pub mod body;
pub mod brain;
pub mod character;
pub mod collision;
pub mod inventory;
pub mod level;
pub mod region_tree;
pub mod rules;
pub mod state;
pub mod tick;
pub mod timer;

pub use bbox::{BoundingBox, Ray, Rect};
pub use body::Body;
pub use brain::{Brain, ThinkContext};
pub use character::{
    ActionFlags, Character, CharacterEvent, CharacterId, CharacterStats, NO_RESET_MASK, Strike, Trigger,
    TriggerEdge, TriggerKind,
};
pub use collision::{CollisionResult, Solid, resolve_against_static, resolve_pairwise};
pub use inventory::{EquipmentSlot, Inventory, Item};
pub use level::{Level, MapData, Obstacle, SpawnDescriptor, TriggerZone};
pub use region_tree::{RegionNode, RegionTree};
pub use rules::{CombatRules, FixedMitigation, RandomMitigation};
pub use state::{Camera, World, WorldEvent};
pub use tick::tick;
pub use timer::Timer;
