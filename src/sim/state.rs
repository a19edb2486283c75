//! World state: the level plus the character arena
//!
//! Characters live in a slot map and refer to each other by [`CharacterId`].
//! Iteration follows slot order, so a tick visits characters in the same
//! order every run.

use glam::Vec2;
use slotmap::SlotMap;

use super::bbox::BoundingBox;
use super::brain::Brain;
use super::character::{Character, CharacterId, CharacterStats};
use super::inventory::{EquipmentSlot, Inventory, Item};
use super::level::Level;
use super::rules::CombatRules;

/// Something the scene layer should react to; visible for one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldEvent {
    /// The player walked into a named map zone
    MapTrigger(String),
    /// A dead character finished its despawn countdown and was removed
    Despawned { id: CharacterId, name: String },
    PlayerDied,
}

/// View centre that trails the player without leaving the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub target: Vec2,
    pub zoom: f32,
    /// Half the visible area in world units
    pub half_view: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            target: Vec2::ZERO,
            zoom: 1.0,
            half_view: Vec2::ZERO,
        }
    }
}

impl Camera {
    /// Region the camera centre may occupy inside `boundary`
    pub fn bounds_for(&self, boundary: &BoundingBox) -> BoundingBox {
        let h = self.half_view / self.zoom;
        boundary.adjust(&BoundingBox::flat(h.x, h.y, -h.x, -h.y))
    }

    pub fn follow(&mut self, pos: Vec2, bounds: &BoundingBox) {
        self.target = bounds.clamp_point(pos);
    }
}

pub struct World {
    pub level: Level,
    pub characters: SlotMap<CharacterId, Character>,
    pub player: Option<CharacterId>,
    pub camera: Camera,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) rules: Box<dyn CombatRules>,
    pub(crate) events: Vec<WorldEvent>,
}

impl World {
    pub fn new(level: Level, rules: Box<dyn CombatRules>) -> Self {
        Self {
            level,
            characters: SlotMap::with_key(),
            player: None,
            camera: Camera::default(),
            time_ticks: 0,
            rules,
            events: Vec::new(),
        }
    }

    /// Level with its authored characters and the player at the start tile
    pub fn populated(level: Level, rules: Box<dyn CombatRules>) -> Self {
        let mut world = Self::new(level, rules);
        for spawn in world.level.spawns().to_vec() {
            let pos = world.level.tile_center(spawn.tile.0, spawn.tile.1);
            world.spawn(&spawn.name, spawn.brain, pos);
        }
        world.spawn_player(world.level.start());
        world
    }

    pub fn spawn(&mut self, name: &str, brain: Brain, pos: Vec2) -> CharacterId {
        let stats = match brain {
            Brain::Player => CharacterStats::player(),
            Brain::Npc => CharacterStats::npc(),
            Brain::Enemy => CharacterStats::enemy(),
        };
        let character = Character::new(name, brain, pos, stats, &self.level.world_boundary());
        let id = self.characters.insert(character);
        log::debug!("Spawned {name} ({brain:?}) at {pos}");
        id
    }

    /// The hero, armed with a wooden sword
    pub fn spawn_player(&mut self, pos: Vec2) -> CharacterId {
        let id = self.spawn("hero", Brain::Player, pos);
        let mut inventory = Inventory::new();
        let _ = inventory.append(Item::new("Wooden sword", EquipmentSlot::Weapon, 0, 0));
        inventory.equip(0);
        let _ = inventory.append(Item::potion(2));
        if let Some(player) = self.characters.get_mut(id) {
            player.inventory = Some(inventory);
        }
        self.player = Some(id);
        id
    }

    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(id)
    }

    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.get_mut(id)
    }

    pub fn player(&self) -> Option<&Character> {
        self.player.and_then(|id| self.characters.get(id))
    }

    pub fn player_mut(&mut self) -> Option<&mut Character> {
        self.player.and_then(|id| self.characters.get_mut(id))
    }

    pub fn events(&self) -> &[WorldEvent] {
        &self.events
    }

    /// Remove a character; its id resolves to nothing from now on
    pub fn despawn(&mut self, id: CharacterId) -> Option<Character> {
        let character = self.characters.remove(id)?;
        if self.player == Some(id) {
            self.player = None;
        }
        log::debug!("Despawned {}", character.name);
        Some(character)
    }

    /// Drop every character (scene teardown)
    pub fn clear(&mut self) {
        self.characters.clear();
        self.player = None;
        self.events.clear();
    }

    pub fn camera_bounds(&self) -> BoundingBox {
        self.camera.bounds_for(&self.level.world_boundary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::tests::walled_map;
    use crate::sim::rules::FixedMitigation;

    fn world() -> World {
        World::populated(Level::from_map(&walled_map()).unwrap(), Box::new(FixedMitigation::default()))
    }

    #[test]
    fn test_populated_world() {
        let world = world();
        assert_eq!(world.characters.len(), 2);
        let player = world.player().unwrap();
        assert_eq!(player.pos(), Vec2::new(8.0, 8.0));
        assert!(player.inventory.as_ref().unwrap().is_equipped_with(EquipmentSlot::Weapon));
    }

    #[test]
    fn test_despawned_id_is_gone() {
        let mut world = world();
        let id = world.player.unwrap();
        assert!(world.despawn(id).is_some());
        assert!(world.get(id).is_none());
        assert!(world.player().is_none());
        assert!(world.despawn(id).is_none());

        // A fresh spawn never reuses the stale handle
        let other = world.spawn("slime", Brain::Enemy, Vec2::ZERO);
        assert_ne!(other, id);
        assert!(world.get(id).is_none());
    }

    #[test]
    fn test_camera_stays_inside_map() {
        let mut world = world();
        world.camera.half_view = Vec2::new(40.0, 30.0);
        let bounds = world.camera_bounds();
        world.camera.follow(Vec2::new(-500.0, 500.0), &bounds);
        assert_eq!(world.camera.target, Vec2::new(-88.0, 97.0));
        world.camera.follow(Vec2::new(3.0, 4.0), &bounds);
        assert_eq!(world.camera.target, Vec2::new(3.0, 4.0));
    }
}
