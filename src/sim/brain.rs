//! Character AI hooks
//!
//! A closed set of behaviours dispatched by `match`. Each hook only sets the
//! character's movement intent (`dir`, `speed`) and action flags for the
//! tick; movement and combat are applied by the character and the world.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;

use super::character::{ActionFlags, Character, CharacterId};
use super::inventory::{EquipmentSlot, Inventory};
use crate::platform::{ACTION_ATTACK, ACTION_DOWN, ACTION_LEFT, ACTION_RIGHT, ACTION_UP, ACTION_USE, InputSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Brain {
    /// Driven by the input collaborator
    Player,
    /// Stands still until spoken to
    Npc,
    /// Walks toward the nearest target it can see and attacks it up close
    Enemy,
}

/// Read-only view of the world handed to AI hooks
pub struct ThinkContext<'a> {
    pub input: &'a dyn InputSource,
    /// Positions of live characters at the start of the think phase
    pub positions: &'a SecondaryMap<CharacterId, Vec2>,
}

impl ThinkContext<'_> {
    /// Position of `id`, or `None` if it has despawned
    pub fn position_of(&self, id: CharacterId) -> Option<Vec2> {
        self.positions.get(id).copied()
    }
}

impl Brain {
    /// Whether a character with this brain tracks `other` in its triggers
    pub fn accepts_target(self, other: Brain) -> bool {
        match self {
            Brain::Player => true,
            Brain::Npc | Brain::Enemy => other == Brain::Player,
        }
    }

    pub fn think(self, character: &mut Character, ctx: &ThinkContext<'_>) {
        character.dir = Vec2::ZERO;
        character.speed = 0.0;
        character.set_action(ActionFlags::IDLING);

        match self {
            Brain::Player => think_player(character, ctx),
            Brain::Npc => {}
            Brain::Enemy => think_enemy(character, ctx),
        }
    }
}

fn think_player(character: &mut Character, ctx: &ThinkContext<'_>) {
    let input = ctx.input;
    let mut dir = Vec2::ZERO;
    if input.is_action_down(ACTION_UP) {
        dir.y -= 1.0;
    }
    if input.is_action_down(ACTION_DOWN) {
        dir.y += 1.0;
    }
    if input.is_action_down(ACTION_LEFT) {
        dir.x -= 1.0;
    }
    if input.is_action_down(ACTION_RIGHT) {
        dir.x += 1.0;
    }

    if dir != Vec2::ZERO {
        character.dir = dir.normalize();
        character.speed = character.stats.speed;
        character.set_action(ActionFlags::WALKING);
    }

    if input.is_action_pressed(ACTION_USE) {
        let slot = character.inventory.as_ref().and_then(Inventory::first_consumable);
        if let Some(slot) = slot {
            character.use_item(slot);
        }
    }

    let armed = character
        .inventory
        .as_ref()
        .is_some_and(|inv| inv.is_equipped_with(EquipmentSlot::Weapon));
    if armed && input.is_action_down(ACTION_ATTACK) {
        character.speed = 0.0;
        character.set_action(ActionFlags::ATTACKING);
    }
}

fn think_enemy(character: &mut Character, ctx: &ThinkContext<'_>) {
    let pos = character.pos();

    if let Some(target) = character.trigger_near.current.and_then(|id| ctx.position_of(id)) {
        character.dir = (target - pos).normalize_or_zero();
        character.set_action(ActionFlags::ATTACKING);
    } else if let Some(target) = character.trigger_far.current.and_then(|id| ctx.position_of(id)) {
        character.dir = (target - pos).normalize_or_zero();
        character.speed = character.stats.speed;
        character.set_action(ActionFlags::WALKING);
    }
}
