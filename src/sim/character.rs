//! Characters: action flags, proximity triggers, combat and despawn
//!
//! A character is a kinematic body plus a flag-based action state. Each tick
//! the world calls [`Character::update`] (timers, movement, per-tick resets),
//! resolves collisions, offers trigger targets, then calls
//! [`Character::think`] (edge events, AI hook, attack cooldown).
//!
//! Characters refer to each other only by [`CharacterId`]; a lookup against a
//! despawned id simply finds nothing.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use super::bbox::{BoundingBox, Rect};
use super::body::Body;
use super::brain::{Brain, ThinkContext};
use super::inventory::Inventory;
use super::rules::CombatRules;
use super::timer::Timer;
use crate::consts::*;

new_key_type! {
    /// Stable handle into the world's character arena
    pub struct CharacterId;
}

bitflags! {
    /// What a character is doing this tick; several may be set at once
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ActionFlags: u8 {
        const IDLING = 1 << 0;
        const WALKING = 1 << 1;
        const ATTACKING = 1 << 2;
        const COLLIDING = 1 << 3;
        const TALKING = 1 << 4;
        /// Terminal and exclusive
        const DYING = 1 << 5;
    }
}

/// Flags that survive the per-tick reset
pub const NO_RESET_MASK: ActionFlags = ActionFlags::TALKING.union(ActionFlags::DYING);

/// Tunable per-character numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterStats {
    /// Walking speed (pixels per second)
    pub speed: f32,
    /// Seconds between blows
    pub attack_speed: f32,
    pub damage: i32,
    pub armor: i32,
    pub hp: i32,
    #[serde(default)]
    pub xp: u32,
    pub trigger_near: f32,
    pub trigger_far: f32,
}

impl CharacterStats {
    pub fn player() -> Self {
        Self {
            speed: 20.0,
            attack_speed: 0.5,
            damage: 1,
            armor: 0,
            hp: 5,
            xp: 1,
            trigger_near: CHARACTER_TRIGGER_NEAR_DEFAULT,
            trigger_far: CHARACTER_TRIGGER_FAR_DEFAULT,
        }
    }

    pub fn enemy() -> Self {
        Self {
            speed: 8.0,
            attack_speed: 0.8,
            hp: 2,
            ..Self::player()
        }
    }

    pub fn npc() -> Self {
        Self {
            speed: 8.0,
            attack_speed: 1.0,
            damage: 0,
            hp: 1,
            ..Self::player()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Near,
    Far,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEdge {
    Enter,
    Leave,
    Follow,
}

/// Closest qualifying character within a radius, tracked across two ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trigger {
    pub distance: f32,
    pub previous: Option<CharacterId>,
    pub current: Option<CharacterId>,
}

impl Default for Trigger {
    fn default() -> Self {
        Self {
            distance: f32::INFINITY,
            previous: None,
            current: None,
        }
    }
}

impl Trigger {
    /// Roll `current` into `previous` and start a new scan
    pub fn reset(&mut self) {
        self.distance = f32::INFINITY;
        self.previous = self.current.take();
    }

    /// Keep `id` if it is within `radius` and strictly closer than the best so far
    pub fn offer(&mut self, id: CharacterId, distance: f32, radius: f32) -> bool {
        if distance <= radius && distance < self.distance {
            self.distance = distance;
            self.current = Some(id);
            return true;
        }
        false
    }

    /// Edge between the previous and current scan, if any
    pub fn edge(&self) -> Option<(TriggerEdge, CharacterId)> {
        match (self.previous, self.current) {
            (None, Some(curr)) => Some((TriggerEdge::Enter, curr)),
            (Some(last), None) => Some((TriggerEdge::Leave, last)),
            (Some(_), Some(curr)) => Some((TriggerEdge::Follow, curr)),
            (None, None) => None,
        }
    }
}

/// Something that happened to a character during the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterEvent {
    Trigger {
        kind: TriggerKind,
        edge: TriggerEdge,
        target: CharacterId,
    },
    Collide {
        other: Option<CharacterId>,
    },
    Hit {
        amount: i32,
    },
    Died,
}

/// A blow landed by an attacker, applied by the world to `target`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strike {
    pub target: CharacterId,
    pub damage: i32,
}

#[derive(Debug, Clone)]
pub struct Character {
    pub name: String,
    pub brain: Brain,
    pub body: Body,
    pub stats: CharacterStats,
    pub health: i32,
    pub actions: ActionFlags,
    /// Movement intent set by the AI hook
    pub dir: Vec2,
    pub speed: f32,
    pub attack_timer: Timer,
    pub despawn_timer: Timer,
    pub trigger_near: Trigger,
    pub trigger_far: Trigger,
    pub boundary: BoundingBox,
    pub inventory: Option<Inventory>,
    events: Vec<CharacterEvent>,
}

impl Character {
    pub fn new(name: &str, brain: Brain, pos: Vec2, stats: CharacterStats, world_boundary: &BoundingBox) -> Self {
        Self {
            name: name.to_string(),
            brain,
            body: Body::new(pos),
            health: stats.hp,
            stats,
            actions: ActionFlags::IDLING,
            dir: Vec2::ZERO,
            speed: 0.0,
            attack_timer: Timer::new(),
            despawn_timer: Timer::new(),
            trigger_near: Trigger::default(),
            trigger_far: Trigger::default(),
            boundary: world_boundary.adjust(&CHARACTER_BOUNDARY_ADJUST),
            inventory: None,
            events: Vec::new(),
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    pub fn set_position_and_boundary(&mut self, pos: Vec2, world_boundary: &BoundingBox) {
        self.body.pos = pos;
        self.boundary = world_boundary.adjust(&CHARACTER_BOUNDARY_ADJUST);
    }

    /// Feet box carved out of the sprite rect
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::from_rect(self.sprite_rect()).adjust(&CHARACTER_BBOX_ADJUST)
    }

    /// Screen-space rect the sprite is drawn into
    pub fn sprite_rect(&self) -> Rect {
        Rect::centered(self.body.pos, CHARACTER_SIZE)
    }

    pub fn max_health(&self) -> i32 {
        self.stats.hp
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_talking(&self) -> bool {
        self.actions.contains(ActionFlags::TALKING)
    }

    /// Dead and done lingering
    pub fn should_be_free(&self) -> bool {
        !self.is_alive() && self.despawn_timer.is_elapsed()
    }

    pub fn damage(&self) -> i32 {
        self.stats.damage + self.inventory.as_ref().map_or(0, Inventory::damage_bonus)
    }

    pub fn armor(&self) -> i32 {
        self.stats.armor + self.inventory.as_ref().map_or(0, Inventory::armor_bonus)
    }

    pub fn events(&self) -> &[CharacterEvent] {
        &self.events
    }

    /// Replace the intent flags with `action`
    ///
    /// Talking/dying survive, and so does this tick's `COLLIDING`, which only
    /// the per-tick reset in [`update`](Self::update) clears.
    pub fn set_action(&mut self, action: ActionFlags) {
        self.actions = (self.actions & (NO_RESET_MASK | ActionFlags::COLLIDING)) | action;
    }

    /// Whether `other` is worth tracking in this character's triggers
    pub fn accepts_target(&self, other: &Character) -> bool {
        self.brain.accepts_target(other.brain)
    }

    /// Offer a candidate to both triggers (closest within radius wins)
    pub fn offer_target(&mut self, id: CharacterId, pos: Vec2) {
        let distance = self.body.pos.distance(pos);
        self.trigger_near.offer(id, distance, self.stats.trigger_near);
        self.trigger_far.offer(id, distance, self.stats.trigger_far);
    }

    pub fn reset_triggers(&mut self) {
        self.trigger_near.reset();
        self.trigger_far.reset();
    }

    pub fn handle_triggers(&mut self) {
        for (kind, trigger) in [(TriggerKind::Near, self.trigger_near), (TriggerKind::Far, self.trigger_far)] {
            if let Some((edge, target)) = trigger.edge() {
                self.events.push(CharacterEvent::Trigger { kind, edge, target });
            }
        }
    }

    /// One step of the attack cooldown
    ///
    /// The first call after a pause only arms the timer. Once it elapses the
    /// near target (if any) is struck and the timer is re-armed.
    pub fn attack_step(&mut self) -> Option<Strike> {
        if !self.attack_timer.is_elapsed() {
            self.attack_timer.set(self.stats.attack_speed);
            return None;
        }
        self.attack_timer.reset();
        self.attack_timer.set(self.stats.attack_speed);
        self.trigger_near.current.map(|target| Strike {
            target,
            damage: self.damage(),
        })
    }

    /// Decide this tick's intent; returns a strike for the world to apply
    pub fn think(&mut self, ctx: &ThinkContext<'_>) -> Option<Strike> {
        if self.is_talking() {
            return None;
        }
        if !self.is_alive() {
            self.die();
            return None;
        }

        self.handle_triggers();
        let brain = self.brain;
        brain.think(self, ctx);

        if self.actions.contains(ActionFlags::ATTACKING) {
            self.attack_step()
        } else {
            self.attack_timer.reset();
            None
        }
    }

    /// Apply an incoming blow; returns the health actually removed
    ///
    /// Blows fully absorbed by armor are silent.
    pub fn hit(&mut self, damage: i32, rules: &mut dyn CombatRules) -> i32 {
        if !self.is_alive() {
            return 0;
        }

        let hits = rules.hits(damage, self.armor());
        if hits > 0 {
            self.health -= hits;
            self.events.push(CharacterEvent::Hit { amount: hits });
        }
        if !self.is_alive() {
            self.die();
        }
        hits
    }

    /// Enter the terminal dying state (only the first call has any effect)
    pub fn die(&mut self) {
        if self.actions.contains(ActionFlags::DYING) {
            return;
        }
        self.body.force = Vec2::ZERO;
        self.body.vel = Vec2::ZERO;
        self.dir = Vec2::ZERO;
        self.speed = 0.0;
        self.actions = ActionFlags::DYING;
        self.despawn_timer.set(CHARACTER_FREE_TIMER);
        self.events.push(CharacterEvent::Died);
        log::debug!("{} died", self.name);
    }

    pub fn heal(&mut self, amount: i32) {
        if self.is_alive() {
            self.health = (self.health + amount).min(self.max_health());
        }
    }

    /// Consume a bag item; returns true if something was used
    pub fn use_item(&mut self, slot: usize) -> bool {
        let Some(item) = self.inventory.as_mut().and_then(|inv| inv.consume(slot)) else {
            return false;
        };
        self.heal(item.heal);
        true
    }

    /// Freeze for a conversation
    pub fn start_talk(&mut self) {
        self.dir = Vec2::ZERO;
        self.speed = 0.0;
        self.actions |= ActionFlags::TALKING;
        self.events.clear();
        self.reset_triggers();
    }

    pub fn stop_talk(&mut self) {
        self.actions.remove(ActionFlags::TALKING);
    }

    /// React to a collision push from the level or another character
    ///
    /// Talking and dying characters are frozen and ignore pushes.
    pub fn collide(&mut self, push: Vec2, other: Option<CharacterId>) {
        if self.actions.intersects(NO_RESET_MASK) {
            return;
        }
        self.body.collide(push);
        self.actions |= ActionFlags::COLLIDING;
        self.events.push(CharacterEvent::Collide { other });
    }

    /// Start-of-tick step: clear last tick's events, roll triggers, advance
    /// timers, move and clamp
    pub fn update(&mut self, dt: f32) {
        self.events.clear();
        self.reset_triggers();
        if self.is_talking() {
            return;
        }

        self.attack_timer.update(dt);
        self.despawn_timer.update(dt);

        self.body.move_constant(self.dir * self.speed, dt);
        self.body.integrate(dt);
        self.body.clamp_to_boundary(&self.boundary);

        self.actions &= NO_RESET_MASK;
    }
}
