//! Playable level scene
//!
//! Runs a [`World`] over one map. Raises `game_over` when the player dies and
//! `trigger` (with the zone name) when the player walks into a map zone. The
//! player's health and inventory are what survives a save.

use std::collections::{HashMap, VecDeque};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Scene, SceneContext, SceneEvent};
use crate::audio::SoundEffect;
use crate::error::Result;
use crate::platform::{ACTION_ACCEPT, Resources, TextureInfo};
use crate::renderer::{Color, Renderer, colors};
use crate::settings::Settings;
use crate::sim::{
    ActionFlags, BoundingBox, Brain, Character, CharacterEvent, CharacterId, Inventory, Level, RandomMitigation, Rect, World,
    WorldEvent, tick,
};

pub const TOKEN_GAME_OVER: &str = "game_over";
pub const TOKEN_TRIGGER: &str = "trigger";

/// Part of the player that outlives the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub health: i32,
    pub inventory: Option<Inventory>,
    #[serde(default)]
    pub position: Option<Vec2>,
}

impl PlayerState {
    fn capture(player: &Character) -> Self {
        Self {
            health: player.health,
            inventory: player.inventory.clone(),
            position: Some(player.pos()),
        }
    }

    fn apply(&self, player: &mut Character, level: &Level) {
        // A save taken on the death screen starts a fresh life
        player.health = if self.health > 0 {
            self.health.min(player.max_health())
        } else {
            player.max_health()
        };
        if self.inventory.is_some() {
            player.inventory = self.inventory.clone();
        }
        if let Some(pos) = self.position {
            player.set_position_and_boundary(pos, &level.world_boundary());
            player.body.clamp_to_boundary(&player.boundary);
        }
    }
}

fn texture_for(brain: Brain) -> &'static str {
    match brain {
        Brain::Player => "hero",
        Brain::Npc => "villager",
        Brain::Enemy => "slime",
    }
}

pub struct LevelScene {
    name: String,
    map: String,
    seed: u64,
    half_view: Vec2,
    debug_draw: bool,
    world: Option<World>,
    textures: HashMap<&'static str, TextureInfo>,
    saved: Option<PlayerState>,
    talking_with: Option<CharacterId>,
    events: VecDeque<SceneEvent>,
}

impl LevelScene {
    pub fn new(name: &str, map: &str, settings: &Settings) -> Self {
        Self {
            name: name.to_string(),
            map: map.to_string(),
            seed: settings.seed,
            half_view: Vec2::new(settings.window_width as f32, settings.window_height as f32) / 2.0,
            debug_draw: settings.debug_draw,
            world: None,
            textures: HashMap::new(),
            saved: None,
            talking_with: None,
            events: VecDeque::new(),
        }
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn world_mut(&mut self) -> Option<&mut World> {
        self.world.as_mut()
    }

    /// Toggle a conversation with the NPC in front of the player
    ///
    /// Talking characters are left out of the trigger scan, so the partner is
    /// remembered here to end the conversation.
    fn handle_talk(world: &mut World, talking_with: &mut Option<CharacterId>) {
        let Some(player_id) = world.player else {
            return;
        };

        if let Some(npc_id) = talking_with.take() {
            for id in [player_id, npc_id] {
                if let Some(character) = world.get_mut(id) {
                    character.stop_talk();
                }
            }
            log::debug!("Conversation ended");
            return;
        }

        let Some(npc_id) = world.get(player_id).and_then(|p| p.trigger_near.current) else {
            return;
        };
        if world.get(npc_id).is_none_or(|npc| npc.brain != Brain::Npc) {
            return;
        }
        for id in [player_id, npc_id] {
            if let Some(character) = world.get_mut(id) {
                character.start_talk();
            }
        }
        *talking_with = Some(npc_id);
        log::debug!("Conversation started");
    }

    fn play_cues(world: &World, ctx: &mut SceneContext<'_>) {
        for (id, character) in &world.characters {
            let is_player = world.player == Some(id);
            for event in character.events() {
                match event {
                    CharacterEvent::Hit { .. } if is_player => ctx.audio.play(SoundEffect::Hurt),
                    CharacterEvent::Hit { .. } => ctx.audio.play(SoundEffect::Hit),
                    CharacterEvent::Died if !is_player => ctx.audio.play(SoundEffect::Death),
                    _ => {}
                }
            }
        }
    }

    fn screen_offset(&self, world: &World) -> Vec2 {
        self.half_view - world.camera.target
    }

    fn draw_character(&self, renderer: &mut dyn Renderer, character: &Character, offset: Vec2) {
        let Some(texture) = self.textures.get(texture_for(character.brain)) else {
            return;
        };
        let row = if character.actions.contains(ActionFlags::DYING) {
            3.0
        } else if character.actions.contains(ActionFlags::ATTACKING) {
            2.0
        } else if character.actions.contains(ActionFlags::WALKING) {
            1.0
        } else {
            0.0
        };
        let col = if character.dir.x < 0.0 { 1.0 } else { 0.0 };
        let size = crate::consts::CHARACTER_SIZE;
        let source = Rect::new(col * size.x, row * size.y, size.x, size.y);
        let sprite = character.sprite_rect();
        let dest = Rect::new(sprite.x + offset.x, sprite.y + offset.y, sprite.width, sprite.height);
        renderer.draw_sprite(texture.id, source, dest, Vec2::ZERO, 0.0, Color::WHITE);

        if self.debug_draw {
            let color = if character.actions.contains(ActionFlags::DYING) {
                colors::DYING
            } else if character.actions.contains(ActionFlags::COLLIDING) {
                colors::COLLIDING
            } else {
                colors::CHARACTER
            };
            renderer.draw_debug_box(&shifted(&character.bbox(), offset), color);
        }
    }
}

fn shifted(bbox: &BoundingBox, offset: Vec2) -> BoundingBox {
    bbox.adjust(&BoundingBox::flat(offset.x, offset.y, offset.x, offset.y))
}

impl Scene for LevelScene {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, _previous: Option<&mut dyn Scene>, resources: &mut Resources) -> Result<()> {
        let map = resources.map(&self.map)?;
        let level = Level::from_map(&map)?;
        for name in ["tiles", "hero", "villager", "slime"] {
            self.textures.insert(name, resources.texture(name)?);
        }

        let mut world = World::populated(level, Box::new(RandomMitigation::new(self.seed)));
        world.camera.half_view = self.half_view;
        if let Some(saved) = &self.saved {
            let World { level, characters, player, .. } = &mut world;
            if let Some(hero) = player.and_then(|id| characters.get_mut(id)) {
                saved.apply(hero, level);
            }
        }
        log::info!("Entered level '{}' with {} characters", self.map, world.characters.len());
        self.world = Some(world);
        self.talking_with = None;
        self.events.clear();
        Ok(())
    }

    fn release(&mut self) {
        if let Some(player) = self.world.as_ref().and_then(World::player) {
            self.saved = Some(PlayerState::capture(player));
        }
        self.world = None;
        self.talking_with = None;
        self.textures.clear();
        self.events.clear();
    }

    fn update(&mut self, dt: f32, ctx: &mut SceneContext<'_>) {
        let Some(world) = self.world.as_mut() else {
            return;
        };

        ctx.audio.play_music(&self.map);
        if ctx.input.is_action_pressed(ACTION_ACCEPT) {
            Self::handle_talk(world, &mut self.talking_with);
        }

        tick(world, ctx.input, dt);
        Self::play_cues(world, ctx);

        for event in world.events() {
            match event {
                WorldEvent::PlayerDied => {
                    ctx.audio.play(SoundEffect::GameOver);
                    self.events.push_back(SceneEvent::new(TOKEN_GAME_OVER));
                }
                WorldEvent::MapTrigger(zone) => {
                    ctx.audio.play(SoundEffect::Trigger);
                    self.events.push_back(SceneEvent::with_detail(TOKEN_TRIGGER, zone));
                }
                WorldEvent::Despawned { .. } => {}
            }
        }
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let Some(world) = self.world.as_ref() else {
            return;
        };
        let offset = self.screen_offset(world);

        if let Some(tiles) = self.textures.get("tiles") {
            let tile = world.level.tile_size;
            for obstacle in world.level.obstacles() {
                let rect = world.level.tile_rect(obstacle.tile.0, obstacle.tile.1);
                let dest = Rect::new(rect.x + offset.x, rect.y + offset.y, rect.width, rect.height);
                renderer.draw_sprite(tiles.id, Rect::new(0.0, 0.0, tile.x, tile.y), dest, Vec2::ZERO, 0.0, Color::WHITE);
                if self.debug_draw {
                    renderer.draw_debug_box(&shifted(&obstacle.bbox, offset), colors::OBSTACLE);
                }
            }
        }

        for character in world.characters.values() {
            self.draw_character(renderer, character, offset);
        }
    }

    fn next_event(&mut self) -> Option<SceneEvent> {
        self.events.pop_front()
    }

    fn save_state(&self) -> Option<Value> {
        let state = match self.world.as_ref().and_then(World::player) {
            Some(player) => PlayerState::capture(player),
            None => self.saved.clone()?,
        };
        serde_json::to_value(state)
            .inspect_err(|e| log::warn!("Could not serialize player state: {e}"))
            .ok()
    }

    fn restore_state(&mut self, state: Value) -> Result<()> {
        let saved: PlayerState = serde_json::from_value(state)?;
        if let Some(world) = self.world.as_mut() {
            let World { level, characters, player, .. } = world;
            if let Some(hero) = player.and_then(|id| characters.get_mut(id)) {
                saved.apply(hero, level);
            }
        }
        self.saved = Some(saved);
        Ok(())
    }

    fn reset_state(&mut self) {
        self.saved = None;
    }
}
