//! Fixed timestep simulation tick
//!
//! One call advances the world by `dt`. Phases run over all characters
//! before the next phase starts:
//! 1. update (timers, movement intent, integration, boundary clamp)
//! 2. despawn characters whose countdown elapsed
//! 3. static and pairwise collision
//! 4. trigger scan (line of sight, target acceptance)
//! 5. think (AI, attack cooldown), then strikes are applied by id
//! 6. map triggers and camera for the player

use glam::Vec2;
use slotmap::SecondaryMap;

use super::bbox::BoundingBox;
use super::brain::{Brain, ThinkContext};
use super::character::{CharacterEvent, CharacterId, Strike};
use super::collision::resolve_pairwise;
use super::state::{World, WorldEvent};
use crate::platform::InputSource;

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &dyn InputSource, dt: f32) {
    world.events.clear();
    world.time_ticks += 1;

    for character in world.characters.values_mut() {
        character.update(dt);
    }

    despawn_expired(world);
    resolve_collisions(world);
    scan_triggers(world);

    let positions: SecondaryMap<CharacterId, Vec2> = world
        .characters
        .iter()
        .filter(|(_, c)| c.is_alive())
        .map(|(id, c)| (id, c.pos()))
        .collect();
    let ctx = ThinkContext {
        input,
        positions: &positions,
    };

    let mut strikes: Vec<(CharacterId, Strike)> = Vec::new();
    for (id, character) in world.characters.iter_mut() {
        if let Some(strike) = character.think(&ctx) {
            strikes.push((id, strike));
        }
    }
    apply_strikes(world, &strikes);

    if let Some(id) = world.player {
        player_step(world, id);
    }
}

fn despawn_expired(world: &mut World) {
    let expired: Vec<CharacterId> = world
        .characters
        .iter()
        .filter(|(_, c)| c.should_be_free())
        .map(|(id, _)| id)
        .collect();

    for id in expired {
        if let Some(character) = world.despawn(id) {
            world.events.push(WorldEvent::Despawned {
                id,
                name: character.name,
            });
        }
    }
}

fn resolve_collisions(world: &mut World) {
    let boxes: Vec<(CharacterId, BoundingBox)> = world
        .characters
        .iter()
        .filter(|(_, c)| c.is_alive())
        .map(|(id, c)| (id, c.bbox()))
        .collect();

    for (id, bbox) in &boxes {
        let result = world.level.check_collision(bbox);
        if result.hit {
            if let Some(character) = world.characters.get_mut(*id) {
                character.collide(result.push, None);
            }
        }
    }

    for (i, (a, box_a)) in boxes.iter().enumerate() {
        for (b, box_b) in &boxes[i + 1..] {
            let result = resolve_pairwise(box_a, box_b);
            if !result.hit {
                continue;
            }
            if let Some(character) = world.characters.get_mut(*a) {
                character.collide(result.push, Some(*b));
            }
            if let Some(character) = world.characters.get_mut(*b) {
                character.collide(result.reversed().push, Some(*a));
            }
        }
    }
}

fn scan_triggers(world: &mut World) {
    let candidates: Vec<(CharacterId, Vec2, Brain)> = world
        .characters
        .iter()
        .filter(|(_, c)| c.is_alive())
        .map(|(id, c)| (id, c.pos(), c.brain))
        .collect();

    let level = &world.level;
    for (id, character) in world.characters.iter_mut() {
        if !character.is_alive() || character.is_talking() {
            continue;
        }
        let pos = character.pos();
        for &(other, other_pos, other_brain) in &candidates {
            if other == id || !character.brain.accepts_target(other_brain) {
                continue;
            }
            if level.has_line_of_sight(pos, other_pos, character.stats.trigger_far) {
                character.offer_target(other, other_pos);
            }
        }
    }
}

fn apply_strikes(world: &mut World, strikes: &[(CharacterId, Strike)]) {
    for (attacker, strike) in strikes {
        let Some(target) = world.characters.get_mut(strike.target) else {
            log::trace!("Strike from {attacker:?} lost: target gone");
            continue;
        };
        let hits = target.hit(strike.damage, world.rules.as_mut());
        log::trace!("{} takes {hits} from {attacker:?}", target.name);
    }
}

fn player_step(world: &mut World, id: CharacterId) {
    let Some(player) = world.characters.get(id) else {
        return;
    };
    let pos = player.pos();
    let alive = player.is_alive();
    let died = player.events().contains(&CharacterEvent::Died);

    if died {
        log::info!("Player died after {} ticks", world.time_ticks);
        world.events.push(WorldEvent::PlayerDied);
    }
    if alive {
        for name in world.level.check_triggers(pos) {
            log::debug!("Map trigger '{name}'");
            world.events.push(WorldEvent::MapTrigger(name));
        }
    }

    let bounds = world.camera_bounds();
    world.camera.follow(pos, &bounds);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ACTION_RIGHT, InputState, NoInput};
    use crate::sim::character::ActionFlags;
    use crate::sim::level::Level;
    use crate::sim::level::tests::walled_map;
    use crate::sim::rules::{FixedMitigation, RandomMitigation};

    const DT: f32 = 0.1;

    /// Player at (8, 8), wall at x = 32..48, slime hidden behind it
    fn world() -> World {
        World::populated(Level::from_map(&walled_map()).unwrap(), Box::new(FixedMitigation::default()))
    }

    fn enemy_next_to_player(world: &mut World) -> CharacterId {
        world.spawn("slime", Brain::Enemy, Vec2::new(20.0, 8.0))
    }

    fn player_id(world: &World) -> CharacterId {
        world.player.unwrap()
    }

    #[test]
    fn test_enemy_behind_wall_is_unseen() {
        let mut world = world();
        let slime = world.characters.iter().find(|(_, c)| c.brain == Brain::Enemy).map(|(id, _)| id).unwrap();
        for _ in 0..5 {
            tick(&mut world, &NoInput, DT);
        }
        let slime = world.get(slime).unwrap();
        assert_eq!(slime.trigger_far.current, None);
        assert_eq!(slime.actions, ActionFlags::IDLING);
    }

    #[test]
    fn test_enemy_strikes_at_cooldown_rate() {
        let mut world = world();
        let slime = enemy_next_to_player(&mut world);
        let player = player_id(&world);

        for _ in 0..8 {
            tick(&mut world, &NoInput, DT);
        }
        assert_eq!(world.get(slime).unwrap().trigger_near.current, Some(player));
        assert!(world.get(slime).unwrap().actions.contains(ActionFlags::ATTACKING));
        assert_eq!(world.player().unwrap().health, 5);

        // 0.8s cooldown armed on the first tick
        tick(&mut world, &NoInput, DT);
        let hero = world.player().unwrap();
        assert_eq!(hero.health, 4);
        assert!(hero.events().contains(&CharacterEvent::Hit { amount: 1 }));

        for _ in 0..8 {
            tick(&mut world, &NoInput, DT);
        }
        assert_eq!(world.player().unwrap().health, 3);
    }

    #[test]
    fn test_player_died_reported_once() {
        let mut world = world();
        enemy_next_to_player(&mut world);
        world.player_mut().unwrap().health = 1;

        let mut died = 0;
        for _ in 0..40 {
            tick(&mut world, &NoInput, DT);
            died += world.events().iter().filter(|e| **e == WorldEvent::PlayerDied).count();
        }
        assert_eq!(died, 1);
        let hero = world.player().unwrap();
        assert_eq!(hero.actions, ActionFlags::DYING);
        assert_eq!(hero.health, 0);
    }

    #[test]
    fn test_dead_enemy_despawns_and_id_goes_stale() {
        let mut world = world();
        let slime = enemy_next_to_player(&mut world);
        let player = player_id(&world);
        tick(&mut world, &NoInput, DT);
        assert_eq!(world.get(player).unwrap().trigger_near.current, Some(slime));

        let target = world.characters.get_mut(slime).unwrap();
        target.hit(10, &mut FixedMitigation::default());
        assert!(target.events().contains(&CharacterEvent::Died));

        tick(&mut world, &NoInput, 30.0);
        assert!(world.get(slime).is_some());
        // Dead characters are never targeted
        assert_eq!(world.get(player).unwrap().trigger_near.current, None);

        tick(&mut world, &NoInput, 30.0);
        assert!(world.get(slime).is_none());
        assert!(world.events().iter().any(|e| matches!(e, WorldEvent::Despawned { id, .. } if *id == slime)));

        let positions = SecondaryMap::new();
        let ctx = ThinkContext {
            input: &NoInput,
            positions: &positions,
        };
        assert_eq!(ctx.position_of(slime), None);
    }

    #[test]
    fn test_player_is_stopped_by_wall() {
        let mut world = world();
        let player = player_id(&world);
        world.get_mut(player).unwrap().body.pos = Vec2::new(24.0, 8.0);

        let mut input = InputState::new();
        input.press(ACTION_RIGHT);

        let mut collided = false;
        for _ in 0..120 {
            tick(&mut world, &input, 1.0 / 60.0);
            let hero = world.get(player).unwrap();
            collided |= hero.actions.contains(ActionFlags::COLLIDING);
            assert!(hero.pos().x < 31.0, "walked into the wall: {}", hero.pos());
        }
        assert!(collided);
    }

    #[test]
    fn test_colliding_and_walking_visible_after_tick() {
        let mut world = world();
        let player = player_id(&world);
        world.get_mut(player).unwrap().body.pos = Vec2::new(24.0, 8.0);

        let mut input = InputState::new();
        input.press(ACTION_RIGHT);

        let mut collide_ticks = 0;
        let mut flagged_ticks = 0;
        for _ in 0..120 {
            tick(&mut world, &input, 1.0 / 60.0);
            let hero = world.get(player).unwrap();
            let collided = hero.events().iter().any(|e| matches!(e, CharacterEvent::Collide { .. }));
            if collided {
                collide_ticks += 1;
                assert!(hero.actions.contains(ActionFlags::WALKING | ActionFlags::COLLIDING));
            }
            if hero.actions.contains(ActionFlags::COLLIDING) {
                flagged_ticks += 1;
            }
        }
        assert!(collide_ticks > 0);
        assert_eq!(flagged_ticks, collide_ticks);

        // Standing still away from the wall clears the flag on the next tick
        world.get_mut(player).unwrap().body.pos = Vec2::new(-40.0, -40.0);
        tick(&mut world, &NoInput, 1.0 / 60.0);
        assert!(!world.get(player).unwrap().actions.contains(ActionFlags::COLLIDING));
    }

    #[test]
    fn test_map_trigger_fires_on_entry() {
        let mut world = world();
        let zone = world.level.tile_center(2, 2);
        world.player_mut().unwrap().body.pos = zone;

        tick(&mut world, &NoInput, DT);
        assert_eq!(world.events(), &[WorldEvent::MapTrigger("exit".to_string())]);
        tick(&mut world, &NoInput, DT);
        assert!(world.events().is_empty());
    }

    #[test]
    fn test_pairwise_contact_pushes_apart() {
        let mut world = world();
        let player = player_id(&world);
        let villager = world.spawn("villager", Brain::Npc, Vec2::new(12.0, 8.0));

        tick(&mut world, &NoInput, DT);
        let hero = world.get(player).unwrap();
        let npc = world.get(villager).unwrap();
        assert!(hero.events().contains(&CharacterEvent::Collide { other: Some(villager) }));
        assert!(npc.events().contains(&CharacterEvent::Collide { other: Some(player) }));

        tick(&mut world, &NoInput, DT);
        let gap = world.get(villager).unwrap().pos().x - world.get(player).unwrap().pos().x;
        assert!(gap > 4.0);
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let level = Level::from_map(&walled_map()).unwrap();
            let mut world = World::populated(level, Box::new(RandomMitigation::new(99)));
            world.spawn("slime", Brain::Enemy, Vec2::new(20.0, 8.0));
            world.spawn("slime", Brain::Enemy, Vec2::new(-20.0, 8.0));
            if let Some(hero) = world.player_mut() {
                hero.stats.armor = 1;
            }
            for _ in 0..200 {
                tick(&mut world, &NoInput, 1.0 / 60.0);
            }
            world
                .characters
                .values()
                .map(|c| (c.pos(), c.health))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
