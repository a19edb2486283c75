//! Static level: tile obstacles, trigger zones and spawn points
//!
//! A level is built once from [`MapData`] handed over by the content
//! collaborator. The map is centred on the origin; tile `(x, y)` covers
//! `[(x - w/2) * tw, (x - w/2 + 1) * tw)` horizontally (same for y). Blocked
//! tiles become [`Obstacle`]s in the region tree, inserted at the tile
//! centre so each sits in exactly one leaf.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::bbox::{BoundingBox, Ray, Rect};
use super::brain::Brain;
use super::collision::{CollisionResult, Solid, resolve_against_static};
use super::region_tree::RegionTree;
use crate::consts::STATIC_QUERY_MARGIN;
use crate::error::{Error, Result};

/// Circular zone that fires when the player walks into it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerZone {
    pub name: String,
    pub tile: (u32, u32),
    /// Pixels from the tile centre
    pub radius: f32,
}

/// Character placed on the map at load time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnDescriptor {
    pub name: String,
    pub brain: Brain,
    pub tile: (u32, u32),
}

/// Parsed map as delivered by the content collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub name: String,
    /// Tiles per side; must be a power of two
    pub width: u32,
    pub height: u32,
    pub tile_width: f32,
    pub tile_height: f32,
    /// Tiles that block movement and sight
    pub blocked: Vec<(u32, u32)>,
    #[serde(default)]
    pub triggers: Vec<TriggerZone>,
    #[serde(default)]
    pub spawns: Vec<SpawnDescriptor>,
    /// Player start tile
    pub start: (u32, u32),
}

/// A blocked tile stored in the region tree
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub bbox: BoundingBox,
    pub tile: (u32, u32),
}

impl Solid for Obstacle {
    fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }
}

#[derive(Debug, Clone)]
struct Zone {
    name: String,
    pos: Vec2,
    radius: f32,
    inside: bool,
}

#[derive(Debug, Clone)]
pub struct Level {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub tile_size: Vec2,
    tree: RegionTree<Obstacle>,
    zones: Vec<Zone>,
    spawns: Vec<SpawnDescriptor>,
    start: Vec2,
}

impl Level {
    /// Validate `map` and build its obstacle index
    pub fn from_map(map: &MapData) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedMap {
            name: map.name.clone(),
            reason,
        };

        if map.width == 0 || map.height == 0 {
            return Err(malformed("map has no tiles".to_string()));
        }
        if map.width != map.height || !map.width.is_power_of_two() {
            return Err(malformed(format!(
                "map must be square with a power-of-two side, got {}x{}",
                map.width, map.height
            )));
        }
        if map.tile_width <= 0.0 || map.tile_width != map.tile_height {
            return Err(malformed(format!(
                "tiles must be square and non-empty, got {}x{}",
                map.tile_width, map.tile_height
            )));
        }

        let in_map = |(x, y): (u32, u32)| x < map.width && y < map.height;
        if let Some(tile) = map.blocked.iter().copied().find(|t| !in_map(*t)) {
            return Err(malformed(format!("obstacle {tile:?} lies outside the map")));
        }
        if let Some(spawn) = map.spawns.iter().find(|s| !in_map(s.tile)) {
            return Err(malformed(format!("spawn '{}' lies outside the map", spawn.name)));
        }
        if let Some(zone) = map.triggers.iter().find(|z| !in_map(z.tile)) {
            return Err(malformed(format!("trigger '{}' lies outside the map", zone.name)));
        }
        if !in_map(map.start) {
            return Err(malformed("start tile lies outside the map".to_string()));
        }

        let mut level = Self {
            name: map.name.clone(),
            width: map.width,
            height: map.height,
            tile_size: Vec2::new(map.tile_width, map.tile_height),
            tree: RegionTree::build(map.width as f32 * map.tile_width / 2.0, map.tile_width),
            zones: Vec::new(),
            spawns: map.spawns.clone(),
            start: Vec2::ZERO,
        };
        level.start = level.tile_center(map.start.0, map.start.1);
        level.zones = map
            .triggers
            .iter()
            .map(|z| Zone {
                name: z.name.clone(),
                pos: level.tile_center(z.tile.0, z.tile.1),
                radius: z.radius,
                inside: false,
            })
            .collect();

        for &(x, y) in &map.blocked {
            let obstacle = Obstacle {
                bbox: level.tile_bbox(x, y),
                tile: (x, y),
            };
            level.tree.insert(level.tile_center(x, y), obstacle);
        }

        log::info!(
            "Level '{}' loaded: {}x{} tiles, {} obstacles, {} spawns, tree depth {}",
            level.name,
            level.width,
            level.height,
            map.blocked.len(),
            level.spawns.len(),
            level.tree.depth()
        );
        Ok(level)
    }

    fn origin(&self) -> Vec2 {
        Vec2::new(-(self.width as f32) / 2.0, -(self.height as f32) / 2.0)
    }

    /// Destination rect of tile `(x, y)` in world space
    pub fn tile_rect(&self, x: u32, y: u32) -> Rect {
        let corner = (Vec2::new(x as f32, y as f32) + self.origin()) * self.tile_size;
        Rect::new(corner.x, corner.y, self.tile_size.x, self.tile_size.y)
    }

    pub fn tile_bbox(&self, x: u32, y: u32) -> BoundingBox {
        BoundingBox::from_rect(self.tile_rect(x, y))
    }

    pub fn tile_center(&self, x: u32, y: u32) -> Vec2 {
        self.tile_rect(x, y).center()
    }

    /// Playable area of the whole map
    pub fn world_boundary(&self) -> BoundingBox {
        let size = Vec2::new(self.width as f32, self.height as f32) * self.tile_size;
        let corner = self.origin() * self.tile_size;
        BoundingBox::from_rect(Rect::new(corner.x, corner.y, size.x, size.y))
    }

    pub fn obstacles(&self) -> Vec<&Obstacle> {
        self.tree.find_where(|_| true)
    }

    pub fn spawns(&self) -> &[SpawnDescriptor] {
        &self.spawns
    }

    pub fn start(&self) -> Vec2 {
        self.start
    }

    /// Push-out of `bbox` against the blocked tiles
    pub fn check_collision(&self, bbox: &BoundingBox) -> CollisionResult {
        resolve_against_static(&self.tree, bbox, self.tile_size * STATIC_QUERY_MARGIN)
    }

    /// Whether `to` can be seen from `from` within `max_distance`
    ///
    /// Obstacles containing `from` are ignored so a character standing on the
    /// edge of a wall can still look away from it.
    pub fn has_line_of_sight(&self, from: Vec2, to: Vec2, max_distance: f32) -> bool {
        let dist = from.distance(to);
        if dist > max_distance {
            return false;
        }
        if dist == 0.0 {
            return true;
        }

        let ray = Ray::between(from, to);
        let origin = Vec3::new(from.x, from.y, 0.0);
        !self.tree.find_ray(&ray).into_iter().any(|obstacle| {
            let bbox = &obstacle.bbox;
            let contains_origin = bbox.min.cmple(origin).all() && bbox.max.cmpge(origin).all();
            !contains_origin && bbox.ray_distance(&ray).is_some_and(|d| d < dist)
        })
    }

    /// Names of trigger zones entered at `pos`
    ///
    /// A zone fires once on entry and re-arms when `pos` leaves it.
    pub fn check_triggers(&mut self, pos: Vec2) -> Vec<String> {
        let mut entered = Vec::new();
        for zone in &mut self.zones {
            let inside = pos.distance(zone.pos) <= zone.radius;
            if inside && !zone.inside {
                entered.push(zone.name.clone());
            }
            zone.inside = inside;
        }
        entered
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 16x16 tiles of 16px with a wall segment at x = 10, y = 4..12
    pub(crate) fn walled_map() -> MapData {
        MapData {
            name: "test".to_string(),
            width: 16,
            height: 16,
            tile_width: 16.0,
            tile_height: 16.0,
            blocked: (4..12).map(|y| (10, y)).collect(),
            triggers: vec![TriggerZone {
                name: "exit".to_string(),
                tile: (2, 2),
                radius: 8.0,
            }],
            spawns: vec![SpawnDescriptor {
                name: "slime".to_string(),
                brain: Brain::Enemy,
                tile: (12, 8),
            }],
            start: (8, 8),
        }
    }

    #[test]
    fn test_tile_geometry() {
        let level = Level::from_map(&walled_map()).unwrap();
        assert_eq!(level.tile_rect(0, 0), Rect::new(-128.0, -128.0, 16.0, 16.0));
        assert_eq!(level.tile_center(8, 8), Vec2::new(8.0, 8.0));
        let boundary = level.world_boundary();
        assert_eq!(boundary.min.truncate(), Vec2::new(-128.0, -128.0));
        assert_eq!(boundary.max.truncate(), Vec2::new(127.0, 127.0));
        assert_eq!(level.start(), Vec2::new(8.0, 8.0));
    }

    #[test]
    fn test_obstacles_indexed_one_per_leaf() {
        let level = Level::from_map(&walled_map()).unwrap();
        assert_eq!(level.tree.depth(), 4);
        assert_eq!(level.obstacles().len(), 8);
        for obstacle in level.obstacles() {
            let found = level.tree.find_point(obstacle.bbox.center_2d());
            assert_eq!(found, vec![obstacle]);
        }
    }

    #[test]
    fn test_collision_against_wall() {
        let level = Level::from_map(&walled_map()).unwrap();
        let wall = level.tile_bbox(10, 8);
        let touching = wall.adjust(&BoundingBox::flat(-6.0, 2.0, -6.0, -2.0));
        let result = level.check_collision(&touching);
        assert!(result.hit);
        assert!(result.push.x < 0.0);

        let open = level.tile_bbox(3, 3);
        assert!(!level.check_collision(&open).hit);
    }

    #[test]
    fn test_line_of_sight() {
        let level = Level::from_map(&walled_map()).unwrap();
        let left = level.tile_center(8, 8);
        let right = level.tile_center(12, 8);
        assert!(!level.has_line_of_sight(left, right, 128.0));
        assert!(level.has_line_of_sight(left, level.tile_center(8, 12), 128.0));
        // Beyond the range nothing is visible
        assert!(!level.has_line_of_sight(left, level.tile_center(8, 14), 64.0));
        // Standing inside the wall does not block the view out of it
        assert!(level.has_line_of_sight(level.tile_center(10, 8), right, 128.0));
    }

    #[test]
    fn test_trigger_hysteresis() {
        let mut level = Level::from_map(&walled_map()).unwrap();
        let zone = level.tile_center(2, 2);
        let away = level.tile_center(6, 6);
        assert_eq!(level.check_triggers(away), Vec::<String>::new());
        assert_eq!(level.check_triggers(zone), vec!["exit".to_string()]);
        assert!(level.check_triggers(zone + Vec2::new(2.0, 0.0)).is_empty());
        assert!(level.check_triggers(away).is_empty());
        assert_eq!(level.check_triggers(zone), vec!["exit".to_string()]);
    }

    #[test]
    fn test_rejects_malformed_maps() {
        let mut map = walled_map();
        map.width = 12;
        map.height = 12;
        assert!(matches!(Level::from_map(&map), Err(Error::MalformedMap { .. })));

        let mut map = walled_map();
        map.blocked.push((16, 0));
        assert!(matches!(Level::from_map(&map), Err(Error::MalformedMap { .. })));

        let mut map = walled_map();
        map.width = 0;
        assert!(Level::from_map(&map).is_err());

        let mut map = walled_map();
        map.start = (20, 20);
        assert!(Level::from_map(&map).is_err());
    }
}
