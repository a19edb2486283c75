//! Content collaborator and the owned resource registry
//!
//! Asset lookups go through [`Resources`], which memoizes whatever the
//! [`ContentSource`] returns. A scene owns its registry and calls
//! [`Resources::release`] on teardown; there are no process-wide caches.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::sim::brain::Brain;
use crate::sim::level::{MapData, SpawnDescriptor, TriggerZone};

/// Opaque handle to a texture owned by the rendering collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

/// Content/asset collaborator boundary
///
/// Missing names are errors: they indicate a packaging defect, not a
/// transient condition.
pub trait ContentSource {
    fn load_texture(&mut self, name: &str) -> Result<TextureInfo>;
    fn load_map(&mut self, name: &str) -> Result<MapData>;
}

/// Memoizing registry over a content source
pub struct Resources {
    source: Box<dyn ContentSource>,
    textures: HashMap<String, TextureInfo>,
    maps: HashMap<String, MapData>,
}

impl Resources {
    pub fn new(source: Box<dyn ContentSource>) -> Self {
        Self {
            source,
            textures: HashMap::new(),
            maps: HashMap::new(),
        }
    }

    pub fn texture(&mut self, name: &str) -> Result<TextureInfo> {
        if let Some(info) = self.textures.get(name) {
            return Ok(*info);
        }
        let info = self.source.load_texture(name)?;
        log::debug!("Loaded texture '{name}' ({}x{})", info.width, info.height);
        self.textures.insert(name.to_string(), info);
        Ok(info)
    }

    pub fn map(&mut self, name: &str) -> Result<MapData> {
        if let Some(map) = self.maps.get(name) {
            return Ok(map.clone());
        }
        let map = self.source.load_map(name)?;
        log::debug!("Loaded map '{name}'");
        self.maps.insert(name.to_string(), map.clone());
        Ok(map)
    }

    /// Number of cached entries (textures + maps)
    pub fn cached(&self) -> usize {
        self.textures.len() + self.maps.len()
    }

    /// Drop every cached entry
    pub fn release(&mut self) {
        log::debug!("Releasing {} cached resources", self.cached());
        self.textures.clear();
        self.maps.clear();
    }
}

/// Content compiled into the binary
#[derive(Debug, Clone, Default)]
pub struct BuiltinContent {
    textures: HashMap<String, TextureInfo>,
    maps: HashMap<String, MapData>,
}

impl BuiltinContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texture(mut self, name: &str, width: u32, height: u32) -> Self {
        let id = TextureId(self.textures.len() as u32);
        self.textures.insert(name.to_string(), TextureInfo { id, width, height });
        self
    }

    pub fn with_map(mut self, map: MapData) -> Self {
        self.maps.insert(map.name.clone(), map);
        self
    }

    /// The stock game: a title card, one walled village and a game-over card
    pub fn demo() -> Self {
        Self::new()
            .with_texture("title", 320, 180)
            .with_texture("game_over", 320, 180)
            .with_texture("tiles", 256, 256)
            .with_texture("hero", 128, 128)
            .with_texture("slime", 128, 128)
            .with_texture("villager", 128, 128)
            .with_map(demo_map())
    }
}

fn demo_map() -> MapData {
    let side = 32;
    let mut blocked: Vec<(u32, u32)> = (0..side)
        .flat_map(|i| [(i, 0), (i, side - 1), (0, i), (side - 1, i)])
        .collect();
    blocked.extend((8..20).map(|y| (14, y)));
    blocked.sort_unstable();
    blocked.dedup();

    MapData {
        name: "village".to_string(),
        width: side,
        height: side,
        tile_width: 16.0,
        tile_height: 16.0,
        blocked,
        triggers: vec![TriggerZone {
            name: "well".to_string(),
            tile: (24, 24),
            radius: 12.0,
        }],
        spawns: vec![
            SpawnDescriptor {
                name: "slime".to_string(),
                brain: Brain::Enemy,
                tile: (18, 12),
            },
            SpawnDescriptor {
                name: "slime".to_string(),
                brain: Brain::Enemy,
                tile: (20, 16),
            },
            SpawnDescriptor {
                name: "villager".to_string(),
                brain: Brain::Npc,
                tile: (6, 6),
            },
        ],
        start: (10, 12),
    }
}

impl ContentSource for BuiltinContent {
    fn load_texture(&mut self, name: &str) -> Result<TextureInfo> {
        self.textures.get(name).copied().ok_or_else(|| Error::MissingAsset {
            kind: "texture",
            name: name.to_string(),
        })
    }

    fn load_map(&mut self, name: &str) -> Result<MapData> {
        self.maps.get(name).cloned().ok_or_else(|| Error::MissingAsset {
            kind: "map",
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::Level;

    #[test]
    fn test_registry_caches_and_releases() {
        let mut resources = Resources::new(Box::new(BuiltinContent::demo()));
        let first = resources.texture("hero").unwrap();
        let again = resources.texture("hero").unwrap();
        assert_eq!(first, again);
        resources.map("village").unwrap();
        assert_eq!(resources.cached(), 2);
        resources.release();
        assert_eq!(resources.cached(), 0);
    }

    #[test]
    fn test_missing_asset_is_an_error() {
        let mut resources = Resources::new(Box::new(BuiltinContent::demo()));
        match resources.texture("dragon") {
            Err(Error::MissingAsset { kind, name }) => {
                assert_eq!(kind, "texture");
                assert_eq!(name, "dragon");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(resources.map("dungeon").is_err());
        assert_eq!(resources.cached(), 0);
    }

    #[test]
    fn test_demo_map_is_valid() {
        let map = BuiltinContent::demo().load_map("village").unwrap();
        let level = Level::from_map(&map).unwrap();
        assert_eq!(level.spawns().len(), 3);
    }
}
