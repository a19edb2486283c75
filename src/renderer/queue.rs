//! Recording renderer
//!
//! Captures draw calls so a frame can be replayed later (fade snapshots) or
//! inspected in tests.

use glam::Vec2;

use super::{Color, Renderer};
use crate::platform::TextureId;
use crate::sim::{BoundingBox, Rect};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Sprite {
        texture: TextureId,
        source: Rect,
        dest: Rect,
        origin: Vec2,
        rotation: f32,
        tint: Color,
    },
    DebugBox {
        bbox: BoundingBox,
        color: Color,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DrawQueue {
    commands: Vec<DrawCommand>,
}

impl DrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Re-issue every recorded draw to `target` with alpha scaled by `alpha`
    pub fn replay(&self, target: &mut dyn Renderer, alpha: f32) {
        for command in &self.commands {
            match *command {
                DrawCommand::Sprite {
                    texture,
                    source,
                    dest,
                    origin,
                    rotation,
                    tint,
                } => target.draw_sprite(texture, source, dest, origin, rotation, tint.faded(alpha)),
                DrawCommand::DebugBox { bbox, color } => target.draw_debug_box(&bbox, color.faded(alpha)),
            }
        }
    }
}

impl Renderer for DrawQueue {
    fn draw_sprite(&mut self, texture: TextureId, source: Rect, dest: Rect, origin: Vec2, rotation: f32, tint: Color) {
        self.commands.push(DrawCommand::Sprite {
            texture,
            source,
            dest,
            origin,
            rotation,
            tint,
        });
    }

    fn draw_debug_box(&mut self, bbox: &BoundingBox, color: Color) {
        self.commands.push(DrawCommand::DebugBox { bbox: *bbox, color });
    }
}
