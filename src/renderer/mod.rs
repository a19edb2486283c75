//! Rendering collaborator boundary
//!
//! The game issues sprite and debug-box draws; pixel buffers, textures and
//! the window belong to whatever implements [`Renderer`].

pub mod queue;

pub use queue::{DrawCommand, DrawQueue};

use glam::Vec2;

use crate::platform::TextureId;
use crate::sim::{BoundingBox, Rect};

/// RGBA colour with components in 0.0 - 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const WHITE: Color = Color([1.0, 1.0, 1.0, 1.0]);

    /// Same colour with alpha scaled by `alpha`
    pub fn faded(self, alpha: f32) -> Self {
        let [r, g, b, a] = self.0;
        Color([r, g, b, a * alpha.clamp(0.0, 1.0)])
    }

    pub fn alpha(self) -> f32 {
        self.0[3]
    }
}

/// Colors for debug overlays
pub mod colors {
    use super::Color;

    pub const OBSTACLE: Color = Color([0.9, 0.2, 0.2, 1.0]);
    pub const CHARACTER: Color = Color([0.2, 0.8, 0.4, 1.0]);
    pub const COLLIDING: Color = Color([1.0, 0.6, 0.1, 1.0]);
    pub const DYING: Color = Color([0.5, 0.5, 0.5, 1.0]);
}

/// Rendering collaborator
pub trait Renderer {
    fn draw_sprite(&mut self, texture: TextureId, source: Rect, dest: Rect, origin: Vec2, rotation: f32, tint: Color);
    fn draw_debug_box(&mut self, bbox: &BoundingBox, color: Color);
}
