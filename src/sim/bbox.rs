//! Axis-aligned bounding volumes
//!
//! Boxes live in the XY plane with a token Z extent of [-1, 1] so that rays
//! cast at z = 0 and box-box tests behave like their 3-D counterparts.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Screen-space rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of `size` centered on `pos`
    pub fn centered(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x - size.x / 2.0, pos.y - size.y / 2.0, size.x, size.y)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A ray with a (normalized) direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub position: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction,
        }
    }

    /// Planar ray from `from` toward `to`
    pub fn between(from: Vec2, to: Vec2) -> Self {
        Self::new(from.extend(0.0), (to - from).extend(0.0).normalize_or_zero())
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Planar box (used for offsets, where z plays no part)
    pub const fn flat(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self::new(Vec3::new(min_x, min_y, 0.0), Vec3::new(max_x, max_y, 0.0))
    }

    /// Box covering `rect`; `max = min + size - 1` so adjacent tiles never overlap
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(
            Vec3::new(rect.x, rect.y, -1.0),
            Vec3::new(rect.x + rect.width - 1.0, rect.y + rect.height - 1.0, 1.0),
        )
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn center_2d(&self) -> Vec2 {
        self.center().truncate()
    }

    /// Half-open containment: `min <= p < max` on both axes
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.min.x <= point.x && point.x < self.max.x && self.min.y <= point.y && point.y < self.max.y
    }

    /// Closed overlap test on all three axes (touching boxes intersect)
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.max.x >= other.min.x
            && self.min.x <= other.max.x
            && self.max.y >= other.min.y
            && self.min.y <= other.max.y
            && self.max.z >= other.min.z
            && self.min.z <= other.max.z
    }

    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        self.ray_distance(ray).is_some()
    }

    /// Distance along `ray` to the first hit (0 when the origin is inside)
    ///
    /// Slab test; axes the ray runs parallel to must already contain the origin.
    pub fn ray_distance(&self, ray: &Ray) -> Option<f32> {
        let mut t_near = 0.0_f32;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.position[axis];
            let dir = ray.direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if dir.abs() < f32::EPSILON {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let (t0, t1) = {
                let a = (lo - origin) * inv;
                let b = (hi - origin) * inv;
                if a < b { (a, b) } else { (b, a) }
            };
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        Some(t_near)
    }

    /// Grow the box by `margin` on each side of x and y
    pub fn resize(&self, margin: Vec2) -> Self {
        let m = margin.extend(0.0);
        Self::new(self.min - m, self.max + m)
    }

    /// Offset each corner independently
    pub fn adjust(&self, offsets: &BoundingBox) -> Self {
        Self::new(self.min + offsets.min, self.max + offsets.max)
    }

    /// Split into four quadrants at the center (z extent preserved)
    pub fn subdivide(&self) -> [BoundingBox; 4] {
        let (a, b, m) = (self.min, self.max, self.center());
        [
            Self::new(Vec3::new(a.x, a.y, a.z), Vec3::new(m.x, m.y, b.z)),
            Self::new(Vec3::new(m.x, a.y, a.z), Vec3::new(b.x, m.y, b.z)),
            Self::new(Vec3::new(m.x, m.y, a.z), Vec3::new(b.x, b.y, b.z)),
            Self::new(Vec3::new(a.x, m.y, a.z), Vec3::new(m.x, b.y, b.z)),
        ]
    }

    /// Clamp a point componentwise into the box
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min.truncate(), self.max.truncate().max(self.min.truncate()))
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}
