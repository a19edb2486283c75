//! Kinematic body: force accumulation and semi-implicit Euler integration

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bbox::BoundingBox;
use crate::consts::*;

/// Point mass moved by accumulated forces
///
/// Forces accumulate during a tick and are cleared by [`Body::integrate`];
/// they never carry over to the next tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub force: Vec2,
    pub mass: f32,
}

impl Default for Body {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl Body {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            force: Vec2::ZERO,
            mass: ENTITY_MASS_DEFAULT,
        }
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// `vel += force / mass * dt; pos += vel * dt; force = 0`
    ///
    /// No sub-stepping or clamping of `dt`; callers feed a fixed step.
    pub fn integrate(&mut self, dt: f32) {
        let acc = self.force / self.mass;
        self.vel += acc * dt;
        self.pos += self.vel * dt;
        self.force = Vec2::ZERO;
    }

    /// Add the force that brings velocity to `target` in one integration step
    ///
    /// Uses a virtual friction `mu = mass / (dt + EPSILON)` against the current
    /// velocity, so intent speed maps directly to actual speed.
    pub fn move_constant(&mut self, target: Vec2, dt: f32) {
        let mu = self.mass / (dt + EPSILON);
        let friction = target * (mu - 1.0) - self.vel * mu;
        self.force += target + friction;
    }

    /// Clamp the position componentwise into `boundary`
    pub fn clamp_to_boundary(&mut self, boundary: &BoundingBox) {
        self.pos = boundary.clamp_point(self.pos);
    }

    /// Convert a collision push into an avoidance force
    pub fn collide(&mut self, push: Vec2) {
        self.force += push * MAX_AVOID_FORCE;
    }
}
