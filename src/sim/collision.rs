//! Collision detection and push-out response for axis-aligned boxes
//!
//! Static geometry goes through the region tree in two phases: a widened
//! broad-phase query and an exact narrow-phase re-test on the original box.
//! Moving characters are tested pairwise. Both return a push direction the
//! caller turns into force; nothing here mutates the inputs.

use glam::{Vec2, Vec3};

use super::bbox::BoundingBox;
use super::region_tree::RegionTree;

/// Anything stored in the region tree that occupies a box
pub trait Solid {
    fn bbox(&self) -> &BoundingBox;
}

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Whether any overlap was found
    pub hit: bool,
    /// Unit push-out direction (zero when there is no meaningful direction)
    pub push: Vec2,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            push: Vec2::ZERO,
        }
    }

    /// Push vector for the other body of a pairwise contact
    pub fn reversed(&self) -> Self {
        Self {
            hit: self.hit,
            push: -self.push,
        }
    }
}

/// Resolve a box against the static obstacles of a level
///
/// `margin` widens the broad-phase query so tiles whose leaf sits just outside
/// the tight box are still considered. Only obstacles that truly overlap
/// `bbox` contribute to the push, which is the normalized sum of
/// `center(bbox) - center(obstacle)`.
pub fn resolve_against_static<T: Solid>(tree: &RegionTree<T>, bbox: &BoundingBox, margin: Vec2) -> CollisionResult {
    let query = bbox.resize(margin);
    let center = bbox.center();

    let mut hit = false;
    let mut sum = Vec3::ZERO;
    for obstacle in tree.find_box(&query) {
        let other = obstacle.bbox();
        if query.intersects(other) && bbox.intersects(other) {
            sum += center - other.center();
            hit = true;
        }
    }

    CollisionResult {
        hit,
        push: sum.truncate().normalize_or_zero(),
    }
}

/// Two-body overlap test
///
/// The push applies to `a`; the caller applies `reversed()` to `b`.
/// Coincident centers give a zero push.
pub fn resolve_pairwise(a: &BoundingBox, b: &BoundingBox) -> CollisionResult {
    if !a.intersects(b) {
        return CollisionResult::miss();
    }
    CollisionResult {
        hit: true,
        push: (a.center_2d() - b.center_2d()).normalize_or_zero(),
    }
}
