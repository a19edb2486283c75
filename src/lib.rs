//! Tiny RPG - real-time simulation core for a small tile-based role-playing game
//!
//! Core modules:
//! - `sim`: Simulation (spatial index, collisions, kinematics, characters, tick)
//! - `scene`: Scene flow (transition table, stack, fades, save/restore)
//! - `renderer`: Rendering collaborator boundary and a recording draw queue
//! - `platform`: Input and content collaborators, owned resource registry
//! - `audio`: Sound cues and the audio collaborator boundary
//! - `persistence`: Versioned save envelope and storage backends

pub mod audio;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    use crate::sim::BoundingBox;

    /// Fixed simulation timestep (60 Hz, one tick per frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the loop will feed into the accumulator (seconds)
    pub const MAX_FRAME_TIME: f32 = 0.1;

    /// Guard for divide-by-zero in the friction integrator
    pub const EPSILON: f32 = 1e-6;
    /// Remaining time at or below which a timer counts as elapsed
    pub const TIMER_RESOLUTION: f32 = 1e-4;

    /// Default body mass
    pub const ENTITY_MASS_DEFAULT: f32 = 1.0;
    /// Force applied along a collision push vector (N)
    pub const MAX_AVOID_FORCE: f32 = 2000.0;

    /// Proximity trigger radii (pixels)
    pub const CHARACTER_TRIGGER_NEAR_DEFAULT: f32 = 16.0;
    pub const CHARACTER_TRIGGER_FAR_DEFAULT: f32 = 64.0;
    /// Seconds a dead character lingers before removal
    pub const CHARACTER_FREE_TIMER: f32 = 60.0;

    /// Character sprite size (pixels)
    pub const CHARACTER_SIZE: Vec2 = Vec2::new(32.0, 32.0);
    /// Feet box carved out of the sprite rect
    pub const CHARACTER_BBOX_ADJUST: BoundingBox = BoundingBox::flat(12.0, 20.0, -12.0, -8.0);
    /// Shrinks the level boundary so sprites stay on screen
    pub const CHARACTER_BOUNDARY_ADJUST: BoundingBox = BoundingBox::flat(8.0, 0.0, -8.0, -8.0);

    /// Fraction of a tile the static broad phase widens the query by
    pub const STATIC_QUERY_MARGIN: f32 = 0.5;

    /// Cross-fade duration between scenes (seconds)
    pub const FADE_DURATION: f32 = 1.0;
}
