//! Platform abstraction layer
//!
//! The simulation never touches devices or files directly. It sees:
//! - Input as logical action names (`"UP"`, `"ATTACK"`, ...)
//! - Content (textures, maps) through a [`ContentSource`], cached in an
//!   owned [`Resources`] registry whose lifetime follows the scene

pub mod content;
pub mod input;

pub use content::{BuiltinContent, ContentSource, Resources, TextureId, TextureInfo};
pub use input::{InputSource, InputState, NoInput};

pub const ACTION_UP: &str = "UP";
pub const ACTION_DOWN: &str = "DOWN";
pub const ACTION_LEFT: &str = "LEFT";
pub const ACTION_RIGHT: &str = "RIGHT";
pub const ACTION_ATTACK: &str = "ATTACK";
/// Confirm / skip a screen
pub const ACTION_ACCEPT: &str = "ACCEPT";
/// Drink the first consumable in the bag
pub const ACTION_USE: &str = "USE";
