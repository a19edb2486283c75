//! Scene flow
//!
//! A scene is one screen of the game (title card, a level, game over). The
//! [`SceneFlow`] owns every scene by name and moves between them through a
//! transition table keyed by `(current scene, token)`, with a LIFO stack for
//! returning to interrupted scenes.

pub mod fade;
pub mod flow;
pub mod level;
pub mod screen;

pub use fade::FadeInOut;
pub use flow::SceneFlow;
pub use level::{LevelScene, PlayerState};
pub use screen::ScreenScene;

use serde_json::Value;

use crate::audio::AudioManager;
use crate::error::Result;
use crate::platform::{InputSource, Resources};
use crate::renderer::Renderer;

/// Token a scene raises to ask the flow for a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneEvent {
    pub token: String,
    /// Extra payload, e.g. the name of a map trigger
    pub detail: Option<String>,
}

impl SceneEvent {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            detail: None,
        }
    }

    pub fn with_detail(token: &str, detail: &str) -> Self {
        Self {
            token: token.to_string(),
            detail: Some(detail.to_string()),
        }
    }
}

/// Collaborators available while a scene updates
pub struct SceneContext<'a> {
    pub input: &'a dyn InputSource,
    pub audio: &'a mut AudioManager,
}

pub trait Scene {
    fn name(&self) -> &str;

    /// Enter the scene; `previous` is the scene being left, if any
    fn init(&mut self, previous: Option<&mut dyn Scene>, resources: &mut Resources) -> Result<()>;

    /// Leave the scene and drop whatever `init` built
    fn release(&mut self);

    fn update(&mut self, dt: f32, ctx: &mut SceneContext<'_>);

    fn draw(&self, renderer: &mut dyn Renderer);

    /// Next pending transition token
    fn next_event(&mut self) -> Option<SceneEvent>;

    /// Opaque state to persist, if this scene has any
    fn save_state(&self) -> Option<Value> {
        None
    }

    fn restore_state(&mut self, _state: Value) -> Result<()> {
        Ok(())
    }

    /// Forget persisted state (new game)
    fn reset_state(&mut self) {}
}
