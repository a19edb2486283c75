//! Static full-screen card (title, game over)
//!
//! Shows one texture and raises its token when the player presses accept or
//! attack, or when the optional timeout runs out.

use std::collections::VecDeque;

use glam::Vec2;

use super::{Scene, SceneContext, SceneEvent};
use crate::audio::SoundEffect;
use crate::error::Result;
use crate::platform::{ACTION_ACCEPT, ACTION_ATTACK, Resources, TextureInfo};
use crate::renderer::{Color, Renderer};
use crate::sim::{Rect, Timer};

pub struct ScreenScene {
    name: String,
    texture_name: String,
    token: String,
    timeout: Option<f32>,
    screen: Vec2,
    texture: Option<TextureInfo>,
    timer: Timer,
    raised: bool,
    events: VecDeque<SceneEvent>,
}

impl ScreenScene {
    pub fn new(name: &str, texture: &str, token: &str, screen: Vec2) -> Self {
        Self {
            name: name.to_string(),
            texture_name: texture.to_string(),
            token: token.to_string(),
            timeout: None,
            screen,
            texture: None,
            timer: Timer::new(),
            raised: false,
            events: VecDeque::new(),
        }
    }

    /// Leave on its own after `seconds`
    pub fn with_timeout(mut self, seconds: f32) -> Self {
        self.timeout = Some(seconds);
        self
    }

    fn raise(&mut self) {
        if !self.raised {
            self.raised = true;
            self.events.push_back(SceneEvent::new(&self.token));
        }
    }
}

impl Scene for ScreenScene {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, _previous: Option<&mut dyn Scene>, resources: &mut Resources) -> Result<()> {
        self.texture = Some(resources.texture(&self.texture_name)?);
        self.timer.reset();
        if let Some(seconds) = self.timeout {
            self.timer.set(seconds);
        }
        self.raised = false;
        self.events.clear();
        Ok(())
    }

    fn release(&mut self) {
        self.texture = None;
        self.timer.reset();
        self.events.clear();
    }

    fn update(&mut self, dt: f32, ctx: &mut SceneContext<'_>) {
        ctx.audio.stop_music();
        self.timer.update(dt);
        let pressed = ctx.input.is_action_pressed(ACTION_ACCEPT) || ctx.input.is_action_pressed(ACTION_ATTACK);
        if pressed && !self.raised {
            ctx.audio.play(SoundEffect::Confirm);
        }
        if pressed || self.timer.is_elapsed() {
            self.raise();
        }
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let Some(texture) = self.texture else {
            return;
        };
        let source = Rect::new(0.0, 0.0, texture.width as f32, texture.height as f32);
        let dest = Rect::new(0.0, 0.0, self.screen.x, self.screen.y);
        renderer.draw_sprite(texture.id, source, dest, Vec2::ZERO, 0.0, Color::WHITE);
    }

    fn next_event(&mut self) -> Option<SceneEvent> {
        self.events.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioManager;
    use crate::audio::tests::RecordingSink;
    use crate::error::Error;
    use crate::platform::{BuiltinContent, InputState, NoInput};
    use crate::renderer::DrawQueue;

    fn resources() -> Resources {
        Resources::new(Box::new(BuiltinContent::demo()))
    }

    #[test]
    fn test_press_raises_token_once() {
        let mut scene = ScreenScene::new("title", "title", "start", Vec2::new(800.0, 450.0));
        scene.init(None, &mut resources()).unwrap();

        let sink = RecordingSink::default();
        let mut audio = AudioManager::new(Box::new(sink.clone()));
        let mut input = InputState::new();
        input.press(ACTION_ACCEPT);
        let mut ctx = SceneContext {
            input: &input,
            audio: &mut audio,
        };
        scene.update(0.1, &mut ctx);
        scene.update(0.1, &mut ctx);
        assert_eq!(scene.next_event(), Some(SceneEvent::new("start")));
        assert_eq!(scene.next_event(), None);
        assert_eq!(*sink.0.borrow(), vec!["play confirm"]);
    }

    #[test]
    fn test_timeout_raises_token() {
        let mut scene = ScreenScene::new("game_over", "game_over", "restart", Vec2::new(800.0, 450.0)).with_timeout(1.0);
        scene.init(None, &mut resources()).unwrap();

        let mut audio = AudioManager::new(Box::new(RecordingSink::default()));
        let mut ctx = SceneContext {
            input: &NoInput,
            audio: &mut audio,
        };
        for _ in 0..9 {
            scene.update(0.1, &mut ctx);
        }
        assert_eq!(scene.next_event(), None);
        scene.update(0.1, &mut ctx);
        assert_eq!(scene.next_event(), Some(SceneEvent::new("restart")));

        // Re-entering re-arms the card
        scene.release();
        scene.init(None, &mut resources()).unwrap();
        assert_eq!(scene.next_event(), None);
    }

    #[test]
    fn test_card_silences_music() {
        let mut scene = ScreenScene::new("game_over", "game_over", "restart", Vec2::ZERO);
        scene.init(None, &mut resources()).unwrap();

        let sink = RecordingSink::default();
        let mut audio = AudioManager::new(Box::new(sink.clone()));
        audio.play_music("village");
        let mut ctx = SceneContext {
            input: &NoInput,
            audio: &mut audio,
        };
        scene.update(0.1, &mut ctx);
        scene.update(0.1, &mut ctx);
        assert_eq!(*sink.0.borrow(), vec!["play village", "stop village"]);
    }

    #[test]
    fn test_draws_full_screen() {
        let mut scene = ScreenScene::new("title", "title", "start", Vec2::new(800.0, 450.0));
        scene.init(None, &mut resources()).unwrap();
        let mut frame = DrawQueue::new();
        scene.draw(&mut frame);
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn test_missing_texture_fails_init() {
        let mut scene = ScreenScene::new("credits", "credits", "done", Vec2::ZERO);
        assert!(matches!(scene.init(None, &mut resources()), Err(Error::MissingAsset { .. })));
    }
}
