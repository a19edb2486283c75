//! Cross-fade decorator
//!
//! On entry the previous scene's last frame is recorded into a draw queue.
//! For [`FADE_DURATION`] seconds that snapshot is replayed on top of the
//! wrapped scene with a falling alpha. Update and draw are otherwise
//! delegated; transition tokens are held back until the fade completes.

use serde_json::Value;

use super::{Scene, SceneContext, SceneEvent};
use crate::consts::FADE_DURATION;
use crate::error::Result;
use crate::platform::Resources;
use crate::renderer::{DrawQueue, Renderer};
use crate::sim::Timer;

pub struct FadeInOut {
    inner: Box<dyn Scene>,
    snapshot: DrawQueue,
    timer: Timer,
}

impl FadeInOut {
    pub fn new(inner: Box<dyn Scene>) -> Self {
        Self {
            inner,
            snapshot: DrawQueue::new(),
            timer: Timer::new(),
        }
    }

    pub fn is_fading(&self) -> bool {
        self.timer.is_running() && !self.timer.is_elapsed()
    }

    /// Opacity of the previous frame (1 at entry, 0 once faded)
    pub fn alpha(&self) -> f32 {
        match self.timer.remaining() {
            Some(t) if self.is_fading() => (t / FADE_DURATION).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

impl Scene for FadeInOut {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn init(&mut self, mut previous: Option<&mut dyn Scene>, resources: &mut Resources) -> Result<()> {
        self.snapshot.clear();
        self.timer.reset();
        if let Some(prev) = previous.as_mut() {
            prev.draw(&mut self.snapshot);
            self.timer.set(FADE_DURATION);
        }
        self.inner.init(previous, resources)
    }

    fn release(&mut self) {
        self.snapshot.clear();
        self.timer.reset();
        self.inner.release();
    }

    fn update(&mut self, dt: f32, ctx: &mut SceneContext<'_>) {
        self.timer.update(dt);
        if self.timer.is_elapsed() {
            self.timer.reset();
            self.snapshot.clear();
        }
        self.inner.update(dt, ctx);
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        self.inner.draw(renderer);
        if self.is_fading() {
            self.snapshot.replay(renderer, self.alpha());
        }
    }

    fn next_event(&mut self) -> Option<SceneEvent> {
        if self.is_fading() {
            return None;
        }
        self.inner.next_event()
    }

    fn save_state(&self) -> Option<Value> {
        self.inner.save_state()
    }

    fn restore_state(&mut self, state: Value) -> Result<()> {
        self.inner.restore_state(state)
    }

    fn reset_state(&mut self) {
        self.inner.reset_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioManager, LogSink};
    use crate::platform::{BuiltinContent, NoInput};
    use crate::renderer::DrawCommand;
    use crate::scene::tests::{Log, StubScene};

    fn resources() -> Resources {
        Resources::new(Box::new(BuiltinContent::new()))
    }

    fn snapshot_alpha(frame: &DrawQueue) -> Option<f32> {
        // The stub draws one box; anything after it is the replayed snapshot
        frame.commands().get(1).map(|command| match command {
            DrawCommand::DebugBox { color, .. } => color.alpha(),
            DrawCommand::Sprite { tint, .. } => tint.alpha(),
        })
    }

    #[test]
    fn test_fades_previous_frame_out() {
        let log = Log::default();
        let mut previous = StubScene::new("title", &log);
        let mut inner = StubScene::new("level", &log);
        inner.pending.push_back(SceneEvent::new("game_over"));
        let mut fade = FadeInOut::new(Box::new(inner));
        fade.init(Some(&mut previous), &mut resources()).unwrap();
        assert_eq!(log.borrow().as_slice(), ["init level from title"]);

        let mut audio = AudioManager::new(Box::new(LogSink));
        let mut ctx = SceneContext {
            input: &NoInput,
            audio: &mut audio,
        };

        let mut frame = DrawQueue::new();
        fade.draw(&mut frame);
        assert_eq!(snapshot_alpha(&frame), Some(1.0));
        assert_eq!(fade.next_event(), None);

        fade.update(0.5, &mut ctx);
        let mut frame = DrawQueue::new();
        fade.draw(&mut frame);
        assert!((snapshot_alpha(&frame).unwrap() - 0.5).abs() < 0.001);
        assert_eq!(fade.next_event(), None);

        fade.update(0.5, &mut ctx);
        let mut frame = DrawQueue::new();
        fade.draw(&mut frame);
        assert_eq!(frame.len(), 1);
        assert_eq!(fade.alpha(), 0.0);
        assert_eq!(fade.next_event(), Some(SceneEvent::new("game_over")));
    }

    #[test]
    fn test_first_scene_has_nothing_to_fade() {
        let log = Log::default();
        let mut fade = FadeInOut::new(Box::new(StubScene::new("title", &log)));
        fade.init(None, &mut resources()).unwrap();
        assert!(!fade.is_fading());
        let mut frame = DrawQueue::new();
        fade.draw(&mut frame);
        assert_eq!(frame.len(), 1);
        assert_eq!(fade.name(), "title");
    }
}
