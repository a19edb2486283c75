//! Scene flow machine: transition table, stack and save/restore

use std::collections::HashMap;

use super::{Scene, SceneContext, SceneEvent};
use crate::error::{Error, Result};
use crate::persistence::{SaveEnvelope, SaveStore};
use crate::platform::Resources;
use crate::renderer::Renderer;

pub struct SceneFlow {
    scenes: HashMap<String, Box<dyn Scene>>,
    transitions: HashMap<(String, String), String>,
    current: Option<String>,
    stack: Vec<String>,
    /// Scenes whose state goes into the save file, in save order
    persistent: Vec<String>,
    resources: Resources,
}

impl SceneFlow {
    pub fn new(resources: Resources) -> Self {
        Self {
            scenes: HashMap::new(),
            transitions: HashMap::new(),
            current: None,
            stack: Vec::new(),
            persistent: Vec::new(),
            resources,
        }
    }

    pub fn register(&mut self, scene: Box<dyn Scene>) {
        self.scenes.insert(scene.name().to_string(), scene);
    }

    /// `token` raised in `from` leads to `to`
    pub fn add_transition(&mut self, from: &str, token: &str, to: &str) {
        self.transitions
            .insert((from.to_string(), token.to_string()), to.to_string());
    }

    /// Include `name` in save/restore
    pub fn persist(&mut self, name: &str) {
        if !self.persistent.iter().any(|n| n == name) {
            self.persistent.push(name.to_string());
        }
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current(&self) -> Option<&dyn Scene> {
        let name = self.current.as_ref()?;
        self.scenes.get(name).map(|s| &**s)
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Enter the first scene
    pub fn start(&mut self, name: &str) -> Result<()> {
        self.switch_to(name)
    }

    /// Follow the transition for `token`; returns false when there is none
    pub fn change_scene(&mut self, token: &str) -> Result<bool> {
        let Some(next) = self.next_for(token) else {
            log::debug!("No transition for '{token}' from {:?}", self.current);
            return Ok(false);
        };
        self.switch_to(&next)?;
        Ok(true)
    }

    /// Like [`change_scene`](Self::change_scene), remembering the current scene
    pub fn push_state(&mut self, token: &str) -> Result<bool> {
        let (Some(current), Some(next)) = (self.current.clone(), self.next_for(token)) else {
            return Ok(false);
        };
        self.switch_to(&next)?;
        self.stack.push(current);
        Ok(true)
    }

    /// Return to the most recently pushed scene; false on an empty stack
    pub fn pop_state(&mut self) -> Result<bool> {
        let Some(previous) = self.stack.pop() else {
            return Ok(false);
        };
        if let Err(e) = self.switch_to(&previous) {
            self.stack.push(previous);
            return Err(e);
        }
        Ok(true)
    }

    fn next_for(&self, token: &str) -> Option<String> {
        let current = self.current.clone()?;
        self.transitions.get(&(current, token.to_string())).cloned()
    }

    fn switch_to(&mut self, name: &str) -> Result<()> {
        if self.current.as_deref() == Some(name) {
            return self.reenter(name);
        }

        let mut next = self
            .scenes
            .remove(name)
            .ok_or_else(|| Error::UnknownScene(name.to_string()))?;

        self.resources.release();
        let previous = self.current.as_ref().and_then(|c| self.scenes.get_mut(c));
        let result = match previous {
            Some(prev) => next.init(Some(&mut **prev), &mut self.resources),
            None => next.init(None, &mut self.resources),
        };
        if let Err(e) = result {
            self.scenes.insert(name.to_string(), next);
            return Err(e);
        }

        if let Some(prev) = self.current.as_ref().and_then(|c| self.scenes.get_mut(c)) {
            prev.release();
        }
        log::info!("Scene {:?} -> {name}", self.current);
        self.scenes.insert(name.to_string(), next);
        self.current = Some(name.to_string());
        Ok(())
    }

    /// Leave and re-enter the current scene; it is its own previous scene
    fn reenter(&mut self, name: &str) -> Result<()> {
        let scene = self
            .scenes
            .get_mut(name)
            .ok_or_else(|| Error::UnknownScene(name.to_string()))?;
        scene.release();
        self.resources.release();
        scene.init(None, &mut self.resources)?;
        log::info!("Scene {name} re-entered");
        Ok(())
    }

    /// Update the current scene, then act on the tokens it raised
    ///
    /// Returns the events that caused no transition so the caller can
    /// inspect them.
    pub fn update(&mut self, dt: f32, ctx: &mut SceneContext<'_>) -> Result<Vec<SceneEvent>> {
        let Some(scene) = self.current.as_ref().and_then(|c| self.scenes.get_mut(c)) else {
            return Ok(Vec::new());
        };
        scene.update(dt, ctx);

        let mut events = Vec::new();
        while let Some(event) = scene.next_event() {
            events.push(event);
        }

        let mut unhandled = Vec::new();
        let mut pending = events.into_iter();
        for event in pending.by_ref() {
            if self.change_scene(&event.token)? {
                break;
            }
            unhandled.push(event);
        }
        // Whatever the old scene raised after the switch is dropped
        let dropped = pending.count();
        if dropped > 0 {
            log::debug!("Dropped {dropped} events from the previous scene");
        }
        Ok(unhandled)
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) {
        if let Some(scene) = self.current() {
            scene.draw(renderer);
        }
    }

    /// Write every persistent scene's state to `path`
    pub fn save(&self, store: &mut dyn SaveStore, path: &str) -> Result<()> {
        let mut envelope = SaveEnvelope::new();
        for name in &self.persistent {
            if let Some(state) = self.scenes.get(name).and_then(|s| s.save_state()) {
                envelope.scenes.insert(name.clone(), state);
            }
        }
        envelope.save(store, path)
    }

    /// Hand saved state back to each scene; false when nothing was saved
    pub fn restore(&mut self, store: &dyn SaveStore, path: &str) -> Result<bool> {
        let Some(envelope) = SaveEnvelope::load(store, path)? else {
            log::info!("No saved state at {path}");
            return Ok(false);
        };
        for (name, state) in envelope.scenes {
            let scene = self
                .scenes
                .get_mut(&name)
                .ok_or_else(|| Error::UnknownScene(name.clone()))?;
            scene.restore_state(state)?;
        }
        log::info!("Restored state from {path}");
        Ok(true)
    }

    /// Forget persisted state in every persistent scene
    pub fn reset(&mut self) {
        for name in &self.persistent {
            if let Some(scene) = self.scenes.get_mut(name) {
                scene.reset_state();
            }
        }
    }

    /// Leave the current scene for good
    pub fn shutdown(&mut self) {
        if let Some(scene) = self.current.take().and_then(|c| self.scenes.get_mut(&c)) {
            scene.release();
        }
        self.stack.clear();
        self.resources.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioManager, LogSink};
    use crate::persistence::MemoryStore;
    use crate::platform::{BuiltinContent, NoInput};
    use crate::scene::tests::{Log, StubScene};
    use serde_json::json;

    fn flow(log: &Log) -> SceneFlow {
        let mut flow = SceneFlow::new(Resources::new(Box::new(BuiltinContent::new())));
        for name in ["title", "level", "menu", "game_over"] {
            flow.register(Box::new(StubScene::new(name, log)));
        }
        flow.add_transition("title", "start", "level");
        flow.add_transition("level", "menu", "menu");
        flow.add_transition("level", "game_over", "game_over");
        flow.add_transition("game_over", "restart", "title");
        flow
    }

    fn drain(log: &Log) -> Vec<String> {
        log.borrow_mut().drain(..).collect()
    }

    #[test]
    fn test_change_scene_follows_table() {
        let log = Log::default();
        let mut flow = flow(&log);
        flow.start("title").unwrap();
        assert_eq!(drain(&log), vec!["init title from none"]);

        assert!(flow.change_scene("start").unwrap());
        assert_eq!(flow.current_name(), Some("level"));
        assert_eq!(drain(&log), vec!["init level from title", "release title"]);
    }

    #[test]
    fn test_missing_transition_is_noop() {
        let log = Log::default();
        let mut flow = flow(&log);
        assert!(!flow.change_scene("start").unwrap());
        flow.start("title").unwrap();
        drain(&log);
        assert!(!flow.change_scene("game_over").unwrap());
        assert_eq!(flow.current_name(), Some("title"));
        assert!(drain(&log).is_empty());
    }

    #[test]
    fn test_unknown_scene_is_error() {
        let log = Log::default();
        let mut flow = flow(&log);
        assert!(matches!(flow.start("credits"), Err(Error::UnknownScene(_))));
        flow.add_transition("title", "credits", "credits");
        flow.start("title").unwrap();
        assert!(flow.change_scene("credits").is_err());
        assert_eq!(flow.current_name(), Some("title"));
    }

    #[test]
    fn test_transition_to_self_reenters() {
        let log = Log::default();
        let mut flow = flow(&log);
        flow.add_transition("level", "retry", "level");
        flow.start("title").unwrap();
        flow.change_scene("start").unwrap();
        drain(&log);

        assert!(flow.change_scene("retry").unwrap());
        assert_eq!(flow.current_name(), Some("level"));
        assert_eq!(drain(&log), vec!["release level", "init level from none"]);
    }

    #[test]
    fn test_push_and_pop() {
        let log = Log::default();
        let mut flow = flow(&log);
        flow.start("title").unwrap();
        flow.change_scene("start").unwrap();

        assert!(flow.push_state("menu").unwrap());
        assert_eq!(flow.current_name(), Some("menu"));
        assert_eq!(flow.stack_depth(), 1);

        assert!(flow.pop_state().unwrap());
        assert_eq!(flow.current_name(), Some("level"));
        assert!(!flow.pop_state().unwrap());
        assert_eq!(flow.current_name(), Some("level"));
    }

    #[test]
    fn test_update_applies_raised_tokens() {
        let log = Log::default();
        let mut flow = flow(&log);
        let mut title = StubScene::new("title", &log);
        title.pending.push_back(SceneEvent::new("unknown"));
        title.pending.push_back(SceneEvent::new("start"));
        title.pending.push_back(SceneEvent::new("start"));
        flow.register(Box::new(title));
        flow.start("title").unwrap();

        let mut audio = AudioManager::new(Box::new(LogSink));
        let mut ctx = SceneContext {
            input: &NoInput,
            audio: &mut audio,
        };
        let unhandled = flow.update(0.1, &mut ctx).unwrap();
        assert_eq!(unhandled, vec![SceneEvent::new("unknown")]);
        assert_eq!(flow.current_name(), Some("level"));
    }

    #[test]
    fn test_save_and_restore_persistent_scenes() {
        let log = Log::default();
        let mut flow = flow(&log);
        flow.persist("level");
        let mut level = StubScene::new("level", &log);
        level.state = Some(json!({ "health": 3 }));
        flow.register(Box::new(level));

        let mut store = MemoryStore::new();
        flow.save(&mut store, "save.json").unwrap();

        let mut fresh = self::flow(&log);
        fresh.persist("level");
        assert!(fresh.restore(&store, "save.json").unwrap());
        fresh.start("title").unwrap();
        fresh.change_scene("start").unwrap();
        assert_eq!(fresh.current().and_then(|s| s.save_state()), Some(json!({ "health": 3 })));

        fresh.reset();
        assert_eq!(fresh.current().and_then(|s| s.save_state()), None);
        assert!(!fresh.restore(&MemoryStore::new(), "save.json").unwrap());
    }

    #[test]
    fn test_restore_unknown_scene_fails() {
        let log = Log::default();
        let mut flow = flow(&log);
        let mut store = MemoryStore::new();
        let mut envelope = SaveEnvelope::new();
        envelope.scenes.insert("credits".to_string(), json!(null));
        envelope.save(&mut store, "save.json").unwrap();
        assert!(matches!(flow.restore(&store, "save.json"), Err(Error::UnknownScene(_))));
    }
}
