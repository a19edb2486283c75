//! Logical input actions

use std::collections::HashSet;

/// Input collaborator boundary
pub trait InputSource {
    /// Action held this frame
    fn is_action_down(&self, name: &str) -> bool;
    /// Action went down this frame
    fn is_action_pressed(&self, name: &str) -> bool;
}

/// Nothing is ever pressed
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn is_action_down(&self, _name: &str) -> bool {
        false
    }

    fn is_action_pressed(&self, _name: &str) -> bool {
        false
    }
}

/// In-memory action state fed by a device layer or a script
#[derive(Debug, Clone, Default)]
pub struct InputState {
    down: HashSet<String>,
    pressed: HashSet<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, name: &str) {
        if self.down.insert(name.to_string()) {
            self.pressed.insert(name.to_string());
        }
    }

    pub fn release(&mut self, name: &str) {
        self.down.remove(name);
        self.pressed.remove(name);
    }

    pub fn release_all(&mut self) {
        self.down.clear();
        self.pressed.clear();
    }

    /// Forget this frame's edges; held actions stay down
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }
}

impl InputSource for InputState {
    fn is_action_down(&self, name: &str) -> bool {
        self.down.contains(name)
    }

    fn is_action_pressed(&self, name: &str) -> bool {
        self.pressed.contains(name)
    }
}
