/// Keyboard input mapping: pressed physical keys -> per-frame input snapshot
use std::collections::HashSet;

use winit::keyboard::KeyCode;

/// Snapshot of the held controls for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub rotate_up: bool,
    pub rotate_down: bool,
    pub zoom_in: bool,
    pub zoom_out: bool,
    pub quit: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// -1, 0 or +1 for the horizontal axis (left is positive)
    pub fn horizontal(&self) -> f32 {
        axis(self.rotate_left, self.rotate_right)
    }

    /// -1, 0 or +1 for the vertical axis (up is positive)
    pub fn vertical(&self) -> f32 {
        axis(self.rotate_up, self.rotate_down)
    }

    /// -1, 0 or +1 for zoom (out is positive, i.e. distance grows)
    pub fn zoom(&self) -> f32 {
        axis(self.zoom_out, self.zoom_in)
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub rotate_left: KeyCode,
    pub rotate_right: KeyCode,
    pub rotate_up: KeyCode,
    pub rotate_down: KeyCode,
    pub zoom_in: KeyCode,
    pub zoom_out: KeyCode,
    pub quit: KeyCode,
    pub toggle_wireframe: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            rotate_left: KeyCode::KeyA,
            rotate_right: KeyCode::KeyD,
            rotate_up: KeyCode::KeyW,
            rotate_down: KeyCode::KeyS,
            zoom_in: KeyCode::KeyQ,
            zoom_out: KeyCode::KeyE,
            quit: KeyCode::Escape,
            toggle_wireframe: KeyCode::KeyF,
        }
    }
}

/// Turns the set of held keys into an [`InputState`]
#[derive(Debug, Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn snapshot(&self, pressed: &HashSet<KeyCode>) -> InputState {
        let b = &self.bindings;
        InputState {
            rotate_left: pressed.contains(&b.rotate_left),
            rotate_right: pressed.contains(&b.rotate_right),
            rotate_up: pressed.contains(&b.rotate_up),
            rotate_down: pressed.contains(&b.rotate_down),
            zoom_in: pressed.contains(&b.zoom_in),
            zoom_out: pressed.contains(&b.zoom_out),
            quit: pressed.contains(&b.quit),
        }
    }

    pub fn wants_to_toggle_wireframe(&self, key: KeyCode) -> bool {
        key == self.bindings.toggle_wireframe
    }
}
