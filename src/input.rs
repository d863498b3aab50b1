//! Keyboard state as the scene sees it.
//!
//! The scene only asks one question per frame: is a given [`SceneKey`] held?
//! [`KeyState`] answers it. [`Input`] answers it from winit keyboard events through
//! a [`KeyBindings`] table; [`HeldKeys`] answers it from a plain set, which is what
//! tests and scripted runs use.

use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// The actions the camera controller reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
    YawLeft,
    YawRight,
}

impl SceneKey {
    pub const ALL: [SceneKey; 8] = [
        SceneKey::Forward,
        SceneKey::Back,
        SceneKey::Left,
        SceneKey::Right,
        SceneKey::Up,
        SceneKey::Down,
        SceneKey::YawLeft,
        SceneKey::YawRight,
    ];
}

/// Read-only view of which scene keys are held this frame.
pub trait KeyState {
    fn is_down(&self, key: SceneKey) -> bool;
}

/// Maps physical keys to scene keys.
#[derive(Clone, Debug)]
pub struct KeyBindings {
    bindings: Vec<(KeyCode, SceneKey)>,
}

impl Default for KeyBindings {
    /// W/S move, A/D turn, arrows strafe and pitch.
    fn default() -> Self {
        Self {
            bindings: vec![
                (KeyCode::KeyW, SceneKey::Forward),
                (KeyCode::KeyS, SceneKey::Back),
                (KeyCode::KeyA, SceneKey::YawLeft),
                (KeyCode::KeyD, SceneKey::YawRight),
                (KeyCode::ArrowLeft, SceneKey::Left),
                (KeyCode::ArrowRight, SceneKey::Right),
                (KeyCode::ArrowUp, SceneKey::Up),
                (KeyCode::ArrowDown, SceneKey::Down),
            ],
        }
    }
}

impl KeyBindings {
    /// An empty table.
    pub fn none() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Adds a binding. A scene key may have several physical keys.
    pub fn bind(mut self, code: KeyCode, key: SceneKey) -> Self {
        self.bindings.push((code, key));
        self
    }

    fn codes_for(&self, key: SceneKey) -> impl Iterator<Item = KeyCode> + '_ {
        self.bindings
            .iter()
            .filter(move |(_, k)| *k == key)
            .map(|(code, _)| *code)
    }
}

/// Tracks held keyboard keys from winit events.
#[derive(Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    bindings: KeyBindings,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bindings(bindings: KeyBindings) -> Self {
        Self {
            keys_down: HashSet::new(),
            bindings,
        }
    }

    /// Process a window event and update key state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            self.keys_down.insert(key);
                        }
                        ElementState::Released => {
                            self.keys_down.remove(&key);
                        }
                    }
                }
            }
            // Releases that happen while unfocused never arrive.
            WindowEvent::Focused(false) => self.keys_down.clear(),
            _ => {}
        }
    }

    /// Returns true if the physical key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }
}

impl KeyState for Input {
    fn is_down(&self, key: SceneKey) -> bool {
        self.bindings.codes_for(key).any(|code| self.key_down(code))
    }
}

/// A plain set of held scene keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys(HashSet<SceneKey>);

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: SceneKey) {
        self.0.insert(key);
    }

    pub fn release(&mut self, key: SceneKey) {
        self.0.remove(&key);
    }
}

impl FromIterator<SceneKey> for HeldKeys {
    fn from_iter<I: IntoIterator<Item = SceneKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl KeyState for HeldKeys {
    fn is_down(&self, key: SceneKey) -> bool {
        self.0.contains(&key)
    }
}
