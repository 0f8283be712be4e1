use glam::Vec2;
use std::collections::BTreeSet;

/// Keys the demo reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    W,
    A,
    S,
    D,
    /// Move down.
    X,
    /// Move up.
    Space,
    Escape,
}

/// Keyboard and mouse state for one frame.
///
/// The platform layer keeps one of these up to date from window events and
/// hands it to `update` by reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    keys_down: BTreeSet<Key>,
    cursor: Vec2,
    left_button: bool,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.keys_down.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.keys_down.remove(&key);
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Keys currently held, in a stable order.
    pub fn keys_down(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys_down.iter().copied()
    }

    /// Cursor position in window client coordinates.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    pub fn set_cursor(&mut self, position: Vec2) {
        self.cursor = position;
    }

    pub fn left_button(&self) -> bool {
        self.left_button
    }

    pub fn set_left_button(&mut self, held: bool) {
        self.left_button = held;
    }

    /// Release everything, e.g. when the window loses focus.
    pub fn clear_buttons(&mut self) {
        self.keys_down.clear();
        self.left_button = false;
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.press(key);
        self
    }

    pub fn with_cursor(mut self, x: f32, y: f32) -> Self {
        self.cursor = Vec2::new(x, y);
        self
    }

    pub fn with_left_button(mut self, held: bool) -> Self {
        self.left_button = held;
        self
    }
}
