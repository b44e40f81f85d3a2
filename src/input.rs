/*
 * Input Module
 *
 * This module defines the input snapshot the simulation reads at tick time.
 * The platform layer (window events, gamepads) translates device events into
 * logical keys on a KeyboardState; scenes only see the read-only
 * InputSnapshot view of it.
 *
 * Release edges are consumed once per simulation tick, so a key released
 * during a frame that runs no tick is still seen by the next tick.
 */

use std::collections::HashSet;

// Logical keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Cancel,
}

// Read-only view of the input state for one tick
pub trait InputSnapshot {
    fn is_held(&self, key: Key) -> bool;
    fn was_released(&self, key: Key) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<Key>,
    released: HashSet<Key>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.released.insert(key);
        }
    }

    // Forget release edges once a tick has seen them
    pub fn clear(&mut self) {
        self.released.clear();
    }

    // Drop everything, e.g. when the window loses focus
    pub fn reset(&mut self) {
        self.held.clear();
        self.released.clear();
    }
}

impl InputSnapshot for KeyboardState {
    fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    fn was_released(&self, key: Key) -> bool {
        self.released.contains(&key)
    }
}

// Unit direction from the held arrow keys, zero when nothing (or opposing keys) is held
pub fn direction(input: &dyn InputSnapshot) -> glam::Vec2 {
    let mut direction = glam::Vec2::ZERO;
    if input.is_held(Key::Left) {
        direction.x -= 1.0;
    }
    if input.is_held(Key::Right) {
        direction.x += 1.0;
    }
    if input.is_held(Key::Up) {
        direction.y -= 1.0;
    }
    if input.is_held(Key::Down) {
        direction.y += 1.0;
    }
    direction.normalize_or_zero()
}
