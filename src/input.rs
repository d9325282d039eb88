//! Keyboard input state.
//!
//! The [`Input`] set tracks which keys are currently held down. It is mutated
//! by the window event handler as key transitions arrive, and polled once per
//! frame by the camera controller — events are always delivered before the
//! per-frame poll, so no synchronization is needed.

use std::collections::HashSet;
use std::hash::Hash;

pub use winit::keyboard::KeyCode;

/// Tracks the set of inputs currently held down.
pub struct Input<T: Eq + Hash + Copy> {
    pressed: HashSet<T>,
}

impl<T: Eq + Hash + Copy> Input<T> {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
        }
    }

    /// Returns `true` if the input is currently held down.
    pub fn pressed(&self, input: T) -> bool {
        self.pressed.contains(&input)
    }

    /// Call when an input is pressed (from the event handler).
    pub fn press(&mut self, input: T) {
        self.pressed.insert(input);
    }

    /// Call when an input is released (from the event handler).
    pub fn release(&mut self, input: T) {
        self.pressed.remove(&input);
    }
}

impl<T: Eq + Hash + Copy> Default for Input<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release_track_held_state() {
        let mut input = Input::new();
        assert!(!input.pressed(KeyCode::KeyW));

        input.press(KeyCode::KeyW);
        assert!(input.pressed(KeyCode::KeyW));

        // Holding is idempotent.
        input.press(KeyCode::KeyW);
        assert!(input.pressed(KeyCode::KeyW));

        input.release(KeyCode::KeyW);
        assert!(!input.pressed(KeyCode::KeyW));
    }
}
