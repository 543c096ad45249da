//! Keyboard and mouse state
//!
//! The window layer feeds events into `InputState`; the frame driver polls an
//! `InputSnapshot` once per frame. Dash and ultimate are edge-triggered: a
//! press is reported by exactly one snapshot, however long the key is held.

use glam::Vec2;

use crate::sim::vector::VecExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    /// Ultimate (active skills)
    Space,
    /// Dash
    Shift,
    Pause,
}

impl Key {
    /// Map a DOM-style key code (`KeyW`, `ArrowUp`, `ShiftLeft`, ...)
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" | "ArrowUp" => Some(Key::Up),
            "KeyS" | "ArrowDown" => Some(Key::Down),
            "KeyA" | "ArrowLeft" => Some(Key::Left),
            "KeyD" | "ArrowRight" => Some(Key::Right),
            "Space" => Some(Key::Space),
            "ShiftLeft" | "ShiftRight" => Some(Key::Shift),
            "Escape" | "KeyP" => Some(Key::Pause),
            _ => None,
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// What the game sees for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    /// Unit vector or zero
    pub move_dir: Vec2,
    /// Cursor in screen space
    pub mouse: Vec2,
    pub fire: bool,
    pub dash: bool,
    pub ultimate: bool,
    pub pause: bool,
}

/// Raw device state
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: u8,
    /// Presses not yet reported by a snapshot
    pressed: u8,
    mouse: Vec2,
    mouse_down: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held & key.bit() == 0 {
            self.pressed |= key.bit();
        }
        self.held |= key.bit();
    }

    pub fn key_up(&mut self, key: Key) {
        self.held &= !key.bit();
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held & key.bit() != 0
    }

    pub fn mouse_move(&mut self, pos: Vec2) {
        self.mouse = pos;
    }

    pub fn mouse_button(&mut self, down: bool) {
        self.mouse_down = down;
    }

    /// Focus lost: drop everything so no key stays stuck
    pub fn reset(&mut self) {
        log::debug!("input reset");
        self.held = 0;
        self.pressed = 0;
        self.mouse_down = false;
    }

    fn movement(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.is_held(Key::Up) {
            dir.y -= 1.0;
        }
        if self.is_held(Key::Down) {
            dir.y += 1.0;
        }
        if self.is_held(Key::Left) {
            dir.x -= 1.0;
        }
        if self.is_held(Key::Right) {
            dir.x += 1.0;
        }
        dir.norm()
    }

    /// Poll the frame's input, consuming pending presses
    pub fn snapshot(&mut self) -> InputSnapshot {
        let pressed = std::mem::take(&mut self.pressed);
        InputSnapshot {
            move_dir: self.movement(),
            mouse: self.mouse,
            fire: self.mouse_down,
            dash: pressed & Key::Shift.bit() != 0,
            ultimate: pressed & Key::Space.bit() != 0,
            pause: pressed & Key::Pause.bit() != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_is_normalised() {
        let mut input = InputState::new();
        input.key_down(Key::Up);
        input.key_down(Key::Right);
        let snap = input.snapshot();
        assert!((snap.move_dir.length() - 1.0).abs() < 1e-6);
        assert!(snap.move_dir.x > 0.0 && snap.move_dir.y < 0.0);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut input = InputState::new();
        input.key_down(Key::Left);
        input.key_down(Key::Right);
        assert_eq!(input.snapshot().move_dir, Vec2::ZERO);
    }

    #[test]
    fn test_dash_reported_once_per_press() {
        let mut input = InputState::new();
        input.key_down(Key::Shift);
        assert!(input.snapshot().dash);
        // Auto-repeat while held is not a new press
        input.key_down(Key::Shift);
        assert!(!input.snapshot().dash);
        input.key_up(Key::Shift);
        input.key_down(Key::Shift);
        assert!(input.snapshot().dash);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut input = InputState::new();
        input.key_down(Key::Up);
        input.key_down(Key::Space);
        input.mouse_button(true);
        input.reset();
        let snap = input.snapshot();
        assert_eq!(snap.move_dir, Vec2::ZERO);
        assert!(!snap.fire && !snap.ultimate);
    }

    #[test]
    fn test_mouse_feeds_snapshot() {
        let mut input = InputState::new();
        input.mouse_move(Vec2::new(320.0, 240.0));
        input.mouse_button(true);
        let snap = input.snapshot();
        assert_eq!(snap.mouse, Vec2::new(320.0, 240.0));
        assert!(snap.fire);
        // Fire is held state, not a press
        assert!(input.snapshot().fire);
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::from_code("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_code("ShiftRight"), Some(Key::Shift));
        assert_eq!(Key::from_code("KeyQ"), None);
    }
}
