//! Platform abstraction layer
//!
//! Turns raw host input into simulation control:
//! - DOM-style key names to [`Key`]
//! - Held key state from press/release edges
//! - Hand tracker samples

use serde::{Deserialize, Serialize};

use crate::sim::ControlSignal;

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Pause,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ArrowUp" | "w" | "W" => Some(Key::Up),
            "ArrowDown" | "s" | "S" => Some(Key::Down),
            "Escape" => Some(Key::Pause),
            _ => None,
        }
    }
}

/// Up/down held state, driven by press and release edges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
}

impl KeyState {
    pub fn press(&mut self, key: Key) {
        self.set(key, true);
    }

    pub fn release(&mut self, key: Key) {
        self.set(key, false);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn set(&mut self, key: Key, held: bool) {
        match key {
            Key::Up => self.up = held,
            Key::Down => self.down = held,
            Key::Pause => {}
        }
    }

    pub fn signal(&self) -> ControlSignal {
        ControlSignal::Discrete {
            up: self.up,
            down: self.down,
        }
    }
}

/// One reading from the hand tracker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandSample {
    pub detected: bool,
    /// Normalized vertical position, 0 = top
    pub y: f32,
}

impl HandSample {
    pub fn missing() -> Self {
        Self { detected: false, y: 0.0 }
    }

    pub fn signal(&self) -> ControlSignal {
        ControlSignal::Continuous {
            detected: self.detected,
            y: self.y,
        }
    }
}
