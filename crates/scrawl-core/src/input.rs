//! Pointer and keyboard events delivered by the host.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Move { position: Point },
    Up { position: Point, button: MouseButton },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position, .. } => *position,
        }
    }
}

/// Keys the tool engines react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Other(String),
}

impl Key {
    /// Map a DOM/winit style key name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }
}

/// A pointer sample as seen by a tool engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    /// Position on the drawing surface, in device-independent pixels.
    pub screen: Point,
    /// Position in scene coordinates.
    pub scene: Point,
    pub button: MouseButton,
}

impl Pointer {
    /// A pointer whose screen and scene positions coincide.
    pub fn at(point: Point) -> Self {
        Self {
            screen: point,
            scene: point,
            button: MouseButton::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("Escape"), Key::Escape);
        assert_eq!(Key::from_name("a"), Key::Other("a".to_string()));
    }

    #[test]
    fn test_event_position() {
        let ev = PointerEvent::Up {
            position: Point::new(1.0, 2.0),
            button: MouseButton::Middle,
        };
        assert_eq!(ev.position(), Point::new(1.0, 2.0));
    }
}
