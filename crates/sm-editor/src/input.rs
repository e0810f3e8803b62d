//! Input abstraction layer.
//!
//! Hosts deliver pointer, wheel and keyboard events in **screen space**
//! (surface-local pixels). The editor maps pointer positions to image space
//! through the viewer before handing them to a session as [`ImageEvent`]s.

use kurbo::Point;

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// A normalized input event from the rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed.
    PointerDown { x: f64, y: f64, modifiers: Modifiers },

    /// Pointer moved, button held or not.
    PointerMove { x: f64, y: f64, modifiers: Modifiers },

    /// Primary button released.
    PointerUp { x: f64, y: f64, modifiers: Modifiers },

    DoubleClick { x: f64, y: f64 },

    /// Wheel; forwarded to the viewer as zoom, except while a drawing or
    /// drag gesture holds the button, when it is swallowed.
    Wheel { x: f64, y: f64, delta_y: f64 },

    /// `key` is the `KeyboardEvent.key` value.
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64) -> Self {
        Self::PointerDown {
            x,
            y,
            modifiers: Modifiers::default(),
        }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove {
            x,
            y,
            modifiers: Modifiers::default(),
        }
    }

    pub fn pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp {
            x,
            y,
            modifiers: Modifiers::default(),
        }
    }

    pub fn key(key: impl Into<String>) -> Self {
        Self::Key {
            key: key.into(),
            modifiers: Modifiers::default(),
        }
    }

    /// Screen position, if this is a pointer or wheel event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. }
            | Self::DoubleClick { x, y }
            | Self::Wheel { x, y, .. } => Some(Point::new(*x, *y)),
            Self::Key { .. } => None,
        }
    }
}

/// A pointer event already mapped to image space, as consumed by sessions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageEvent {
    Press(Point),
    Move(Point),
    Release(Point),
    DoubleClick(Point),
}

impl ImageEvent {
    pub fn point(&self) -> Point {
        match *self {
            Self::Press(p) | Self::Move(p) | Self::Release(p) | Self::DoubleClick(p) => p,
        }
    }
}
