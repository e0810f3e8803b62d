//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. What an action
//! does depends on the editor mode; the map itself is mode-agnostic.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Abort the drawing session or the active move.
    Cancel,
    /// Close the polygon in progress, or save the active move.
    Confirm,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"Escape"`).
    /// Returns `None` if the combo has no binding. Bindings only fire
    /// without ctrl/meta so browser shortcuts pass through.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.ctrl || modifiers.meta {
            return None;
        }
        match key {
            "Escape" | "Esc" => Some(ShortcutAction::Cancel),
            "Enter" => Some(ShortcutAction::Confirm),
            _ => None,
        }
    }
}
