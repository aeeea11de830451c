//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives in
//! Rust so the browser bridge and native tests share it.
//!
//! While a text field has focus (the label overlay or the title input) only
//! Enter and Escape are resolved; everything else, Ctrl/⌘+Z in particular,
//! belongs to the field's native editing.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tools ──
    TogglePencil,
    ToggleEraser,

    // ── Edit ──
    Undo,
    /// Commit the label overlay (Enter).
    CommitText,
    /// Cancel the label overlay, or drop the active tool (Escape).
    Cancel,

    // ── View ──
    ZoomIn,
    ZoomOut,
    Home,
}

impl ShortcutAction {
    pub fn name(self) -> &'static str {
        match self {
            ShortcutAction::TogglePencil => "togglePencil",
            ShortcutAction::ToggleEraser => "toggleEraser",
            ShortcutAction::Undo => "undo",
            ShortcutAction::CommitText => "commitText",
            ShortcutAction::Cancel => "cancel",
            ShortcutAction::ZoomIn => "zoomIn",
            ShortcutAction::ZoomOut => "zoomOut",
            ShortcutAction::Home => "home",
        }
    }

    /// View actions are carried out by the host's view transform.
    pub fn is_view(self) -> bool {
        matches!(
            self,
            ShortcutAction::ZoomIn | ShortcutAction::ZoomOut | ShortcutAction::Home
        )
    }
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Escape"`).
    /// `text_focus` is true while a text input owns the keyboard.
    pub fn resolve(key: &str, modifiers: Modifiers, text_focus: bool) -> Option<ShortcutAction> {
        if text_focus {
            return match key {
                "Enter" if !modifiers.shift => Some(ShortcutAction::CommitText),
                "Escape" => Some(ShortcutAction::Cancel),
                _ => None,
            };
        }

        if modifiers.command() {
            return match key {
                "z" | "Z" if !modifiers.shift => Some(ShortcutAction::Undo),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::Home),
                _ => None,
            };
        }

        if modifiers.alt {
            return None;
        }

        match key {
            "p" | "P" => Some(ShortcutAction::TogglePencil),
            "e" | "E" => Some(ShortcutAction::ToggleEraser),
            "Escape" => Some(ShortcutAction::Cancel),
            "=" | "+" => Some(ShortcutAction::ZoomIn),
            "-" => Some(ShortcutAction::ZoomOut),
            "0" | "Home" => Some(ShortcutAction::Home),
            _ => None,
        }
    }
}
