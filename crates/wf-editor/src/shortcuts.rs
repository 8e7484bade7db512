//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s.
//! The shortcut map lives in Rust so it's shared across WASM and native.
//!
//! Canvas conventions:
//! - Arrow = move keyboard focus to the nearest object in that direction
//! - ⌥Arrow = pan the camera
//! - ⌘⇧Arrow = move the selection one grid unit (⌥⌘⇧ = one canvas unit)
//! - Escape = abort the running gesture, otherwise deselect

use wf_core::geometry::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ArrowDirection {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Self::Up),
            "ArrowDown" => Some(Self::Down),
            "ArrowLeft" => Some(Self::Left),
            "ArrowRight" => Some(Self::Right),
            _ => None,
        }
    }

    /// Unit vector in canvas space (y grows downwards).
    pub fn unit(&self) -> Position {
        match self {
            Self::Up => Position::new(0.0, -1.0),
            Self::Down => Position::new(0.0, 1.0),
            Self::Left => Position::new(-1.0, 0.0),
            Self::Right => Position::new(1.0, 0.0),
        }
    }
}

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Selection ──
    SelectNearest(ArrowDirection),
    SelectAll,
    /// Abort the running drag/transform, otherwise clear the selection.
    Escape,

    // ── Edit ──
    /// `fine` moves by one canvas unit instead of one grid unit.
    MoveSelection { direction: ArrowDirection, fine: bool },

    // ── View ──
    Pan(ArrowDirection),
    ZoomIn,
    ZoomOut,
    ResetZoom,
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"a"`, `"ArrowUp"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        // ── Modifier combos first (most specific) ──
        if cmd && shift {
            return ArrowDirection::from_key(key).map(|direction| {
                ShortcutAction::MoveSelection {
                    direction,
                    fine: alt,
                }
            });
        }

        if cmd {
            return match key {
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ResetZoom),
                _ => None,
            };
        }

        if alt {
            return ArrowDirection::from_key(key).map(ShortcutAction::Pan);
        }

        // ── Single keys ──
        if let Some(direction) = ArrowDirection::from_key(key) {
            return Some(ShortcutAction::SelectNearest(direction));
        }
        match key {
            "Escape" => Some(ShortcutAction::Escape),
            _ => None,
        }
    }
}
