//! Input abstraction layer.
//!
//! Normalizes browser pointer and keyboard events into plain structs consumed
//! by the interaction engine. Every event carries a [`MarkSlot`] so inner
//! handlers can claim it before outer (canvas-level, global) handlers see it.

use std::cell::RefCell;
use wf_core::geometry::Position;

/// Keyboard modifier state at the time of the event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    /// Platform command key (⌘ on macOS, Ctrl elsewhere).
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Gestures that toggle membership instead of replacing the selection.
    pub fn is_multi_select(&self) -> bool {
        self.shift || self.command()
    }
}

/// Who claimed an event first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMark {
    pub initiator: String,
    pub skip_global_selection: bool,
}

/// Interior-mutable annotations attached to a native event.
#[derive(Debug, Default)]
pub struct MarkSlot {
    pub(crate) handled: RefCell<Option<EventMark>>,
    pub(crate) escape: RefCell<Option<String>>,
}

/// A native pointer event (pointerdown / pointermove / pointerup).
#[derive(Debug)]
pub struct PointerEvent {
    /// Client (screen) coordinates.
    pub client: Position,
    pub modifiers: Modifiers,
    pub pointer_id: i32,
    /// 0 = primary, 1 = middle, 2 = secondary.
    pub button: i16,
    /// Host timestamp in milliseconds.
    pub timestamp_ms: f64,
    pub(crate) marks: MarkSlot,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64, modifiers: Modifiers, timestamp_ms: f64) -> Self {
        Self {
            client: Position::new(x, y),
            modifiers,
            pointer_id: 1,
            button: 0,
            timestamp_ms,
            marks: MarkSlot::default(),
        }
    }

    pub fn with_pointer_id(mut self, pointer_id: i32) -> Self {
        self.pointer_id = pointer_id;
        self
    }

    pub fn with_button(mut self, button: i16) -> Self {
        self.button = button;
        self
    }

    pub fn is_primary(&self) -> bool {
        self.button == 0
    }
}

/// A native keydown event.
#[derive(Debug)]
pub struct KeyEvent {
    /// `KeyboardEvent.key`, e.g. `"ArrowUp"`, `"Escape"`, `"a"`.
    pub key: String,
    pub modifiers: Modifiers,
    pub(crate) marks: MarkSlot,
}

impl KeyEvent {
    pub fn new(key: &str, modifiers: Modifiers) -> Self {
        Self {
            key: key.to_string(),
            modifiers,
            marks: MarkSlot::default(),
        }
    }

    pub fn is_escape(&self) -> bool {
        self.key == "Escape"
    }
}

/// A scene-graph event wrapping the native pointer event that produced it,
/// as delivered by the WebGL renderer's event system.
#[derive(Debug)]
pub struct ScenePointerEvent<'a> {
    pub native: &'a PointerEvent,
    /// Position in the renderer's global (stage) space.
    pub global: Position,
}

/// Anything that is, or wraps, a native event.
pub trait NativeEvent {
    fn marks(&self) -> &MarkSlot;
}

impl NativeEvent for PointerEvent {
    fn marks(&self) -> &MarkSlot {
        &self.marks
    }
}

impl NativeEvent for KeyEvent {
    fn marks(&self) -> &MarkSlot {
        &self.marks
    }
}

impl NativeEvent for ScenePointerEvent<'_> {
    fn marks(&self) -> &MarkSlot {
        self.native.marks()
    }
}

/// A pointer event for any renderer, unwrapped to the native event.
pub trait AsPointerEvent: NativeEvent {
    fn pointer(&self) -> &PointerEvent;
}

impl AsPointerEvent for PointerEvent {
    fn pointer(&self) -> &PointerEvent {
        self
    }
}

impl AsPointerEvent for ScenePointerEvent<'_> {
    fn pointer(&self) -> &PointerEvent {
        self.native
    }
}
