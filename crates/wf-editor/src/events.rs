//! Event tagging and double-click detection.
//!
//! Inner objects mark the native event they handled so that canvas
//! background handlers and the global selection logic can skip it. Marks are
//! last-write-wins: an inner handler that runs after a generic canvas handler
//! overrides it, with a warning naming both.

use crate::input::{EventMark, KeyEvent, NativeEvent};
use wf_core::geometry::Position;

/// Options for [`mark_event_as_handled`].
#[derive(Debug, Clone)]
pub struct MarkOptions<'a> {
    pub initiator: &'a str,
    pub skip_global_selection: bool,
}

impl<'a> MarkOptions<'a> {
    pub fn new(initiator: &'a str) -> Self {
        Self {
            initiator,
            skip_global_selection: true,
        }
    }

    pub fn keep_global_selection(mut self) -> Self {
        self.skip_global_selection = false;
        self
    }
}

pub fn mark_event_as_handled(event: &impl NativeEvent, options: MarkOptions<'_>) {
    let mut slot = event.marks().handled.borrow_mut();
    if let Some(previous) = slot.as_ref() {
        log::warn!(
            "event already handled by `{}`, re-marked by `{}`",
            previous.initiator,
            options.initiator
        );
    }
    *slot = Some(EventMark {
        initiator: options.initiator.to_string(),
        skip_global_selection: options.skip_global_selection,
    });
}

/// Whether the event was claimed, optionally by a specific initiator.
pub fn is_marked_event(event: &impl NativeEvent, initiator: Option<&str>) -> bool {
    match (event.marks().handled.borrow().as_ref(), initiator) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(mark), Some(who)) => mark.initiator == who,
    }
}

/// Whether global selection handlers should ignore the event.
pub fn skips_global_selection(event: &impl NativeEvent) -> bool {
    event
        .marks()
        .handled
        .borrow()
        .as_ref()
        .is_some_and(|m| m.skip_global_selection)
}

pub fn marked_by(event: &impl NativeEvent) -> Option<String> {
    event
        .marks()
        .handled
        .borrow()
        .as_ref()
        .map(|m| m.initiator.clone())
}

/// Claim an Escape key press so the global "deselect on Escape" handler
/// leaves the selection alone.
pub fn mark_escape_as_handled(event: &KeyEvent, initiator: &str) {
    if !event.is_escape() {
        log::warn!("`{initiator}` tried to mark `{}` as a handled Escape", event.key);
        return;
    }
    let mut slot = event.marks.escape.borrow_mut();
    if let Some(previous) = slot.as_deref() {
        log::warn!("Escape already handled by `{previous}`, re-marked by `{initiator}`");
    }
    *slot = Some(initiator.to_string());
}

pub fn is_escape_handled(event: &KeyEvent) -> bool {
    event.is_escape() && event.marks.escape.borrow().is_some()
}

// ─── Double click ────────────────────────────────────────────────────────

/// Remembers the last qualifying pointer-down to detect a second one.
#[derive(Debug, Clone)]
pub struct DoubleClickDetector {
    window_ms: f64,
    last: Option<(f64, Position)>,
}

impl DoubleClickDetector {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            last: None,
        }
    }

    /// Register a pointer-down. Returns `true` if it completes a double click.
    /// `epsilon` is the allowed client-coordinate distance (0 = exact).
    pub fn register(&mut self, timestamp_ms: f64, client: Position, epsilon: f64) -> bool {
        if let Some((t, p)) = self.last {
            let elapsed = timestamp_ms - t;
            let same_spot = if epsilon <= 0.0 {
                p == client
            } else {
                p.distance(client) <= epsilon
            };
            if (0.0..=self.window_ms).contains(&elapsed) && same_spot {
                self.last = None;
                return true;
            }
        }
        self.last = Some((timestamp_ms, client));
        false
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
