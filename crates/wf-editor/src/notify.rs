//! User-facing notifications: toasts and hover tooltips.
//!
//! Both are driven by host timestamps rather than timers of their own, so
//! the host calls [`TooltipTimer::tick`] from its animation frame.

use serde::Serialize;
use std::collections::VecDeque;
use wf_core::model::ObjectRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToastKind {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub headline: String,
    pub message: String,
}

/// Toasts waiting for the host to display them.
#[derive(Debug, Default)]
pub struct ToastQueue {
    pending: VecDeque<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn push(&mut self, kind: ToastKind, headline: &str, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        self.pending.push_back(Toast {
            id: self.next_id,
            kind,
            headline: headline.to_string(),
            message: message.into(),
        });
        self.next_id
    }

    pub fn error(&mut self, headline: &str, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Error, headline, message)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn peek(&self) -> impl Iterator<Item = &Toast> {
        self.pending.iter()
    }

    pub fn drain(&mut self) -> Vec<Toast> {
        self.pending.drain(..).collect()
    }
}

// ─── Tooltips ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum TooltipPhase {
    Hidden,
    /// Pointer entered at the timestamp; show after the show delay.
    Showing(f64),
    Visible,
    /// Pointer left at the timestamp; hide after the hide delay.
    Hiding(f64),
}

/// Delayed show/hide of the hover tooltip for one object at a time.
#[derive(Debug, Clone)]
pub struct TooltipTimer {
    show_delay_ms: f64,
    hide_delay_ms: f64,
    target: Option<ObjectRef>,
    phase: TooltipPhase,
}

impl TooltipTimer {
    pub fn new(show_delay_ms: f64, hide_delay_ms: f64) -> Self {
        Self {
            show_delay_ms,
            hide_delay_ms,
            target: None,
            phase: TooltipPhase::Hidden,
        }
    }

    pub fn pointer_enter(&mut self, object: ObjectRef, now_ms: f64) {
        match self.phase {
            // Moving between objects while a tooltip is up switches instantly.
            TooltipPhase::Visible | TooltipPhase::Hiding(_) => {
                self.phase = TooltipPhase::Visible;
            }
            TooltipPhase::Hidden | TooltipPhase::Showing(_) => {
                self.phase = TooltipPhase::Showing(now_ms);
            }
        }
        self.target = Some(object);
    }

    pub fn pointer_leave(&mut self, now_ms: f64) {
        self.phase = match self.phase {
            TooltipPhase::Visible => TooltipPhase::Hiding(now_ms),
            TooltipPhase::Hiding(t) => TooltipPhase::Hiding(t),
            TooltipPhase::Hidden | TooltipPhase::Showing(_) => {
                self.target = None;
                TooltipPhase::Hidden
            }
        };
    }

    /// Hide immediately (a drag started).
    pub fn dismiss(&mut self) {
        self.target = None;
        self.phase = TooltipPhase::Hidden;
    }

    /// Advance to `now_ms`; returns the object whose tooltip is visible.
    pub fn tick(&mut self, now_ms: f64) -> Option<ObjectRef> {
        match self.phase {
            TooltipPhase::Showing(since) if now_ms - since >= self.show_delay_ms => {
                self.phase = TooltipPhase::Visible;
            }
            TooltipPhase::Hiding(since) if now_ms - since >= self.hide_delay_ms => {
                self.dismiss();
            }
            _ => {}
        }
        self.visible()
    }

    pub fn visible(&self) -> Option<ObjectRef> {
        match self.phase {
            TooltipPhase::Visible | TooltipPhase::Hiding(_) => self.target,
            TooltipPhase::Hidden | TooltipPhase::Showing(_) => None,
        }
    }
}
