//! Annotation resize ("transform") handles.
//!
//! An annotation has eight handles, one per compass direction. Dragging a
//! handle moves the matching edges; each axis is validated on its own so a
//! drag that would collapse or over-grow one dimension still resizes the
//! other.

use crate::commands::WorkflowCommand;
use crate::input::PointerEvent;
use wf_core::CanvasConfig;
use wf_core::geometry::{Bounds, Grid, Position};
use wf_core::id::AnnotationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    pub const ALL: [Self; 8] = [
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
        Self::NW,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "n" => Self::N,
            "ne" => Self::NE,
            "e" => Self::E,
            "se" => Self::SE,
            "s" => Self::S,
            "sw" => Self::SW,
            "w" => Self::W,
            "nw" => Self::NW,
            _ => return None,
        })
    }

    fn north(&self) -> bool {
        matches!(self, Self::N | Self::NE | Self::NW)
    }

    fn south(&self) -> bool {
        matches!(self, Self::S | Self::SE | Self::SW)
    }

    fn east(&self) -> bool {
        matches!(self, Self::E | Self::NE | Self::SE)
    }

    fn west(&self) -> bool {
        matches!(self, Self::W | Self::NW | Self::SW)
    }
}

/// Resize `bounds` for a handle drag from `start` to `current`.
///
/// A dimension is only changed when the result stays within `(0, max]`;
/// otherwise that axis keeps its original origin and size.
pub fn transform_bounds(
    bounds: Bounds,
    direction: Direction,
    start: Position,
    current: Position,
    max: f64,
) -> Bounds {
    let valid = |size: f64| size > 0.0 && size <= max;
    let dx = current.x - start.x;
    let dy = current.y - start.y;
    let mut out = bounds;

    if direction.north() {
        let height = bounds.height - dy;
        if valid(height) {
            out.y = bounds.y + dy;
            out.height = height;
        }
    } else if direction.south() {
        let height = bounds.height + dy;
        if valid(height) {
            out.height = height;
        }
    }

    if direction.west() {
        let width = bounds.width - dx;
        if valid(width) {
            out.x = bounds.x + dx;
            out.width = width;
        }
    } else if direction.east() {
        let width = bounds.width + dx;
        if valid(width) {
            out.width = width;
        }
    }

    out
}

/// Snap origin and size to the grid.
///
/// Snapping can push a valid size out of `(0, max]` (a width of 2 snaps to
/// 0). Such an axis takes its origin and size from `fallback` instead,
/// snapped and clamped to at least one grid unit.
pub fn adjust_to_grid(bounds: Bounds, fallback: Bounds, grid: Grid, max: f64) -> Bounds {
    let valid = |size: f64| size > 0.0 && size <= max;
    let largest = |unit: f64| (max / unit).floor() * unit;
    let snapped = grid.snap_bounds(bounds);
    let fallback = grid.snap_bounds(fallback);
    let mut out = snapped;
    if !valid(snapped.width) {
        out.x = fallback.x;
        out.width = fallback.width.max(grid.x).min(largest(grid.x));
    }
    if !valid(snapped.height) {
        out.y = fallback.y;
        out.height = fallback.height.max(grid.y).min(largest(grid.y));
    }
    out
}

/// Top-left corner of the handle box for `direction`. Handles sit inside
/// the bounds: near edges at the bounds origin, midpoints centred, far edges
/// at `origin + size - handle_size`.
pub fn handle_position(bounds: Bounds, direction: Direction, handle_size: f64) -> Position {
    let place = |near: bool, far: bool, start: f64, size: f64| {
        if near {
            start
        } else if far {
            start + size - handle_size
        } else {
            start + size / 2.0 - handle_size / 2.0
        }
    };
    Position::new(
        place(
            direction.west(),
            direction.east(),
            bounds.x,
            bounds.width,
        ),
        place(
            direction.north(),
            direction.south(),
            bounds.y,
            bounds.height,
        ),
    )
}

// ─── Session ─────────────────────────────────────────────────────────────

/// One handle drag, from pointer-down to pointer-up.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformSession {
    pub annotation: AnnotationId,
    pub direction: Direction,
    pub pointer_id: i32,
    original: Bounds,
    start: Position,
    current: Bounds,
}

impl TransformSession {
    /// `start` is the canvas position of the pointer-down on the handle.
    pub fn start(
        annotation: AnnotationId,
        direction: Direction,
        bounds: Bounds,
        start: Position,
        event: &PointerEvent,
    ) -> Self {
        log::debug!("transform {direction:?} of annotation {annotation} started");
        Self {
            annotation,
            direction,
            pointer_id: event.pointer_id,
            original: bounds,
            start,
            current: bounds,
        }
    }

    pub fn original(&self) -> Bounds {
        self.original
    }

    /// The bounds to render right now.
    pub fn transformed_bounds(&self) -> Bounds {
        self.current
    }

    pub fn update(&mut self, pointer: Position, config: &CanvasConfig) -> Bounds {
        let raw = transform_bounds(
            self.original,
            self.direction,
            self.start,
            pointer,
            config.max_annotation_size,
        );
        self.current = adjust_to_grid(
            raw,
            self.original,
            config.grid(),
            config.max_annotation_size,
        );
        self.current
    }

    /// Finish the drag. No command when nothing changed.
    pub fn end(self) -> Option<WorkflowCommand> {
        if self.current == self.original {
            return None;
        }
        Some(WorkflowCommand::UpdateAnnotationBounds {
            annotation_id: self.annotation,
            bounds: self.current,
        })
    }

    /// Throw the drag away; the annotation keeps its original bounds.
    pub fn abort(self) -> Bounds {
        log::debug!("transform of annotation {} aborted", self.annotation);
        self.original
    }
}
