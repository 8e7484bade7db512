//! Drag delta computation.
//!
//! Objects are dragged by a grid-snapped delta. An object that starts off
//! the grid would stay off it forever, so the first delta also carries the
//! residual distance that brings the object back onto the grid.

use wf_core::CanvasConfig;
use wf_core::geometry::{Grid, Position};
use wf_core::model::ObjectKind;

/// Outcome of one pointer move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveDelta {
    pub delta: Position,
    /// The pointer has moved far enough to count as a drag.
    pub significant: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPositionTracker {
    kind: ObjectKind,
    /// Canvas position of the pointer when the gesture started.
    start: Position,
    residual: Position,
    grid: Grid,
    bendpoint_threshold: f64,
}

impl DragPositionTracker {
    /// `object_position` is where the dragged object (the one under the
    /// pointer) sits when the gesture starts.
    pub fn new(
        kind: ObjectKind,
        start: Position,
        object_position: Position,
        config: &CanvasConfig,
    ) -> Self {
        let grid = config.grid();
        let residual = if kind == ObjectKind::Bendpoint {
            Position::ORIGIN
        } else {
            grid.residual(object_position)
        };
        Self {
            kind,
            start,
            residual,
            grid,
            bendpoint_threshold: config.bendpoint_move_threshold,
        }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn residual(&self) -> Position {
        self.residual
    }

    /// Delta to apply to every dragged object for the pointer at `current`.
    ///
    /// Holding Alt moves freely (no snapping, no residual); bendpoints always
    /// move freely.
    pub fn delta(&self, current: Position, alt: bool) -> MoveDelta {
        let raw = current - self.start;
        let free = alt || self.kind == ObjectKind::Bendpoint;
        let delta = if free {
            raw
        } else {
            self.grid.snap(raw) + self.residual
        };
        MoveDelta {
            delta,
            significant: self.is_significant(raw),
        }
    }

    /// Significance is judged on the raw pointer travel: rounding would turn
    /// a move of just under one unit into a full grid step.
    fn is_significant(&self, raw: Position) -> bool {
        let (tx, ty) = if self.kind == ObjectKind::Bendpoint {
            (self.bendpoint_threshold, self.bendpoint_threshold)
        } else {
            (self.grid.x, self.grid.y)
        };
        raw.x.abs() >= tx || raw.y.abs() >= ty
    }
}
