//! The interaction session: state shared by every object on the canvas
//! while a gesture is in flight.
//!
//! Only one drag can run at a time. The session owns that drag together
//! with the collision index and the edge-pan loop, and resets all of them
//! when the drag ends so nothing leaks into the next gesture.

use crate::collision::{CollisionChecker, DragPayload};
use crate::edge_pan::EdgePanController;
use crate::interaction::InteractionError;
use crate::position::DragPositionTracker;
use wf_core::CanvasConfig;
use wf_core::geometry::Position;
use wf_core::model::{ObjectRef, Workflow};

/// One drag of one or more objects.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// The object under the pointer.
    pub target: ObjectRef,
    pub pointer_id: i32,
    /// Everything that moves with the target.
    pub objects: Vec<ObjectRef>,
    pub original_positions: Vec<(ObjectRef, Position)>,
    pub tracker: DragPositionTracker,
    /// Current (uncommitted) offset of all dragged objects.
    pub delta: Position,
    pub last_client: Position,
    pub alt: bool,
    /// A significant move happened.
    pub dragging: bool,
    /// Set for single-node drags, which may replace or be inserted.
    pub payload: Option<DragPayload>,
    /// The target does not exist in the workflow yet (virtual bendpoint).
    pub is_virtual: bool,
}

impl DragSession {
    pub fn original_position(&self, object: &ObjectRef) -> Option<Position> {
        self.original_positions
            .iter()
            .find(|(o, _)| o == object)
            .map(|(_, p)| *p)
    }

    pub fn is_multi_object(&self) -> bool {
        self.objects.len() > 1
    }
}

#[derive(Debug, Default)]
pub struct InteractionSession {
    drag: Option<DragSession>,
    pub collision: CollisionChecker,
    pub edge_pan: EdgePanController,
    escape_armed: bool,
}

impl InteractionSession {
    pub fn is_active(&self) -> bool {
        self.drag.is_some()
    }

    /// Start a drag. Returns `false` (and changes nothing) if one is
    /// already running.
    pub fn start_drag(
        &mut self,
        drag: DragSession,
        workflow: &Workflow,
        config: &CanvasConfig,
    ) -> bool {
        if let Some(active) = &self.drag {
            log::debug!(
                "drag of {} requested while {} is being dragged, ignoring",
                drag.target,
                active.target
            );
            return false;
        }
        self.edge_pan.stop();
        self.collision.clear();
        if drag.payload.is_some() {
            self.collision.init(workflow, config);
        }
        self.escape_armed = true;
        self.drag = Some(drag);
        true
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn drag_mut(&mut self) -> Result<&mut DragSession, InteractionError> {
        self.drag.as_mut().ok_or(InteractionError::NotDragging)
    }

    /// Escape aborts the drag exactly once.
    pub fn take_escape(&mut self) -> bool {
        std::mem::take(&mut self.escape_armed)
    }

    /// End the drag and reset everything that belongs to it.
    pub fn end_drag(&mut self) -> Option<DragSession> {
        self.edge_pan.stop();
        self.collision.clear();
        self.escape_armed = false;
        self.drag.take()
    }
}
