//! Renderer-independent canvas surface.
//!
//! The interaction engine only talks to this trait: coordinate conversion,
//! pointer capture, interaction mode, screen-space hit testing, the
//! port-selection overlay and a drag visual optimizer. The retained SVG DOM
//! and the scene-graph renderer each implement it once.

use crate::camera::Camera;
use crate::hit::{hit_test, hit_test_connection, hover_label};
use wf_core::geometry::Position;
use wf_core::model::{ObjectRef, Workflow};
use wf_core::CanvasConfig;

/// What the canvas may hit-test right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Full,
    /// Only camera gestures; objects are not hit-testable. Used during
    /// multi-object drags.
    CameraOnly,
}

/// Result of a screen-space hit test.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedObject {
    /// Renderer label, e.g. `connector-hover:<connectionId>` for connection
    /// hover areas.
    pub label: String,
    /// The selectable object, if the hit is one.
    pub object: Option<ObjectRef>,
}

/// Moves dragged visuals somewhere cheap to redraw for the duration of a drag.
pub trait DragVisualOptimizer {
    fn start(&mut self, objects: &[ObjectRef]);
    fn update(&mut self, delta: Position);
    fn end(&mut self);
    /// Like `end`, but the visuals are back at their pre-drag positions.
    fn abort(&mut self);
    fn is_active(&self) -> bool;
}

/// Optimizer for renderers that redraw moved objects cheaply anyway.
#[derive(Debug, Default)]
pub struct NoopOptimizer {
    active: bool,
}

impl DragVisualOptimizer for NoopOptimizer {
    fn start(&mut self, _objects: &[ObjectRef]) {
        self.active = true;
    }

    fn update(&mut self, _delta: Position) {}

    fn end(&mut self) {
        self.active = false;
    }

    fn abort(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

pub trait CanvasSurface {
    fn camera(&self) -> &Camera;
    fn camera_mut(&mut self) -> &mut Camera;

    fn screen_to_canvas(&self, client: Position) -> Position {
        self.camera().screen_to_canvas(client)
    }

    fn capture_pointer(&mut self, pointer_id: i32);
    fn release_pointer(&mut self, pointer_id: i32);
    fn has_pointer_capture(&self, pointer_id: i32) -> bool;

    fn set_interaction_mode(&mut self, mode: InteractionMode);
    fn interaction_mode(&self) -> InteractionMode;

    fn hide_port_selection(&mut self);
    fn is_port_selection_visible(&self) -> bool;

    /// Offset applied visually to the dragged objects (not yet committed).
    fn set_move_preview(&mut self, objects: &[ObjectRef], delta: Option<Position>);
    fn move_preview(&self) -> Option<Position>;

    fn drag_optimizer(&mut self) -> &mut dyn DragVisualOptimizer;

    /// Client-coordinate tolerance for double clicks on this renderer.
    fn double_click_epsilon(&self, configured: f64) -> f64;

    /// The workflow was replaced by a backend snapshot.
    fn workflow_changed(&mut self, _workflow: &Workflow) {}

    /// Topmost rendered thing under the client position. Objects win over
    /// connection hover areas. Nothing is hit in camera-only mode.
    fn find_object_from_screen_coordinates(
        &self,
        workflow: &Workflow,
        config: &CanvasConfig,
        client: Position,
    ) -> Option<RenderedObject> {
        if self.interaction_mode() == InteractionMode::CameraOnly {
            return None;
        }
        let p = self.screen_to_canvas(client);
        if let Some(object) = hit_test(workflow, config, p) {
            return Some(RenderedObject {
                label: object.to_string(),
                object: Some(object),
            });
        }
        self.find_connection_hover_from_screen_coordinates(workflow, config, client)
    }

    /// Connection hover area under the client position, ignoring objects
    /// (a dragged node is always under the pointer).
    fn find_connection_hover_from_screen_coordinates(
        &self,
        workflow: &Workflow,
        config: &CanvasConfig,
        client: Position,
    ) -> Option<RenderedObject> {
        let p = self.screen_to_canvas(client);
        hit_test_connection(workflow, config, p).map(|id| RenderedObject {
            label: hover_label(id),
            object: None,
        })
    }
}
