//! Retained SVG DOM surface.
//!
//! The browser owns the element tree; this surface tracks the state the
//! interaction engine toggles on it. Moved objects are re-rendered by the
//! DOM directly, so the drag optimizer does nothing.

use crate::camera::Camera;
use crate::surface::{CanvasSurface, DragVisualOptimizer, InteractionMode, NoopOptimizer};
use smallvec::SmallVec;
use wf_core::geometry::Position;
use wf_core::model::ObjectRef;

#[derive(Debug, Default)]
pub struct SvgSurface {
    pub camera: Camera,
    captured: SmallVec<[i32; 2]>,
    mode: InteractionMode,
    port_selection_visible: bool,
    preview: Option<Position>,
    preview_objects: Vec<ObjectRef>,
    optimizer: NoopOptimizer,
}

impl SvgSurface {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            ..Self::default()
        }
    }

    /// The host shows the port-selection overlay (e.g. a port was clicked).
    pub fn show_port_selection(&mut self) {
        self.port_selection_visible = true;
    }

    pub fn preview_objects(&self) -> &[ObjectRef] {
        &self.preview_objects
    }
}

impl CanvasSurface for SvgSurface {
    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    fn capture_pointer(&mut self, pointer_id: i32) {
        if !self.captured.contains(&pointer_id) {
            self.captured.push(pointer_id);
        }
    }

    fn release_pointer(&mut self, pointer_id: i32) {
        self.captured.retain(|id| *id != pointer_id);
    }

    fn has_pointer_capture(&self, pointer_id: i32) -> bool {
        self.captured.contains(&pointer_id)
    }

    fn set_interaction_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
    }

    fn interaction_mode(&self) -> InteractionMode {
        self.mode
    }

    fn hide_port_selection(&mut self) {
        self.port_selection_visible = false;
    }

    fn is_port_selection_visible(&self) -> bool {
        self.port_selection_visible
    }

    fn set_move_preview(&mut self, objects: &[ObjectRef], delta: Option<Position>) {
        self.preview = delta;
        self.preview_objects.clear();
        if delta.is_some() {
            self.preview_objects.extend_from_slice(objects);
        }
    }

    fn move_preview(&self) -> Option<Position> {
        self.preview
    }

    fn drag_optimizer(&mut self) -> &mut dyn DragVisualOptimizer {
        &mut self.optimizer
    }

    fn double_click_epsilon(&self, configured: f64) -> f64 {
        configured
    }
}
