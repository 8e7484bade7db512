//! Scene-graph (WebGL) surface.
//!
//! Visuals live in per-kind layer containers. While dragging, the dragged
//! visuals are reparented into a dedicated drag layer so only that layer is
//! re-batched each frame; when the drag ends (or is aborted) every visual
//! goes back to its original container at its original position.

use crate::camera::Camera;
use crate::surface::{CanvasSurface, DragVisualOptimizer, InteractionMode};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};
use wf_core::geometry::Position;
use wf_core::model::{ObjectKind, ObjectRef, Workflow};

/// Containers of the scene graph, in paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Annotations,
    Nodes,
    Placeholders,
    Bendpoints,
    PortBars,
    Drag,
}

impl Layer {
    pub fn for_kind(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Annotation => Self::Annotations,
            ObjectKind::Node => Self::Nodes,
            ObjectKind::ComponentPlaceholder => Self::Placeholders,
            ObjectKind::Bendpoint => Self::Bendpoints,
            ObjectKind::PortBar => Self::PortBars,
        }
    }
}

/// Layer containers plus the drag-layer reparenting optimizer.
#[derive(Debug, Default)]
pub struct DragLayer {
    layers: BTreeMap<Layer, Vec<ObjectRef>>,
    /// Where each dragged visual came from.
    origin_cache: HashMap<ObjectRef, (Layer, usize)>,
    offset: Position,
    active: bool,
}

impl DragLayer {
    /// Rebuild containers from the workflow (after a backend patch).
    pub fn sync(&mut self, workflow: &Workflow) {
        if self.active {
            log::debug!("scene sync during drag, restoring dragged visuals first");
            self.restore();
        }
        self.layers.clear();
        for object in workflow.object_refs() {
            self.layers
                .entry(Layer::for_kind(object.kind()))
                .or_default()
                .push(object);
        }
    }

    pub fn children(&self, layer: Layer) -> &[ObjectRef] {
        self.layers.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn layer_of(&self, object: &ObjectRef) -> Option<Layer> {
        self.layers
            .iter()
            .find(|(_, children)| children.contains(object))
            .map(|(layer, _)| *layer)
    }

    pub fn offset(&self) -> Position {
        self.offset
    }

    fn restore(&mut self) {
        let dragged = self.layers.remove(&Layer::Drag).unwrap_or_default();
        let mut back: Vec<(Layer, usize, ObjectRef)> = dragged
            .into_iter()
            .filter_map(|obj| {
                self.origin_cache
                    .get(&obj)
                    .map(|(layer, index)| (*layer, *index, obj))
            })
            .collect();
        // Ascending original index so earlier inserts don't shift later ones.
        back.sort_by_key(|(layer, index, _)| (*layer, *index));
        for (layer, index, obj) in back {
            let children = self.layers.entry(layer).or_default();
            let at = index.min(children.len());
            children.insert(at, obj);
        }
        self.origin_cache.clear();
        self.offset = Position::ORIGIN;
        self.active = false;
    }
}

impl DragVisualOptimizer for DragLayer {
    fn start(&mut self, objects: &[ObjectRef]) {
        if self.active {
            log::debug!("drag layer already active, ignoring start");
            return;
        }
        self.origin_cache.clear();
        let mut moved: SmallVec<[ObjectRef; 8]> = SmallVec::new();
        for object in objects {
            let layer = Layer::for_kind(object.kind());
            let Some(children) = self.layers.get_mut(&layer) else {
                continue;
            };
            if let Some(index) = children.iter().position(|c| c == object) {
                self.origin_cache.insert(*object, (layer, index));
                moved.push(*object);
            }
        }
        // Remove after recording so cached indices refer to the original order.
        for object in &moved {
            if let Some((layer, _)) = self.origin_cache.get(object)
                && let Some(children) = self.layers.get_mut(layer)
            {
                children.retain(|c| c != object);
            }
        }
        self.layers
            .entry(Layer::Drag)
            .or_default()
            .extend(moved.iter().copied());
        self.offset = Position::ORIGIN;
        self.active = true;
        log::trace!("drag layer holds {} visuals", moved.len());
    }

    fn update(&mut self, delta: Position) {
        if self.active {
            self.offset = delta;
        }
    }

    fn end(&mut self) {
        if self.active {
            self.restore();
        }
    }

    fn abort(&mut self) {
        if self.active {
            log::debug!("drag layer aborted, visuals returned to their containers");
            self.restore();
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug, Default)]
pub struct SceneSurface {
    pub camera: Camera,
    pub scene: DragLayer,
    captured: SmallVec<[i32; 2]>,
    mode: InteractionMode,
    port_selection_visible: bool,
    preview: Option<Position>,
}

impl SceneSurface {
    pub fn new(camera: Camera, workflow: &Workflow) -> Self {
        let mut surface = Self {
            camera,
            ..Self::default()
        };
        surface.scene.sync(workflow);
        surface
    }

    pub fn show_port_selection(&mut self) {
        self.port_selection_visible = true;
    }
}

impl CanvasSurface for SceneSurface {
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

    /// The drag layer carries the offset itself; this only records it.
    fn set_move_preview(&mut self, _objects: &[ObjectRef], delta: Option<Position>) {
        self.preview = delta;
    }

    fn move_preview(&self) -> Option<Position> {
        self.preview
    }

    fn drag_optimizer(&mut self) -> &mut dyn DragVisualOptimizer {
        &mut self.scene
    }

    /// The scene graph reports integer-snapped client coordinates, so
    /// double clicks must match exactly.
    fn double_click_epsilon(&self, _configured: f64) -> f64 {
        0.0
    }

    fn workflow_changed(&mut self, workflow: &Workflow) {
        self.scene.sync(workflow);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wf_core::id::{NodeId, WorkflowId};
    use wf_core::model::WorkflowNode;

    fn workflow() -> Workflow {
        let mut wf = Workflow::new(WorkflowId::intern("root"));
        for (i, id) in ["n0", "n1", "n2", "n3"].iter().enumerate() {
            wf.add_node(WorkflowNode::new(
                NodeId::intern(id),
                Position::new(i as f64 * 100.0, 0.0),
            ));
        }
        wf
    }

    fn node(id: &str) -> ObjectRef {
        ObjectRef::Node(NodeId::intern(id))
    }

    #[test]
    fn drag_reparents_and_restores_order() {
        let wf = workflow();
        let mut scene = DragLayer::default();
        scene.sync(&wf);
        let before = scene.children(Layer::Nodes).to_vec();

        scene.start(&[node("n1"), node("n3")]);
        assert_eq!(scene.children(Layer::Drag), &[node("n1"), node("n3")]);
        assert_eq!(scene.children(Layer::Nodes), &[node("n0"), node("n2")]);
        assert_eq!(scene.layer_of(&node("n3")), Some(Layer::Drag));

        scene.update(Position::new(10.0, 5.0));
        assert_eq!(scene.offset(), Position::new(10.0, 5.0));

        scene.end();
        assert_eq!(scene.children(Layer::Nodes), before.as_slice());
        assert!(scene.children(Layer::Drag).is_empty());
        assert_eq!(scene.offset(), Position::ORIGIN);
    }

    #[test]
    fn abort_is_idempotent() {
        let wf = workflow();
        let mut scene = DragLayer::default();
        scene.sync(&wf);
        scene.start(&[node("n0")]);
        scene.abort();
        scene.abort();
        assert!(!scene.is_active());
        assert_eq!(scene.children(Layer::Nodes).len(), 4);
    }

    #[test]
    fn second_start_while_active_is_ignored() {
        let wf = workflow();
        let mut scene = DragLayer::default();
        scene.sync(&wf);
        scene.start(&[node("n0")]);
        scene.start(&[node("n2")]);
        assert_eq!(scene.children(Layer::Drag), &[node("n0")]);
        scene.end();
        assert_eq!(scene.children(Layer::Nodes).len(), 4);
    }
}
