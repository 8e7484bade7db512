//! Arrow-key navigation: the keyboard equivalent of drag, pan and click.

use crate::commands::{WorkflowCommand, WorkflowMutations};
use crate::interaction::issue;
use crate::notify::ToastQueue;
use crate::selection::{SelectionCoordinator, SelectionMode};
use crate::shortcuts::ArrowDirection;
use wf_core::CanvasConfig;
use wf_core::geometry::Position;
use wf_core::model::{ObjectRef, Workflow};
use wf_render::camera::Camera;

pub const ZOOM_STEP: f64 = 1.2;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;

/// Offset of one arrow-key move: a grid unit, or one canvas unit when fine.
pub fn keyboard_move_delta(direction: ArrowDirection, fine: bool, config: &CanvasConfig) -> Position {
    let unit = direction.unit();
    let (sx, sy) = if fine {
        (1.0, 1.0)
    } else {
        (config.grid_size_x, config.grid_size_y)
    };
    Position::new(unit.x * sx, unit.y * sy)
}

/// Move every selected object one step. Returns `false` when nothing moved
/// (read-only workflow, empty selection, only fixed objects selected, or
/// the backend rejected the move).
pub fn move_selection(
    workflow: &mut Workflow,
    selection: &SelectionCoordinator,
    mutations: &mut dyn WorkflowMutations,
    toasts: &mut ToastQueue,
    config: &CanvasConfig,
    direction: ArrowDirection,
    fine: bool,
) -> bool {
    if !workflow.writable {
        log::debug!("workflow is read-only, keyboard move ignored");
        return false;
    }
    let objects = selection
        .query_selection(SelectionMode::Committed)
        .selected_objects;
    let command =
        WorkflowCommand::move_objects(&objects, keyboard_move_delta(direction, fine, config));
    if let WorkflowCommand::MoveObjects {
        nodes,
        annotations,
        bendpoints,
        ..
    } = &command
        && nodes.is_empty()
        && annotations.is_empty()
        && bendpoints.is_empty()
    {
        return false;
    }
    issue(workflow, mutations, toasts, command)
}

/// Pan the camera so content in `direction` comes into view.
pub fn pan_camera(camera: &mut Camera, direction: ArrowDirection, config: &CanvasConfig) -> Position {
    let unit = direction.unit();
    let step = config.keyboard_pan_step;
    camera.pan_by_screen(-unit.x * step, -unit.y * step)
}

/// Zoom by `factor` around the centre of the viewport.
pub fn zoom_by(camera: &mut Camera, factor: f64) {
    let zoom = (camera.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    let centre = Position::new(
        camera.origin.x + camera.viewport_width / 2.0,
        camera.origin.y + camera.viewport_height / 2.0,
    );
    camera.zoom_around(zoom, centre);
}

pub fn reset_zoom(camera: &mut Camera) {
    zoom_by(camera, 1.0 / camera.zoom);
}

/// Visual centre of an object that keyboard focus can land on.
fn focus_center(workflow: &Workflow, config: &CanvasConfig, object: &ObjectRef) -> Option<Position> {
    let half = config.node_size / 2.0;
    match object {
        ObjectRef::Node(_) | ObjectRef::ComponentPlaceholder(_) => workflow
            .position_of(object)
            .map(|p| p + Position::new(half, half)),
        ObjectRef::Annotation(id) => workflow.annotation(*id).map(|a| a.bounds.as_rect().center()),
        ObjectRef::Bendpoint(_) | ObjectRef::PortBar { .. } => None,
    }
}

/// The closest focusable object inside the 90° cone around `direction`
/// as seen from `from`.
pub fn nearest_in_direction(
    workflow: &Workflow,
    config: &CanvasConfig,
    from: &ObjectRef,
    direction: ArrowDirection,
) -> Option<ObjectRef> {
    let origin = focus_center(workflow, config, from)
        .or_else(|| workflow.position_of(from))?;
    let unit = direction.unit();
    workflow
        .object_refs()
        .into_iter()
        .filter(|o| o != from)
        .filter_map(|o| {
            let c = focus_center(workflow, config, &o)?;
            let v = c - origin;
            let along = v.x * unit.x + v.y * unit.y;
            let across = (v.x * unit.y - v.y * unit.x).abs();
            (along > 0.0 && across <= along).then(|| (o, v.x * v.x + v.y * v.y))
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(o, _)| o)
}

/// Where keyboard selection starts from: the focused object, else the only
/// selected one.
pub fn navigation_origin(selection: &SelectionCoordinator) -> Option<ObjectRef> {
    selection.focus().or_else(|| {
        selection
            .query_selection(SelectionMode::Committed)
            .single_selected_object
    })
}

/// Every object Ctrl/Meta+A selects.
pub fn all_selectable(workflow: &Workflow) -> Vec<ObjectRef> {
    workflow
        .object_refs()
        .into_iter()
        .filter(|o| !matches!(o, ObjectRef::PortBar { .. }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::RecordingMutations;
    use pretty_assertions::assert_eq;
    use wf_core::geometry::Bounds;
    use wf_core::id::{AnnotationId, NodeId, WorkflowId};
    use wf_core::model::{Annotation, WorkflowNode};

    fn node(id: &str) -> ObjectRef {
        ObjectRef::Node(NodeId::intern(id))
    }

    fn grid_of_nodes() -> Workflow {
        let mut wf = Workflow::new(WorkflowId::intern("root"));
        for (id, x, y) in [
            ("k-center", 100.0, 100.0),
            ("k-right", 300.0, 120.0),
            ("k-far-right", 600.0, 100.0),
            ("k-diagonal", 300.0, 400.0),
            ("k-up", 100.0, -200.0),
        ] {
            wf.add_node(WorkflowNode::new(NodeId::intern(id), Position::new(x, y)));
        }
        wf
    }

    #[test]
    fn nearest_respects_the_cone() {
        let wf = grid_of_nodes();
        let config = CanvasConfig::default();
        let from = node("k-center");
        assert_eq!(
            nearest_in_direction(&wf, &config, &from, ArrowDirection::Right),
            Some(node("k-right"))
        );
        assert_eq!(
            nearest_in_direction(&wf, &config, &from, ArrowDirection::Up),
            Some(node("k-up"))
        );
        // (200, 300) away: more across than along for Right, inside for Down.
        assert_eq!(
            nearest_in_direction(&wf, &config, &from, ArrowDirection::Down),
            Some(node("k-diagonal"))
        );
        assert_eq!(
            nearest_in_direction(&wf, &config, &from, ArrowDirection::Left),
            None
        );
    }

    #[test]
    fn annotations_are_reachable_by_their_centre() {
        let mut wf = grid_of_nodes();
        wf.annotations.push(Annotation {
            id: AnnotationId::intern("k-note"),
            bounds: Bounds::new(-200.0, 80.0, 100.0, 80.0),
            text: String::new(),
        });
        assert_eq!(
            nearest_in_direction(&wf, &CanvasConfig::default(), &node("k-center"), ArrowDirection::Left),
            Some(ObjectRef::Annotation(AnnotationId::intern("k-note")))
        );
    }

    #[test]
    fn move_selection_uses_grid_or_fine_steps() {
        let mut wf = grid_of_nodes();
        let config = CanvasConfig::default();
        let mut selection = SelectionCoordinator::new();
        selection.select(&[node("k-center")], SelectionMode::Committed);
        let mut mutations = RecordingMutations::new();
        let mut toasts = ToastQueue::default();

        assert!(move_selection(
            &mut wf,
            &selection,
            &mut mutations,
            &mut toasts,
            &config,
            ArrowDirection::Right,
            false
        ));
        assert!(move_selection(
            &mut wf,
            &selection,
            &mut mutations,
            &mut toasts,
            &config,
            ArrowDirection::Up,
            true
        ));
        assert_eq!(
            wf.node(NodeId::intern("k-center")).map(|n| n.position),
            Some(Position::new(105.0, 99.0))
        );
        assert_eq!(mutations.issued().len(), 2);
    }

    #[test]
    fn rejected_keyboard_move_keeps_the_position() {
        let mut wf = grid_of_nodes();
        let config = CanvasConfig::default();
        let mut selection = SelectionCoordinator::new();
        selection.select(&[node("k-center")], SelectionMode::Committed);
        let mut mutations = RecordingMutations::new();
        mutations.fail_next("workflow locked");
        let mut toasts = ToastQueue::default();

        assert!(!move_selection(
            &mut wf,
            &selection,
            &mut mutations,
            &mut toasts,
            &config,
            ArrowDirection::Right,
            false
        ));
        assert_eq!(
            wf.node(NodeId::intern("k-center")).map(|n| n.position),
            Some(Position::new(100.0, 100.0))
        );
        assert_eq!(toasts.len(), 1);
        assert!(mutations.issued().is_empty());
    }

    #[test]
    fn read_only_or_empty_selection_does_not_move() {
        let mut wf = grid_of_nodes();
        let config = CanvasConfig::default();
        let mut selection = SelectionCoordinator::new();
        let mut mutations = RecordingMutations::new();
        let mut toasts = ToastQueue::default();
        assert!(!move_selection(
            &mut wf,
            &selection,
            &mut mutations,
            &mut toasts,
            &config,
            ArrowDirection::Right,
            false
        ));
        selection.select(&[node("k-center")], SelectionMode::Committed);
        wf.writable = false;
        assert!(!move_selection(
            &mut wf,
            &selection,
            &mut mutations,
            &mut toasts,
            &config,
            ArrowDirection::Right,
            false
        ));
        assert!(mutations.issued().is_empty());
    }

    #[test]
    fn pan_moves_the_view_towards_the_arrow() {
        let mut camera = Camera::new(800.0, 600.0);
        let config = CanvasConfig::default();
        pan_camera(&mut camera, ArrowDirection::Right, &config);
        assert_eq!(camera.offset(), Position::new(-50.0, 0.0));
        assert_eq!(camera.visible_area().left, 50.0);
    }

    #[test]
    fn zoom_keeps_the_viewport_centre_fixed() {
        let mut camera = Camera::new(800.0, 600.0);
        let centre = camera.screen_to_canvas(Position::new(400.0, 300.0));
        zoom_by(&mut camera, 2.0);
        assert_eq!(camera.zoom, 2.0);
        assert_eq!(camera.screen_to_canvas(Position::new(400.0, 300.0)), centre);
        reset_zoom(&mut camera);
        assert_eq!(camera.zoom, 1.0);
        zoom_by(&mut camera, 100.0);
        assert_eq!(camera.zoom, MAX_ZOOM);
    }
}
