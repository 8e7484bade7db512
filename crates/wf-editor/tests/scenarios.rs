//! Integration tests: end-to-end pointer scenarios through `CanvasEditor`
//! (wf-editor ↔ wf-render ↔ wf-core).
//!
//! Every scenario runs against both renderer surfaces; the interaction
//! outcome must not depend on which one draws the canvas.

use pretty_assertions::assert_eq;
use wf_core::geometry::Position;
use wf_core::id::{ConnectionId, NodeId, PortTypeId, WorkflowId};
use wf_core::model::*;
use wf_editor::commands::NodeSource;
use wf_editor::{
    CanvasEditor, GestureEnd, KeyEvent, Modifiers, PointerEvent, RecordingMutations,
    SelectionMode, WorkflowCommand, WorkflowMutations,
};
use wf_render::{Camera, CanvasSurface, SceneSurface, SvgSurface};

const VIEWPORT: (f64, f64) = (1600.0, 1200.0);

fn table() -> PortTypeId {
    PortTypeId::intern("table")
}

fn node_a() -> NodeId {
    NodeId::intern("scenario-a")
}

fn node_b() -> NodeId {
    NodeId::intern("scenario-b")
}

/// A at (100, 100), B at (300, 100), not connected.
fn workflow(writable: bool) -> Workflow {
    let mut wf = Workflow::new(WorkflowId::intern("root"));
    wf.writable = writable;
    wf.add_node(WorkflowNode::new(node_a(), Position::new(100.0, 100.0)).with_ports([table()], [table()]));
    wf.add_node(WorkflowNode::new(node_b(), Position::new(300.0, 100.0)).with_ports([table()], [table()]));
    wf
}

fn camera() -> Camera {
    Camera::new(VIEWPORT.0, VIEWPORT.1)
}

fn svg_editor(writable: bool) -> CanvasEditor<SvgSurface, RecordingMutations> {
    let _ = env_logger::builder().is_test(true).try_init();
    CanvasEditor::new(
        Default::default(),
        workflow(writable),
        SvgSurface::new(camera()),
        RecordingMutations::new(),
    )
}

fn scene_editor(writable: bool) -> CanvasEditor<SceneSurface, RecordingMutations> {
    let wf = workflow(writable);
    let surface = SceneSurface::new(camera(), &wf);
    CanvasEditor::new(Default::default(), wf, surface, RecordingMutations::new())
}

fn at(x: f64, y: f64) -> PointerEvent {
    PointerEvent::new(x, y, Modifiers::NONE, 0.0)
}

/// Pointer-down at `from`, move through each point (one frame each), release
/// at the last one.
fn drag<S: CanvasSurface, M: WorkflowMutations>(
    editor: &mut CanvasEditor<S, M>,
    from: (f64, f64),
    path: &[(f64, f64)],
) -> GestureEnd {
    editor.pointer_down(&at(from.0, from.1));
    let mut now = 0.0;
    for &(x, y) in path {
        now += 16.0;
        editor.pointer_move(at(x, y));
        editor.animation_frame(now);
    }
    let (x, y) = path.last().copied().unwrap_or(from);
    editor.pointer_up(&at(x, y))
}

fn committed<S: CanvasSurface, M: WorkflowMutations>(editor: &CanvasEditor<S, M>) -> Vec<ObjectRef> {
    editor
        .selection()
        .query_selection(SelectionMode::Committed)
        .selected_objects
}

// ─── Scenario A: click selects ──────────────────────────────────────────

#[test]
fn click_selects_unselected_node_without_commands() {
    let mut editor = svg_editor(true);
    assert_eq!(drag(&mut editor, (110.0, 110.0), &[]), GestureEnd::Click);
    assert_eq!(committed(&editor), vec![ObjectRef::Node(node_a())]);
    assert!(editor.mutations().issued().is_empty());

    let mut editor = scene_editor(true);
    assert_eq!(drag(&mut editor, (110.0, 110.0), &[]), GestureEnd::Click);
    assert_eq!(committed(&editor), vec![ObjectRef::Node(node_a())]);
    assert!(editor.mutations().issued().is_empty());
}

// ─── Scenario B: drag moves ─────────────────────────────────────────────

fn assert_moved_by_fifty<S: CanvasSurface>(editor: &CanvasEditor<S, RecordingMutations>) {
    assert_eq!(
        editor.mutations().issued(),
        &[WorkflowCommand::MoveObjects {
            nodes: vec![node_a()],
            annotations: vec![],
            bendpoints: vec![],
            delta: Position::new(50.0, 50.0),
        }]
    );
    assert_eq!(committed(editor), vec![ObjectRef::Node(node_a())]);
    assert_eq!(
        editor.workflow().node(node_a()).map(|n| n.position),
        Some(Position::new(150.0, 150.0))
    );
    assert_eq!(editor.surface().move_preview(), None);
}

#[test]
fn drag_beyond_threshold_issues_one_move() {
    let path = [(112.0, 111.0), (130.0, 130.0), (160.0, 160.0)];

    let mut editor = svg_editor(true);
    assert_eq!(drag(&mut editor, (110.0, 110.0), &path), GestureEnd::Drop);
    assert_moved_by_fifty(&editor);

    let mut editor = scene_editor(true);
    assert_eq!(drag(&mut editor, (110.0, 110.0), &path), GestureEnd::Drop);
    assert_moved_by_fifty(&editor);
    assert!(!editor.surface_mut().drag_optimizer().is_active());
}

#[test]
fn sub_threshold_wiggle_is_still_a_click() {
    let mut editor = svg_editor(true);
    assert_eq!(
        drag(&mut editor, (110.0, 110.0), &[(114.0, 113.0)]),
        GestureEnd::Click
    );
    assert!(editor.mutations().issued().is_empty());
}

// ─── Scenario C: drop onto a node replaces it ───────────────────────────

#[test]
fn drop_onto_node_replaces_it_exactly_once() {
    let mut editor = svg_editor(true);
    let end = drag(
        &mut editor,
        (110.0, 110.0),
        &[(150.0, 110.0), (220.0, 110.0), (260.0, 110.0)],
    );
    assert_eq!(end, GestureEnd::Drop);
    let issued = editor.mutations().issued();
    assert_eq!(
        issued,
        &[WorkflowCommand::ReplaceNode {
            target_node_id: node_b(),
            replacement: NodeSource::Existing { node_id: node_a() },
        }]
    );
    assert!(
        !issued
            .iter()
            .any(|c| matches!(c, WorkflowCommand::InsertNode { .. }))
    );
    // Structural commands wait for the backend; the mirror is untouched.
    assert_eq!(
        editor.workflow().node(node_a()).map(|n| n.position),
        Some(Position::new(100.0, 100.0))
    );
}

#[test]
fn connected_node_is_never_replaced() {
    let mut wf = workflow(true);
    wf.add_connection(Connection {
        id: ConnectionId::intern("scenario-a-b"),
        source: Endpoint::Node {
            node: node_a(),
            port: 0,
        },
        dest: Endpoint::Node {
            node: node_b(),
            port: 0,
        },
        bendpoints: vec![],
        allow_delete: true,
    })
    .expect("both nodes exist");
    let mut editor = CanvasEditor::new(
        Default::default(),
        wf,
        SvgSurface::new(camera()),
        RecordingMutations::new(),
    );
    drag(&mut editor, (110.0, 110.0), &[(260.0, 160.0)]);
    assert_eq!(
        editor.mutations().issued(),
        &[WorkflowCommand::MoveObjects {
            nodes: vec![node_a()],
            annotations: vec![],
            bendpoints: vec![],
            delta: Position::new(150.0, 50.0),
        }]
    );
}

// ─── Scenario D: read-only ──────────────────────────────────────────────

#[test]
fn read_only_workflow_selects_but_never_mutates() {
    let mut editor = svg_editor(false);
    let end = drag(
        &mut editor,
        (110.0, 110.0),
        &[(150.0, 110.0), (260.0, 110.0)],
    );
    assert_eq!(end, GestureEnd::Click);
    assert!(editor.mutations().issued().is_empty());
    assert_eq!(committed(&editor), vec![ObjectRef::Node(node_a())]);
    assert_eq!(editor.replacement_candidate(), None);
}

// ─── Scenario E: Escape aborts ──────────────────────────────────────────

fn escape_mid_drag<S: CanvasSurface>(editor: &mut CanvasEditor<S, RecordingMutations>) {
    editor.pointer_down(&at(110.0, 110.0));
    editor.pointer_move(at(160.0, 175.0));
    editor.animation_frame(16.0);
    assert_eq!(editor.surface().move_preview(), Some(Position::new(50.0, 65.0)));

    let esc = KeyEvent::new("Escape", Modifiers::NONE);
    editor.key_down(&esc);
    assert!(wf_editor::events::is_escape_handled(&esc));

    editor.pointer_move(at(200.0, 200.0));
    editor.animation_frame(32.0);
    assert_eq!(editor.pointer_up(&at(200.0, 200.0)), GestureEnd::Nothing);

    assert_eq!(
        editor.workflow().node(node_a()).map(|n| n.position),
        Some(Position::new(100.0, 100.0))
    );
    assert_eq!(editor.surface().move_preview(), None);
    assert!(editor.mutations().issued().is_empty());
    // The selection shown during the drag stays.
    assert_eq!(committed(editor), vec![ObjectRef::Node(node_a())]);
}

#[test]
fn escape_mid_drag_reverts_without_commands() {
    escape_mid_drag(&mut svg_editor(true));
    let mut editor = scene_editor(true);
    escape_mid_drag(&mut editor);
    assert!(!editor.surface_mut().drag_optimizer().is_active());
}

#[test]
fn second_escape_after_abort_deselects() {
    let mut editor = svg_editor(true);
    escape_mid_drag(&mut editor);
    editor.key_down(&KeyEvent::new("Escape", Modifiers::NONE));
    assert!(committed(&editor).is_empty());
}

// ─── Confirmation gate ──────────────────────────────────────────────────

#[test]
fn unsaved_selection_needs_confirmation_before_switching() {
    let mut editor = svg_editor(true);
    drag(&mut editor, (110.0, 110.0), &[]);
    editor.selection_mut().set_has_unsaved_changes(true);

    // Clicking B asks first; nothing moves even if the pointer does.
    drag(&mut editor, (310.0, 110.0), &[(360.0, 160.0)]);
    assert!(editor.is_awaiting_confirmation());
    assert!(editor.mutations().issued().is_empty());
    assert_eq!(committed(&editor), vec![ObjectRef::Node(node_a())]);

    assert!(editor.resolve_confirmation(true));
    assert_eq!(committed(&editor), vec![ObjectRef::Node(node_b())]);
    assert!(editor.machine().is_idle());
}
