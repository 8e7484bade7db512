//! Pointer interaction with canvas objects: select, drag, double-click.
//!
//! Every selectable object (node, annotation, bendpoint, port bar,
//! component placeholder) runs through the same state machine:
//!
//! ```text
//! Idle ──down──▶ AwaitingGesture ──significant move──▶ Dragging ──up──▶ Idle (drop)
//!   │                  │ up (click)                        │ Escape
//!   │                  ▼                                   ▼
//!   │                 Idle                                Idle (aborted)
//!   └──down, selection can't be discarded──▶ AwaitingConfirmation ──resolve──▶ Idle
//! ```
//!
//! Unselected annotations use a click-only variant (`PendingClick`): any
//! significant move cancels the gesture so a rubber band started on top of
//! an annotation doesn't select it. Read-only workflows get `SelectOnly`.
//!
//! The machine only talks to the renderer through [`CanvasSurface`], so the
//! SVG and the scene-graph canvas share it.

use crate::collision::{CollisionQuery, DragPayload, ReplacementOperation};
use crate::commands::{PositionMode, WorkflowCommand, WorkflowMutations};
use crate::edge_pan::PanTick;
use crate::events::{
    DoubleClickDetector, MarkOptions, mark_escape_as_handled, mark_event_as_handled,
};
use crate::input::{AsPointerEvent, KeyEvent};
use crate::notify::ToastQueue;
use crate::position::DragPositionTracker;
use crate::selection::{ClearOutcome, SelectionCoordinator, SelectionMode, SelectionSnapshot};
use crate::session::{DragSession, InteractionSession};
use std::fmt;
use thiserror::Error;
use wf_core::CanvasConfig;
use wf_core::geometry::Position;
use wf_core::id::{BendpointId, ConnectionId};
use wf_core::model::{ObjectRef, Workflow};
use wf_render::{CanvasSurface, InteractionMode};

/// Programming errors: the machine and the session disagree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteractionError {
    #[error("drag operation called while no drag is in progress")]
    NotDragging,
    #[error("{0} is not on the canvas")]
    UnknownObject(ObjectRef),
}

/// Everything the machine reads or mutates, borrowed from the editor for
/// the duration of one event.
pub struct InteractionContext<'a> {
    pub workflow: &'a mut Workflow,
    pub selection: &'a mut SelectionCoordinator,
    pub surface: &'a mut dyn CanvasSurface,
    pub mutations: &'a mut dyn WorkflowMutations,
    pub session: &'a mut InteractionSession,
    pub toasts: &'a mut ToastQueue,
    pub config: &'a CanvasConfig,
    pub side_panel_open: &'a mut bool,
}

// ─── Options & outcomes ──────────────────────────────────────────────────

/// Summary of a finished drag, handed to the `on_move_end` hook.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveEnd {
    pub target: ObjectRef,
    pub objects: Vec<ObjectRef>,
    pub delta: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveEndVerdict {
    /// Commit the move as usual.
    Commit,
    /// Drop the move; nothing is issued.
    Veto,
    /// Issue these commands instead of the move.
    Replace(Vec<WorkflowCommand>),
}

pub type DoubleClickHook = Box<dyn FnOnce(ObjectRef)>;
pub type MoveEndHook = Box<dyn FnOnce(&MoveEnd) -> MoveEndVerdict>;

/// Per-object extras for [`InteractionMachine::pointer_down`].
#[derive(Default)]
pub struct InteractionOptions {
    pub on_double_click: Option<DoubleClickHook>,
    pub on_move_end: Option<MoveEndHook>,
    /// Start position of an object that doesn't exist yet.
    pub virtual_origin: Option<Position>,
}

impl InteractionOptions {
    pub fn on_double_click(mut self, hook: impl FnOnce(ObjectRef) + 'static) -> Self {
        self.on_double_click = Some(Box::new(hook));
        self
    }

    pub fn on_move_end(mut self, hook: impl FnOnce(&MoveEnd) -> MoveEndVerdict + 'static) -> Self {
        self.on_move_end = Some(Box::new(hook));
        self
    }

    /// Dragging the midpoint handle of a connection segment creates a
    /// bendpoint there instead of moving anything.
    pub fn virtual_bendpoint(connection_id: ConnectionId, index: usize, origin: Position) -> Self {
        Self {
            virtual_origin: Some(origin),
            ..Self::default()
        }
        .on_move_end(move |end| {
            MoveEndVerdict::Replace(vec![WorkflowCommand::InsertBendpoint {
                connection_id,
                index,
                position: origin + end.delta,
            }])
        })
    }

    /// The object a virtual bendpoint handle stands for.
    pub fn virtual_bendpoint_ref(connection_id: ConnectionId, index: usize) -> ObjectRef {
        ObjectRef::Bendpoint(BendpointId::new(connection_id, index))
    }
}

impl fmt::Debug for InteractionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionOptions")
            .field("on_double_click", &self.on_double_click.is_some())
            .field("on_move_end", &self.on_move_end.is_some())
            .field("virtual_origin", &self.virtual_origin)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDownOutcome {
    /// Another gesture owns the pointer, or the object is gone.
    Ignored,
    DoubleClicked,
    /// The selection holds unsaved changes; the host must ask the user and
    /// call [`InteractionMachine::resolve_confirmation`].
    ConfirmationRequested,
    /// The selection was replaced without a gesture (no confirmation needed
    /// but the selection could not be discarded silently either).
    Selected,
    /// Multi-select modifier: membership toggled, no drag.
    SelectionToggled,
    /// Waiting for move or release.
    GestureStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEnd {
    Nothing,
    Click,
    Drop,
}

/// What a selection request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRequest {
    Done,
    NeedsConfirmation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    Idle,
    AwaitingConfirmation {
        then_select: Option<ObjectRef>,
    },
    /// Unselected annotation: select on release, cancel on move.
    PendingClick {
        target: ObjectRef,
        pointer_id: i32,
        tracker: DragPositionTracker,
    },
    /// Read-only workflow: selection only, never a drag.
    SelectOnly {
        target: ObjectRef,
        pointer_id: i32,
    },
    /// Pointer is down, the drag session is set up, no significant move yet.
    AwaitingGesture,
    Dragging,
}

// ─── Per-kind behaviour ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct ObjectHandler {
    initiator: &'static str,
    /// Moves together with the rest of the selection.
    group_movable: bool,
    /// Unselected objects are selected by a click only, never dragged.
    click_to_select: bool,
}

impl ObjectHandler {
    fn for_object(object: &ObjectRef) -> Self {
        match object {
            ObjectRef::Node(_) => Self {
                initiator: "node",
                group_movable: true,
                click_to_select: false,
            },
            ObjectRef::Annotation(_) => Self {
                initiator: "annotation",
                group_movable: true,
                click_to_select: true,
            },
            ObjectRef::Bendpoint(_) => Self {
                initiator: "bendpoint",
                group_movable: true,
                click_to_select: false,
            },
            ObjectRef::PortBar { .. } => Self {
                initiator: "port-bar",
                group_movable: false,
                click_to_select: false,
            },
            ObjectRef::ComponentPlaceholder(_) => Self {
                initiator: "component-placeholder",
                group_movable: false,
                click_to_select: false,
            },
        }
    }

    fn drag_set(&self, target: ObjectRef, selection: &SelectionSnapshot) -> Vec<ObjectRef> {
        if !self.group_movable {
            return vec![target];
        }
        let mut objects: Vec<ObjectRef> = selection
            .selected_objects
            .iter()
            .filter(|o| Self::for_object(o).group_movable)
            .copied()
            .collect();
        if !objects.contains(&target) {
            objects.push(target);
        }
        objects
    }

    fn move_command(&self, drag: &DragSession) -> WorkflowCommand {
        if self.group_movable {
            WorkflowCommand::move_objects(&drag.objects, drag.delta)
        } else {
            WorkflowCommand::UpdatePosition {
                object: drag.target,
                position: drag.delta,
                mode: PositionMode::Add,
            }
        }
    }
}

/// Send `command` to the backend and mirror it locally once accepted.
/// Failures are logged and toasted, never propagated, and leave the local
/// workflow untouched.
pub(crate) fn issue(
    workflow: &mut Workflow,
    mutations: &mut dyn WorkflowMutations,
    toasts: &mut ToastQueue,
    command: WorkflowCommand,
) -> bool {
    let name = command.name();
    if let Err(err) = mutations.dispatch(command.clone()) {
        log::error!("{name} failed: {err} ({command:?})");
        toasts.error(failure_headline(name), err.to_string());
        return false;
    }
    if let Err(err) = command.apply_locally(workflow) {
        log::warn!("could not apply {name} to the local workflow: {err}");
    }
    true
}

fn failure_headline(command: &str) -> &'static str {
    match command {
        "replaceNode" => "Could not replace node",
        "insertNode" | "addComponentNode" | "addNode" => "Could not add node",
        "updateAnnotationBounds" => "Could not resize annotation",
        "insertBendpoint" => "Could not add bendpoint",
        _ => "Could not move objects",
    }
}

fn select_only(selection: &mut SelectionCoordinator, target: ObjectRef, mode: SelectionMode) {
    selection.deselect_all(&[target], mode);
    selection.select(&[target], mode);
}

// ─── State machine ───────────────────────────────────────────────────────

pub struct InteractionMachine {
    state: GestureState,
    double_click: DoubleClickDetector,
    move_end_hook: Option<MoveEndHook>,
}

impl fmt::Debug for InteractionMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionMachine")
            .field("state", &self.state)
            .field("double_click", &self.double_click)
            .field("move_end_hook", &self.move_end_hook.is_some())
            .finish()
    }
}

impl InteractionMachine {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            state: GestureState::Idle,
            double_click: DoubleClickDetector::new(config.double_click_window_ms),
            move_end_hook: None,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state == GestureState::Dragging
    }

    pub fn is_idle(&self) -> bool {
        self.state == GestureState::Idle
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        matches!(self.state, GestureState::AwaitingConfirmation { .. })
    }

    /// Pointer-down on a canvas object.
    pub fn pointer_down(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        target: ObjectRef,
        event: &impl AsPointerEvent,
        options: InteractionOptions,
    ) -> PointerDownOutcome {
        let handler = ObjectHandler::for_object(&target);
        mark_event_as_handled(event, MarkOptions::new(handler.initiator));
        let pointer = event.pointer();

        match &self.state {
            GestureState::Idle => {}
            GestureState::AwaitingConfirmation { then_select } if *then_select == Some(target) => {
                log::debug!("{target} is waiting for confirmation, ignoring pointer-down");
                return PointerDownOutcome::Ignored;
            }
            // A newer request replaces the pending one.
            GestureState::AwaitingConfirmation { .. } => {}
            other => {
                log::debug!("pointer-down on {target} while {other:?}, ignoring");
                return PointerDownOutcome::Ignored;
            }
        }

        let epsilon = ctx.surface.double_click_epsilon(ctx.config.double_click_epsilon);
        let is_double = self
            .double_click
            .register(pointer.timestamp_ms, pointer.client, epsilon);
        if is_double && let Some(hook) = options.on_double_click {
            *ctx.side_panel_open = true;
            hook(target);
            return PointerDownOutcome::DoubleClicked;
        }

        let committed = ctx.selection.query_selection(SelectionMode::Committed);
        let was_selected = committed.contains(&target);
        if !ctx.selection.can_clear_current_selection()
            && committed.single_selected_object != Some(target)
        {
            return match self.request_selection(ctx.selection, Some(target)) {
                SelectionRequest::Done => PointerDownOutcome::Selected,
                SelectionRequest::NeedsConfirmation => PointerDownOutcome::ConfirmationRequested,
            };
        }
        if self.is_awaiting_confirmation() {
            // Back on the sole selected object: the selection is kept.
            log::debug!("pointer-down on {target} withdraws the pending selection change");
            ctx.selection.resolve_clear(false);
        }
        self.state = GestureState::Idle;

        if pointer.modifiers.is_multi_select() {
            if was_selected {
                ctx.selection.deselect(&[target], SelectionMode::Committed);
            } else {
                ctx.selection.select(&[target], SelectionMode::Committed);
            }
            return PointerDownOutcome::SelectionToggled;
        }

        let start = ctx.surface.screen_to_canvas(pointer.client);
        let Some(origin) = options
            .virtual_origin
            .or_else(|| ctx.workflow.position_of(&target))
        else {
            log::error!("{}", InteractionError::UnknownObject(target));
            return PointerDownOutcome::Ignored;
        };

        if handler.click_to_select && !was_selected {
            self.state = GestureState::PendingClick {
                target,
                pointer_id: pointer.pointer_id,
                tracker: DragPositionTracker::new(target.kind(), start, origin, ctx.config),
            };
            return PointerDownOutcome::GestureStarted;
        }

        if !was_selected {
            ctx.selection.deselect_all(&[], SelectionMode::Preview);
            ctx.selection.select(&[target], SelectionMode::Preview);
        }

        if !ctx.workflow.writable {
            self.state = GestureState::SelectOnly {
                target,
                pointer_id: pointer.pointer_id,
            };
            return PointerDownOutcome::GestureStarted;
        }

        let is_virtual = options.virtual_origin.is_some();
        let objects = if is_virtual {
            vec![target]
        } else {
            handler.drag_set(target, &ctx.selection.query_selection(SelectionMode::Preview))
        };
        let original_positions = if is_virtual {
            vec![(target, origin)]
        } else {
            objects
                .iter()
                .filter_map(|o| ctx.workflow.position_of(o).map(|p| (*o, p)))
                .collect()
        };
        let payload = match objects.as_slice() {
            [ObjectRef::Node(id)] => Some(DragPayload::ExistingNode(*id)),
            _ => None,
        };
        let drag = DragSession {
            target,
            pointer_id: pointer.pointer_id,
            objects,
            original_positions,
            tracker: DragPositionTracker::new(target.kind(), start, origin, ctx.config),
            delta: Position::ORIGIN,
            last_client: pointer.client,
            alt: pointer.modifiers.alt,
            dragging: false,
            payload,
            is_virtual,
        };
        if !ctx.session.start_drag(drag, ctx.workflow, ctx.config) {
            return PointerDownOutcome::Ignored;
        }
        ctx.surface.capture_pointer(pointer.pointer_id);
        self.move_end_hook = options.on_move_end;
        self.state = GestureState::AwaitingGesture;
        PointerDownOutcome::GestureStarted
    }

    pub fn pointer_move(&mut self, ctx: &mut InteractionContext<'_>, event: &impl AsPointerEvent) {
        let pointer = event.pointer();
        match &self.state {
            GestureState::Idle
            | GestureState::AwaitingConfirmation { .. }
            | GestureState::SelectOnly { .. } => {}
            GestureState::PendingClick {
                target,
                pointer_id,
                tracker,
            } => {
                if *pointer_id != pointer.pointer_id {
                    return;
                }
                let p = ctx.surface.screen_to_canvas(pointer.client);
                if tracker.delta(p, false).significant {
                    log::debug!("pointer moved, click on {target} cancelled");
                    self.state = GestureState::Idle;
                }
            }
            GestureState::AwaitingGesture | GestureState::Dragging => {
                let drag = match ctx.session.drag_mut() {
                    Ok(drag) => drag,
                    Err(err) => {
                        self.fail(err);
                        return;
                    }
                };
                if drag.pointer_id != pointer.pointer_id {
                    return;
                }
                drag.last_client = pointer.client;
                drag.alt = pointer.modifiers.alt;
                self.update_drag(ctx);
            }
        }
    }

    /// Recompute the drag from the last pointer position (after a pointer
    /// move or an edge-pan scroll).
    fn update_drag(&mut self, ctx: &mut InteractionContext<'_>) {
        let drag = match ctx.session.drag_mut() {
            Ok(drag) => drag,
            Err(err) => {
                self.fail(err);
                return;
            }
        };
        let canvas = ctx.surface.screen_to_canvas(drag.last_client);
        let step = drag.tracker.delta(canvas, drag.alt);
        if !drag.dragging {
            if !step.significant {
                return;
            }
            drag.dragging = true;
            ctx.surface.hide_port_selection();
            if drag.is_multi_object() {
                ctx.surface.set_interaction_mode(InteractionMode::CameraOnly);
            }
            ctx.surface.drag_optimizer().start(&drag.objects);
            self.state = GestureState::Dragging;
            log::debug!("dragging {} object(s)", drag.objects.len());
        }
        drag.delta = step.delta;
        ctx.surface.set_move_preview(&drag.objects, Some(step.delta));
        ctx.surface.drag_optimizer().update(step.delta);

        let client = drag.last_client;
        let collision = drag.payload.clone().map(|payload| {
            let position = drag.original_position(&drag.target).unwrap_or_default() + step.delta;
            (payload, position)
        });
        if let Some((payload, position)) = collision {
            ctx.session.collision.check(&CollisionQuery {
                workflow: &*ctx.workflow,
                surface: &*ctx.surface,
                config: ctx.config,
                payload: &payload,
                position,
                client,
            });
        }
        ctx.session
            .edge_pan
            .track_pointer(ctx.surface.camera(), client, ctx.config);
    }

    /// One animation frame: run the edge-pan loop and keep the dragged
    /// objects under the pointer while the camera scrolls.
    pub fn animation_frame(&mut self, ctx: &mut InteractionContext<'_>) -> Option<PanTick> {
        if self.state != GestureState::Dragging {
            return None;
        }
        let tick = ctx
            .session
            .edge_pan
            .tick(ctx.surface.camera_mut(), ctx.config)?;
        if !tick.scrolled.is_zero() {
            self.update_drag(ctx);
        }
        Some(tick)
    }

    pub fn pointer_up(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        event: &impl AsPointerEvent,
    ) -> GestureEnd {
        let pointer = event.pointer();
        match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Idle => GestureEnd::Nothing,
            state @ GestureState::AwaitingConfirmation { .. } => {
                self.state = state;
                GestureEnd::Nothing
            }
            GestureState::PendingClick {
                target, pointer_id, ..
            }
            | GestureState::SelectOnly { target, pointer_id } => {
                if pointer_id != pointer.pointer_id {
                    log::trace!("pointer-up of another pointer, ignoring");
                    return GestureEnd::Nothing;
                }
                select_only(ctx.selection, target, SelectionMode::Preview);
                ctx.selection.commit_selection_preview();
                GestureEnd::Click
            }
            state @ (GestureState::AwaitingGesture | GestureState::Dragging) => {
                if ctx
                    .session
                    .drag()
                    .is_some_and(|d| d.pointer_id != pointer.pointer_id)
                {
                    self.state = state;
                    return GestureEnd::Nothing;
                }
                let candidate = ctx.session.collision.take_candidate();
                let Some(drag) = ctx.session.end_drag() else {
                    self.fail(InteractionError::NotDragging);
                    ctx.selection.commit_selection_preview();
                    return GestureEnd::Nothing;
                };
                ctx.surface.set_interaction_mode(InteractionMode::Full);
                ctx.surface.release_pointer(drag.pointer_id);
                let hook = self.move_end_hook.take();
                let outcome = if drag.dragging {
                    finish_drag(ctx, &drag, candidate, hook);
                    GestureEnd::Drop
                } else {
                    select_only(ctx.selection, drag.target, SelectionMode::Preview);
                    GestureEnd::Click
                };
                ctx.selection.commit_selection_preview();
                outcome
            }
        }
    }

    /// Abort the running gesture. Idempotent; returns whether anything was
    /// aborted. The selection shown during the gesture is kept.
    pub fn abort(&mut self, ctx: &mut InteractionContext<'_>) -> bool {
        match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::AwaitingGesture | GestureState::Dragging => {
                self.move_end_hook = None;
                let Some(drag) = ctx.session.end_drag() else {
                    self.fail(InteractionError::NotDragging);
                    return false;
                };
                if !drag.is_virtual {
                    for (object, position) in &drag.original_positions {
                        if let Err(err) = ctx.workflow.set_position(object, *position) {
                            log::warn!("could not restore {object}: {err}");
                        }
                    }
                }
                ctx.surface.drag_optimizer().abort();
                ctx.surface.set_move_preview(&[], None);
                ctx.surface.set_interaction_mode(InteractionMode::Full);
                ctx.surface.release_pointer(drag.pointer_id);
                ctx.selection.commit_selection_preview();
                log::debug!("drag of {} aborted", drag.target);
                true
            }
            GestureState::PendingClick { .. } | GestureState::SelectOnly { .. } => {
                ctx.selection.discard_selection_preview();
                true
            }
            state @ (GestureState::Idle | GestureState::AwaitingConfirmation { .. }) => {
                self.state = state;
                false
            }
        }
    }

    /// Escape while a gesture runs aborts it and claims the key press.
    pub fn handle_escape(&mut self, ctx: &mut InteractionContext<'_>, event: &KeyEvent) -> bool {
        let armed = ctx.session.take_escape();
        let aborted = match self.state {
            GestureState::AwaitingGesture | GestureState::Dragging if !armed => false,
            _ => self.abort(ctx),
        };
        if aborted {
            mark_escape_as_handled(event, "object-interaction");
        }
        aborted
    }

    /// Replace the selection with `then_select` (or clear it), asking for
    /// confirmation first if the current selection can't be discarded.
    pub fn request_selection(
        &mut self,
        selection: &mut SelectionCoordinator,
        then_select: Option<ObjectRef>,
    ) -> SelectionRequest {
        match selection.try_clear_selection() {
            ClearOutcome::Cleared => {
                if let Some(object) = then_select {
                    selection.select(&[object], SelectionMode::Committed);
                }
                self.state = GestureState::Idle;
                SelectionRequest::Done
            }
            ClearOutcome::NeedsConfirmation => {
                self.state = GestureState::AwaitingConfirmation { then_select };
                SelectionRequest::NeedsConfirmation
            }
        }
    }

    /// The user answered the confirmation prompt. No drag starts from the
    /// gesture that triggered it.
    pub fn resolve_confirmation(
        &mut self,
        selection: &mut SelectionCoordinator,
        confirmed: bool,
    ) -> bool {
        let GestureState::AwaitingConfirmation { then_select } = self.state else {
            log::warn!("confirmation resolved while {:?}", self.state);
            return false;
        };
        self.state = GestureState::Idle;
        let result = selection.resolve_clear(confirmed);
        if result.was_aborted {
            log::debug!("selection change aborted by the user");
            return false;
        }
        if let Some(object) = then_select {
            selection.select(&[object], SelectionMode::Committed);
        }
        true
    }

    fn fail(&mut self, err: InteractionError) {
        log::error!("interaction state corrupted: {err}; resetting");
        self.state = GestureState::Idle;
        self.move_end_hook = None;
    }
}

fn finish_drag(
    ctx: &mut InteractionContext<'_>,
    drag: &DragSession,
    candidate: Option<ReplacementOperation>,
    hook: Option<MoveEndHook>,
) {
    ctx.surface.drag_optimizer().end();
    ctx.surface.set_move_preview(&[], None);

    let end = MoveEnd {
        target: drag.target,
        objects: drag.objects.clone(),
        delta: drag.delta,
    };
    let verdict = hook.map_or(MoveEndVerdict::Commit, |hook| hook(&end));
    let commands = match verdict {
        MoveEndVerdict::Veto => {
            log::debug!("move of {} vetoed", drag.target);
            Vec::new()
        }
        MoveEndVerdict::Replace(commands) => commands,
        MoveEndVerdict::Commit => match (candidate, &drag.payload) {
            (Some(operation), Some(payload)) => {
                let position =
                    drag.original_position(&drag.target).unwrap_or_default() + drag.delta;
                vec![operation.command(payload, position)]
            }
            _ if drag.delta.is_zero() || drag.is_virtual => Vec::new(),
            _ => vec![ObjectHandler::for_object(&drag.target).move_command(drag)],
        },
    };
    for command in commands {
        issue(ctx.workflow, ctx.mutations, ctx.toasts, command);
    }
}
