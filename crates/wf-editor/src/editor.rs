//! The canvas editor: owns the workflow mirror, the selection, one renderer
//! surface and the mutation bridge, and routes host events to the
//! interaction machine, the transform controls, the marquee and the
//! keyboard handlers.
//!
//! Pointer moves are coalesced: [`CanvasEditor::pointer_move`] only records
//! the latest event and [`CanvasEditor::animation_frame`] processes it, so a
//! frame never does more than one drag update.

use crate::collision::{CollisionQuery, DragPayload};
use crate::commands::{ComponentPlacement, WorkflowCommand, WorkflowMutations};
use crate::edge_pan::PanTick;
use crate::events::{MarkOptions, is_escape_handled, mark_escape_as_handled, mark_event_as_handled};
use crate::input::{KeyEvent, PointerEvent};
use crate::interaction::{
    GestureEnd, InteractionContext, InteractionError, InteractionMachine, InteractionOptions,
    PointerDownOutcome, SelectionRequest, issue,
};
use crate::keyboard;
use crate::marquee::{Marquee, MarqueeEnd};
use crate::notify::{Toast, ToastQueue, TooltipTimer};
use crate::selection::{SelectionCoordinator, SelectionMode};
use crate::session::InteractionSession;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::transform::{Direction, TransformSession};
use wf_core::CanvasConfig;
use wf_core::geometry::{Bounds, Position};
use wf_core::id::AnnotationId;
use wf_core::model::{ObjectRef, Workflow};
use wf_render::CanvasSurface;

/// A node or component dragged in from outside the canvas.
#[derive(Debug, Clone, PartialEq)]
struct ExternalDrag {
    payload: DragPayload,
    position: Position,
}

pub struct CanvasEditor<S: CanvasSurface, M: WorkflowMutations> {
    config: CanvasConfig,
    workflow: Workflow,
    selection: SelectionCoordinator,
    surface: S,
    mutations: M,
    session: InteractionSession,
    machine: InteractionMachine,
    toasts: ToastQueue,
    tooltip: TooltipTimer,
    transform: Option<TransformSession>,
    marquee: Option<Marquee>,
    external: Option<ExternalDrag>,
    pending_move: Option<PointerEvent>,
    side_panel_open: bool,
}

impl<S: CanvasSurface, M: WorkflowMutations> CanvasEditor<S, M> {
    pub fn new(config: CanvasConfig, workflow: Workflow, mut surface: S, mutations: M) -> Self {
        surface.workflow_changed(&workflow);
        Self {
            machine: InteractionMachine::new(&config),
            tooltip: TooltipTimer::new(config.tooltip_show_delay_ms, config.tooltip_hide_delay_ms),
            config,
            workflow,
            selection: SelectionCoordinator::new(),
            surface,
            mutations,
            session: InteractionSession::default(),
            toasts: ToastQueue::default(),
            transform: None,
            marquee: None,
            external: None,
            pending_move: None,
            side_panel_open: false,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn selection(&self) -> &SelectionCoordinator {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionCoordinator {
        &mut self.selection
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn mutations(&self) -> &M {
        &self.mutations
    }

    pub fn mutations_mut(&mut self) -> &mut M {
        &mut self.mutations
    }

    pub fn machine(&self) -> &InteractionMachine {
        &self.machine
    }

    pub fn session(&self) -> &InteractionSession {
        &self.session
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn drain_toasts(&mut self) -> Vec<Toast> {
        self.toasts.drain()
    }

    pub fn is_side_panel_open(&self) -> bool {
        self.side_panel_open
    }

    pub fn set_side_panel_open(&mut self, open: bool) {
        self.side_panel_open = open;
    }

    pub fn visible_tooltip(&self) -> Option<ObjectRef> {
        self.tooltip.visible()
    }

    pub fn marquee(&self) -> Option<&Marquee> {
        self.marquee.as_ref()
    }

    fn with_machine<R>(
        &mut self,
        f: impl FnOnce(&mut InteractionMachine, &mut InteractionContext<'_>) -> R,
    ) -> R {
        let mut ctx = InteractionContext {
            workflow: &mut self.workflow,
            selection: &mut self.selection,
            surface: &mut self.surface,
            mutations: &mut self.mutations,
            session: &mut self.session,
            toasts: &mut self.toasts,
            config: &self.config,
            side_panel_open: &mut self.side_panel_open,
        };
        f(&mut self.machine, &mut ctx)
    }

    // ─── Workflow updates ────────────────────────────────────────────────

    /// Replace the local mirror with a backend snapshot. A running drag is
    /// aborted; selected objects that no longer exist are deselected.
    pub fn apply_workflow(&mut self, workflow: Workflow) {
        if self.with_machine(|m, ctx| m.abort(ctx)) {
            log::debug!("workflow replaced during a drag, drag aborted");
        }
        if let Some(transform) = self.transform.take() {
            transform.abort();
        }
        self.workflow = workflow;
        self.surface.workflow_changed(&self.workflow);
        let gone: Vec<ObjectRef> = self
            .selection
            .query_selection(SelectionMode::Committed)
            .selected_objects
            .into_iter()
            .filter(|o| !self.workflow.contains(o))
            .collect();
        if !gone.is_empty() {
            self.selection.deselect(&gone, SelectionMode::Committed);
        }
    }

    /// The host reports that a dispatched command failed on the backend.
    pub fn report_command_failure(&mut self, command: &str, message: &str) {
        log::error!("{command} failed on the backend: {message}");
        self.toasts.error(&format!("{command} failed"), message);
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Pointer-down anywhere on the canvas. Objects are found by hit
    /// testing; the background starts a marquee.
    pub fn pointer_down(&mut self, event: &PointerEvent) -> PointerDownOutcome {
        let target = self
            .surface
            .find_object_from_screen_coordinates(&self.workflow, &self.config, event.client)
            .and_then(|hit| hit.object);
        match target {
            Some(object) => self.pointer_down_on(object, event, InteractionOptions::default()),
            None => self.background_pointer_down(event),
        }
    }

    /// Pointer-down the host already attributed to `target`.
    pub fn pointer_down_on(
        &mut self,
        target: ObjectRef,
        event: &PointerEvent,
        options: InteractionOptions,
    ) -> PointerDownOutcome {
        if !event.is_primary() {
            return PointerDownOutcome::Ignored;
        }
        self.tooltip.dismiss();
        self.with_machine(|m, ctx| m.pointer_down(ctx, target, event, options))
    }

    pub fn background_pointer_down(&mut self, event: &PointerEvent) -> PointerDownOutcome {
        if !event.is_primary() || !self.machine.is_idle() || self.marquee.is_some() {
            return PointerDownOutcome::Ignored;
        }
        let start = self.surface.screen_to_canvas(event.client);
        match Marquee::start(event, start, &self.selection) {
            Some(marquee) => {
                self.marquee = Some(marquee);
                PointerDownOutcome::GestureStarted
            }
            None => PointerDownOutcome::Ignored,
        }
    }

    /// Record a pointer move; it is processed on the next animation frame.
    pub fn pointer_move(&mut self, event: PointerEvent) {
        if self.pending_move.replace(event).is_some() {
            log::trace!("pointer move coalesced");
        }
    }

    fn flush_pointer_move(&mut self) {
        let Some(event) = self.pending_move.take() else {
            return;
        };
        let canvas = self.surface.screen_to_canvas(event.client);
        if let Some(transform) = &mut self.transform {
            if transform.pointer_id == event.pointer_id {
                transform.update(canvas, &self.config);
            }
            return;
        }
        if let Some(marquee) = &mut self.marquee {
            if marquee.pointer_id() == event.pointer_id {
                marquee.update(canvas, &self.workflow, &self.config, &mut self.selection);
            }
            return;
        }
        self.with_machine(|m, ctx| m.pointer_move(ctx, &event));
    }

    /// One animation frame at host time `now_ms`.
    pub fn animation_frame(&mut self, now_ms: f64) -> Option<PanTick> {
        self.flush_pointer_move();
        let tick = self.with_machine(|m, ctx| m.animation_frame(ctx));
        self.tooltip.tick(now_ms);
        tick
    }

    pub fn pointer_up(&mut self, event: &PointerEvent) -> GestureEnd {
        self.flush_pointer_move();

        if self
            .transform
            .as_ref()
            .is_some_and(|t| t.pointer_id == event.pointer_id)
        {
            return if self.end_transform() {
                GestureEnd::Drop
            } else {
                GestureEnd::Nothing
            };
        }

        if self
            .marquee
            .as_ref()
            .is_some_and(|m| m.pointer_id() == event.pointer_id)
            && let Some(marquee) = self.marquee.take()
        {
            return match marquee.end(&mut self.selection) {
                MarqueeEnd::Selected(_) => GestureEnd::Drop,
                MarqueeEnd::Click { additive: true } => GestureEnd::Click,
                MarqueeEnd::Click { additive: false } => {
                    self.selection.set_focus(None);
                    let selection = &mut self.selection;
                    self.machine.request_selection(selection, None);
                    GestureEnd::Click
                }
            };
        }

        self.with_machine(|m, ctx| m.pointer_up(ctx, event))
    }

    // ─── Hover ───────────────────────────────────────────────────────────

    pub fn pointer_enter(&mut self, object: ObjectRef, now_ms: f64) {
        if self.machine.is_idle() {
            self.tooltip.pointer_enter(object, now_ms);
        }
    }

    pub fn pointer_leave(&mut self, now_ms: f64) {
        self.tooltip.pointer_leave(now_ms);
    }

    // ─── Confirmation ────────────────────────────────────────────────────

    /// Answer to the "discard the current selection?" prompt.
    pub fn resolve_confirmation(&mut self, confirmed: bool) -> bool {
        self.machine.resolve_confirmation(&mut self.selection, confirmed)
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        self.selection.has_pending_clear()
    }

    // ─── Annotation transform ────────────────────────────────────────────

    /// Pointer-down on a resize handle of `annotation`.
    pub fn start_transform(
        &mut self,
        annotation: AnnotationId,
        direction: Direction,
        event: &PointerEvent,
    ) -> Result<bool, InteractionError> {
        mark_event_as_handled(event, MarkOptions::new("transform-controls"));
        if !self.workflow.writable || self.transform.is_some() || !self.machine.is_idle() {
            return Ok(false);
        }
        let bounds = self
            .workflow
            .annotation(annotation)
            .map(|a| a.bounds)
            .ok_or(InteractionError::UnknownObject(ObjectRef::Annotation(annotation)))?;
        let start = self.surface.screen_to_canvas(event.client);
        self.surface.capture_pointer(event.pointer_id);
        self.tooltip.dismiss();
        self.transform = Some(TransformSession::start(
            annotation, direction, bounds, start, event,
        ));
        Ok(true)
    }

    /// Bounds to draw for `annotation` while its handles are dragged.
    pub fn transformed_bounds(&self, annotation: AnnotationId) -> Option<Bounds> {
        self.transform
            .as_ref()
            .filter(|t| t.annotation == annotation)
            .map(TransformSession::transformed_bounds)
    }

    fn end_transform(&mut self) -> bool {
        let Some(transform) = self.transform.take() else {
            return false;
        };
        self.surface.release_pointer(transform.pointer_id);
        match transform.end() {
            Some(command) => issue(
                &mut self.workflow,
                &mut self.mutations,
                &mut self.toasts,
                command,
            ),
            None => false,
        }
    }

    fn abort_transform(&mut self) -> bool {
        let Some(transform) = self.transform.take() else {
            return false;
        };
        self.surface.release_pointer(transform.pointer_id);
        transform.abort();
        true
    }

    // ─── External drags ──────────────────────────────────────────────────

    /// A node-repository entry or hub component entered the canvas.
    pub fn start_external_drag(&mut self, payload: DragPayload) -> bool {
        if self.session.is_active() || self.external.is_some() {
            log::debug!("external drag ignored, another drag is running");
            return false;
        }
        self.session.collision.clear();
        if self.workflow.writable {
            self.session.collision.init(&self.workflow, &self.config);
        }
        self.external = Some(ExternalDrag {
            payload,
            position: Position::ORIGIN,
        });
        true
    }

    /// The dragged entry is over the canvas at `client`; its node would be
    /// centred on the pointer.
    pub fn external_drag_move(&mut self, client: Position) {
        let Some(external) = &mut self.external else {
            return;
        };
        let half = self.config.node_size / 2.0;
        external.position = self.surface.screen_to_canvas(client) - Position::new(half, half);
        self.session.collision.check(&CollisionQuery {
            workflow: &self.workflow,
            surface: &self.surface,
            config: &self.config,
            payload: &external.payload,
            position: external.position,
            client,
        });
    }

    /// Drop the dragged entry. Returns the issued command, if any.
    pub fn external_drop(&mut self, client: Position) -> Option<WorkflowCommand> {
        self.external_drag_move(client);
        let external = self.external.take()?;
        let candidate = self.session.collision.take_candidate();
        self.session.collision.clear();
        if !self.workflow.writable {
            log::debug!("workflow is read-only, drop ignored");
            return None;
        }
        let position = self.config.grid().snap(external.position);
        let command = match (candidate, &external.payload) {
            (Some(operation), payload) => operation.command(payload, position),
            (None, DragPayload::NodeFactory { factory_key, .. }) => WorkflowCommand::AddNode {
                factory_key: factory_key.clone(),
                position,
            },
            (None, DragPayload::ComponentTemplate { id_in_hub, .. }) => {
                WorkflowCommand::AddComponentNode {
                    component_id_in_hub: id_in_hub.clone(),
                    position,
                    placement: ComponentPlacement::Standalone,
                }
            }
            (None, DragPayload::ExistingNode(id)) => {
                log::warn!("external drop of existing node {id} without a target");
                return None;
            }
        };
        issue(
            &mut self.workflow,
            &mut self.mutations,
            &mut self.toasts,
            command.clone(),
        )
        .then_some(command)
    }

    pub fn cancel_external_drag(&mut self) {
        if self.external.take().is_some() {
            self.session.collision.clear();
        }
    }

    pub fn replacement_candidate(&self) -> Option<crate::collision::ReplacementOperation> {
        self.session.collision.candidate()
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Key press on the editor root. Returns the action it resolved to.
    pub fn key_down(&mut self, event: &KeyEvent) -> Option<ShortcutAction> {
        let m = event.modifiers;
        let action = ShortcutMap::resolve(&event.key, m.ctrl, m.shift, m.alt, m.meta)?;
        match action {
            ShortcutAction::Escape => self.escape(event),
            ShortcutAction::SelectAll => {
                if self.machine.is_idle() {
                    let all = keyboard::all_selectable(&self.workflow);
                    self.selection.select(&all, SelectionMode::Committed);
                }
            }
            ShortcutAction::MoveSelection { direction, fine } => {
                if self.machine.is_idle() && self.transform.is_none() {
                    keyboard::move_selection(
                        &mut self.workflow,
                        &self.selection,
                        &mut self.mutations,
                        &mut self.toasts,
                        &self.config,
                        direction,
                        fine,
                    );
                }
            }
            ShortcutAction::Pan(direction) => {
                keyboard::pan_camera(self.surface.camera_mut(), direction, &self.config);
            }
            ShortcutAction::SelectNearest(direction) => {
                let Some(from) = keyboard::navigation_origin(&self.selection) else {
                    keyboard::pan_camera(self.surface.camera_mut(), direction, &self.config);
                    return Some(action);
                };
                if !self.machine.is_idle() {
                    return Some(action);
                }
                if let Some(next) =
                    keyboard::nearest_in_direction(&self.workflow, &self.config, &from, direction)
                {
                    let selection = &mut self.selection;
                    if self.machine.request_selection(selection, Some(next))
                        == SelectionRequest::Done
                    {
                        self.selection.set_focus(Some(next));
                    }
                }
            }
            ShortcutAction::ZoomIn => keyboard::zoom_by(self.surface.camera_mut(), keyboard::ZOOM_STEP),
            ShortcutAction::ZoomOut => {
                keyboard::zoom_by(self.surface.camera_mut(), 1.0 / keyboard::ZOOM_STEP)
            }
            ShortcutAction::ResetZoom => keyboard::reset_zoom(self.surface.camera_mut()),
        }
        Some(action)
    }

    /// Escape aborts the running gesture; otherwise it clears the selection
    /// unless an inner control already consumed it.
    fn escape(&mut self, event: &KeyEvent) {
        if self.abort_transform() {
            mark_escape_as_handled(event, "transform-controls");
            return;
        }
        if self.with_machine(|m, ctx| m.handle_escape(ctx, event)) {
            return;
        }
        if let Some(marquee) = self.marquee.take() {
            marquee.abort(&mut self.selection);
            mark_escape_as_handled(event, "marquee");
            return;
        }
        if is_escape_handled(event) {
            return;
        }
        if self.machine.is_awaiting_confirmation() {
            log::debug!("escape ignored while the selection prompt is open");
            return;
        }
        let selection = &mut self.selection;
        self.machine.request_selection(selection, None);
    }
}
