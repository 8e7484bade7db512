//! WASM bridge for the workflow canvas: exposes the interaction engine to
//! the browser host.
//!
//! Compiled via `wasm-pack build --target web`. The host owns rendering and
//! the backend connection; it forwards DOM events here, drains the issued
//! workflow commands and toasts as JSON, and pushes backend snapshots back.

use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wf_core::CanvasConfig;
use wf_core::geometry::Position;
use wf_core::id::{AnnotationId, PortTypeId};
use wf_core::model::{ObjectRef, Workflow};
use wf_editor::collision::ReplacementOperation;
use wf_editor::input::{KeyEvent, Modifiers, PointerEvent};
use wf_editor::interaction::{GestureEnd, PointerDownOutcome};
use wf_editor::shortcuts::ShortcutAction;
use wf_editor::transform::Direction;
use wf_editor::{CanvasEditor, DragPayload, RecordingMutations, SelectionMode};
use wf_render::{Camera, CanvasSurface, SceneSurface, SvgSurface};

/// The editor over whichever renderer the host picked.
enum Editor {
    Svg(CanvasEditor<SvgSurface, RecordingMutations>),
    Scene(CanvasEditor<SceneSurface, RecordingMutations>),
}

macro_rules! with_editor {
    ($editor:expr, $e:ident => $body:expr) => {
        match $editor {
            Editor::Svg($e) => $body,
            Editor::Scene($e) => $body,
        }
    };
}

/// Something dragged in from outside the canvas, as the host describes it.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
enum ExternalPayload {
    NodeFactory {
        factory_key: String,
        #[serde(default)]
        in_ports: Vec<String>,
        #[serde(default)]
        out_ports: Vec<String>,
    },
    Component {
        id_in_hub: String,
        #[serde(default)]
        in_ports: Vec<String>,
        #[serde(default)]
        out_ports: Vec<String>,
    },
}

impl From<ExternalPayload> for DragPayload {
    fn from(payload: ExternalPayload) -> Self {
        let intern = |ports: Vec<String>| ports.iter().map(|p| PortTypeId::intern(p)).collect();
        match payload {
            ExternalPayload::NodeFactory {
                factory_key,
                in_ports,
                out_ports,
            } => DragPayload::NodeFactory {
                factory_key,
                in_ports: intern(in_ports),
                out_ports: intern(out_ports),
            },
            ExternalPayload::Component {
                id_in_hub,
                in_ports,
                out_ports,
            } => DragPayload::ComponentTemplate {
                id_in_hub,
                in_ports: intern(in_ports),
                out_ports: intern(out_ports),
            },
        }
    }
}

/// The WASM-facing canvas controller.
///
/// All pointer and keyboard input from the host goes through this struct.
#[wasm_bindgen]
pub struct WorkflowCanvas {
    editor: Editor,
}

#[wasm_bindgen]
impl WorkflowCanvas {
    /// Create a controller for a `width` × `height` canvas element.
    ///
    /// `renderer` is `"svg"` or `"webgl"`. `config_json` may be empty for
    /// the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: f64,
        height: f64,
        renderer: &str,
        workflow_json: &str,
        config_json: &str,
    ) -> Result<WorkflowCanvas, JsValue> {
        console_error_panic_hook_setup();

        let config = if config_json.trim().is_empty() {
            CanvasConfig::default()
        } else {
            CanvasConfig::from_json(config_json).map_err(to_js_error)?
        };
        let workflow = Workflow::from_json(workflow_json).map_err(to_js_error)?;
        let camera = Camera::new(width, height);
        let mutations = RecordingMutations::new();
        let editor = match renderer {
            "svg" => Editor::Svg(CanvasEditor::new(
                config,
                workflow,
                SvgSurface::new(camera),
                mutations,
            )),
            "webgl" => {
                let surface = SceneSurface::new(camera, &workflow);
                Editor::Scene(CanvasEditor::new(config, workflow, surface, mutations))
            }
            other => return Err(JsValue::from_str(&format!("unknown renderer: {other}"))),
        };
        Ok(Self { editor })
    }

    /// Replace the workflow with a backend snapshot. Returns `false` if the
    /// JSON does not describe a workflow.
    pub fn set_workflow(&mut self, json: &str) -> bool {
        match Workflow::from_json(json) {
            Ok(workflow) => {
                with_editor!(&mut self.editor, e => e.apply_workflow(workflow));
                true
            }
            Err(err) => {
                log::error!("rejected workflow snapshot: {err}");
                false
            }
        }
    }

    /// Resize the canvas element.
    pub fn resize(&mut self, width: f64, height: f64) {
        with_editor!(&mut self.editor, e => {
            let camera = e.surface_mut().camera_mut();
            camera.viewport_width = width;
            camera.viewport_height = height;
        });
    }

    /// Client position of the canvas element's top-left corner.
    pub fn set_origin(&mut self, x: f64, y: f64) {
        with_editor!(&mut self.editor, e => {
            e.surface_mut().camera_mut().origin = Position::new(x, y);
        });
    }

    /// `{ zoom, offsetX, offsetY }` of the current view.
    pub fn get_camera(&self) -> String {
        let camera = with_editor!(&self.editor, e => e.surface().camera().clone());
        let offset = camera.offset();
        serde_json::json!({
            "zoom": camera.zoom,
            "offsetX": offset.x,
            "offsetY": offset.y,
        })
        .to_string()
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Handle pointer down. Returns what it did: `"ignored"`,
    /// `"doubleClicked"`, `"confirmationRequested"`, `"selected"`,
    /// `"selectionToggled"` or `"gestureStarted"`.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        pointer_id: i32,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        let event = pointer_event(x, y, pointer_id, mods).with_button(button);
        let outcome = with_editor!(&mut self.editor, e => e.pointer_down(&event));
        outcome_name(outcome).to_string()
    }

    /// Handle pointer move. Processed on the next `animation_frame`.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_move(
        &mut self,
        x: f64,
        y: f64,
        pointer_id: i32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        let event = pointer_event(x, y, pointer_id, mods);
        with_editor!(&mut self.editor, e => e.pointer_move(event));
    }

    /// Handle pointer up. Returns `"nothing"`, `"click"` or `"drop"`.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_up(
        &mut self,
        x: f64,
        y: f64,
        pointer_id: i32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        let event = pointer_event(x, y, pointer_id, mods);
        let end = with_editor!(&mut self.editor, e => e.pointer_up(&event));
        match end {
            GestureEnd::Nothing => "nothing",
            GestureEnd::Click => "click",
            GestureEnd::Drop => "drop",
        }
        .to_string()
    }

    /// Call once per `requestAnimationFrame`. Returns `true` while the view
    /// is edge-panning.
    pub fn animation_frame(&mut self) -> bool {
        let now = now_ms();
        with_editor!(&mut self.editor, e => e.animation_frame(now)).is_some()
    }

    /// Pointer entered the object labelled `object_id` (e.g. `"node:root:1"`).
    pub fn pointer_enter(&mut self, object_id: &str) -> bool {
        let Ok(object) = ObjectRef::parse(object_id) else {
            log::warn!("pointer entered unknown object {object_id:?}");
            return false;
        };
        let now = now_ms();
        with_editor!(&mut self.editor, e => e.pointer_enter(object, now));
        true
    }

    pub fn pointer_leave(&mut self) {
        let now = now_ms();
        with_editor!(&mut self.editor, e => e.pointer_leave(now));
    }

    /// Object whose tooltip is showing, or an empty string.
    pub fn get_tooltip(&self) -> String {
        with_editor!(&self.editor, e => e.visible_tooltip())
            .map(|o| o.to_string())
            .unwrap_or_default()
    }

    /// Offset of the objects being dragged as JSON (`null` when idle).
    pub fn get_move_preview(&self) -> String {
        let preview = with_editor!(&self.editor, e => e.surface().move_preview());
        serde_json::to_string(&preview).unwrap_or_else(|_| "null".to_string())
    }

    /// Current replacement candidate as `{ type, id }`, or `null`.
    pub fn get_replacement_candidate(&self) -> String {
        let candidate = with_editor!(&self.editor, e => e.replacement_candidate());
        match candidate {
            Some(ReplacementOperation::Node(id)) => {
                serde_json::json!({ "type": "node", "id": id.as_str() })
            }
            Some(ReplacementOperation::Connection(id)) => {
                serde_json::json!({ "type": "connection", "id": id.as_str() })
            }
            None => serde_json::Value::Null,
        }
        .to_string()
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Committed selection as a JSON array of object ids.
    pub fn get_selected_ids(&self) -> String {
        let selected = with_editor!(&self.editor, e => e
            .selection()
            .query_selection(SelectionMode::Committed)
            .selected_objects);
        serde_json::to_string(&selected).unwrap_or_else(|_| "[]".to_string())
    }

    /// Selection including an in-progress preview (marquee, drag).
    pub fn get_preview_ids(&self) -> String {
        let selected = with_editor!(&self.editor, e => e
            .selection()
            .query_selection(SelectionMode::Preview)
            .selected_objects);
        serde_json::to_string(&selected).unwrap_or_else(|_| "[]".to_string())
    }

    /// The current selection holds unsaved edits (e.g. an open dialog);
    /// replacing it needs the user's confirmation.
    pub fn set_has_unsaved_changes(&mut self, unsaved: bool) {
        with_editor!(&mut self.editor, e => e.selection_mut().set_has_unsaved_changes(unsaved));
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        with_editor!(&self.editor, e => e.is_awaiting_confirmation())
    }

    /// The user answered the discard prompt.
    pub fn resolve_confirmation(&mut self, confirmed: bool) -> bool {
        with_editor!(&mut self.editor, e => e.resolve_confirmation(confirmed))
    }

    pub fn set_side_panel_open(&mut self, open: bool) {
        with_editor!(&mut self.editor, e => e.set_side_panel_open(open));
    }

    pub fn is_side_panel_open(&self) -> bool {
        with_editor!(&self.editor, e => e.is_side_panel_open())
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Handle a keydown. Returns the action name, or an empty string if the
    /// key is not bound.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let event = KeyEvent::new(
            key,
            Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        );
        with_editor!(&mut self.editor, e => e.key_down(&event))
            .map(action_name)
            .unwrap_or_default()
            .to_string()
    }

    // ─── Annotation transform ────────────────────────────────────────────

    /// Pointer-down on the `direction` handle (`"n"`, `"se"`, ...) of an
    /// annotation.
    pub fn start_transform(
        &mut self,
        annotation_id: &str,
        direction: &str,
        x: f64,
        y: f64,
        pointer_id: i32,
    ) -> bool {
        let Some(direction) = Direction::parse(direction) else {
            log::warn!("unknown transform direction {direction:?}");
            return false;
        };
        let event = pointer_event(x, y, pointer_id, Modifiers::NONE);
        let annotation = AnnotationId::intern(annotation_id);
        match with_editor!(&mut self.editor, e => e.start_transform(annotation, direction, &event)) {
            Ok(started) => started,
            Err(err) => {
                log::error!("transform not started: {err}");
                false
            }
        }
    }

    /// Bounds to draw for the annotation while it is transformed, or `null`.
    pub fn get_transformed_bounds(&self, annotation_id: &str) -> String {
        let annotation = AnnotationId::intern(annotation_id);
        let bounds = with_editor!(&self.editor, e => e.transformed_bounds(annotation));
        serde_json::to_string(&bounds).unwrap_or_else(|_| "null".to_string())
    }

    // ─── External drags ──────────────────────────────────────────────────

    /// A node-repository or hub entry entered the canvas.
    /// `payload_json` is `{ "type": "nodeFactory", "factoryKey", "inPorts",
    /// "outPorts" }` or `{ "type": "component", "idInHub", ... }`.
    pub fn start_external_drag(&mut self, payload_json: &str) -> bool {
        let payload: ExternalPayload = match serde_json::from_str(payload_json) {
            Ok(p) => p,
            Err(err) => {
                log::error!("bad external drag payload: {err}");
                return false;
            }
        };
        with_editor!(&mut self.editor, e => e.start_external_drag(payload.into()))
    }

    pub fn external_drag_move(&mut self, x: f64, y: f64) {
        with_editor!(&mut self.editor, e => e.external_drag_move(Position::new(x, y)));
    }

    /// Drop the external entry. Returns the issued command as JSON, or an
    /// empty string if nothing was issued.
    pub fn external_drop(&mut self, x: f64, y: f64) -> String {
        with_editor!(&mut self.editor, e => e.external_drop(Position::new(x, y)))
            .and_then(|command| serde_json::to_string(&command).ok())
            .unwrap_or_default()
    }

    pub fn cancel_external_drag(&mut self) {
        with_editor!(&mut self.editor, e => e.cancel_external_drag());
    }

    // ─── Backend traffic ─────────────────────────────────────────────────

    /// Commands issued since the last call, as a JSON array. The host sends
    /// them to the backend in order.
    pub fn take_commands(&mut self) -> String {
        let commands = with_editor!(&mut self.editor, e => e.mutations_mut().take_issued());
        serde_json::to_string(&commands).unwrap_or_else(|_| "[]".to_string())
    }

    /// The backend rejected a command the host forwarded.
    pub fn report_command_failure(&mut self, command: &str, message: &str) {
        with_editor!(&mut self.editor, e => e.report_command_failure(command, message));
    }

    /// Toasts to show, as a JSON array of `{ id, kind, headline, message }`.
    pub fn take_toasts(&mut self) -> String {
        let toasts = with_editor!(&mut self.editor, e => e.drain_toasts());
        serde_json::to_string(&toasts).unwrap_or_else(|_| "[]".to_string())
    }
}

fn pointer_event(x: f64, y: f64, pointer_id: i32, modifiers: Modifiers) -> PointerEvent {
    PointerEvent::new(x, y, modifiers, now_ms()).with_pointer_id(pointer_id)
}

fn outcome_name(outcome: PointerDownOutcome) -> &'static str {
    match outcome {
        PointerDownOutcome::Ignored => "ignored",
        PointerDownOutcome::DoubleClicked => "doubleClicked",
        PointerDownOutcome::ConfirmationRequested => "confirmationRequested",
        PointerDownOutcome::Selected => "selected",
        PointerDownOutcome::SelectionToggled => "selectionToggled",
        PointerDownOutcome::GestureStarted => "gestureStarted",
    }
}

fn action_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::SelectNearest(_) => "selectNearest",
        ShortcutAction::SelectAll => "selectAll",
        ShortcutAction::Escape => "escape",
        ShortcutAction::MoveSelection { .. } => "moveSelection",
        ShortcutAction::Pan(_) => "pan",
        ShortcutAction::ZoomIn => "zoomIn",
        ShortcutAction::ZoomOut => "zoomOut",
        ShortcutAction::ResetZoom => "resetZoom",
    }
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Host clock in milliseconds.
fn now_ms() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or_default()
    }
}

/// Set up a panic hook that logs to the browser console.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("workflow canvas WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

/// Validate a workflow snapshot. Returns an empty string if it is valid,
/// otherwise the error message.
#[wasm_bindgen]
pub fn validate_workflow(json: &str) -> String {
    match Workflow::from_json(json) {
        Ok(_) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Validate a canvas configuration. Same contract as [`validate_workflow`].
#[wasm_bindgen]
pub fn validate_config(json: &str) -> String {
    match CanvasConfig::from_json(json) {
        Ok(_) => String::new(),
        Err(err) => err.to_string(),
    }
}
