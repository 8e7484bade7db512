pub mod collision;
pub mod commands;
pub mod edge_pan;
pub mod editor;
pub mod events;
pub mod input;
pub mod interaction;
pub mod keyboard;
pub mod marquee;
pub mod notify;
pub mod position;
pub mod selection;
pub mod session;
pub mod shortcuts;
pub mod transform;

pub use collision::{CollisionChecker, DragPayload, ReplacementOperation};
pub use commands::{CommandError, RecordingMutations, WorkflowCommand, WorkflowMutations};
pub use editor::CanvasEditor;
pub use input::{KeyEvent, Modifiers, PointerEvent, ScenePointerEvent};
pub use interaction::{
    GestureEnd, InteractionError, InteractionMachine, InteractionOptions, MoveEndVerdict,
    PointerDownOutcome,
};
pub use selection::{SelectionCoordinator, SelectionMode, SelectionSnapshot};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use transform::Direction;
