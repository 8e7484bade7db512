//! Workflow mutation commands.
//!
//! The canvas never edits the authoritative workflow itself. Every gesture
//! ends in a [`WorkflowCommand`] sent through a [`WorkflowMutations`]
//! implementation (the backend bridge). Once the bridge accepts a move it is
//! also applied to the local mirror so the canvas doesn't snap back while the
//! backend round-trip is in flight. A rejected command leaves the mirror as
//! it was.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wf_core::error::CanvasError;
use wf_core::geometry::{Bounds, Position};
use wf_core::id::{AnnotationId, BendpointId, ConnectionId, NodeId};
use wf_core::model::{ObjectRef, Workflow};

/// Where a node used for a replacement or insertion comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum NodeSource {
    /// A node that is already part of the workflow.
    Existing { node_id: NodeId },
    /// A new node created from a node-repository factory.
    Factory { factory_key: String },
}

/// What a component added from the hub does to the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ComponentPlacement {
    Standalone,
    ReplaceNode { target_node_id: NodeId },
    InsertOnConnection { connection_id: ConnectionId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionMode {
    /// `position` is a delta added to the current position.
    Add,
    /// `position` is the new absolute position.
    Replace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum WorkflowCommand {
    MoveObjects {
        nodes: Vec<NodeId>,
        annotations: Vec<AnnotationId>,
        bendpoints: Vec<BendpointId>,
        delta: Position,
    },
    /// Move a single object that is not part of group moves (port bars,
    /// component placeholders).
    UpdatePosition {
        object: ObjectRef,
        position: Position,
        mode: PositionMode,
    },
    ReplaceNode {
        target_node_id: NodeId,
        replacement: NodeSource,
    },
    InsertNode {
        connection_id: ConnectionId,
        position: Position,
        node: NodeSource,
    },
    AddComponentNode {
        component_id_in_hub: String,
        position: Position,
        placement: ComponentPlacement,
    },
    AddNode {
        factory_key: String,
        position: Position,
    },
    InsertBendpoint {
        connection_id: ConnectionId,
        index: usize,
        position: Position,
    },
    UpdateAnnotationBounds {
        annotation_id: AnnotationId,
        bounds: Bounds,
    },
}

impl WorkflowCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MoveObjects { .. } => "moveObjects",
            Self::UpdatePosition { .. } => "updatePosition",
            Self::ReplaceNode { .. } => "replaceNode",
            Self::InsertNode { .. } => "insertNode",
            Self::AddComponentNode { .. } => "addComponentNode",
            Self::AddNode { .. } => "addNode",
            Self::InsertBendpoint { .. } => "insertBendpoint",
            Self::UpdateAnnotationBounds { .. } => "updateAnnotationBounds",
        }
    }

    /// Build a group move from a list of dragged objects. Port bars and
    /// placeholders are not part of group moves and are skipped.
    pub fn move_objects(objects: &[ObjectRef], delta: Position) -> Self {
        let mut nodes = Vec::new();
        let mut annotations = Vec::new();
        let mut bendpoints = Vec::new();
        for object in objects {
            match object {
                ObjectRef::Node(id) => nodes.push(*id),
                ObjectRef::Annotation(id) => annotations.push(*id),
                ObjectRef::Bendpoint(id) => bendpoints.push(*id),
                ObjectRef::PortBar { .. } | ObjectRef::ComponentPlaceholder(_) => {
                    log::debug!("{object} is not group-movable, skipped");
                }
            }
        }
        Self::MoveObjects {
            nodes,
            annotations,
            bendpoints,
            delta,
        }
    }

    /// Optimistically apply the command to the local mirror.
    ///
    /// Returns `false` for structural commands that only the backend can
    /// carry out (replacements, insertions, new nodes).
    pub fn apply_locally(&self, workflow: &mut Workflow) -> Result<bool, CanvasError> {
        match self {
            Self::MoveObjects {
                nodes,
                annotations,
                bendpoints,
                delta,
            } => {
                let objects = nodes
                    .iter()
                    .map(|id| ObjectRef::Node(*id))
                    .chain(annotations.iter().map(|id| ObjectRef::Annotation(*id)))
                    .chain(bendpoints.iter().map(|id| ObjectRef::Bendpoint(*id)));
                for object in objects {
                    workflow.translate(&object, *delta)?;
                }
                Ok(true)
            }
            Self::UpdatePosition {
                object,
                position,
                mode,
            } => {
                match mode {
                    PositionMode::Add => workflow.translate(object, *position)?,
                    PositionMode::Replace => workflow.set_position(object, *position)?,
                }
                Ok(true)
            }
            Self::UpdateAnnotationBounds {
                annotation_id,
                bounds,
            } => {
                let annotation =
                    workflow
                        .annotation_mut(*annotation_id)
                        .ok_or_else(|| CanvasError::UnknownObject {
                            kind: "annotation",
                            id: annotation_id.to_string(),
                        })?;
                annotation.bounds = *bounds;
                Ok(true)
            }
            Self::InsertBendpoint {
                connection_id,
                index,
                position,
            } => {
                let connection = workflow.connection_mut(*connection_id).ok_or_else(|| {
                    CanvasError::UnknownObject {
                        kind: "connection",
                        id: connection_id.to_string(),
                    }
                })?;
                let at = (*index).min(connection.bendpoints.len());
                connection.bendpoints.insert(at, *position);
                Ok(true)
            }
            Self::ReplaceNode { .. }
            | Self::InsertNode { .. }
            | Self::AddComponentNode { .. }
            | Self::AddNode { .. } => Ok(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("{command} was rejected: {reason}")]
    Rejected {
        command: &'static str,
        reason: String,
    },
    #[error("the workflow is read-only")]
    ReadOnly,
    #[error("the workflow backend is unavailable: {0}")]
    Unavailable(String),
}

/// The backend's mutation API.
pub trait WorkflowMutations {
    fn dispatch(&mut self, command: WorkflowCommand) -> Result<(), CommandError>;
}

/// Records every command it accepts. The WASM bridge drains the record and
/// forwards it to the host; tests inspect it directly.
#[derive(Debug, Default)]
pub struct RecordingMutations {
    issued: Vec<WorkflowCommand>,
    fail_next: Option<String>,
}

impl RecordingMutations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issued(&self) -> &[WorkflowCommand] {
        &self.issued
    }

    pub fn take_issued(&mut self) -> Vec<WorkflowCommand> {
        std::mem::take(&mut self.issued)
    }

    /// Reject the next command with `reason`.
    pub fn fail_next(&mut self, reason: &str) {
        self.fail_next = Some(reason.to_string());
    }
}

impl WorkflowMutations for RecordingMutations {
    fn dispatch(&mut self, command: WorkflowCommand) -> Result<(), CommandError> {
        if let Some(reason) = self.fail_next.take() {
            return Err(CommandError::Rejected {
                command: command.name(),
                reason,
            });
        }
        self.issued.push(command);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wf_core::id::WorkflowId;
    use wf_core::model::{Annotation, Connection, Endpoint, WorkflowNode};

    fn workflow() -> Workflow {
        let mut wf = Workflow::new(WorkflowId::intern("root"));
        wf.add_node(WorkflowNode::new(NodeId::intern("a"), Position::new(10.0, 10.0)));
        wf.add_node(WorkflowNode::new(NodeId::intern("b"), Position::new(200.0, 10.0)));
        wf.add_connection(Connection {
            id: ConnectionId::intern("a-b"),
            source: Endpoint::Node {
                node: NodeId::intern("a"),
                port: 0,
            },
            dest: Endpoint::Node {
                node: NodeId::intern("b"),
                port: 0,
            },
            bendpoints: vec![Position::new(100.0, 50.0)],
            allow_delete: true,
        })
        .expect("nodes exist");
        wf.annotations.push(Annotation {
            id: AnnotationId::intern("note"),
            bounds: Bounds::new(0.0, 100.0, 50.0, 50.0),
            text: String::new(),
        });
        wf
    }

    #[test]
    fn move_objects_groups_by_kind() {
        let bend = BendpointId::new(ConnectionId::intern("a-b"), 0);
        let cmd = WorkflowCommand::move_objects(
            &[
                ObjectRef::Node(NodeId::intern("a")),
                ObjectRef::Bendpoint(bend),
                ObjectRef::Annotation(AnnotationId::intern("note")),
            ],
            Position::new(5.0, 0.0),
        );
        let mut wf = workflow();
        assert!(cmd.apply_locally(&mut wf).expect("objects exist"));
        assert_eq!(wf.node(NodeId::intern("a")).map(|n| n.position), Some(Position::new(15.0, 10.0)));
        assert_eq!(wf.bendpoint(bend), Some(Position::new(105.0, 50.0)));
        assert_eq!(
            wf.annotation(AnnotationId::intern("note")).map(|a| a.bounds.x),
            Some(5.0)
        );
    }

    #[test]
    fn structural_commands_are_not_applied_locally() {
        let mut wf = workflow();
        let cmd = WorkflowCommand::ReplaceNode {
            target_node_id: NodeId::intern("b"),
            replacement: NodeSource::Existing {
                node_id: NodeId::intern("a"),
            },
        };
        assert!(!cmd.apply_locally(&mut wf).expect("no-op"));
        assert_eq!(wf.node_count(), 2);
    }

    #[test]
    fn insert_bendpoint_locally() {
        let mut wf = workflow();
        let cmd = WorkflowCommand::InsertBendpoint {
            connection_id: ConnectionId::intern("a-b"),
            index: 0,
            position: Position::new(50.0, 20.0),
        };
        cmd.apply_locally(&mut wf).expect("connection exists");
        let conn = wf.connection(ConnectionId::intern("a-b")).expect("connection");
        assert_eq!(
            conn.bendpoints,
            vec![Position::new(50.0, 20.0), Position::new(100.0, 50.0)]
        );
    }

    #[test]
    fn rejected_commands_are_not_recorded() {
        let mut backend = RecordingMutations::new();
        backend.fail_next("node is locked");
        let replace = WorkflowCommand::ReplaceNode {
            target_node_id: NodeId::intern("b"),
            replacement: NodeSource::Factory {
                factory_key: "org.example.Filter".into(),
            },
        };
        let err = backend.dispatch(replace.clone()).expect_err("rejected");
        assert_eq!(err.to_string(), "replaceNode was rejected: node is locked");
        assert!(backend.issued().is_empty());

        assert!(backend.dispatch(replace.clone()).is_ok());
        assert_eq!(backend.issued(), &[replace]);
    }

    #[test]
    fn commands_serialize_with_type_tag() {
        let cmd = WorkflowCommand::UpdatePosition {
            object: ObjectRef::Node(NodeId::intern("a")),
            position: Position::new(1.0, 2.0),
            mode: PositionMode::Add,
        };
        let json = serde_json::to_value(&cmd).expect("serializable");
        assert_eq!(json["type"], "updatePosition");
        assert_eq!(json["object"], "node:a");
        assert_eq!(json["mode"], "add");
    }
}
