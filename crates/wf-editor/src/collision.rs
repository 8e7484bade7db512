//! Replacement / insertion candidate detection.
//!
//! While a single node (or a node-repository entry, or a hub component) is
//! dragged over the canvas, this finds what dropping it would affect:
//!
//! 1. a nearby node, which the dragged thing would replace, or else
//! 2. the connection under the pointer, into which it would be inserted.
//!
//! Node candidates win over connection candidates. Nodes are found through a
//! spatial hash built once at drag start; connections through the surface's
//! connection hover hit areas.

use crate::commands::{ComponentPlacement, NodeSource, WorkflowCommand};
use wf_core::CanvasConfig;
use wf_core::geometry::{Position, Rect, rectangles_intersect};
use wf_core::id::{ConnectionId, NodeId, PortTypeId};
use wf_core::model::{PortList, Workflow};
use wf_core::spatial::{SpatialHash, SpatialObject};
use wf_render::CanvasSurface;
use wf_render::hit::parse_hover_label;

/// Hash id standing in for things that are not in the workflow yet.
const EXTERNAL_DRAG_REFERENCE: &str = "<external-drag>";

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum DragPayload {
    ExistingNode(NodeId),
    NodeFactory {
        factory_key: String,
        in_ports: PortList,
        out_ports: PortList,
    },
    ComponentTemplate {
        id_in_hub: String,
        in_ports: PortList,
        out_ports: PortList,
    },
}

impl DragPayload {
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Self::ExistingNode(id) => Some(*id),
            Self::NodeFactory { .. } | Self::ComponentTemplate { .. } => None,
        }
    }

    /// `(in_ports, out_ports)` of the dragged thing.
    fn ports<'a>(&'a self, workflow: &'a Workflow) -> Option<(&'a [PortTypeId], &'a [PortTypeId])> {
        match self {
            Self::ExistingNode(id) => workflow
                .node(*id)
                .map(|n| (n.in_ports.as_slice(), n.out_ports.as_slice())),
            Self::NodeFactory {
                in_ports, out_ports, ..
            }
            | Self::ComponentTemplate {
                in_ports, out_ports, ..
            } => Some((in_ports.as_slice(), out_ports.as_slice())),
        }
    }
}

/// A pending replacement, applied on drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementOperation {
    Node(NodeId),
    Connection(ConnectionId),
}

impl ReplacementOperation {
    /// The command a drop of `payload` at `position` issues.
    pub fn command(&self, payload: &DragPayload, position: Position) -> WorkflowCommand {
        match (self, payload) {
            (Self::Node(target), DragPayload::ComponentTemplate { id_in_hub, .. }) => {
                WorkflowCommand::AddComponentNode {
                    component_id_in_hub: id_in_hub.clone(),
                    position,
                    placement: ComponentPlacement::ReplaceNode {
                        target_node_id: *target,
                    },
                }
            }
            (Self::Connection(connection), DragPayload::ComponentTemplate { id_in_hub, .. }) => {
                WorkflowCommand::AddComponentNode {
                    component_id_in_hub: id_in_hub.clone(),
                    position,
                    placement: ComponentPlacement::InsertOnConnection {
                        connection_id: *connection,
                    },
                }
            }
            (Self::Node(target), payload) => WorkflowCommand::ReplaceNode {
                target_node_id: *target,
                replacement: node_source(payload),
            },
            (Self::Connection(connection), payload) => WorkflowCommand::InsertNode {
                connection_id: *connection,
                position,
                node: node_source(payload),
            },
        }
    }
}

fn node_source(payload: &DragPayload) -> NodeSource {
    match payload {
        DragPayload::ExistingNode(id) => NodeSource::Existing { node_id: *id },
        DragPayload::NodeFactory { factory_key, .. } => NodeSource::Factory {
            factory_key: factory_key.clone(),
        },
        // Components are added through their own command; see `command`.
        DragPayload::ComponentTemplate { id_in_hub, .. } => NodeSource::Factory {
            factory_key: id_in_hub.clone(),
        },
    }
}

/// Inputs of one collision check.
pub struct CollisionQuery<'a> {
    pub workflow: &'a Workflow,
    pub surface: &'a dyn CanvasSurface,
    pub config: &'a CanvasConfig,
    pub payload: &'a DragPayload,
    /// Canvas position (top-left) the dragged node would land on.
    pub position: Position,
    /// Pointer client position.
    pub client: Position,
}

#[derive(Debug, Default)]
pub struct CollisionChecker {
    index: Option<SpatialHash<NodeId>>,
    candidate: Option<ReplacementOperation>,
}

impl CollisionChecker {
    /// Index the workflow's nodes. Call once when a drag starts.
    pub fn init(&mut self, workflow: &Workflow, config: &CanvasConfig) {
        let objects = workflow.nodes().map(|n| SpatialObject {
            id: n.id,
            position: n.position,
        });
        self.index = Some(SpatialHash::build(
            objects,
            config.node_size,
            config.collision_cell_size(),
        ));
        self.candidate = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.index.is_some()
    }

    pub fn candidate(&self) -> Option<ReplacementOperation> {
        self.candidate
    }

    pub fn take_candidate(&mut self) -> Option<ReplacementOperation> {
        self.candidate.take()
    }

    pub fn clear(&mut self) {
        self.index = None;
        self.candidate = None;
    }

    /// Recompute the candidate for the current drag position.
    pub fn check(&mut self, query: &CollisionQuery<'_>) -> Option<ReplacementOperation> {
        self.candidate = if query.workflow.writable {
            self.find_node(query)
                .map(ReplacementOperation::Node)
                .or_else(|| find_connection(query).map(ReplacementOperation::Connection))
        } else {
            None
        };
        self.candidate
    }

    fn find_node(&self, query: &CollisionQuery<'_>) -> Option<NodeId> {
        let Some(index) = &self.index else {
            log::warn!("collision check before init");
            return None;
        };
        let dragged = query.payload.node_id();
        let reference = SpatialObject {
            id: dragged.unwrap_or_else(|| NodeId::intern(EXTERNAL_DRAG_REFERENCE)),
            position: query.position,
        };
        let size = query.config.node_size;
        let reach = query.config.replace_distance;
        let detection = |p: Position| {
            Rect::new(p.x - reach / 2.0, p.y - reach / 2.0, size + reach, size + reach)
        };
        index.query_nearby(reference, |candidate, reference| {
            if dragged.is_some_and(|d| query.workflow.are_connected(d, candidate.id)) {
                return false;
            }
            rectangles_intersect(&detection(candidate.position), &detection(reference.position))
        })
    }
}

fn find_connection(query: &CollisionQuery<'_>) -> Option<ConnectionId> {
    let hit = query.surface.find_connection_hover_from_screen_coordinates(
        query.workflow,
        query.config,
        query.client,
    )?;
    let id = parse_hover_label(&hit.label)?;
    let connection = query.workflow.connection(id)?;
    if !connection.allow_delete {
        log::trace!("connection {id} cannot be deleted, not an insertion target");
        return None;
    }
    if let Some(dragged) = query.payload.node_id()
        && connection.touches_node(dragged)
    {
        return None;
    }
    let (in_ports, out_ports) = query.payload.ports(query.workflow)?;
    let source_type = query.workflow.endpoint_port_type(&connection.source, true);
    let dest_type = query.workflow.endpoint_port_type(&connection.dest, false);
    let accepts_source = source_type.is_some_and(|from| {
        in_ports
            .iter()
            .any(|to| query.workflow.ports_compatible(from, *to))
    });
    let feeds_dest = dest_type.is_some_and(|to| {
        out_ports
            .iter()
            .any(|from| query.workflow.ports_compatible(*from, to))
    });
    (accepts_source || feeds_dest).then_some(id)
}
