//! Workflow graph data model as seen by the canvas.
//!
//! The authoritative workflow lives on the backend; this is the local mirror
//! the canvas hit-tests and mutates optimistically. Nodes are vertices of a
//! `StableDiGraph` and node-to-node connections are its edges, so "are these
//! two nodes wired together" is a neighbour lookup. Connections that end on a
//! metanode port bar have no vertex on that side and live only in the
//! connection table.

use crate::error::CanvasError;
use crate::geometry::{Bounds, Position};
use crate::id::{
    AnnotationId, BendpointId, ConnectionId, NodeId, PlaceholderId, PortTypeId, WorkflowId,
};
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// ─── Object references ───────────────────────────────────────────────────

/// Which side of a metanode/component the port bar sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PortBarSide {
    In,
    Out,
}

impl PortBarSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

/// Discriminant of [`ObjectRef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectKind {
    Node,
    Annotation,
    Bendpoint,
    PortBar,
    ComponentPlaceholder,
}

/// Identifies the canvas object an interaction is about.
///
/// Identity is the pair (kind, id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectRef {
    Node(NodeId),
    Annotation(AnnotationId),
    Bendpoint(BendpointId),
    PortBar {
        container: WorkflowId,
        side: PortBarSide,
    },
    ComponentPlaceholder(PlaceholderId),
}

impl ObjectRef {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Node(_) => ObjectKind::Node,
            Self::Annotation(_) => ObjectKind::Annotation,
            Self::Bendpoint(_) => ObjectKind::Bendpoint,
            Self::PortBar { .. } => ObjectKind::PortBar,
            Self::ComponentPlaceholder(_) => ObjectKind::ComponentPlaceholder,
        }
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(*id),
            _ => None,
        }
    }

    /// Parse the string form produced by `Display`
    /// (`node:<id>`, `annotation:<id>`, `bendpoint:<conn>__<n>`,
    /// `portBar:<workflow>:<in|out>`, `placeholder:<id>`).
    pub fn parse(s: &str) -> Result<Self, CanvasError> {
        let malformed = || CanvasError::MalformedObjectRef(s.to_string());
        let (kind, rest) = s.split_once(':').ok_or_else(malformed)?;
        if rest.is_empty() {
            return Err(malformed());
        }
        match kind {
            "node" => Ok(Self::Node(NodeId::intern(rest))),
            "annotation" => Ok(Self::Annotation(AnnotationId::intern(rest))),
            "bendpoint" => BendpointId::parse(rest)
                .map(Self::Bendpoint)
                .ok_or_else(malformed),
            "portBar" => {
                let (container, side) = rest.rsplit_once(':').ok_or_else(malformed)?;
                let side = match side {
                    "in" => PortBarSide::In,
                    "out" => PortBarSide::Out,
                    _ => return Err(malformed()),
                };
                Ok(Self::PortBar {
                    container: WorkflowId::intern(container),
                    side,
                })
            }
            "placeholder" => Ok(Self::ComponentPlaceholder(PlaceholderId::intern(rest))),
            _ => Err(malformed()),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => write!(f, "node:{id}"),
            Self::Annotation(id) => write!(f, "annotation:{id}"),
            Self::Bendpoint(id) => write!(f, "bendpoint:{id}"),
            Self::PortBar { container, side } => {
                write!(f, "portBar:{container}:{}", side.as_str())
            }
            Self::ComponentPlaceholder(id) => write!(f, "placeholder:{id}"),
        }
    }
}

impl Serialize for ObjectRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ─── Ports ───────────────────────────────────────────────────────────────

/// Port type id every other type can connect to.
pub const GENERIC_PORT_TYPE: &str = "generic";

/// Extra compatibility information of a port type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PortTypeInfo {
    /// Source types an input of this type also accepts.
    pub compatible_types: SmallVec<[PortTypeId; 2]>,
}

pub type PortList = SmallVec<[PortTypeId; 4]>;

// ─── Nodes ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    #[default]
    Native,
    Metanode,
    Component,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    pub id: NodeId,
    pub position: Position,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub in_ports: PortList,
    #[serde(default)]
    pub out_ports: PortList,
}

impl WorkflowNode {
    pub fn new(id: NodeId, position: Position) -> Self {
        Self {
            id,
            position,
            kind: NodeKind::Native,
            in_ports: PortList::new(),
            out_ports: PortList::new(),
        }
    }

    pub fn with_ports(
        mut self,
        in_ports: impl IntoIterator<Item = PortTypeId>,
        out_ports: impl IntoIterator<Item = PortTypeId>,
    ) -> Self {
        self.in_ports = in_ports.into_iter().collect();
        self.out_ports = out_ports.into_iter().collect();
        self
    }
}

// ─── Connections ─────────────────────────────────────────────────────────

/// One end of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Endpoint {
    Node { node: NodeId, port: usize },
    /// A port on the metanode port bar of the containing workflow.
    PortBar { port: usize },
}

impl Endpoint {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::Node { node, .. } => Some(*node),
            Self::PortBar { .. } => None,
        }
    }

    pub fn port(&self) -> usize {
        match self {
            Self::Node { port, .. } | Self::PortBar { port } => *port,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub source: Endpoint,
    pub dest: Endpoint,
    #[serde(default)]
    pub bendpoints: Vec<Position>,
    #[serde(default = "default_true")]
    pub allow_delete: bool,
}

fn default_true() -> bool {
    true
}

impl Connection {
    pub fn touches_node(&self, node: NodeId) -> bool {
        self.source.node() == Some(node) || self.dest.node() == Some(node)
    }
}

// ─── Annotations, placeholders, port bars ────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    pub bounds: Bounds,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentPlaceholder {
    pub id: PlaceholderId,
    pub position: Position,
    #[serde(default)]
    pub name: String,
}

/// Metanode port bar, present only when the canvas shows the inside of a
/// metanode or component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortBar {
    pub side: PortBarSide,
    pub bounds: Bounds,
    #[serde(default)]
    pub ports: PortList,
}

// ─── Workflow ────────────────────────────────────────────────────────────

/// Serialized workflow as delivered by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub id: Option<WorkflowId>,
    pub writable: bool,
    pub nodes: Vec<WorkflowNode>,
    pub connections: Vec<Connection>,
    pub annotations: Vec<Annotation>,
    pub placeholders: Vec<ComponentPlaceholder>,
    pub port_bars: Vec<PortBar>,
    pub port_types: BTreeMap<PortTypeId, PortTypeInfo>,
}

/// The local mirror of a workflow.
#[derive(Debug, Clone)]
pub struct Workflow {
    pub id: WorkflowId,
    /// Whether structural edits are allowed.
    pub writable: bool,
    pub graph: StableDiGraph<WorkflowNode, ConnectionId>,
    id_index: HashMap<NodeId, NodeIndex>,
    connections: BTreeMap<ConnectionId, Connection>,
    edge_index: HashMap<ConnectionId, EdgeIndex>,
    pub annotations: Vec<Annotation>,
    pub placeholders: Vec<ComponentPlaceholder>,
    pub port_bars: Vec<PortBar>,
    pub port_types: BTreeMap<PortTypeId, PortTypeInfo>,
}

impl Workflow {
    pub fn new(id: WorkflowId) -> Self {
        Self {
            id,
            writable: true,
            graph: StableDiGraph::new(),
            id_index: HashMap::new(),
            connections: BTreeMap::new(),
            edge_index: HashMap::new(),
            annotations: Vec::new(),
            placeholders: Vec::new(),
            port_bars: Vec::new(),
            port_types: BTreeMap::new(),
        }
    }

    pub fn from_snapshot(snapshot: WorkflowSnapshot) -> Result<Self, CanvasError> {
        let mut wf = Self::new(snapshot.id.unwrap_or_else(|| WorkflowId::intern("root")));
        wf.writable = snapshot.writable;
        wf.port_types = snapshot.port_types;
        for node in snapshot.nodes {
            wf.add_node(node);
        }
        for connection in snapshot.connections {
            wf.add_connection(connection)?;
        }
        wf.annotations = snapshot.annotations;
        wf.placeholders = snapshot.placeholders;
        wf.port_bars = snapshot.port_bars;
        Ok(wf)
    }

    pub fn from_json(json: &str) -> Result<Self, CanvasError> {
        let snapshot: WorkflowSnapshot =
            serde_json::from_str(json).map_err(|e| CanvasError::decode("workflow", e))?;
        Self::from_snapshot(snapshot)
    }

    // ─── Nodes ───────────────────────────────────────────────────────────

    /// Add a node, replacing any existing node with the same id.
    pub fn add_node(&mut self, node: WorkflowNode) -> NodeIndex {
        if let Some(&idx) = self.id_index.get(&node.id) {
            self.graph[idx] = node;
            return idx;
        }
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.id_index.insert(id, idx);
        idx
    }

    pub fn remove_node(&mut self, id: NodeId) -> Option<WorkflowNode> {
        let idx = self.id_index.remove(&id)?;
        self.connections.retain(|conn_id, conn| {
            let keep = !conn.touches_node(id);
            if !keep {
                self.edge_index.remove(conn_id);
            }
            keep
        });
        self.graph.remove_node(idx)
    }

    pub fn node(&self, id: NodeId) -> Option<&WorkflowNode> {
        self.id_index.get(&id).map(|&idx| &self.graph[idx])
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut WorkflowNode> {
        let idx = *self.id_index.get(&id)?;
        self.graph.node_weight_mut(idx)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &WorkflowNode> {
        self.graph.node_weights()
    }

    pub fn node_count(&self) -> usize {
        self.id_index.len()
    }

    /// Whether a connection runs directly between `a` and `b`, in either direction.
    pub fn are_connected(&self, a: NodeId, b: NodeId) -> bool {
        let (Some(&ia), Some(&ib)) = (self.id_index.get(&a), self.id_index.get(&b)) else {
            return false;
        };
        self.graph.neighbors_undirected(ia).any(|n| n == ib)
    }

    // ─── Connections ─────────────────────────────────────────────────────

    pub fn add_connection(&mut self, connection: Connection) -> Result<(), CanvasError> {
        for end in [connection.source, connection.dest] {
            if let Some(node) = end.node()
                && !self.id_index.contains_key(&node)
            {
                return Err(CanvasError::UnknownObject {
                    kind: "node",
                    id: node.to_string(),
                });
            }
        }
        if let Some(old) = self.edge_index.remove(&connection.id) {
            self.graph.remove_edge(old);
        }
        if let (Some(src), Some(dst)) = (connection.source.node(), connection.dest.node()) {
            let edge = self
                .graph
                .add_edge(self.id_index[&src], self.id_index[&dst], connection.id);
            self.edge_index.insert(connection.id, edge);
        }
        self.connections.insert(connection.id, connection);
        Ok(())
    }

    pub fn remove_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        if let Some(edge) = self.edge_index.remove(&id) {
            self.graph.remove_edge(edge);
        }
        self.connections.remove(&id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn connection_mut(&mut self, id: ConnectionId) -> Option<&mut Connection> {
        self.connections.get_mut(&id)
    }

    /// Connections in id order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Type of the port an endpoint refers to, given which end it is.
    pub fn endpoint_port_type(&self, end: &Endpoint, is_source: bool) -> Option<PortTypeId> {
        match end {
            Endpoint::Node { node, port } => {
                let node = self.node(*node)?;
                let ports = if is_source {
                    &node.out_ports
                } else {
                    &node.in_ports
                };
                ports.get(*port).copied()
            }
            Endpoint::PortBar { port } => {
                // Connections leave the in-bar and enter the out-bar.
                let side = if is_source {
                    PortBarSide::In
                } else {
                    PortBarSide::Out
                };
                self.port_bar(side)?.ports.get(*port).copied()
            }
        }
    }

    /// Whether an output of type `from` may feed an input of type `to`.
    pub fn ports_compatible(&self, from: PortTypeId, to: PortTypeId) -> bool {
        if from == to || to.as_str() == GENERIC_PORT_TYPE {
            return true;
        }
        self.port_types
            .get(&to)
            .is_some_and(|info| info.compatible_types.contains(&from))
    }

    // ─── Bendpoints ──────────────────────────────────────────────────────

    pub fn bendpoint(&self, id: BendpointId) -> Option<Position> {
        self.connection(id.connection)?
            .bendpoints
            .get(id.index)
            .copied()
    }

    pub fn bendpoint_mut(&mut self, id: BendpointId) -> Option<&mut Position> {
        self.connection_mut(id.connection)?
            .bendpoints
            .get_mut(id.index)
    }

    // ─── Annotations, placeholders, port bars ────────────────────────────

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn annotation_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id == id)
    }

    pub fn placeholder(&self, id: PlaceholderId) -> Option<&ComponentPlaceholder> {
        self.placeholders.iter().find(|p| p.id == id)
    }

    pub fn port_bar(&self, side: PortBarSide) -> Option<&PortBar> {
        self.port_bars.iter().find(|b| b.side == side)
    }

    pub fn port_bar_mut(&mut self, side: PortBarSide) -> Option<&mut PortBar> {
        self.port_bars.iter_mut().find(|b| b.side == side)
    }

    // ─── Generic object access ───────────────────────────────────────────

    pub fn contains(&self, object: &ObjectRef) -> bool {
        self.position_of(object).is_some()
    }

    /// Canvas position of any object (top-left for boxes).
    pub fn position_of(&self, object: &ObjectRef) -> Option<Position> {
        match object {
            ObjectRef::Node(id) => self.node(*id).map(|n| n.position),
            ObjectRef::Annotation(id) => self.annotation(*id).map(|a| a.bounds.origin()),
            ObjectRef::Bendpoint(id) => self.bendpoint(*id),
            ObjectRef::PortBar { container, side } => {
                if *container != self.id {
                    return None;
                }
                self.port_bar(*side).map(|b| b.bounds.origin())
            }
            ObjectRef::ComponentPlaceholder(id) => self.placeholder(*id).map(|p| p.position),
        }
    }

    /// Set the canvas position of an object.
    pub fn set_position(&mut self, object: &ObjectRef, position: Position) -> Result<(), CanvasError> {
        let unknown = || CanvasError::UnknownObject {
            kind: kind_name(object.kind()),
            id: object.to_string(),
        };
        match object {
            ObjectRef::Node(id) => {
                self.node_mut(*id).ok_or_else(unknown)?.position = position;
            }
            ObjectRef::Annotation(id) => {
                let annotation = self.annotation_mut(*id).ok_or_else(unknown)?;
                annotation.bounds.x = position.x;
                annotation.bounds.y = position.y;
            }
            ObjectRef::Bendpoint(id) => {
                *self.bendpoint_mut(*id).ok_or_else(unknown)? = position;
            }
            ObjectRef::PortBar { container, side } => {
                if *container != self.id {
                    return Err(unknown());
                }
                let bar = self.port_bar_mut(*side).ok_or_else(unknown)?;
                bar.bounds.x = position.x;
                bar.bounds.y = position.y;
            }
            ObjectRef::ComponentPlaceholder(id) => {
                let id = *id;
                self.placeholders
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or_else(unknown)?
                    .position = position;
            }
        }
        Ok(())
    }

    pub fn translate(&mut self, object: &ObjectRef, delta: Position) -> Result<(), CanvasError> {
        let current = self.position_of(object).ok_or_else(|| CanvasError::UnknownObject {
            kind: kind_name(object.kind()),
            id: object.to_string(),
        })?;
        self.set_position(object, current + delta)
    }

    /// Every selectable object on the canvas, in a stable order.
    pub fn object_refs(&self) -> Vec<ObjectRef> {
        let mut out: Vec<ObjectRef> = self.nodes().map(|n| ObjectRef::Node(n.id)).collect();
        out.sort();
        out.extend(self.annotations.iter().map(|a| ObjectRef::Annotation(a.id)));
        for conn in self.connections() {
            out.extend(
                (0..conn.bendpoints.len())
                    .map(|i| ObjectRef::Bendpoint(BendpointId::new(conn.id, i))),
            );
        }
        out.extend(self.port_bars.iter().map(|b| ObjectRef::PortBar {
            container: self.id,
            side: b.side,
        }));
        out.extend(
            self.placeholders
                .iter()
                .map(|p| ObjectRef::ComponentPlaceholder(p.id)),
        );
        out
    }
}

pub fn kind_name(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::Node => "node",
        ObjectKind::Annotation => "annotation",
        ObjectKind::Bendpoint => "bendpoint",
        ObjectKind::PortBar => "port bar",
        ObjectKind::ComponentPlaceholder => "component placeholder",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> PortTypeId {
        PortTypeId::intern("table")
    }

    fn sample() -> Workflow {
        let mut wf = Workflow::new(WorkflowId::intern("root"));
        for (id, x) in [("n1", 0.0), ("n2", 100.0), ("n3", 200.0)] {
            wf.add_node(
                WorkflowNode::new(NodeId::intern(id), Position::new(x, 0.0))
                    .with_ports([table()], [table()]),
            );
        }
        wf.add_connection(Connection {
            id: ConnectionId::intern("c1"),
            source: Endpoint::Node {
                node: NodeId::intern("n1"),
                port: 0,
            },
            dest: Endpoint::Node {
                node: NodeId::intern("n2"),
                port: 0,
            },
            bendpoints: vec![Position::new(50.0, 40.0)],
            allow_delete: true,
        })
        .unwrap();
        wf
    }

    #[test]
    fn connected_is_undirected() {
        let wf = sample();
        let (n1, n2, n3) = (
            NodeId::intern("n1"),
            NodeId::intern("n2"),
            NodeId::intern("n3"),
        );
        assert!(wf.are_connected(n1, n2));
        assert!(wf.are_connected(n2, n1));
        assert!(!wf.are_connected(n1, n3));
    }

    #[test]
    fn removing_a_node_drops_its_connections() {
        let mut wf = sample();
        wf.remove_node(NodeId::intern("n2"));
        assert!(wf.connection(ConnectionId::intern("c1")).is_none());
        assert!(!wf.are_connected(NodeId::intern("n1"), NodeId::intern("n2")));
    }

    #[test]
    fn connection_to_unknown_node_is_rejected() {
        let mut wf = sample();
        let err = wf
            .add_connection(Connection {
                id: ConnectionId::intern("bad"),
                source: Endpoint::Node {
                    node: NodeId::intern("ghost"),
                    port: 0,
                },
                dest: Endpoint::PortBar { port: 0 },
                bendpoints: vec![],
                allow_delete: true,
            })
            .unwrap_err();
        assert!(matches!(err, CanvasError::UnknownObject { kind: "node", .. }));
    }

    #[test]
    fn object_ref_string_roundtrip() {
        let refs = [
            ObjectRef::Node(NodeId::intern("root:1")),
            ObjectRef::Annotation(AnnotationId::intern("root_0")),
            ObjectRef::Bendpoint(BendpointId::new(ConnectionId::intern("root:2_1"), 3)),
            ObjectRef::PortBar {
                container: WorkflowId::intern("root:5"),
                side: PortBarSide::Out,
            },
            ObjectRef::ComponentPlaceholder(PlaceholderId::intern("ph-1")),
        ];
        for r in refs {
            assert_eq!(ObjectRef::parse(&r.to_string()).unwrap(), r);
        }
        assert!(ObjectRef::parse("widget:1").is_err());
        assert!(ObjectRef::parse("node:").is_err());
        assert!(ObjectRef::parse("portBar:root:up").is_err());
    }

    #[test]
    fn translate_moves_bendpoints_and_annotations() {
        let mut wf = sample();
        wf.annotations.push(Annotation {
            id: AnnotationId::intern("a1"),
            bounds: Bounds::new(10.0, 10.0, 200.0, 100.0),
            text: String::new(),
        });
        let bp = ObjectRef::Bendpoint(BendpointId::new(ConnectionId::intern("c1"), 0));
        wf.translate(&bp, Position::new(5.0, -5.0)).unwrap();
        assert_eq!(wf.position_of(&bp), Some(Position::new(55.0, 35.0)));

        let ann = ObjectRef::Annotation(AnnotationId::intern("a1"));
        wf.translate(&ann, Position::new(-10.0, 0.0)).unwrap();
        assert_eq!(
            wf.annotation(AnnotationId::intern("a1")).unwrap().bounds,
            Bounds::new(0.0, 10.0, 200.0, 100.0)
        );
    }

    #[test]
    fn compatibility_uses_declared_types() {
        let mut wf = sample();
        let db = PortTypeId::intern("database");
        assert!(wf.ports_compatible(table(), table()));
        assert!(!wf.ports_compatible(db, table()));
        wf.port_types.insert(
            table(),
            PortTypeInfo {
                compatible_types: [db].into_iter().collect(),
            },
        );
        assert!(wf.ports_compatible(db, table()));
        assert!(!wf.ports_compatible(table(), db));
        assert!(wf.ports_compatible(db, PortTypeId::intern(GENERIC_PORT_TYPE)));
    }

    #[test]
    fn snapshot_json_loads() {
        let json = r#"{
            "id": "root",
            "writable": true,
            "nodes": [
                {"id": "a", "position": {"x": 0, "y": 0}, "inPorts": ["table"], "outPorts": ["table"]},
                {"id": "b", "position": {"x": 200, "y": 0}}
            ],
            "connections": [
                {"id": "a_b", "source": {"type": "node", "node": "a", "port": 0},
                 "dest": {"type": "node", "node": "b", "port": 0}}
            ],
            "annotations": [{"id": "ann", "bounds": {"x": 0, "y": 0, "width": 100, "height": 50}}]
        }"#;
        let wf = Workflow::from_json(json).unwrap();
        assert_eq!(wf.node_count(), 2);
        assert!(wf.are_connected(NodeId::intern("a"), NodeId::intern("b")));
        assert!(wf.connection(ConnectionId::intern("a_b")).unwrap().allow_delete);
        assert_eq!(wf.object_refs().len(), 3);
    }
}
