//! Hit testing: canvas point → object lookup.
//!
//! Objects are tested front-to-back in paint order: port bars, bendpoints,
//! nodes, component placeholders, then annotations (which sit underneath
//! everything else). Connections are not selectable by point; their hover
//! areas are found separately and reported with a label of the form
//! `connector-hover:<connectionId>`.

use kurbo::{BezPath, CubicBez, ParamCurveNearest, Point, Shape};
use wf_core::geometry::{Position, Rect};
use wf_core::id::{BendpointId, ConnectionId};
use wf_core::model::*;
use wf_core::CanvasConfig;

/// Label prefix of connection hover hit areas.
pub const CONNECTOR_HOVER_PREFIX: &str = "connector-hover:";

/// Hit radius around a bendpoint centre.
pub const BENDPOINT_RADIUS: f64 = 4.0;

const NEAREST_ACCURACY: f64 = 1e-3;

pub fn hover_label(id: ConnectionId) -> String {
    format!("{CONNECTOR_HOVER_PREFIX}{id}")
}

/// Extract the connection id from a hover-area label.
pub fn parse_hover_label(label: &str) -> Option<ConnectionId> {
    label
        .strip_prefix(CONNECTOR_HOVER_PREFIX)
        .filter(|rest| !rest.is_empty())
        .map(ConnectionId::intern)
}

/// Find the topmost selectable object at canvas position `p`.
pub fn hit_test(workflow: &Workflow, config: &CanvasConfig, p: Position) -> Option<ObjectRef> {
    for bar in &workflow.port_bars {
        if bar.bounds.as_rect().contains(p) {
            return Some(ObjectRef::PortBar {
                container: workflow.id,
                side: bar.side,
            });
        }
    }

    for conn in workflow.connections() {
        for (index, bp) in conn.bendpoints.iter().enumerate() {
            if bp.distance(p) <= BENDPOINT_RADIUS {
                return Some(ObjectRef::Bendpoint(BendpointId::new(conn.id, index)));
            }
        }
    }

    // Later nodes are painted on top.
    let mut top_node = None;
    for node in workflow.nodes() {
        if Rect::square(node.position, config.node_size).contains(p) {
            top_node = Some(node.id);
        }
    }
    if let Some(id) = top_node {
        return Some(ObjectRef::Node(id));
    }

    for ph in &workflow.placeholders {
        if Rect::square(ph.position, config.node_size).contains(p) {
            return Some(ObjectRef::ComponentPlaceholder(ph.id));
        }
    }

    workflow
        .annotations
        .iter()
        .rev()
        .find(|a| a.bounds.as_rect().contains(p))
        .map(|a| ObjectRef::Annotation(a.id))
}

// ─── Connections ─────────────────────────────────────────────────────────

fn to_point(p: Position) -> Point {
    Point::new(p.x, p.y)
}

/// Vertical position of port `index` out of `count` along a box edge.
fn port_offset(index: usize, count: usize, extent: f64) -> f64 {
    let count = count.max(1) as f64;
    (index as f64 + 0.5) * extent / count
}

/// Canvas position of a connection end.
pub fn endpoint_position(
    workflow: &Workflow,
    config: &CanvasConfig,
    end: &Endpoint,
    is_source: bool,
) -> Option<Position> {
    match end {
        Endpoint::Node { node, port } => {
            let node = workflow.node(*node)?;
            let (count, x) = if is_source {
                (node.out_ports.len(), node.position.x + config.node_size)
            } else {
                (node.in_ports.len(), node.position.x)
            };
            Some(Position::new(
                x,
                node.position.y + port_offset(*port, count, config.node_size),
            ))
        }
        Endpoint::PortBar { port } => {
            let side = if is_source {
                PortBarSide::In
            } else {
                PortBarSide::Out
            };
            let bar = workflow.port_bar(side)?;
            let x = if is_source {
                bar.bounds.x + bar.bounds.width
            } else {
                bar.bounds.x
            };
            Some(Position::new(
                x,
                bar.bounds.y + port_offset(*port, bar.ports.len(), bar.bounds.height),
            ))
        }
    }
}

/// Connection geometry: horizontal-tangent cubic segments from the source
/// port through every bendpoint to the destination port.
pub fn connection_path(
    workflow: &Workflow,
    config: &CanvasConfig,
    conn: &Connection,
) -> Option<BezPath> {
    let start = endpoint_position(workflow, config, &conn.source, true)?;
    let end = endpoint_position(workflow, config, &conn.dest, false)?;

    let mut stops = Vec::with_capacity(conn.bendpoints.len() + 2);
    stops.push(start);
    stops.extend(conn.bendpoints.iter().copied());
    stops.push(end);

    let mut path = BezPath::new();
    path.move_to(to_point(start));
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let handle = ((b.x - a.x).abs() / 2.0).max(20.0);
        let seg = CubicBez::new(
            to_point(a),
            Point::new(a.x + handle, a.y),
            Point::new(b.x - handle, b.y),
            to_point(b),
        );
        path.curve_to(seg.p1, seg.p2, seg.p3);
    }
    Some(path)
}

/// Distance from `p` to the closest point of `path`.
pub fn distance_to_path(path: &BezPath, p: Position) -> f64 {
    let pt = to_point(p);
    path.segments()
        .map(|seg| seg.nearest(pt, NEAREST_ACCURACY).distance_sq)
        .fold(f64::INFINITY, f64::min)
        .sqrt()
}

/// The connection whose hover area (a stroke of `connection_hover_width`)
/// contains `p`, preferring the closest one.
pub fn hit_test_connection(
    workflow: &Workflow,
    config: &CanvasConfig,
    p: Position,
) -> Option<ConnectionId> {
    let tolerance = config.connection_hover_width / 2.0;
    let mut best: Option<(f64, ConnectionId)> = None;
    for conn in workflow.connections() {
        let Some(path) = connection_path(workflow, config, conn) else {
            log::trace!("connection {} has a dangling end, skipping", conn.id);
            continue;
        };
        // Cheap reject before the nearest-point search.
        if !path.bounding_box().inflate(tolerance, tolerance).contains(to_point(p)) {
            continue;
        }
        let dist = distance_to_path(&path, p);
        if dist <= tolerance && best.is_none_or(|(d, _)| dist < d) {
            best = Some((dist, conn.id));
        }
    }
    best.map(|(_, id)| id)
}

// ─── Rectangle selection ─────────────────────────────────────────────────

/// Objects selected by a rubber-band rectangle.
///
/// Nodes and placeholders are included when their box touches the rectangle
/// (sharing an edge counts), bendpoints when they lie inside it, and
/// annotations only when fully enclosed.
pub fn hit_test_rect(workflow: &Workflow, config: &CanvasConfig, rect: Rect) -> Vec<ObjectRef> {
    let mut result = Vec::new();

    let mut nodes: Vec<_> = workflow
        .nodes()
        .filter(|n| Rect::square(n.position, config.node_size).touches(&rect))
        .map(|n| ObjectRef::Node(n.id))
        .collect();
    nodes.sort();
    result.extend(nodes);

    result.extend(
        workflow
            .placeholders
            .iter()
            .filter(|p| Rect::square(p.position, config.node_size).touches(&rect))
            .map(|p| ObjectRef::ComponentPlaceholder(p.id)),
    );

    for conn in workflow.connections() {
        for (index, bp) in conn.bendpoints.iter().enumerate() {
            if rect.contains(*bp) {
                result.push(ObjectRef::Bendpoint(BendpointId::new(conn.id, index)));
            }
        }
    }

    result.extend(
        workflow
            .annotations
            .iter()
            .filter(|a| {
                let b = a.bounds.as_rect();
                rect.contains(Position::new(b.left, b.top))
                    && rect.contains(Position::new(b.right(), b.bottom()))
            })
            .map(|a| ObjectRef::Annotation(a.id)),
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wf_core::geometry::Bounds;
    use wf_core::id::{AnnotationId, NodeId, PortTypeId, WorkflowId};

    fn config() -> CanvasConfig {
        CanvasConfig::default()
    }

    fn two_nodes_connected() -> Workflow {
        let table = PortTypeId::intern("table");
        let mut wf = Workflow::new(WorkflowId::intern("root"));
        wf.add_node(
            WorkflowNode::new(NodeId::intern("src"), Position::new(0.0, 0.0))
                .with_ports([], [table]),
        );
        wf.add_node(
            WorkflowNode::new(NodeId::intern("dst"), Position::new(300.0, 0.0))
                .with_ports([table], []),
        );
        wf.add_connection(Connection {
            id: ConnectionId::intern("src_dst"),
            source: Endpoint::Node {
                node: NodeId::intern("src"),
                port: 0,
            },
            dest: Endpoint::Node {
                node: NodeId::intern("dst"),
                port: 0,
            },
            bendpoints: vec![],
            allow_delete: true,
        })
        .unwrap();
        wf
    }

    #[test]
    fn hover_labels_roundtrip() {
        let id = ConnectionId::intern("root:1_0");
        assert_eq!(parse_hover_label(&hover_label(id)), Some(id));
        assert_eq!(parse_hover_label("node:root:1"), None);
        assert_eq!(parse_hover_label(CONNECTOR_HOVER_PREFIX), None);
    }

    #[test]
    fn straight_connection_is_hit_near_its_middle() {
        let wf = two_nodes_connected();
        // Both ports sit at y = 16; the path is a straight horizontal line.
        let hit = hit_test_connection(&wf, &config(), Position::new(166.0, 19.0));
        assert_eq!(hit, Some(ConnectionId::intern("src_dst")));
        let miss = hit_test_connection(&wf, &config(), Position::new(166.0, 40.0));
        assert_eq!(miss, None);
    }

    #[test]
    fn nodes_win_over_annotations_underneath() {
        let mut wf = two_nodes_connected();
        wf.annotations.push(Annotation {
            id: AnnotationId::intern("bg"),
            bounds: Bounds::new(-50.0, -50.0, 500.0, 200.0),
            text: String::new(),
        });
        assert_eq!(
            hit_test(&wf, &config(), Position::new(10.0, 10.0)),
            Some(ObjectRef::Node(NodeId::intern("src")))
        );
        assert_eq!(
            hit_test(&wf, &config(), Position::new(150.0, 100.0)),
            Some(ObjectRef::Annotation(AnnotationId::intern("bg")))
        );
        assert_eq!(hit_test(&wf, &config(), Position::new(900.0, 900.0)), None);
    }

    #[test]
    fn bendpoints_are_hit_within_radius() {
        let mut wf = two_nodes_connected();
        wf.connection_mut(ConnectionId::intern("src_dst"))
            .unwrap()
            .bendpoints
            .push(Position::new(150.0, 80.0));
        assert_eq!(
            hit_test(&wf, &config(), Position::new(152.0, 82.0)),
            Some(ObjectRef::Bendpoint(BendpointId::new(
                ConnectionId::intern("src_dst"),
                0
            )))
        );
    }

    fn grid_of_four() -> Workflow {
        let mut wf = Workflow::new(WorkflowId::intern("root"));
        for (id, x, y) in [
            ("a", 0.0, 0.0),
            ("b", 0.0, 50.0),
            ("c", 50.0, 50.0),
            ("d", 50.0, 0.0),
        ] {
            wf.add_node(WorkflowNode::new(NodeId::intern(id), Position::new(x, y)));
        }
        wf
    }

    fn selected(wf: &Workflow, from: (f64, f64), to: (f64, f64)) -> usize {
        let rect = Rect::from_corners(Position::new(from.0, from.1), Position::new(to.0, to.1));
        hit_test_rect(wf, &config(), rect).len()
    }

    #[test]
    fn selection_rectangle_encloses_all_four() {
        let wf = grid_of_four();
        assert_eq!(selected(&wf, (-5.0, -5.0), (75.0, 75.0)), 4);
        assert_eq!(selected(&wf, (75.0, 75.0), (-5.0, -5.0)), 4);
    }

    #[test]
    fn selection_rectangle_between_nodes_selects_none() {
        let wf = grid_of_four();
        assert_eq!(selected(&wf, (33.0, 33.0), (49.0, 49.0)), 0);
        assert_eq!(selected(&wf, (49.0, 49.0), (33.0, 33.0)), 0);
    }

    #[test]
    fn selection_rectangle_boundary_flips_at_one_unit() {
        let wf = grid_of_four();
        assert_eq!(selected(&wf, (32.0, 32.0), (50.0, 50.0)), 4);
        assert_eq!(selected(&wf, (50.0, 50.0), (32.0, 32.0)), 4);
        assert_eq!(selected(&wf, (33.0, 32.0), (50.0, 50.0)), 2);
    }
}
