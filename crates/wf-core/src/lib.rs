pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod model;
pub mod spatial;

pub use config::CanvasConfig;
pub use error::CanvasError;
pub use geometry::{Bounds, Grid, Position, Rect, rectangles_intersect, snap_to_grid};
pub use id::{AnnotationId, BendpointId, ConnectionId, NodeId, PlaceholderId, PortTypeId, WorkflowId};
pub use model::*;
pub use spatial::{SpatialHash, SpatialObject};
