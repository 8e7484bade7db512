//! Edge panning while dragging.
//!
//! When the pointer gets close to a viewport edge during a drag, the camera
//! scrolls a little every animation frame until the pointer leaves the edge
//! area or the drag ends.

use wf_core::CanvasConfig;
use wf_core::geometry::Position;
use wf_render::camera::{AxisPinned, Camera, Edge};

/// What one frame of edge panning did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanTick {
    pub edge: Edge,
    /// Canvas-space scroll requested this frame (`step / zoom` per axis).
    pub offset: Position,
    /// Axes that could not scroll because the camera is at its pan limit.
    pub pinned: AxisPinned,
    /// Canvas-space distance the camera actually moved.
    pub scrolled: Position,
}

#[derive(Debug, Clone, Default)]
pub struct EdgePanController {
    edge: Option<Edge>,
}

impl EdgePanController {
    pub fn is_running(&self) -> bool {
        self.edge.is_some()
    }

    pub fn edge(&self) -> Option<Edge> {
        self.edge
    }

    /// Start (or retarget) panning. Calling it again while running only
    /// changes the edge; it never starts a second loop.
    pub fn start(&mut self, edge: Edge) {
        if self.edge.is_none() {
            log::debug!("edge pan started towards {edge:?}");
        }
        self.edge = Some(edge);
    }

    pub fn stop(&mut self) {
        if let Some(edge) = self.edge.take() {
            log::debug!("edge pan towards {edge:?} stopped");
        }
    }

    /// Start or stop depending on where the pointer is.
    pub fn track_pointer(&mut self, camera: &Camera, client: Position, config: &CanvasConfig) {
        match camera.visible_area_edge_near_point(client, config.edge_pan_margin) {
            Some(edge) => self.start(edge),
            None => self.stop(),
        }
    }

    /// Run one animation frame. Returns `None` when not panning.
    pub fn tick(&mut self, camera: &mut Camera, config: &CanvasConfig) -> Option<PanTick> {
        let edge = self.edge?;
        let (dx, dy) = edge.direction();
        let step = config.edge_pan_step / camera.zoom;
        let offset = Position::new(dx * step, dy * step);
        let pinned = camera.is_at_offset_boundary_axis(edge);
        let requested = Position::new(
            if pinned.x { 0.0 } else { offset.x },
            if pinned.y { 0.0 } else { offset.y },
        );
        let scrolled = if requested.is_zero() {
            Position::ORIGIN
        } else {
            camera.scroll_by_canvas(requested)
        };
        log::trace!("edge pan {edge:?}: scrolled {scrolled:?}, pinned {pinned:?}");
        Some(PanTick {
            edge,
            offset,
            pinned,
            scrolled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wf_core::geometry::Rect;

    #[test]
    fn start_is_idempotent_and_stop_halts() {
        let mut pan = EdgePanController::default();
        let mut cam = Camera::new(800.0, 600.0);
        let config = CanvasConfig::default();
        pan.start(Edge::E);
        pan.start(Edge::E);
        assert!(pan.is_running());
        let tick = pan.tick(&mut cam, &config).expect("running");
        assert_eq!(tick.offset, Position::new(5.0, 0.0));
        assert_eq!(tick.scrolled, Position::new(5.0, 0.0));
        pan.stop();
        assert_eq!(pan.tick(&mut cam, &config), None);
    }

    #[test]
    fn step_is_divided_by_zoom() {
        let mut pan = EdgePanController::default();
        let mut cam = Camera::new(800.0, 600.0);
        cam.zoom = 2.0;
        pan.start(Edge::NW);
        let tick = pan
            .tick(&mut cam, &CanvasConfig::default())
            .expect("running");
        assert_eq!(tick.offset, Position::new(-2.5, -2.5));
    }

    #[test]
    fn pinned_axis_does_not_scroll() {
        let mut pan = EdgePanController::default();
        let mut cam = Camera::new(800.0, 600.0);
        // Content exactly as wide as the viewport: no horizontal pan range.
        cam.pan_bounds = Some(Rect::new(0.0, 0.0, 800.0, 5000.0));
        cam.set_offset(Position::ORIGIN);
        pan.start(Edge::SE);
        let tick = pan
            .tick(&mut cam, &CanvasConfig::default())
            .expect("running");
        assert!(tick.pinned.x);
        assert!(!tick.pinned.y);
        assert_eq!(tick.scrolled, Position::new(0.0, 5.0));
    }

    #[test]
    fn track_pointer_follows_viewport_edges() {
        let mut pan = EdgePanController::default();
        let cam = Camera::new(800.0, 600.0);
        let config = CanvasConfig::default();
        pan.track_pointer(&cam, Position::new(795.0, 300.0), &config);
        assert_eq!(pan.edge(), Some(Edge::E));
        pan.track_pointer(&cam, Position::new(400.0, 300.0), &config);
        assert!(!pan.is_running());
    }
}
