//! Camera: screen ↔ canvas coordinates, zoom, pan range, viewport edges.
//!
//! Screen coordinates are client pixels; canvas coordinates are workflow
//! units. `canvas = (client - origin - offset) / zoom`.

use wf_core::geometry::{Position, Rect};

/// One of the eight compass edges/corners of the visible area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Edge {
    /// Unit direction pointing out of the viewport through this edge.
    pub fn direction(&self) -> (f64, f64) {
        match self {
            Self::N => (0.0, -1.0),
            Self::NE => (1.0, -1.0),
            Self::E => (1.0, 0.0),
            Self::SE => (1.0, 1.0),
            Self::S => (0.0, 1.0),
            Self::SW => (-1.0, 1.0),
            Self::W => (-1.0, 0.0),
            Self::NW => (-1.0, -1.0),
        }
    }

    fn from_flags(left: bool, right: bool, top: bool, bottom: bool) -> Option<Self> {
        match (left, right, top, bottom) {
            (true, _, true, _) => Some(Self::NW),
            (true, _, _, true) => Some(Self::SW),
            (_, true, true, _) => Some(Self::NE),
            (_, true, _, true) => Some(Self::SE),
            (true, _, _, _) => Some(Self::W),
            (_, true, _, _) => Some(Self::E),
            (_, _, true, _) => Some(Self::N),
            (_, _, _, true) => Some(Self::S),
            _ => None,
        }
    }
}

/// Whether the camera offset sits on the pan limit of each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisPinned {
    pub x: bool,
    pub y: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub zoom: f64,
    /// Translation of the canvas content in screen pixels.
    offset: Position,
    /// Client coordinates of the canvas element's top-left corner.
    pub origin: Position,
    /// Size of the canvas element in screen pixels.
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Canvas-space area the view may show; `None` means unbounded.
    pub pan_bounds: Option<Rect>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Camera {
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            zoom: 1.0,
            offset: Position::ORIGIN,
            origin: Position::ORIGIN,
            viewport_width,
            viewport_height,
            pan_bounds: None,
        }
    }

    pub fn offset(&self) -> Position {
        self.offset
    }

    pub fn screen_to_canvas(&self, client: Position) -> Position {
        Position::new(
            (client.x - self.origin.x - self.offset.x) / self.zoom,
            (client.y - self.origin.y - self.offset.y) / self.zoom,
        )
    }

    pub fn canvas_to_screen(&self, p: Position) -> Position {
        Position::new(
            p.x * self.zoom + self.offset.x + self.origin.x,
            p.y * self.zoom + self.offset.y + self.origin.y,
        )
    }

    /// Canvas-space rectangle currently visible.
    pub fn visible_area(&self) -> Rect {
        let top_left = self.screen_to_canvas(self.origin);
        Rect::new(
            top_left.x,
            top_left.y,
            self.viewport_width / self.zoom,
            self.viewport_height / self.zoom,
        )
    }

    /// Set the zoom factor, keeping the canvas point under `anchor` (client
    /// coordinates) fixed on screen.
    pub fn zoom_around(&mut self, zoom: f64, anchor: Position) {
        if !(zoom.is_finite() && zoom > 0.0) {
            log::warn!("ignoring invalid zoom factor {zoom}");
            return;
        }
        let fixed = self.screen_to_canvas(anchor);
        self.zoom = zoom;
        let drift = self.canvas_to_screen(fixed) - anchor;
        self.set_offset(self.offset - drift);
    }

    fn offset_range(&self) -> Option<((f64, f64), (f64, f64))> {
        let b = self.pan_bounds?;
        // offset.x ∈ [viewport - right*zoom, -left*zoom]
        let x_min = self.viewport_width - b.right() * self.zoom;
        let x_max = -b.left * self.zoom;
        let y_min = self.viewport_height - b.bottom() * self.zoom;
        let y_max = -b.top * self.zoom;
        // Content smaller than the viewport: pin to the leading edge.
        Some(((x_min.min(x_max), x_max), (y_min.min(y_max), y_max)))
    }

    /// Set the offset, clamped to the pan bounds. Returns the applied offset.
    pub fn set_offset(&mut self, offset: Position) -> Position {
        self.offset = match self.offset_range() {
            Some(((x_min, x_max), (y_min, y_max))) => Position::new(
                offset.x.clamp(x_min, x_max),
                offset.y.clamp(y_min, y_max),
            ),
            None => offset,
        };
        self.offset
    }

    /// Scroll the view by a canvas-space vector (positive x reveals content
    /// to the right). Returns the canvas-space distance actually scrolled.
    pub fn scroll_by_canvas(&mut self, delta: Position) -> Position {
        let before = self.offset;
        let requested = Position::new(
            before.x - delta.x * self.zoom,
            before.y - delta.y * self.zoom,
        );
        let applied = self.set_offset(requested);
        Position::new(
            (before.x - applied.x) / self.zoom,
            (before.y - applied.y) / self.zoom,
        )
    }

    /// Pan by screen pixels (keyboard panning).
    pub fn pan_by_screen(&mut self, dx: f64, dy: f64) -> Position {
        self.set_offset(Position::new(self.offset.x + dx, self.offset.y + dy))
    }

    /// Which edge of the viewport `client` is within `margin` pixels of.
    /// Points outside the viewport count as near the edge they crossed.
    pub fn visible_area_edge_near_point(&self, client: Position, margin: f64) -> Option<Edge> {
        let x = client.x - self.origin.x;
        let y = client.y - self.origin.y;
        Edge::from_flags(
            x < margin,
            x > self.viewport_width - margin,
            y < margin,
            y > self.viewport_height - margin,
        )
    }

    /// Whether scrolling towards `edge` is blocked on each axis.
    pub fn is_at_offset_boundary_axis(&self, edge: Edge) -> AxisPinned {
        let Some(((x_min, x_max), (y_min, y_max))) = self.offset_range() else {
            return AxisPinned::default();
        };
        let (dx, dy) = edge.direction();
        // Scrolling right lowers offset.x, so the limit hit is the minimum.
        let x = (dx > 0.0 && self.offset.x <= x_min) || (dx < 0.0 && self.offset.x >= x_max);
        let y = (dy > 0.0 && self.offset.y <= y_min) || (dy < 0.0 && self.offset.y >= y_max);
        AxisPinned { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_canvas_roundtrip_with_zoom_and_offset() {
        let mut cam = Camera::new(800.0, 600.0);
        cam.origin = Position::new(100.0, 50.0);
        cam.zoom = 2.0;
        cam.set_offset(Position::new(-40.0, 20.0));

        let canvas = cam.screen_to_canvas(Position::new(160.0, 110.0));
        assert_eq!(canvas, Position::new(50.0, 20.0));
        assert_eq!(cam.canvas_to_screen(canvas), Position::new(160.0, 110.0));
    }

    #[test]
    fn edge_detection_covers_corners() {
        let cam = Camera::new(800.0, 600.0);
        let near = |x, y| cam.visible_area_edge_near_point(Position::new(x, y), 40.0);
        assert_eq!(near(400.0, 300.0), None);
        assert_eq!(near(10.0, 300.0), Some(Edge::W));
        assert_eq!(near(790.0, 300.0), Some(Edge::E));
        assert_eq!(near(400.0, 5.0), Some(Edge::N));
        assert_eq!(near(400.0, 599.0), Some(Edge::S));
        assert_eq!(near(5.0, 5.0), Some(Edge::NW));
        assert_eq!(near(795.0, 595.0), Some(Edge::SE));
        assert_eq!(near(-30.0, 700.0), Some(Edge::SW));
        assert_eq!(near(900.0, -3.0), Some(Edge::NE));
    }

    #[test]
    fn scrolling_is_clamped_by_pan_bounds() {
        let mut cam = Camera::new(100.0, 100.0);
        cam.pan_bounds = Some(Rect::new(0.0, 0.0, 150.0, 100.0));
        let scrolled = cam.scroll_by_canvas(Position::new(30.0, 10.0));
        assert_eq!(scrolled, Position::new(30.0, 0.0));
        let scrolled = cam.scroll_by_canvas(Position::new(30.0, 0.0));
        assert_eq!(scrolled, Position::new(20.0, 0.0));
        assert_eq!(
            cam.is_at_offset_boundary_axis(Edge::E),
            AxisPinned { x: true, y: false }
        );
        assert_eq!(
            cam.is_at_offset_boundary_axis(Edge::SE),
            AxisPinned { x: true, y: true }
        );
        assert_eq!(cam.is_at_offset_boundary_axis(Edge::W), AxisPinned::default());
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut cam = Camera::new(800.0, 600.0);
        let anchor = Position::new(200.0, 100.0);
        let before = cam.screen_to_canvas(anchor);
        cam.zoom_around(2.5, anchor);
        let after = cam.screen_to_canvas(anchor);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }
}
