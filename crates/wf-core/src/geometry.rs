//! Pure geometry helpers: positions, rectangles, grid snapping.
//!
//! Nothing here holds state; absence is expressed with `Option`/`bool`.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Neg, Sub};

// ─── Position ────────────────────────────────────────────────────────────

/// A point (or an offset) in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, other: Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: Position) -> f64 {
        self.distance_sq(other).sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Position {
    type Output = Position;
    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Position {
    fn add_assign(&mut self, rhs: Position) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Position {
    type Output = Position;
    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Position {
    type Output = Position;
    fn neg(self) -> Position {
        Position::new(-self.x, -self.y)
    }
}

// ─── Rectangles ──────────────────────────────────────────────────────────

/// Axis-aligned rectangle used for collision and selection queries.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle spanned by two corners, in any order.
    pub fn from_corners(a: Position, b: Position) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    /// Square of side `size` anchored at `origin` (its top-left corner).
    pub fn square(origin: Position, size: f64) -> Self {
        Self::new(origin.x, origin.y, size, size)
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Inclusive containment: points on the border are inside.
    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }

    /// Inclusive overlap test: rectangles that merely share an edge count.
    /// This is the semantics of the rubber-band selection rectangle.
    pub fn touches(&self, other: &Rect) -> bool {
        self.left <= other.right()
            && other.left <= self.right()
            && self.top <= other.bottom()
            && other.top <= self.bottom()
    }
}

/// Strict overlap: true only if the two rectangles share area on both axes.
/// Rectangles that only touch along an edge or a corner do not intersect.
pub fn rectangles_intersect(a: &Rect, b: &Rect) -> bool {
    a.left < b.right() && b.left < a.right() && a.top < b.bottom() && b.top < a.bottom()
}

// ─── Bounds ──────────────────────────────────────────────────────────────

/// Position and size of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn translated(&self, delta: Position) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            ..*self
        }
    }
}

// ─── Grid ────────────────────────────────────────────────────────────────

/// Round `value` to the nearest multiple of `unit`.
pub fn snap_to_grid(value: f64, unit: f64) -> f64 {
    if unit <= 0.0 {
        return value;
    }
    let snapped = (value / unit).round() * unit;
    // Avoid -0.0 leaking into serialized positions.
    if snapped == 0.0 { 0.0 } else { snapped }
}

/// The canvas grid (independent units per axis).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub x: f64,
    pub y: f64,
}

impl Grid {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn snap_x(&self, value: f64) -> f64 {
        snap_to_grid(value, self.x)
    }

    pub fn snap_y(&self, value: f64) -> f64 {
        snap_to_grid(value, self.y)
    }

    pub fn snap(&self, p: Position) -> Position {
        Position::new(self.snap_x(p.x), self.snap_y(p.y))
    }

    pub fn snap_bounds(&self, b: Bounds) -> Bounds {
        Bounds::new(
            self.snap_x(b.x),
            self.snap_y(b.y),
            self.snap_x(b.width),
            self.snap_y(b.height),
        )
    }

    /// `snap(p) - p`: how far an object has to travel to land on the grid.
    pub fn residual(&self, p: Position) -> Position {
        self.snap(p) - p
    }

    pub fn is_aligned(&self, b: &Bounds) -> bool {
        is_on_grid(b.x, self.x)
            && is_on_grid(b.y, self.y)
            && is_on_grid(b.width, self.x)
            && is_on_grid(b.height, self.y)
    }
}

/// Whether `value` is a multiple of `unit` (up to float noise).
pub fn is_on_grid(value: f64, unit: f64) -> bool {
    let steps = value / unit;
    (steps - steps.round()).abs() < 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_rectangles_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        let corner = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert!(!rectangles_intersect(&a, &right));
        assert!(!rectangles_intersect(&a, &below));
        assert!(!rectangles_intersect(&a, &corner));
        // ...but the inclusive test treats them as touching
        assert!(a.touches(&right));
        assert!(a.touches(&corner));
    }

    #[test]
    fn intersection_is_symmetric_and_reflexive() {
        let rects = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(5.0, 5.0, 10.0, 10.0),
            Rect::new(-20.0, 3.0, 21.0, 1.0),
            Rect::new(100.0, 100.0, 1.0, 1.0),
            Rect::new(9.5, -4.0, 0.5, 30.0),
        ];
        for a in &rects {
            assert!(rectangles_intersect(a, a), "{a:?} must intersect itself");
            for b in &rects {
                assert_eq!(rectangles_intersect(a, b), rectangles_intersect(b, a));
            }
        }
    }

    #[test]
    fn overlap_by_a_fraction_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(9.99, 9.99, 10.0, 10.0);
        assert!(rectangles_intersect(&a, &b));
    }

    #[test]
    fn snapping_rounds_to_nearest_multiple() {
        assert_eq!(snap_to_grid(12.0, 5.0), 10.0);
        assert_eq!(snap_to_grid(12.5, 5.0), 15.0);
        assert_eq!(snap_to_grid(-7.0, 5.0), -5.0);
        assert_eq!(snap_to_grid(-2.0, 5.0), 0.0);
        assert_eq!(snap_to_grid(20.0, 5.0), 20.0);
    }

    #[test]
    fn snapping_is_idempotent() {
        let mut v = -103.7;
        while v < 103.7 {
            let once = snap_to_grid(v, 5.0);
            assert_eq!(snap_to_grid(once, 5.0), once, "value {v}");
            v += 0.37;
        }
    }

    #[test]
    fn residual_pulls_off_grid_positions_onto_the_grid() {
        let grid = Grid::new(5.0, 5.0);
        assert_eq!(grid.residual(Position::new(10.0, 20.0)), Position::ORIGIN);
        assert_eq!(
            grid.residual(Position::new(11.0, 23.0)),
            Position::new(-1.0, 2.0)
        );
    }

    #[test]
    fn rect_from_corners_is_direction_independent() {
        let a = Rect::from_corners(Position::new(75.0, 75.0), Position::new(-5.0, -5.0));
        let b = Rect::from_corners(Position::new(-5.0, -5.0), Position::new(75.0, 75.0));
        assert_eq!(a, b);
        assert_eq!(a, Rect::new(-5.0, -5.0, 80.0, 80.0));
    }
}
