//! Uniform-grid spatial hash for proximity queries.
//!
//! Built once at the start of a drag gesture from the current object
//! positions and thrown away when the gesture ends. Every object is
//! registered in all cells its bounding box overlaps, so a query only has to
//! look at the cells around the query point instead of scanning everything.

use crate::geometry::{Position, Rect};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Integer cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub col: i64,
    pub row: i64,
}

impl CellKey {
    pub fn of(p: Position, cell_size: f64) -> Self {
        Self {
            col: (p.x / cell_size).floor() as i64,
            row: (p.y / cell_size).floor() as i64,
        }
    }
}

/// An object taking part in a spatial query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialObject<K> {
    pub id: K,
    pub position: Position,
}

/// Cell → ids map plus the cell size it was built with.
#[derive(Debug, Clone)]
pub struct SpatialHash<K> {
    cells: HashMap<CellKey, SmallVec<[K; 4]>>,
    positions: HashMap<K, Position>,
    cell_size: f64,
}

impl<K: Copy + Eq + Hash + Ord> SpatialHash<K> {
    /// Register every object's bounding box (anchored at its position, of
    /// size `extent`) in all cells it overlaps.
    pub fn build(objects: impl IntoIterator<Item = SpatialObject<K>>, extent: f64, cell_size: f64) -> Self {
        let mut cells: HashMap<CellKey, SmallVec<[K; 4]>> = HashMap::new();
        let mut positions = HashMap::new();

        for object in objects {
            let bbox = Rect::square(object.position, extent);
            let min = CellKey::of(Position::new(bbox.left, bbox.top), cell_size);
            let max = CellKey::of(Position::new(bbox.right(), bbox.bottom()), cell_size);
            for col in min.col..=max.col {
                for row in min.row..=max.row {
                    cells.entry(CellKey { col, row }).or_default().push(object.id);
                }
            }
            positions.insert(object.id, object.position);
        }

        log::trace!(
            "spatial hash built: {} objects in {} cells (cell size {cell_size})",
            positions.len(),
            cells.len()
        );

        Self {
            cells,
            positions,
            cell_size,
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position_of(&self, id: K) -> Option<Position> {
        self.positions.get(&id).copied()
    }

    pub fn ids_in_cell(&self, key: CellKey) -> &[K] {
        self.cells.get(&key).map(|ids| ids.as_slice()).unwrap_or(&[])
    }

    /// Candidates from the cell containing `p` and its eight neighbours,
    /// deduplicated and sorted for deterministic iteration.
    pub fn candidates_around(&self, p: Position) -> Vec<K> {
        let center = CellKey::of(p, self.cell_size);
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for col in center.col - 1..=center.col + 1 {
            for row in center.row - 1..=center.row + 1 {
                for &id in self.ids_in_cell(CellKey { col, row }) {
                    if seen.insert(id) {
                        out.push(id);
                    }
                }
            }
        }
        out.sort();
        out
    }

    /// Find the object closest to `reference` that passes `aabb_test`,
    /// never returning the reference itself.
    ///
    /// Ties in distance resolve to the smaller id.
    pub fn query_nearby<F>(&self, reference: SpatialObject<K>, mut aabb_test: F) -> Option<K>
    where
        F: FnMut(&SpatialObject<K>, &SpatialObject<K>) -> bool,
    {
        let mut best: Option<(f64, K)> = None;
        for id in self.candidates_around(reference.position) {
            if id == reference.id {
                continue;
            }
            let Some(position) = self.position_of(id) else {
                continue;
            };
            let candidate = SpatialObject { id, position };
            if !aabb_test(&candidate, &reference) {
                continue;
            }
            let dist = position.distance_sq(reference.position);
            match best {
                Some((best_dist, _)) if best_dist <= dist => {}
                _ => best = Some((dist, id)),
            }
        }
        best.map(|(_, id)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::rectangles_intersect;

    fn obj(id: u32, x: f64, y: f64) -> SpatialObject<u32> {
        SpatialObject {
            id,
            position: Position::new(x, y),
        }
    }

    fn overlap(size: f64) -> impl FnMut(&SpatialObject<u32>, &SpatialObject<u32>) -> bool {
        move |a, b| {
            rectangles_intersect(&Rect::square(a.position, size), &Rect::square(b.position, size))
        }
    }

    #[test]
    fn objects_spanning_cells_are_registered_in_each() {
        let hash = SpatialHash::build([obj(1, 90.0, 90.0)], 20.0, 100.0);
        for (col, row) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(hash.ids_in_cell(CellKey { col, row }), &[1]);
        }
        assert!(hash.ids_in_cell(CellKey { col: 2, row: 2 }).is_empty());
    }

    #[test]
    fn query_excludes_reference() {
        let hash = SpatialHash::build([obj(1, 0.0, 0.0), obj(2, 500.0, 500.0)], 32.0, 182.0);
        let found = hash.query_nearby(obj(1, 0.0, 0.0), overlap(182.0));
        assert_eq!(found, None);
    }

    #[test]
    fn query_returns_nearest_match() {
        let hash = SpatialHash::build(
            [obj(1, 0.0, 0.0), obj(2, 100.0, 0.0), obj(3, 40.0, 0.0)],
            32.0,
            182.0,
        );
        let found = hash.query_nearby(obj(9, 10.0, 0.0), overlap(182.0));
        assert_eq!(found, Some(1));
        let found = hash.query_nearby(obj(9, 35.0, 0.0), overlap(182.0));
        assert_eq!(found, Some(3));
    }

    #[test]
    fn equal_distance_prefers_smaller_id() {
        let hash = SpatialHash::build([obj(7, -10.0, 0.0), obj(4, 10.0, 0.0)], 32.0, 182.0);
        let found = hash.query_nearby(obj(9, 0.0, 0.0), overlap(182.0));
        assert_eq!(found, Some(4));
    }

    #[test]
    fn touching_detection_boxes_are_not_close_enough() {
        // Boxes of 182 anchored 182 apart share only an edge.
        let hash = SpatialHash::build([obj(1, 182.0, 0.0)], 32.0, 182.0);
        assert_eq!(hash.query_nearby(obj(9, 0.0, 0.0), overlap(182.0)), None);
        assert_eq!(hash.query_nearby(obj(9, 1.0, 0.0), overlap(182.0)), Some(1));
    }

    #[test]
    fn negative_coordinates_hash_to_negative_cells() {
        assert_eq!(
            CellKey::of(Position::new(-0.5, -200.0), 100.0),
            CellKey { col: -1, row: -2 }
        );
    }
}
