//! Uniform-grid spatial hash for proximity queries
//!
//! Rebuilt from scratch every tick: `clear()` then `insert()` every live
//! entity. There is no removal API; stale entries never survive a rebuild.
//! Queries return the 3x3 block of cells around a point, which is a
//! conservative superset; callers do the exact distance test.

use std::collections::HashMap;

use glam::Vec2;

#[derive(Debug, Clone)]
pub struct SpatialHash<T> {
    cell_size: f32,
    buckets: HashMap<(i32, i32), Vec<T>>,
}

impl<T: Copy> SpatialHash<T> {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            buckets: HashMap::new(),
        }
    }

    /// Grid cell containing a world position
    pub fn cell_of(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, pos: Vec2, item: T) {
        let cell = self.cell_of(pos);
        self.buckets.entry(cell).or_default().push(item);
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Items in the 3x3 neighbourhood of `pos`, x-major then y, bucket order within a cell
    pub fn query(&self, pos: Vec2) -> Vec<T> {
        let (cx, cy) = self.cell_of(pos);
        let mut out = Vec::new();
        for x in cx - 1..=cx + 1 {
            for y in cy - 1..=cy + 1 {
                if let Some(items) = self.buckets.get(&(x, y)) {
                    out.extend_from_slice(items);
                }
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }
}
