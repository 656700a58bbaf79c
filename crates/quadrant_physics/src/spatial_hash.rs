//! Uniform-grid spatial hash
//!
//! Each collider is bucketed into every grid cell its bounds touch. Queries
//! walk the cells covering the query area and test the stored bounds.

use std::collections::{HashMap, HashSet};

use quadrant_math::Rect;
use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;

use crate::index::{ColliderKey, PhysicsError, SpatialIndex};
use crate::CollisionLayer;

/// Configuration for the spatial hash
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialHashConfig {
    /// Side length of a grid cell in world units
    pub cell_size: f32,
    /// Upper bound on the cells a single collider may occupy
    pub max_cells_per_collider: usize,
}

impl Default for SpatialHashConfig {
    fn default() -> Self {
        Self {
            cell_size: 100.0,
            max_cells_per_collider: 1024,
        }
    }
}

impl SpatialHashConfig {
    /// Create a config with the given cell size and the default cell limit
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            ..Self::default()
        }
    }
}

type Cell = (i32, i32);

#[derive(Clone, Copy, Debug)]
struct Entry {
    bounds: Rect,
    layer: CollisionLayer,
}

/// Inclusive range of cells covered by some bounds
#[derive(Clone, Copy, Debug)]
struct CellSpan {
    min: Cell,
    max: Cell,
}

impl CellSpan {
    fn count(&self) -> u64 {
        let w = (self.max.0 as i64 - self.min.0 as i64 + 1) as u64;
        let h = (self.max.1 as i64 - self.min.1 as i64 + 1) as u64;
        w * h
    }

    fn covers(&self, (x, y): Cell) -> bool {
        (self.min.0..=self.max.0).contains(&x) && (self.min.1..=self.max.1).contains(&y)
    }

    fn cells(self) -> impl Iterator<Item = Cell> {
        (self.min.1..=self.max.1).flat_map(move |y| (self.min.0..=self.max.0).map(move |x| (x, y)))
    }
}

/// Broad-phase index backed by a sparse uniform grid
pub struct SpatialHash {
    config: SpatialHashConfig,
    inverse_cell_size: f32,
    cells: HashMap<Cell, Vec<ColliderKey>>,
    entries: SecondaryMap<ColliderKey, Entry>,
}

impl Default for SpatialHash {
    fn default() -> Self {
        let config = SpatialHashConfig::default();
        Self {
            inverse_cell_size: 1.0 / config.cell_size,
            config,
            cells: HashMap::new(),
            entries: SecondaryMap::new(),
        }
    }
}

impl SpatialHash {
    /// Create a spatial hash, rejecting a non-positive or non-finite cell size
    pub fn new(config: SpatialHashConfig) -> Result<Self, PhysicsError> {
        if !(config.cell_size.is_finite() && config.cell_size > 0.0) {
            return Err(PhysicsError::InvalidCellSize(config.cell_size));
        }
        Ok(Self {
            inverse_cell_size: 1.0 / config.cell_size,
            config,
            cells: HashMap::new(),
            entries: SecondaryMap::new(),
        })
    }

    pub fn config(&self) -> &SpatialHashConfig {
        &self.config
    }

    /// Number of non-empty grid cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Bounds `key` was inserted or last updated with
    pub fn bounds_of(&self, key: ColliderKey) -> Option<Rect> {
        self.entries.get(key).map(|e| e.bounds)
    }

    fn cell_at(&self, x: f32, y: f32) -> Cell {
        (
            (x * self.inverse_cell_size).floor() as i32,
            (y * self.inverse_cell_size).floor() as i32,
        )
    }

    fn span(&self, bounds: &Rect) -> CellSpan {
        CellSpan {
            min: self.cell_at(bounds.min.x, bounds.min.y),
            max: self.cell_at(bounds.max.x, bounds.max.y),
        }
    }

    fn checked_span(&self, key: ColliderKey, bounds: &Rect) -> Result<CellSpan, PhysicsError> {
        let span = self.span(bounds);
        let cells = span.count();
        if cells > self.config.max_cells_per_collider as u64 {
            return Err(PhysicsError::CellLimitExceeded {
                key,
                cells,
                limit: self.config.max_cells_per_collider,
            });
        }
        Ok(span)
    }

    /// Cells a query over `span` has to visit, row by row
    ///
    /// Spans larger than the occupied grid walk the occupied cells instead,
    /// so query cost never exceeds the number of non-empty cells.
    fn visit_cells(&self, span: CellSpan) -> Vec<Cell> {
        if span.count() <= self.cells.len() as u64 {
            return span.cells().collect();
        }
        let mut occupied: Vec<Cell> = self.cells.keys().copied().filter(|c| span.covers(*c)).collect();
        occupied.sort_unstable_by_key(|&(x, y)| (y, x));
        occupied
    }

    fn bucket(&mut self, key: ColliderKey, span: CellSpan) {
        for cell in span.cells() {
            self.cells.entry(cell).or_default().push(key);
        }
    }

    fn unbucket(&mut self, key: ColliderKey, span: CellSpan) {
        for cell in span.cells() {
            if let Some(keys) = self.cells.get_mut(&cell) {
                keys.retain(|k| *k != key);
                if keys.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
    }
}

impl SpatialIndex for SpatialHash {
    fn insert(&mut self, key: ColliderKey, bounds: Rect, layer: CollisionLayer) -> Result<(), PhysicsError> {
        if self.entries.contains_key(key) {
            return Err(PhysicsError::AlreadyRegistered(key));
        }
        let span = self.checked_span(key, &bounds)?;
        self.bucket(key, span);
        self.entries.insert(key, Entry { bounds, layer });
        Ok(())
    }

    fn remove(&mut self, key: ColliderKey) -> Result<(), PhysicsError> {
        let entry = self.entries.remove(key).ok_or(PhysicsError::NotRegistered(key))?;
        let span = self.span(&entry.bounds);
        self.unbucket(key, span);
        Ok(())
    }

    fn update(&mut self, key: ColliderKey, bounds: Rect) -> Result<(), PhysicsError> {
        let old = self
            .entries
            .get(key)
            .map(|e| e.bounds)
            .ok_or(PhysicsError::NotRegistered(key))?;
        // Validate first so a rejected move leaves the old entry in place
        let new_span = self.checked_span(key, &bounds)?;
        let old_span = self.span(&old);
        self.unbucket(key, old_span);
        self.bucket(key, new_span);
        if let Some(entry) = self.entries.get_mut(key) {
            entry.bounds = bounds;
        }
        Ok(())
    }

    fn query(&self, area: &Rect, mask: CollisionLayer) -> Vec<ColliderKey> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for cell in self.visit_cells(self.span(area)) {
            let Some(keys) = self.cells.get(&cell) else {
                continue;
            };
            for &key in keys {
                if !seen.insert(key) {
                    continue;
                }
                if let Some(entry) = self.entries.get(key) {
                    if entry.layer.visible_to(mask) && entry.bounds.intersects(area) {
                        found.push(key);
                    }
                }
            }
        }
        found
    }

    fn contains(&self, key: ColliderKey) -> bool {
        self.entries.contains_key(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
    }
}
