//! The spatial index capability colliders register with

use quadrant_math::Rect;
use slotmap::new_key_type;
use thiserror::Error;

use crate::CollisionLayer;

new_key_type! {
    /// Key to a collider in the collider arena
    ///
    /// Generational, so a key kept after its collider was freed never aliases
    /// a newer collider that reuses the slot.
    pub struct ColliderKey;
}

/// Failures reported by a spatial index
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error("collider {0:?} is already registered with the spatial index")]
    AlreadyRegistered(ColliderKey),

    #[error("collider {0:?} is not registered with the spatial index")]
    NotRegistered(ColliderKey),

    /// The bounds cover more grid cells than the index allows per collider
    #[error("collider {key:?} spans {cells} cells, limit is {limit}")]
    CellLimitExceeded {
        key: ColliderKey,
        cells: u64,
        limit: usize,
    },

    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),
}

/// Broad-phase structure tracking collider bounds
///
/// Implementations decide how entries are bucketed. Callers guarantee they
/// never insert a key twice without removing it in between.
pub trait SpatialIndex {
    /// Start tracking `key` with the given world-space bounds
    fn insert(&mut self, key: ColliderKey, bounds: Rect, layer: CollisionLayer) -> Result<(), PhysicsError>;

    /// Stop tracking `key`
    fn remove(&mut self, key: ColliderKey) -> Result<(), PhysicsError>;

    /// Move an existing entry to new bounds
    fn update(&mut self, key: ColliderKey, bounds: Rect) -> Result<(), PhysicsError>;

    /// Keys whose bounds intersect `area` and whose layer is visible to `mask`
    fn query(&self, area: &Rect, mask: CollisionLayer) -> Vec<ColliderKey>;

    /// Whether `key` is currently tracked
    fn contains(&self, key: ColliderKey) -> bool;

    /// Number of tracked entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    fn clear(&mut self);
}
