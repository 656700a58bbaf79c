//! Broad-phase physics for Quadrant
//!
//! This crate provides the shared spatial index that colliders register with:
//! - Generational collider keys
//! - Collision layers for query filtering
//! - The [`SpatialIndex`] capability and a uniform-grid [`SpatialHash`]

pub mod index;
pub mod layer;
pub mod spatial_hash;

// Re-export commonly used types
pub use index::{ColliderKey, PhysicsError, SpatialIndex};
pub use layer::CollisionLayer;
pub use spatial_hash::{SpatialHash, SpatialHashConfig};
