//! Core types for the Quadrant engine
//!
//! This crate provides the entity side of collision handling:
//!
//! - [`Collider`] - Capability implemented by every collision shape
//! - [`BoxCollider`], [`CircleCollider`] - Concrete shapes
//! - [`ColliderRegistry`] - The ordered colliders attached to one entity
//! - [`PhysicsContext`] - Collider arena plus the spatial index
//! - [`Entity`] - An object in the world that drives its colliders' lifecycle
//! - [`World`] - Container for all entities
//! - [`SceneTemplate`] - Loadable/saveable scene description
//! - [`DebugSurface`] - Sink for collider debug drawing

mod collider;
mod debug;
mod entity;
mod error;
mod physics;
mod registry;
mod scene;
mod shapes;
mod world;

pub use collider::{Collider, ColliderBase, Owner};
pub use debug::{
    vertex_bytes, Color, DebugDrawList, DebugShape, DebugSurface, DebugVertex, BOUNDS_COLOR, COLLIDER_COLOR,
    TRIGGER_COLOR,
};
pub use entity::{Entity, EntityKey};
pub use error::{ErrorKind, LifecycleEvent, NotificationError, RegistryError};
pub use physics::PhysicsContext;
pub use registry::{ColliderRegistry, Iter as RegistryIter};
pub use scene::{ColliderTemplate, EntityTemplate, SceneLoadError, SceneSaveError, SceneTemplate};
pub use shapes::{BoxCollider, CircleCollider};
pub use world::{World, WorldError};

// Re-export commonly used types from the lower crates for convenience
pub use quadrant_math::{Rect, Vec2};
pub use quadrant_physics::{
    ColliderKey, CollisionLayer, PhysicsError, SpatialHash, SpatialHashConfig, SpatialIndex,
};
