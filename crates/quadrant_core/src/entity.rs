//! Entity type
//!
//! An Entity is a positioned object in the world that owns a collider
//! registry and drives its lifecycle notifications.

use quadrant_math::Vec2;
use quadrant_physics::ColliderKey;
use slotmap::new_key_type;

use crate::debug::DebugSurface;
use crate::error::{NotificationError, RegistryError};
use crate::physics::PhysicsContext;
use crate::registry::ColliderRegistry;

new_key_type! {
    /// Key to an entity in the world
    ///
    /// Generational, so keys held after an entity is destroyed resolve to
    /// nothing instead of a newer entity in the same slot.
    pub struct EntityKey;
}

/// An object in the world
///
/// Each entity has:
/// - An optional name (for lookup)
/// - A position
/// - An enabled flag (disabled entities keep their colliders out of the index)
/// - A scene-membership flag
/// - The registry of colliders attached to it
#[derive(Debug)]
pub struct Entity {
    /// Optional name for this entity (for lookup)
    pub name: Option<String>,
    key: EntityKey,
    position: Vec2,
    enabled: bool,
    in_scene: bool,
    colliders: ColliderRegistry,
}

impl Entity {
    /// Create an enabled entity that is not yet in a scene
    pub fn new(key: EntityKey, position: Vec2) -> Self {
        Self {
            name: None,
            key,
            position,
            enabled: true,
            in_scene: false,
            colliders: ColliderRegistry::new(key, position),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn key(&self) -> EntityKey {
        self.key
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn in_scene(&self) -> bool {
        self.in_scene
    }

    /// Whether the entity is in a scene and enabled
    #[inline]
    pub fn is_active(&self) -> bool {
        self.in_scene && self.enabled
    }

    pub fn colliders(&self) -> &ColliderRegistry {
        &self.colliders
    }

    /// First collider attached to this entity
    pub fn main_collider(&self) -> Option<ColliderKey> {
        self.colliders.main_collider()
    }

    /// Attach an allocated collider
    ///
    /// A disabled entity that is already in a scene keeps the new collider
    /// out of the index until it is enabled again.
    pub fn add_collider(&mut self, key: ColliderKey, physics: &mut PhysicsContext) -> Result<ColliderKey, RegistryError> {
        if self.in_scene && !self.enabled {
            self.colliders.add_unindexed(key, physics)
        } else {
            self.colliders.add(key, physics)
        }
    }

    pub fn remove_collider(&mut self, key: ColliderKey, physics: &mut PhysicsContext) -> Result<(), RegistryError> {
        self.colliders.remove(key, physics)
    }

    pub fn remove_collider_at(&mut self, index: usize, physics: &mut PhysicsContext) -> Result<ColliderKey, RegistryError> {
        self.colliders.remove_at(index, physics)
    }

    /// Move the entity; colliders are only notified on an actual change
    pub fn set_position(&mut self, position: Vec2, physics: &mut PhysicsContext) -> Result<(), NotificationError> {
        if position == self.position {
            return Ok(());
        }
        self.position = position;
        self.colliders.on_entity_position_changed(position, physics)
    }

    /// Enable or disable the entity
    ///
    /// Only a real transition while in a scene touches the index.
    pub fn set_enabled(&mut self, enabled: bool, physics: &mut PhysicsContext) -> Result<(), NotificationError> {
        if enabled == self.enabled {
            return Ok(());
        }
        self.enabled = enabled;
        if !self.in_scene {
            return Ok(());
        }
        if enabled {
            self.colliders.on_entity_enabled(physics)
        } else {
            self.colliders.on_entity_disabled(physics)
        }
    }

    pub(crate) fn on_added_to_scene(&mut self, physics: &mut PhysicsContext) -> Result<(), NotificationError> {
        self.in_scene = true;
        let added = self.colliders.on_entity_added_to_scene(physics);
        // A disabled entity still joins the scene but its colliders stay out of the index
        let disabled = if self.enabled {
            Ok(())
        } else {
            self.colliders.on_entity_disabled(physics)
        };
        added.and(disabled)
    }

    pub(crate) fn on_removed_from_scene(&mut self, physics: &mut PhysicsContext) -> Result<(), NotificationError> {
        self.in_scene = false;
        self.colliders.on_entity_removed_from_scene(physics)
    }

    /// Detach every collider, last first so the main collider goes last
    ///
    /// Detached keys are pushed to `removed` as they go, so a failure part
    /// way through still reports the ones already detached.
    pub(crate) fn clear_colliders(
        &mut self,
        removed: &mut Vec<ColliderKey>,
        physics: &mut PhysicsContext,
    ) -> Result<(), RegistryError> {
        while !self.colliders.is_empty() {
            removed.push(self.colliders.remove_at(self.colliders.len() - 1, physics)?);
        }
        Ok(())
    }

    pub fn debug_render(&self, physics: &PhysicsContext, surface: &mut dyn DebugSurface) {
        self.colliders.debug_render(physics, surface);
    }
}
