//! The collider capability
//!
//! A collider is a collision shape attached to an entity. Concrete shapes
//! embed a [`ColliderBase`] holding the state every collider shares (owner,
//! offset, layer, registration) and implement [`Collider`] on top of it. The
//! provided trait methods carry the registration rules:
//!
//! - registering only happens while the owner is in a scene, and never twice
//! - unregistering is a no-op for a collider that isn't registered
//! - a position change re-buckets a registered collider in the index

use std::fmt;

use quadrant_math::{Rect, Vec2};
use quadrant_physics::{ColliderKey, CollisionLayer, PhysicsError, SpatialIndex};

use crate::debug::DebugSurface;
use crate::EntityKey;

/// Snapshot of the owning entity handed to a collider when it is bound
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Owner {
    pub entity: EntityKey,
    /// World position of the entity
    pub position: Vec2,
    /// Whether the entity is currently part of the active scene
    pub in_scene: bool,
}

/// State shared by every collider shape
#[derive(Clone, Debug)]
pub struct ColliderBase {
    /// Offset from the owning entity's position
    pub offset: Vec2,
    /// Layer used for broad-phase filtering
    pub layer: CollisionLayer,
    /// Triggers report overlaps but are drawn differently
    pub is_trigger: bool,
    owner: Option<EntityKey>,
    origin: Vec2,
    parent_in_scene: bool,
    registered_bounds: Option<Rect>,
}

impl Default for ColliderBase {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            layer: CollisionLayer::DEFAULT,
            is_trigger: false,
            owner: None,
            origin: Vec2::ZERO,
            parent_in_scene: false,
            registered_bounds: None,
        }
    }
}

impl ColliderBase {
    pub fn owner(&self) -> Option<EntityKey> {
        self.owner
    }

    /// Position of the owning entity as last reported
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn parent_in_scene(&self) -> bool {
        self.parent_in_scene
    }

    /// Bounds the collider is currently registered with, if any
    pub fn registered_bounds(&self) -> Option<Rect> {
        self.registered_bounds
    }

    fn bind(&mut self, owner: Option<Owner>) {
        match owner {
            Some(owner) => {
                self.owner = Some(owner.entity);
                self.origin = owner.position;
                self.parent_in_scene = owner.in_scene;
            }
            None => {
                self.owner = None;
                self.parent_in_scene = false;
            }
        }
    }
}

/// A collision shape that can be attached to an entity
///
/// Shapes supply their geometry and debug drawing; the registration and
/// notification handling come from the provided methods. Implementors may
/// override those, but must keep the register/unregister pairing intact.
pub trait Collider: fmt::Debug {
    fn base(&self) -> &ColliderBase;

    fn base_mut(&mut self) -> &mut ColliderBase;

    /// Bounds relative to the owner's position, offset included
    fn local_bounds(&self) -> Rect;

    /// Draw the shape outline
    fn debug_render(&self, surface: &mut dyn DebugSurface);

    /// Entity this collider is attached to
    fn entity(&self) -> Option<EntityKey> {
        self.base().owner()
    }

    /// Bind to an owner, or clear the binding with `None`
    fn set_owner(&mut self, owner: Option<Owner>) {
        self.base_mut().bind(owner);
    }

    /// World-space bounds
    fn bounds(&self) -> Rect {
        self.local_bounds().translated(self.base().origin())
    }

    fn collision_layer(&self) -> CollisionLayer {
        self.base().layer
    }

    fn is_registered(&self) -> bool {
        self.base().registered_bounds.is_some()
    }

    /// Insert into the spatial index if the owner is in a scene
    fn register(&mut self, key: ColliderKey, index: &mut dyn SpatialIndex) -> Result<(), PhysicsError> {
        if !self.base().parent_in_scene || self.is_registered() {
            return Ok(());
        }
        let bounds = self.bounds();
        index.insert(key, bounds, self.collision_layer())?;
        self.base_mut().registered_bounds = Some(bounds);
        Ok(())
    }

    /// Remove from the spatial index if registered
    fn unregister(&mut self, key: ColliderKey, index: &mut dyn SpatialIndex) -> Result<(), PhysicsError> {
        if self.is_registered() {
            index.remove(key)?;
            self.base_mut().registered_bounds = None;
        }
        Ok(())
    }

    fn on_entity_added_to_scene(&mut self, key: ColliderKey, index: &mut dyn SpatialIndex) -> Result<(), PhysicsError> {
        self.base_mut().parent_in_scene = true;
        self.register(key, index)
    }

    fn on_entity_removed_from_scene(&mut self, key: ColliderKey, index: &mut dyn SpatialIndex) -> Result<(), PhysicsError> {
        let result = self.unregister(key, index);
        // The owner has left the scene even if the index refused the removal
        self.base_mut().parent_in_scene = false;
        result
    }

    fn on_entity_position_changed(
        &mut self,
        key: ColliderKey,
        position: Vec2,
        index: &mut dyn SpatialIndex,
    ) -> Result<(), PhysicsError> {
        self.base_mut().origin = position;
        if self.is_registered() {
            let bounds = self.bounds();
            index.update(key, bounds)?;
            self.base_mut().registered_bounds = Some(bounds);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::BoxCollider;
    use quadrant_physics::SpatialHash;
    use slotmap::SlotMap;

    fn setup() -> (EntityKey, ColliderKey) {
        let mut entities: SlotMap<EntityKey, ()> = SlotMap::with_key();
        let mut colliders: SlotMap<ColliderKey, ()> = SlotMap::with_key();
        (entities.insert(()), colliders.insert(()))
    }

    #[test]
    fn test_register_requires_scene() {
        let (entity, key) = setup();
        let mut index = SpatialHash::default();
        let mut collider = BoxCollider::new(2.0, 2.0);

        collider.set_owner(Some(Owner { entity, position: Vec2::ZERO, in_scene: false }));
        collider.register(key, &mut index).unwrap();
        assert!(!collider.is_registered());
        assert!(index.is_empty());

        collider.on_entity_added_to_scene(key, &mut index).unwrap();
        assert!(collider.is_registered());
        assert!(index.contains(key));
    }

    #[test]
    fn test_register_is_not_repeated() {
        let (entity, key) = setup();
        let mut index = SpatialHash::default();
        let mut collider = BoxCollider::new(2.0, 2.0);
        collider.set_owner(Some(Owner { entity, position: Vec2::ZERO, in_scene: true }));

        collider.register(key, &mut index).unwrap();
        // A second insert would fail in the index; the collider must skip it
        collider.register(key, &mut index).unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_unregister_when_not_registered_is_noop() {
        let (_, key) = setup();
        let mut index = SpatialHash::default();
        let mut collider = BoxCollider::new(1.0, 1.0);
        assert!(collider.unregister(key, &mut index).is_ok());
    }

    #[test]
    fn test_position_change_updates_index() {
        let (entity, key) = setup();
        let mut index = SpatialHash::default();
        let mut collider = BoxCollider::new(2.0, 2.0);
        collider.set_owner(Some(Owner { entity, position: Vec2::ZERO, in_scene: true }));
        collider.register(key, &mut index).unwrap();

        collider
            .on_entity_position_changed(key, Vec2::new(500.0, 0.0), &mut index)
            .unwrap();

        let expected = Rect::from_center_size(Vec2::new(500.0, 0.0), Vec2::new(2.0, 2.0));
        assert_eq!(collider.bounds(), expected);
        assert_eq!(index.bounds_of(key), Some(expected));
        assert_eq!(collider.base().registered_bounds(), Some(expected));
    }

    #[test]
    fn test_position_change_while_unregistered_only_moves_origin() {
        let (entity, key) = setup();
        let mut index = SpatialHash::default();
        let mut collider = BoxCollider::new(2.0, 2.0);
        collider.set_owner(Some(Owner { entity, position: Vec2::ZERO, in_scene: false }));

        collider
            .on_entity_position_changed(key, Vec2::new(3.0, 4.0), &mut index)
            .unwrap();
        assert_eq!(collider.base().origin(), Vec2::new(3.0, 4.0));
        assert!(index.is_empty());
    }

    #[test]
    fn test_removed_from_scene_unregisters() {
        let (entity, key) = setup();
        let mut index = SpatialHash::default();
        let mut collider = BoxCollider::new(2.0, 2.0);
        collider.set_owner(Some(Owner { entity, position: Vec2::ZERO, in_scene: true }));
        collider.register(key, &mut index).unwrap();

        collider.on_entity_removed_from_scene(key, &mut index).unwrap();
        assert!(!collider.is_registered());
        assert!(!collider.base().parent_in_scene());
        assert!(index.is_empty());

        // Out of the scene, register stays a no-op
        collider.register(key, &mut index).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_clearing_owner() {
        let (entity, _) = setup();
        let mut collider = BoxCollider::new(1.0, 1.0);
        collider.set_owner(Some(Owner { entity, position: Vec2::ONE, in_scene: true }));
        assert_eq!(collider.entity(), Some(entity));

        collider.set_owner(None);
        assert_eq!(collider.entity(), None);
        assert!(!collider.base().parent_in_scene());
    }
}
