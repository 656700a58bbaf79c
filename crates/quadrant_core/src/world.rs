//! World container for entities
//!
//! The World owns every entity plus the collider arena and spatial index,
//! and turns scene/enable/position changes into registry notifications.

use quadrant_math::{Rect, Vec2};
use quadrant_physics::{ColliderKey, CollisionLayer, PhysicsError, SpatialHash, SpatialHashConfig, SpatialIndex};
use slotmap::SlotMap;
use thiserror::Error;

use crate::collider::Collider;
use crate::debug::DebugSurface;
use crate::entity::{Entity, EntityKey};
use crate::error::{NotificationError, RegistryError};
use crate::physics::PhysicsContext;

/// Errors from world-level operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error("entity {0:?} does not exist")]
    MissingEntity(EntityKey),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Notification(#[from] NotificationError),
}

/// The game world: entities, their colliders, and the broad-phase index
pub struct World {
    entities: SlotMap<EntityKey, Entity>,
    physics: PhysicsContext,
}

impl Default for World {
    fn default() -> Self {
        Self::new(SpatialHash::default())
    }
}

impl World {
    /// Create a world using the given spatial index
    pub fn new(index: impl SpatialIndex + 'static) -> Self {
        Self {
            entities: SlotMap::with_key(),
            physics: PhysicsContext::new(index),
        }
    }

    /// Create a world backed by a [`SpatialHash`]
    pub fn with_spatial_hash(config: SpatialHashConfig) -> Result<Self, PhysicsError> {
        Ok(Self::new(SpatialHash::new(config)?))
    }

    pub fn physics(&self) -> &PhysicsContext {
        &self.physics
    }

    /// Create an entity outside the scene
    pub fn create_entity(&mut self, position: Vec2) -> EntityKey {
        self.entities.insert_with_key(|key| Entity::new(key, position))
    }

    /// Create a named entity outside the scene
    pub fn create_named(&mut self, name: impl Into<String>, position: Vec2) -> EntityKey {
        let name = name.into();
        self.entities.insert_with_key(|key| Entity::new(key, position).with_name(name))
    }

    pub fn entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Find the first entity with the given name
    pub fn find_by_name(&self, name: &str) -> Option<EntityKey> {
        self.entities
            .iter()
            .find(|(_, e)| e.name.as_deref() == Some(name))
            .map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entities.iter()
    }

    fn entity_mut(&mut self, key: EntityKey) -> Result<&mut Entity, WorldError> {
        self.entities.get_mut(key).ok_or(WorldError::MissingEntity(key))
    }

    /// Bring an entity into the active scene; no-op if it is already there
    pub fn add_to_scene(&mut self, key: EntityKey) -> Result<(), WorldError> {
        let entity = self.entities.get_mut(key).ok_or(WorldError::MissingEntity(key))?;
        if entity.in_scene() {
            return Ok(());
        }
        log::debug!("Entity {:?} added to scene", key);
        entity.on_added_to_scene(&mut self.physics)?;
        Ok(())
    }

    /// Take an entity out of the active scene; no-op if it isn't there
    pub fn remove_from_scene(&mut self, key: EntityKey) -> Result<(), WorldError> {
        let entity = self.entities.get_mut(key).ok_or(WorldError::MissingEntity(key))?;
        if !entity.in_scene() {
            return Ok(());
        }
        log::debug!("Entity {:?} removed from scene", key);
        entity.on_removed_from_scene(&mut self.physics)?;
        Ok(())
    }

    /// Remove an entity from the scene, detach and free its colliders, and drop it
    ///
    /// Returns the freed colliders, main collider last.
    ///
    /// If a collider can't be detached the entity survives with the colliders
    /// still attached; those already detached are freed before the error is returned.
    pub fn destroy_entity(&mut self, key: EntityKey) -> Result<Vec<Box<dyn Collider>>, WorldError> {
        self.remove_from_scene(key)?;
        let entity = self.entities.get_mut(key).ok_or(WorldError::MissingEntity(key))?;
        let mut removed = Vec::with_capacity(entity.colliders().len());
        let cleared = entity.clear_colliders(&mut removed, &mut self.physics);

        let mut colliders = Vec::with_capacity(removed.len());
        for collider_key in removed {
            colliders.push(self.physics.remove(collider_key)?);
        }
        if let Err(e) = cleared {
            log::warn!("Entity {:?} kept colliders after {} were freed: {}", key, colliders.len(), e);
            return Err(e.into());
        }

        self.entities.remove(key);
        log::debug!("Entity {:?} destroyed with {} collider(s)", key, colliders.len());
        Ok(colliders)
    }

    pub fn set_position(&mut self, key: EntityKey, position: Vec2) -> Result<(), WorldError> {
        let entity = self.entities.get_mut(key).ok_or(WorldError::MissingEntity(key))?;
        entity.set_position(position, &mut self.physics)?;
        Ok(())
    }

    /// Move an entity by `delta`
    pub fn translate(&mut self, key: EntityKey, delta: Vec2) -> Result<(), WorldError> {
        let position = self.entity_mut(key)?.position() + delta;
        self.set_position(key, position)
    }

    pub fn set_enabled(&mut self, key: EntityKey, enabled: bool) -> Result<(), WorldError> {
        let entity = self.entities.get_mut(key).ok_or(WorldError::MissingEntity(key))?;
        entity.set_enabled(enabled, &mut self.physics)?;
        Ok(())
    }

    /// Allocate a collider and attach it to an entity
    ///
    /// If attaching fails the collider is freed again.
    pub fn attach_collider(&mut self, key: EntityKey, collider: impl Collider + 'static) -> Result<ColliderKey, WorldError> {
        let entity = self.entities.get_mut(key).ok_or(WorldError::MissingEntity(key))?;
        let collider_key = self.physics.insert(collider);
        if let Err(err) = entity.add_collider(collider_key, &mut self.physics) {
            // Only freed when the failed add left it unbound
            if self.physics.get(collider_key).is_some_and(|c| c.entity().is_none()) {
                if let Err(e) = self.physics.remove(collider_key) {
                    log::warn!("Failed to free collider {:?} after a failed attach: {}", collider_key, e);
                }
            }
            return Err(err.into());
        }
        Ok(collider_key)
    }

    /// Detach a collider from an entity and free it
    pub fn detach_collider(&mut self, key: EntityKey, collider: ColliderKey) -> Result<Box<dyn Collider>, WorldError> {
        let entity = self.entities.get_mut(key).ok_or(WorldError::MissingEntity(key))?;
        entity.remove_collider(collider, &mut self.physics)?;
        Ok(self.physics.remove(collider)?)
    }

    pub fn collider(&self, key: ColliderKey) -> Option<&dyn Collider> {
        self.physics.get(key)
    }

    /// Colliders attached to an entity, main collider first
    pub fn colliders_of(&self, key: EntityKey) -> impl Iterator<Item = (ColliderKey, &dyn Collider)> + '_ {
        let physics = &self.physics;
        self.entities
            .get(key)
            .into_iter()
            .flat_map(|e| e.colliders().iter())
            .filter_map(move |k| physics.get(k).map(|c| (k, c)))
    }

    /// Entities with a collider overlapping `area` on a layer visible to `mask`
    ///
    /// Each entity appears once, in the order its first collider was found.
    pub fn overlapping(&self, area: &Rect, mask: CollisionLayer) -> Vec<EntityKey> {
        let mut found = Vec::new();
        for collider_key in self.physics.query(area, mask) {
            let Some(owner) = self.physics.get(collider_key).and_then(|c| c.entity()) else {
                continue;
            };
            if !found.contains(&owner) {
                found.push(owner);
            }
        }
        found
    }

    /// Draw the colliders of every active entity
    pub fn debug_render(&self, surface: &mut dyn DebugSurface) {
        for (_, entity) in self.entities.iter().filter(|(_, e)| e.is_active()) {
            entity.debug_render(&self.physics, surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::DebugDrawList;
    use crate::shapes::{BoxCollider, CircleCollider};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn area(x: f32, y: f32, size: f32) -> Rect {
        Rect::from_center_size(Vec2::new(x, y), Vec2::splat(size))
    }

    #[test]
    fn test_create_and_find() {
        let mut world = World::default();
        let a = world.create_named("crate", Vec2::new(1.0, 2.0));
        world.create_entity(Vec2::ZERO);

        assert_eq!(world.entity_count(), 2);
        assert_eq!(world.find_by_name("crate"), Some(a));
        assert_eq!(world.find_by_name("missing"), None);
        assert_eq!(world.entity(a).unwrap().position(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_with_spatial_hash_rejects_bad_config() {
        assert!(World::with_spatial_hash(SpatialHashConfig::new(-1.0)).is_err());
        assert!(World::with_spatial_hash(SpatialHashConfig::new(32.0)).is_ok());
    }

    #[test]
    fn test_scene_entry_is_idempotent() {
        let mut world = World::default();
        let e = world.create_entity(Vec2::ZERO);
        let c = world.attach_collider(e, BoxCollider::new(1.0, 1.0)).unwrap();

        world.add_to_scene(e).unwrap();
        // A second entry must not try to register again
        world.add_to_scene(e).unwrap();
        assert!(world.physics().is_registered(c));
        assert_eq!(world.physics().index().len(), 1);

        world.remove_from_scene(e).unwrap();
        world.remove_from_scene(e).unwrap();
        assert!(world.physics().index().is_empty());
    }

    #[test]
    fn test_overlapping() {
        let mut world = World::default();
        let player = world.create_entity(Vec2::new(10.0, 10.0));
        let wall = world.create_entity(Vec2::new(12.0, 10.0));
        let far = world.create_entity(Vec2::new(900.0, 900.0));
        world.attach_collider(player, CircleCollider::new(1.0).with_layer(CollisionLayer::PLAYER)).unwrap();
        world.attach_collider(wall, BoxCollider::new(2.0, 8.0).with_layer(CollisionLayer::WORLD)).unwrap();
        world.attach_collider(wall, BoxCollider::new(2.0, 2.0).with_layer(CollisionLayer::WORLD)).unwrap();
        world.attach_collider(far, BoxCollider::new(1.0, 1.0)).unwrap();
        for e in [player, wall, far] {
            world.add_to_scene(e).unwrap();
        }

        let hits = world.overlapping(&area(11.0, 10.0, 4.0), CollisionLayer::ALL);
        assert_eq!(hits.len(), 2);
        assert!(hits.contains(&player));
        assert!(hits.contains(&wall));

        let walls = world.overlapping(&area(11.0, 10.0, 4.0), CollisionLayer::WORLD);
        assert_eq!(walls, vec![wall]);
    }

    #[test]
    fn test_overlapping_huge_area() {
        let mut world = World::with_spatial_hash(SpatialHashConfig::new(1.0)).unwrap();
        let everywhere = area(0.0, 0.0, 1.0e6);
        assert!(world.overlapping(&everywhere, CollisionLayer::ALL).is_empty());

        let e = world.create_entity(Vec2::new(2_000.0, -3_000.0));
        world.attach_collider(e, CircleCollider::new(0.5)).unwrap();
        world.add_to_scene(e).unwrap();
        assert_eq!(world.overlapping(&everywhere, CollisionLayer::ALL), vec![e]);
    }

    #[test]
    fn test_disabled_entities_are_not_found() {
        let mut world = World::default();
        let e = world.create_entity(Vec2::ZERO);
        world.attach_collider(e, BoxCollider::new(2.0, 2.0)).unwrap();
        world.add_to_scene(e).unwrap();

        world.set_enabled(e, false).unwrap();
        assert!(world.overlapping(&area(0.0, 0.0, 4.0), CollisionLayer::ALL).is_empty());

        world.set_enabled(e, true).unwrap();
        assert_eq!(world.overlapping(&area(0.0, 0.0, 4.0), CollisionLayer::ALL), vec![e]);
    }

    #[test]
    fn test_translate_moves_colliders() {
        let mut world = World::default();
        let e = world.create_entity(Vec2::ZERO);
        world.attach_collider(e, BoxCollider::new(2.0, 2.0)).unwrap();
        world.add_to_scene(e).unwrap();

        world.translate(e, Vec2::new(300.0, 0.0)).unwrap();

        assert!(world.overlapping(&area(0.0, 0.0, 4.0), CollisionLayer::ALL).is_empty());
        assert_eq!(world.overlapping(&area(300.0, 0.0, 4.0), CollisionLayer::ALL), vec![e]);
    }

    #[test]
    fn test_detach_collider() {
        let mut world = World::default();
        let e = world.create_entity(Vec2::ZERO);
        let a = world.attach_collider(e, BoxCollider::new(1.0, 1.0)).unwrap();
        let b = world.attach_collider(e, BoxCollider::new(1.0, 1.0)).unwrap();
        world.add_to_scene(e).unwrap();

        let attached: Vec<ColliderKey> = world.colliders_of(e).map(|(k, _)| k).collect();
        assert_eq!(attached, vec![a, b]);

        let freed = world.detach_collider(e, a).unwrap();
        assert!(freed.entity().is_none());
        assert!(!world.physics().contains(a));
        assert!(!world.physics().is_registered(a));
        assert_eq!(world.entity(e).unwrap().main_collider(), Some(b));

        let err = world.detach_collider(e, a).unwrap_err();
        assert_eq!(err, WorldError::Registry(RegistryError::NotAMember(a)));
    }

    #[test]
    fn test_destroy_entity_frees_everything() {
        let mut world = World::default();
        let e = world.create_entity(Vec2::ZERO);
        let a = world.attach_collider(e, BoxCollider::new(1.0, 1.0)).unwrap();
        world.attach_collider(e, CircleCollider::new(1.0)).unwrap();
        world.add_to_scene(e).unwrap();

        let freed = world.destroy_entity(e).unwrap();

        assert_eq!(freed.len(), 2);
        assert!(world.entity(e).is_none());
        assert!(world.physics().is_empty());
        assert!(world.physics().index().is_empty());
        assert!(world.collider(a).is_none());
        assert_eq!(world.destroy_entity(e).unwrap_err(), WorldError::MissingEntity(e));
    }

    #[test]
    fn test_attach_failure_frees_collider() {
        let config = SpatialHashConfig {
            cell_size: 1.0,
            max_cells_per_collider: 4,
        };
        let mut world = World::with_spatial_hash(config).unwrap();
        let e = world.create_entity(Vec2::ZERO);
        world.add_to_scene(e).unwrap();

        let err = world.attach_collider(e, BoxCollider::new(50.0, 50.0)).unwrap_err();
        assert!(matches!(
            err,
            WorldError::Registry(RegistryError::Physics(PhysicsError::CellLimitExceeded { .. }))
        ));
        assert!(world.physics().is_empty());
        assert!(world.entity(e).unwrap().colliders().is_empty());
    }

    #[test]
    fn test_debug_render_skips_inactive() {
        let mut world = World::default();
        let shown = world.create_entity(Vec2::ZERO);
        let hidden = world.create_entity(Vec2::ZERO);
        let offstage = world.create_entity(Vec2::ZERO);
        for e in [shown, hidden, offstage] {
            world.attach_collider(e, BoxCollider::new(1.0, 1.0)).unwrap();
        }
        world.add_to_scene(shown).unwrap();
        world.add_to_scene(hidden).unwrap();
        world.set_enabled(hidden, false).unwrap();

        let mut surface = DebugDrawList::new();
        world.debug_render(&mut surface);
        assert_eq!(surface.len(), 1);
    }

    /// Spatial hash whose `remove` refuses chosen keys, or every key
    struct StickyIndex {
        inner: SpatialHash,
        reject_all: bool,
        rejected: Rc<RefCell<Vec<ColliderKey>>>,
    }

    impl StickyIndex {
        fn rejecting_all() -> Self {
            Self {
                inner: SpatialHash::default(),
                reject_all: true,
                rejected: Rc::default(),
            }
        }

        fn rejecting(rejected: &Rc<RefCell<Vec<ColliderKey>>>) -> Self {
            Self {
                inner: SpatialHash::default(),
                reject_all: false,
                rejected: Rc::clone(rejected),
            }
        }
    }

    impl SpatialIndex for StickyIndex {
        fn insert(&mut self, key: ColliderKey, bounds: Rect, layer: CollisionLayer) -> Result<(), PhysicsError> {
            self.inner.insert(key, bounds, layer)
        }

        fn remove(&mut self, key: ColliderKey) -> Result<(), PhysicsError> {
            if self.reject_all || self.rejected.borrow().contains(&key) {
                return Err(PhysicsError::NotRegistered(key));
            }
            self.inner.remove(key)
        }

        fn update(&mut self, key: ColliderKey, bounds: Rect) -> Result<(), PhysicsError> {
            self.inner.update(key, bounds)
        }

        fn query(&self, area: &Rect, mask: CollisionLayer) -> Vec<ColliderKey> {
            self.inner.query(area, mask)
        }

        fn contains(&self, key: ColliderKey) -> bool {
            self.inner.contains(key)
        }

        fn len(&self) -> usize {
            self.inner.len()
        }

        fn clear(&mut self) {
            self.inner.clear();
        }
    }

    #[test]
    fn test_attach_to_disabled_entity_never_touches_index() {
        let mut world = World::new(StickyIndex::rejecting_all());
        let e = world.create_entity(Vec2::ZERO);
        world.add_to_scene(e).unwrap();
        world.set_enabled(e, false).unwrap();

        let key = world.attach_collider(e, BoxCollider::new(1.0, 1.0)).unwrap();

        assert_eq!(world.entity(e).unwrap().colliders().as_slice(), &[key]);
        assert!(!world.physics().is_registered(key));
        assert!(world.physics().index().is_empty());

        world.set_enabled(e, true).unwrap();
        assert!(world.physics().is_registered(key));
    }

    #[test]
    fn test_destroy_failure_frees_detached_colliders() {
        let rejected = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new(StickyIndex::rejecting(&rejected));
        let e = world.create_entity(Vec2::ZERO);
        let a = world.attach_collider(e, BoxCollider::new(1.0, 1.0)).unwrap();
        let b = world.attach_collider(e, BoxCollider::new(1.0, 1.0)).unwrap();
        world.add_to_scene(e).unwrap();
        rejected.borrow_mut().push(a);

        // Leaving the scene fails for `a`, which stays indexed
        assert!(matches!(world.destroy_entity(e), Err(WorldError::Notification(_))));
        assert!(world.physics().is_registered(a));
        assert!(!world.physics().is_registered(b));

        // `b` detaches and is freed, `a` can't be detached
        let err = world.destroy_entity(e).unwrap_err();
        assert_eq!(err, WorldError::Registry(RegistryError::Physics(PhysicsError::NotRegistered(a))));
        assert!(!world.physics().contains(b));
        assert_eq!(world.entity(e).unwrap().colliders().as_slice(), &[a]);
        assert_eq!(world.physics().len(), 1);

        rejected.borrow_mut().clear();
        let freed = world.destroy_entity(e).unwrap();
        assert_eq!(freed.len(), 1);
        assert!(world.physics().is_empty());
        assert!(world.entity(e).is_none());
    }

    #[test]
    fn test_missing_entity() {
        let mut world = World::default();
        let e = world.create_entity(Vec2::ZERO);
        world.destroy_entity(e).unwrap();

        assert_eq!(world.add_to_scene(e), Err(WorldError::MissingEntity(e)));
        assert_eq!(world.set_position(e, Vec2::ONE), Err(WorldError::MissingEntity(e)));
        assert!(world.attach_collider(e, BoxCollider::new(1.0, 1.0)).is_err());
        assert!(world.physics().is_empty());
    }
}
