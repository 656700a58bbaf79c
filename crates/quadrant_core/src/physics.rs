//! Collider arena plus the spatial index colliders register with

use quadrant_math::Rect;
use quadrant_physics::{ColliderKey, CollisionLayer, SpatialIndex};
use slotmap::SlotMap;

use crate::collider::Collider;
use crate::error::RegistryError;

/// Storage for every collider plus the shared broad-phase index
///
/// Colliders are allocated here by the caller and referred to by
/// [`ColliderKey`]. Registries hold keys only; the index is injected at
/// construction so tests can substitute their own.
pub struct PhysicsContext {
    colliders: SlotMap<ColliderKey, Box<dyn Collider>>,
    index: Box<dyn SpatialIndex>,
}

impl PhysicsContext {
    pub fn new(index: impl SpatialIndex + 'static) -> Self {
        Self::with_index(Box::new(index))
    }

    pub fn with_index(index: Box<dyn SpatialIndex>) -> Self {
        Self {
            colliders: SlotMap::with_key(),
            index,
        }
    }

    /// Allocate a collider and return its key
    ///
    /// The collider starts unbound; add it to an entity's registry to attach it.
    pub fn insert(&mut self, collider: impl Collider + 'static) -> ColliderKey {
        self.insert_boxed(Box::new(collider))
    }

    pub fn insert_boxed(&mut self, collider: Box<dyn Collider>) -> ColliderKey {
        self.colliders.insert(collider)
    }

    /// Free a collider and hand it back
    ///
    /// Fails while the collider is still bound to an entity; remove it from
    /// that entity's registry first.
    pub fn remove(&mut self, key: ColliderKey) -> Result<Box<dyn Collider>, RegistryError> {
        let collider = self.colliders.get(key).ok_or(RegistryError::MissingCollider(key))?;
        if let Some(entity) = collider.entity() {
            return Err(RegistryError::StillBound { collider: key, entity });
        }
        self.colliders.remove(key).ok_or(RegistryError::MissingCollider(key))
    }

    pub fn get(&self, key: ColliderKey) -> Option<&dyn Collider> {
        self.colliders.get(key).map(|c| c.as_ref())
    }

    pub fn get_mut(&mut self, key: ColliderKey) -> Option<&mut dyn Collider> {
        let collider = self.colliders.get_mut(key)?;
        Some(collider.as_mut())
    }

    /// Borrow a collider together with the index it registers with
    pub fn split_mut(&mut self, key: ColliderKey) -> Option<(&mut dyn Collider, &mut dyn SpatialIndex)> {
        let collider: &mut dyn Collider = self.colliders.get_mut(key)?.as_mut();
        let index: &mut dyn SpatialIndex = self.index.as_mut();
        Some((collider, index))
    }

    pub fn contains(&self, key: ColliderKey) -> bool {
        self.colliders.contains_key(key)
    }

    /// Number of allocated colliders
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColliderKey, &dyn Collider)> {
        self.colliders.iter().map(|(k, c)| (k, c.as_ref()))
    }

    pub fn index(&self) -> &dyn SpatialIndex {
        self.index.as_ref()
    }

    /// Whether `key` currently has an entry in the spatial index
    pub fn is_registered(&self, key: ColliderKey) -> bool {
        self.index.contains(key)
    }

    /// Broad-phase query against the index
    pub fn query(&self, area: &Rect, mask: CollisionLayer) -> Vec<ColliderKey> {
        self.index.query(area, mask)
    }
}
