//! Per-entity collider registry
//!
//! [`ColliderRegistry`] is the ordered set of colliders attached to one
//! entity. It is the only code that binds colliders to their entity and the
//! only code that moves them in and out of the spatial index while they are
//! members, so the index always mirrors the entity's scene membership and
//! enabled state.
//!
//! ## Ordering
//!
//! Members keep insertion order. The first member is the *main collider*;
//! removing it promotes the next one. Every lifecycle notification visits
//! members in this order.
//!
//! ## Failure behaviour
//!
//! - `add`: bind, register, append. If registering fails the binding is
//!   cleared again and nothing is appended.
//! - `remove_at`: unregister, unbind, excise. If unregistering fails nothing
//!   else happens.
//! - Lifecycle notifications never stop early. Failures are collected and
//!   returned together in a [`NotificationError`] once every member has been
//!   visited.

use std::iter::Copied;
use std::ops::Index;
use std::slice;

use quadrant_math::Vec2;
use quadrant_physics::{ColliderKey, PhysicsError, SpatialIndex};

use crate::collider::{Collider, Owner};
use crate::debug::DebugSurface;
use crate::error::{LifecycleEvent, NotificationError, RegistryError};
use crate::physics::PhysicsContext;
use crate::EntityKey;

/// Iterator over the keys of a registry's members, in insertion order
pub type Iter<'a> = Copied<slice::Iter<'a, ColliderKey>>;

/// The colliders attached to a single entity
///
/// Holds keys into a [`PhysicsContext`]; the colliders themselves are
/// allocated and freed by the caller. Iterating borrows the registry, so it
/// cannot be mutated mid-iteration.
#[derive(Clone, Debug)]
pub struct ColliderRegistry {
    entity: EntityKey,
    /// Owner position handed to colliders when they are bound
    position: Vec2,
    in_scene: bool,
    colliders: Vec<ColliderKey>,
}

impl ColliderRegistry {
    /// Create an empty registry for `entity`, currently at `position`
    pub fn new(entity: EntityKey, position: Vec2) -> Self {
        Self {
            entity,
            position,
            in_scene: false,
            colliders: Vec::new(),
        }
    }

    /// The entity this registry belongs to
    pub fn entity(&self) -> EntityKey {
        self.entity
    }

    /// The first collider added that is still a member
    #[inline]
    pub fn main_collider(&self) -> Option<ColliderKey> {
        self.colliders.first().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Member at `index`
    pub fn at(&self, index: usize) -> Result<ColliderKey, RegistryError> {
        self.colliders
            .get(index)
            .copied()
            .ok_or(RegistryError::OutOfRange { index, len: self.colliders.len() })
    }

    pub fn contains(&self, key: ColliderKey) -> bool {
        self.colliders.contains(&key)
    }

    /// Current position of `key` in the member sequence
    pub fn index_of(&self, key: ColliderKey) -> Option<usize> {
        self.colliders.iter().position(|k| *k == key)
    }

    pub fn iter(&self) -> Iter<'_> {
        self.colliders.iter().copied()
    }

    pub fn as_slice(&self) -> &[ColliderKey] {
        &self.colliders
    }

    fn owner(&self) -> Owner {
        Owner {
            entity: self.entity,
            position: self.position,
            in_scene: self.in_scene,
        }
    }

    /// Attach a collider: bind it to this entity, register it, append it
    ///
    /// Returns `key` back for chaining. Adding a collider that is already a
    /// member fails with [`RegistryError::AlreadyMember`].
    pub fn add(&mut self, key: ColliderKey, physics: &mut PhysicsContext) -> Result<ColliderKey, RegistryError> {
        self.insert(key, physics, true)
    }

    /// Attach a collider without registering it
    ///
    /// Used while the owner is disabled: the collider is bound and appended
    /// but stays out of the index until [`Self::on_entity_enabled`].
    pub fn add_unindexed(&mut self, key: ColliderKey, physics: &mut PhysicsContext) -> Result<ColliderKey, RegistryError> {
        self.insert(key, physics, false)
    }

    fn insert(&mut self, key: ColliderKey, physics: &mut PhysicsContext, register: bool) -> Result<ColliderKey, RegistryError> {
        if self.contains(key) {
            return Err(RegistryError::AlreadyMember(key));
        }
        let owner = self.owner();
        let (collider, index) = physics.split_mut(key).ok_or(RegistryError::MissingCollider(key))?;

        collider.set_owner(Some(owner));
        if register {
            if let Err(err) = collider.register(key, index) {
                collider.set_owner(None);
                return Err(err.into());
            }
        }
        self.colliders.push(key);

        log::debug!("Collider {:?} added to entity {:?} ({} total)", key, self.entity, self.colliders.len());
        Ok(key)
    }

    /// Detach a member collider
    ///
    /// Fails with [`RegistryError::NotAMember`] before touching anything if
    /// `key` is not in this registry.
    pub fn remove(&mut self, key: ColliderKey, physics: &mut PhysicsContext) -> Result<(), RegistryError> {
        let index = self.index_of(key).ok_or(RegistryError::NotAMember(key))?;
        self.remove_at(index, physics).map(|_| ())
    }

    /// Detach the member at `index`: unregister it, unbind it, excise it
    ///
    /// Later members shift down by one. Returns the removed key.
    pub fn remove_at(&mut self, index: usize, physics: &mut PhysicsContext) -> Result<ColliderKey, RegistryError> {
        let key = self.at(index)?;
        let (collider, spatial) = physics.split_mut(key).ok_or(RegistryError::MissingCollider(key))?;

        collider.unregister(key, spatial)?;
        collider.set_owner(None);
        self.colliders.remove(index);

        log::debug!("Collider {:?} removed from entity {:?} ({} left)", key, self.entity, self.colliders.len());
        Ok(key)
    }

    /// Visit every member, collecting failures instead of stopping
    fn notify_each<F>(&self, event: LifecycleEvent, physics: &mut PhysicsContext, mut notify: F) -> Result<(), NotificationError>
    where
        F: FnMut(&mut dyn Collider, ColliderKey, &mut dyn SpatialIndex) -> Result<(), PhysicsError>,
    {
        let mut failures = Vec::new();
        for &key in &self.colliders {
            let Some((collider, index)) = physics.split_mut(key) else {
                log::warn!("{} notification skipped missing collider {:?}", event, key);
                failures.push((key, RegistryError::MissingCollider(key)));
                continue;
            };
            if let Err(err) = notify(collider, key, index) {
                log::warn!("{} notification failed for collider {:?}: {}", event, key, err);
                failures.push((key, err.into()));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(NotificationError { event, failures })
        }
    }

    /// The owning entity entered the active scene
    pub fn on_entity_added_to_scene(&mut self, physics: &mut PhysicsContext) -> Result<(), NotificationError> {
        self.in_scene = true;
        self.notify_each(LifecycleEvent::AddedToScene, physics, |collider, key, index| {
            collider.on_entity_added_to_scene(key, index)
        })
    }

    /// The owning entity left the active scene
    pub fn on_entity_removed_from_scene(&mut self, physics: &mut PhysicsContext) -> Result<(), NotificationError> {
        self.in_scene = false;
        self.notify_each(LifecycleEvent::RemovedFromScene, physics, |collider, key, index| {
            collider.on_entity_removed_from_scene(key, index)
        })
    }

    /// The owning entity moved to `position`
    pub fn on_entity_position_changed(
        &mut self,
        position: Vec2,
        physics: &mut PhysicsContext,
    ) -> Result<(), NotificationError> {
        self.position = position;
        self.notify_each(LifecycleEvent::PositionChanged, physics, |collider, key, index| {
            collider.on_entity_position_changed(key, position, index)
        })
    }

    /// Re-register every member with the spatial index
    ///
    /// Membership and owner bindings are left alone.
    pub fn on_entity_enabled(&mut self, physics: &mut PhysicsContext) -> Result<(), NotificationError> {
        self.notify_each(LifecycleEvent::Enabled, physics, |collider, key, index| {
            collider.register(key, index)
        })
    }

    /// Unregister every member from the spatial index
    ///
    /// Membership and owner bindings are left alone.
    pub fn on_entity_disabled(&mut self, physics: &mut PhysicsContext) -> Result<(), NotificationError> {
        self.notify_each(LifecycleEvent::Disabled, physics, |collider, key, index| {
            collider.unregister(key, index)
        })
    }

    /// Ask every member to draw itself, in order
    pub fn debug_render(&self, physics: &PhysicsContext, surface: &mut dyn DebugSurface) {
        for &key in &self.colliders {
            match physics.get(key) {
                Some(collider) => collider.debug_render(surface),
                None => log::warn!("debug render skipped missing collider {:?}", key),
            }
        }
    }
}

impl Index<usize> for ColliderRegistry {
    type Output = ColliderKey;

    /// Panics when `index >= len()`, like slice indexing; use
    /// [`ColliderRegistry::at`] for a checked lookup.
    fn index(&self, index: usize) -> &ColliderKey {
        &self.colliders[index]
    }
}

impl<'a> IntoIterator for &'a ColliderRegistry {
    type Item = ColliderKey;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
