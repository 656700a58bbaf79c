//! Error types for collider membership and lifecycle propagation

use std::fmt;

use quadrant_physics::{ColliderKey, PhysicsError};
use thiserror::Error;

use crate::EntityKey;

/// Broad class of a [`RegistryError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller passed a collider that is not valid for the operation
    InvalidArgument,
    /// The caller passed an index outside `0..len`
    OutOfRange,
    /// The spatial index rejected a registration change
    External,
}

/// Errors from adding, removing or indexing colliders
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("collider {0:?} is not in the registry")]
    NotAMember(ColliderKey),

    #[error("collider {0:?} is already in the registry")]
    AlreadyMember(ColliderKey),

    #[error("collider index {index} is out of range for {len} colliders")]
    OutOfRange { index: usize, len: usize },

    #[error("collider {0:?} does not exist")]
    MissingCollider(ColliderKey),

    #[error("collider {collider:?} is still bound to entity {entity:?}")]
    StillBound { collider: ColliderKey, entity: EntityKey },

    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::NotAMember(_)
            | RegistryError::AlreadyMember(_)
            | RegistryError::MissingCollider(_)
            | RegistryError::StillBound { .. } => ErrorKind::InvalidArgument,
            RegistryError::OutOfRange { .. } => ErrorKind::OutOfRange,
            RegistryError::Physics(_) => ErrorKind::External,
        }
    }
}

/// Entity lifecycle notifications forwarded to colliders
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    AddedToScene,
    RemovedFromScene,
    PositionChanged,
    Enabled,
    Disabled,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleEvent::AddedToScene => "added-to-scene",
            LifecycleEvent::RemovedFromScene => "removed-from-scene",
            LifecycleEvent::PositionChanged => "position-changed",
            LifecycleEvent::Enabled => "enabled",
            LifecycleEvent::Disabled => "disabled",
        };
        f.write_str(name)
    }
}

/// Per-collider failures collected while forwarding one notification
///
/// Returned only after every member has been visited.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{event} notification failed for {} collider(s)", .failures.len())]
pub struct NotificationError {
    pub event: LifecycleEvent,
    pub failures: Vec<(ColliderKey, RegistryError)>,
}

impl NotificationError {
    /// Keys of the colliders that failed, in visiting order
    pub fn failed_keys(&self) -> impl Iterator<Item = ColliderKey> + '_ {
        self.failures.iter().map(|(key, _)| *key)
    }
}
