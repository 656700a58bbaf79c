//! Collision layers
//!
//! Every collider belongs to one or more layers; broad-phase queries pass a
//! mask and only see colliders whose layer intersects it.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Layer bits for filtering broad-phase queries
    ///
    /// Serializes as flag names, e.g. `"PLAYER | ENEMY"`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct CollisionLayer: u32 {
        /// Layer given to colliders that don't ask for one
        const DEFAULT = 1 << 0;
        /// Player-controlled actors
        const PLAYER = 1 << 1;
        /// Hostile actors
        const ENEMY = 1 << 2;
        /// Level geometry that never moves
        const WORLD = 1 << 3;
        /// Sensors and trigger volumes
        const TRIGGER = 1 << 4;
        /// Bullets and other short-lived movers
        const PROJECTILE = 1 << 5;
        const ALL = 0xFFFF_FFFF;
    }
}

impl Default for CollisionLayer {
    fn default() -> Self {
        CollisionLayer::DEFAULT
    }
}

impl CollisionLayer {
    /// Whether a query using `mask` can see a collider on this layer
    #[inline]
    pub fn visible_to(self, mask: CollisionLayer) -> bool {
        self.intersects(mask)
    }
}
