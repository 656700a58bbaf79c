//! Concrete collider shapes
//!
//! Only bounding geometry lives here; narrow-phase tests belong elsewhere.

use quadrant_math::{Rect, Vec2};
use quadrant_physics::CollisionLayer;

use crate::collider::{Collider, ColliderBase};
use crate::debug::{DebugSurface, BOUNDS_COLOR, COLLIDER_COLOR, TRIGGER_COLOR};

fn outline_color(base: &ColliderBase) -> [f32; 4] {
    if base.is_trigger {
        TRIGGER_COLOR
    } else {
        COLLIDER_COLOR
    }
}

/// Axis-aligned box centered on the owner's position plus offset
#[derive(Clone, Debug)]
pub struct BoxCollider {
    base: ColliderBase,
    pub width: f32,
    pub height: f32,
}

impl BoxCollider {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            base: ColliderBase::default(),
            width,
            height,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.base.offset = offset;
        self
    }

    pub fn with_layer(mut self, layer: CollisionLayer) -> Self {
        self.base.layer = layer;
        self
    }

    pub fn as_trigger(mut self) -> Self {
        self.base.is_trigger = true;
        self
    }
}

impl Collider for BoxCollider {
    fn base(&self) -> &ColliderBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ColliderBase {
        &mut self.base
    }

    fn local_bounds(&self) -> Rect {
        Rect::from_center_size(self.base.offset, Vec2::new(self.width, self.height))
    }

    fn debug_render(&self, surface: &mut dyn DebugSurface) {
        surface.draw_rect(self.bounds(), outline_color(&self.base));
    }
}

/// Circle around the owner's position plus offset
#[derive(Clone, Debug)]
pub struct CircleCollider {
    base: ColliderBase,
    pub radius: f32,
}

impl CircleCollider {
    pub fn new(radius: f32) -> Self {
        Self {
            base: ColliderBase::default(),
            radius,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.base.offset = offset;
        self
    }

    pub fn with_layer(mut self, layer: CollisionLayer) -> Self {
        self.base.layer = layer;
        self
    }

    pub fn as_trigger(mut self) -> Self {
        self.base.is_trigger = true;
        self
    }

    /// World-space center
    pub fn center(&self) -> Vec2 {
        self.base.origin() + self.base.offset
    }
}

impl Collider for CircleCollider {
    fn base(&self) -> &ColliderBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ColliderBase {
        &mut self.base
    }

    fn local_bounds(&self) -> Rect {
        Rect::from_circle(self.base.offset, self.radius)
    }

    fn debug_render(&self, surface: &mut dyn DebugSurface) {
        surface.draw_circle(self.center(), self.radius, outline_color(&self.base));
        surface.draw_rect(self.bounds(), BOUNDS_COLOR);
    }
}
