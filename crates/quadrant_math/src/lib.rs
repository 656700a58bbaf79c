//! 2D Mathematics Library
//!
//! Value types shared by the Quadrant engine crates.
//!
//! - [`Vec2`] - 2D vector with x, y components
//! - [`Rect`] - Axis-aligned rectangle used for collider bounds and broad-phase queries

mod vec2;
mod rect;

pub use vec2::Vec2;
pub use rect::Rect;
