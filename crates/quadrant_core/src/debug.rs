//! Debug drawing surface for collider visualisation
//!
//! Colliders draw their outlines onto a [`DebugSurface`]. [`DebugDrawList`]
//! records the requests and can flatten them into a line list for upload.

use bytemuck::{Pod, Zeroable};
use quadrant_math::{Rect, Vec2};

/// RGBA colour, each component 0.0-1.0
pub type Color = [f32; 4];

/// Outline colour for solid colliders
pub const COLLIDER_COLOR: Color = [0.0, 1.0, 0.0, 1.0];
/// Outline colour for trigger colliders
pub const TRIGGER_COLOR: Color = [1.0, 0.8, 0.0, 1.0];
/// Colour used for the bounds box drawn around non-box shapes
pub const BOUNDS_COLOR: Color = [0.3, 0.3, 1.0, 0.5];

/// Sink for debug draw requests
pub trait DebugSurface {
    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color);

    /// Outline of a rectangle
    fn draw_rect(&mut self, rect: Rect, color: Color) {
        let c = rect.corners();
        for i in 0..4 {
            self.draw_line(c[i], c[(i + 1) % 4], color);
        }
    }

    /// Outline of a circle approximated with 16 segments
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        for (from, to) in circle_segments(center, radius, 16) {
            self.draw_line(from, to, color);
        }
    }
}

fn circle_segments(center: Vec2, radius: f32, segments: u32) -> impl Iterator<Item = (Vec2, Vec2)> {
    let step = std::f32::consts::TAU / segments as f32;
    (0..segments).map(move |i| {
        let a = i as f32 * step;
        (
            center + Vec2::from_angle(a, radius),
            center + Vec2::from_angle(a + step, radius),
        )
    })
}

/// A recorded draw request
#[derive(Clone, Debug, PartialEq)]
pub enum DebugShape {
    Line { from: Vec2, to: Vec2, color: Color },
    Rect { rect: Rect, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
}

/// Line-list vertex, matches a `vec2 position, vec4 color` shader layout
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl DebugVertex {
    pub fn new(position: Vec2, color: Color) -> Self {
        Self {
            position: [position.x, position.y],
            color,
        }
    }
}

/// Recording [`DebugSurface`]
#[derive(Clone, Debug)]
pub struct DebugDrawList {
    shapes: Vec<DebugShape>,
    circle_segments: u32,
}

impl Default for DebugDrawList {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugDrawList {
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            circle_segments: 24,
        }
    }

    /// Set how many segments circles are flattened into (minimum 3)
    pub fn with_circle_segments(mut self, segments: u32) -> Self {
        self.circle_segments = segments.max(3);
        self
    }

    pub fn shapes(&self) -> &[DebugShape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Drop everything recorded so far (call once per frame)
    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Flatten every recorded shape into line-list vertex pairs
    pub fn line_vertices(&self) -> Vec<DebugVertex> {
        let mut out = Vec::new();
        for shape in &self.shapes {
            match *shape {
                DebugShape::Line { from, to, color } => {
                    out.push(DebugVertex::new(from, color));
                    out.push(DebugVertex::new(to, color));
                }
                DebugShape::Rect { rect, color } => {
                    let c = rect.corners();
                    for i in 0..4 {
                        out.push(DebugVertex::new(c[i], color));
                        out.push(DebugVertex::new(c[(i + 1) % 4], color));
                    }
                }
                DebugShape::Circle { center, radius, color } => {
                    for (from, to) in circle_segments(center, radius, self.circle_segments) {
                        out.push(DebugVertex::new(from, color));
                        out.push(DebugVertex::new(to, color));
                    }
                }
            }
        }
        out
    }
}

/// View a vertex slice as raw bytes for a vertex buffer
pub fn vertex_bytes(vertices: &[DebugVertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

impl DebugSurface for DebugDrawList {
    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.shapes.push(DebugShape::Line { from, to, color });
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.shapes.push(DebugShape::Rect { rect, color });
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.shapes.push(DebugShape::Circle { center, radius, color });
    }
}
