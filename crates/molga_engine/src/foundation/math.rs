//! Math utilities and types
//!
//! Provides the 2D math types used by the scene graph: vectors, colors,
//! axis-aligned boxes and the world-space transform produced by walking
//! the entity hierarchy.

use serde::{Deserialize, Serialize};

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Degrees to radians conversion factor
pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

/// RGBA color with components in the `0.0..=1.0` range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel
    pub a: f32,
}

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque black
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Fully transparent black
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Create a color from its four channels
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Linear interpolation between two colors
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Axis-Aligned Bounding Box in 2D world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec2,
    /// Maximum corner of the bounding box
    pub max: Vec2,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create an AABB from its top-left corner and size
    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self {
            min: position,
            max: position + size,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get the size of the AABB
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y
    }

    /// Check if this AABB intersects another AABB
    ///
    /// Touching edges do not count as an intersection.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x &&
        self.min.y < other.max.y && self.max.y > other.min.y
    }
}

/// Resolved world-space placement of an entity
///
/// Produced by composing each local transform with its parent's world
/// transform, all the way up to the root of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    /// World position
    pub position: Vec2,
    /// World rotation in degrees
    pub rotation: f32,
    /// World scale factors
    pub scale: Vec2,
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl WorldTransform {
    /// Transform at the origin with no rotation and unit scale
    pub fn identity() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
        }
    }

    /// Create a world transform from its parts
    pub fn new(position: Vec2, rotation: f32, scale: Vec2) -> Self {
        Self { position, rotation, scale }
    }

    /// Place a local transform inside this (parent) world transform
    ///
    /// The local position is scaled by the parent scale, rotated by the parent
    /// rotation and offset by the parent position. Rotations add and scales
    /// multiply component-wise.
    pub fn combine(&self, local_position: Vec2, local_rotation: f32, local_scale: Vec2) -> Self {
        let scaled = local_position.component_mul(&self.scale);
        let (sin, cos) = (self.rotation * DEG_TO_RAD).sin_cos();
        let rotated = Vec2::new(
            scaled.x * cos - scaled.y * sin,
            scaled.x * sin + scaled.y * cos,
        );

        Self {
            position: rotated + self.position,
            rotation: self.rotation + local_rotation,
            scale: self.scale.component_mul(&local_scale),
        }
    }
}
