//! Transform component
//!
//! Local 2D placement of an entity relative to its parent. World-space
//! placement is resolved by [`Scene::world_transform`](crate::scene::Scene::world_transform).

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::ecs::component::{encode_fields, read_field, Component, FieldError, FieldMap};
use crate::foundation::math::Vec2;

/// Local position, rotation and scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    /// Position relative to the parent
    pub position: Vec2,

    /// Rotation in degrees
    pub rotation: f32,

    /// Scale factors
    pub scale: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create from position only
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder pattern: Set rotation in degrees
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Builder pattern: Set scale
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Move by `delta`
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Rotate by `degrees`
    pub fn rotate(&mut self, degrees: f32) {
        self.rotation += degrees;
    }
}

impl Component for Transform {
    fn type_name(&self) -> &'static str {
        "Transform"
    }

    fn serialize_fields(&self, fields: &mut FieldMap) {
        encode_fields(self, fields);
    }

    fn deserialize_fields(&mut self, fields: &FieldMap) -> Result<(), FieldError> {
        read_field(fields, "position", &mut self.position)?;
        read_field(fields, "rotation", &mut self.rotation)?;
        read_field(fields, "scale", &mut self.scale)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
