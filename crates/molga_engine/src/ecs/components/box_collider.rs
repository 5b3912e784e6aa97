//! Box collider component
//!
//! Axis-aligned collision box. Overlaps are detected by
//! [`OverlapTracker`](crate::physics::OverlapTracker); there is no physical
//! response.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::ecs::component::{encode_fields, read_field, Component, FieldError, FieldMap};
use crate::foundation::math::{Aabb, Vec2, WorldTransform};

/// Axis-aligned box collider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoxCollider2D {
    /// Box size before scaling
    pub size: Vec2,
    /// Offset from the owner's position, scaled with it
    pub offset: Vec2,
    /// Triggers report overlaps through the trigger hooks
    pub is_trigger: bool,
}

impl Default for BoxCollider2D {
    fn default() -> Self {
        Self {
            size: Vec2::new(32.0, 32.0),
            offset: Vec2::zeros(),
            is_trigger: false,
        }
    }
}

impl BoxCollider2D {
    /// Create a collider of the given size
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    /// Mark this as a trigger volume
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Builder pattern: Set offset
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// World-space box for an owner placed at `world`
    ///
    /// Rotation is ignored.
    pub fn world_aabb(&self, world: &WorldTransform) -> Aabb {
        Aabb::from_position_size(
            world.position + self.offset.component_mul(&world.scale),
            self.size.component_mul(&world.scale),
        )
    }
}

impl Component for BoxCollider2D {
    fn type_name(&self) -> &'static str {
        "BoxCollider2D"
    }

    fn serialize_fields(&self, fields: &mut FieldMap) {
        encode_fields(self, fields);
    }

    fn deserialize_fields(&mut self, fields: &FieldMap) -> Result<(), FieldError> {
        read_field(fields, "size", &mut self.size)?;
        read_field(fields, "offset", &mut self.offset)?;
        read_field(fields, "isTrigger", &mut self.is_trigger)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_world_aabb_applies_offset_and_scale() {
        let collider = BoxCollider2D::new(Vec2::new(10.0, 4.0)).with_offset(Vec2::new(1.0, 1.0));
        let world = WorldTransform::new(Vec2::new(100.0, 50.0), 0.0, Vec2::new(2.0, 3.0));

        let aabb = collider.world_aabb(&world);
        assert_relative_eq!(aabb.min, Vec2::new(102.0, 53.0));
        assert_relative_eq!(aabb.size(), Vec2::new(20.0, 12.0));
    }

    #[test]
    fn test_trigger_flag_serializes_camel_case() {
        let mut fields = FieldMap::new();
        BoxCollider2D::default().as_trigger().serialize_fields(&mut fields);
        assert_eq!(fields["isTrigger"], serde_json::json!(true));
    }
}
