//! Constant-rate rotation

use std::any::Any;

use molga_engine::ecs::{encode_fields, read_field, Component, ComponentContext, FieldError, FieldMap};
use molga_engine::scripting::Script;
use serde::{Deserialize, Serialize};

/// Rotates the owner, optionally speeding up over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Spinner {
    /// Degrees per second
    pub speed: f32,
    /// Degrees per second added every second
    pub acceleration: f32,
}

impl Default for Spinner {
    fn default() -> Self {
        Self {
            speed: 120.0,
            acceleration: 0.0,
        }
    }
}

impl Component for Spinner {
    fn type_name(&self) -> &'static str {
        "Spinner"
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, delta_time: f32) {
        self.speed += self.acceleration * delta_time;
        if let Some(transform) = ctx.transform_mut() {
            transform.rotate(self.speed * delta_time);
        }
    }

    fn serialize_fields(&self, fields: &mut FieldMap) {
        encode_fields(self, fields);
    }

    fn deserialize_fields(&mut self, fields: &FieldMap) -> Result<(), FieldError> {
        read_field(fields, "speed", &mut self.speed)?;
        read_field(fields, "acceleration", &mut self.acceleration)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_script(&self) -> Option<&dyn Script> {
        Some(self)
    }

    fn as_script_mut(&mut self) -> Option<&mut dyn Script> {
        Some(self)
    }
}

impl Script for Spinner {}

#[cfg(test)]
mod tests {
    use super::*;
    use molga_engine::ecs::{Entity, Transform};
    use approx::assert_relative_eq;

    #[test]
    fn test_acceleration() {
        let mut entity = Entity::new("Top");
        entity.add_component(Transform::default());
        entity.add_component(Spinner { speed: 10.0, acceleration: 10.0 });

        entity.update(1.0);
        entity.update(1.0);

        assert_relative_eq!(entity.get_component::<Transform>().unwrap().rotation, 50.0);
        assert_relative_eq!(entity.get_component::<Spinner>().unwrap().speed, 30.0);
    }
}
