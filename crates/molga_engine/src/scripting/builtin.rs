//! Built-in scripts

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::ecs::{
    encode_fields, read_field, Component, ComponentContext, ComponentRegistry, FieldError,
    FieldMap,
};
use crate::foundation::math::Vec2;
use crate::scripting::Script;

/// Spins the owner's transform at a constant rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Rotator {
    /// Degrees per second
    pub rotation_speed: f32,
}

impl Default for Rotator {
    fn default() -> Self {
        Self { rotation_speed: 90.0 }
    }
}

impl Rotator {
    /// Create a rotator spinning at `rotation_speed` degrees per second
    pub fn new(rotation_speed: f32) -> Self {
        Self { rotation_speed }
    }
}

impl Component for Rotator {
    fn type_name(&self) -> &'static str {
        "Rotator"
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, delta_time: f32) {
        if let Some(transform) = ctx.transform_mut() {
            transform.rotate(self.rotation_speed * delta_time);
        }
    }

    fn serialize_fields(&self, fields: &mut FieldMap) {
        encode_fields(self, fields);
    }

    fn deserialize_fields(&mut self, fields: &FieldMap) -> Result<(), FieldError> {
        read_field(fields, "rotationSpeed", &mut self.rotation_speed)
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

impl Script for Rotator {}

/// Moves the owner back and forth along one axis
///
/// The oscillation is centered on the position the transform had when the
/// script started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Oscillator {
    /// Peak offset in world units
    pub amplitude: f32,
    /// Oscillations per second
    pub frequency: f32,
    /// Move along x when true, along y otherwise
    pub horizontal: bool,
    #[serde(skip)]
    start_position: Vec2,
    #[serde(skip)]
    elapsed: f32,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self {
            amplitude: 50.0,
            frequency: 2.0,
            horizontal: true,
            start_position: Vec2::zeros(),
            elapsed: 0.0,
        }
    }
}

impl Oscillator {
    /// Create an oscillator
    pub fn new(amplitude: f32, frequency: f32, horizontal: bool) -> Self {
        Self {
            amplitude,
            frequency,
            horizontal,
            ..Default::default()
        }
    }

    /// Offset from the start position at `elapsed` seconds
    pub fn offset_at(&self, elapsed: f32) -> f32 {
        self.amplitude * (elapsed * self.frequency * std::f32::consts::TAU).sin()
    }
}

impl Component for Oscillator {
    fn type_name(&self) -> &'static str {
        "Oscillator"
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, delta_time: f32) {
        self.elapsed += delta_time;
        let offset = self.offset_at(self.elapsed);
        let start = self.start_position;
        let horizontal = self.horizontal;

        if let Some(transform) = ctx.transform_mut() {
            transform.position = if horizontal {
                Vec2::new(start.x + offset, start.y)
            } else {
                Vec2::new(start.x, start.y + offset)
            };
        }
    }

    fn serialize_fields(&self, fields: &mut FieldMap) {
        encode_fields(self, fields);
    }

    fn deserialize_fields(&mut self, fields: &FieldMap) -> Result<(), FieldError> {
        read_field(fields, "amplitude", &mut self.amplitude)?;
        read_field(fields, "frequency", &mut self.frequency)?;
        read_field(fields, "horizontal", &mut self.horizontal)
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

impl Script for Oscillator {
    fn start(&mut self, ctx: &mut ComponentContext<'_>) {
        if let Some(transform) = ctx.transform() {
            self.start_position = transform.position;
        }
        self.elapsed = 0.0;
    }
}

/// Register `Rotator` and `Oscillator`
pub fn register_builtin_scripts(registry: &mut ComponentRegistry) {
    registry.register_default::<Rotator>();
    registry.register_default::<Oscillator>();
}
