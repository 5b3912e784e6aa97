//! Breathing scale effect

use std::any::Any;
use std::f32::consts::TAU;

use molga_engine::ecs::{encode_fields, read_field, Component, ComponentContext, FieldError, FieldMap};
use molga_engine::foundation::math::Vec2;
use molga_engine::scripting::Script;
use serde::{Deserialize, Serialize};

/// Scales the owner up and down around the scale it started with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pulse {
    /// Relative scale swing, 0.25 means +-25%
    pub amplitude: f32,
    /// Cycles per second
    pub frequency: f32,
    #[serde(skip)]
    base_scale: Option<Vec2>,
    #[serde(skip)]
    elapsed: f32,
}

impl Default for Pulse {
    fn default() -> Self {
        Self {
            amplitude: 0.25,
            frequency: 1.0,
            base_scale: None,
            elapsed: 0.0,
        }
    }
}

impl Pulse {
    /// Scale factor after `elapsed` seconds
    pub fn factor_at(&self, elapsed: f32) -> f32 {
        1.0 + self.amplitude * (elapsed * self.frequency * TAU).sin()
    }
}

impl Component for Pulse {
    fn type_name(&self) -> &'static str {
        "Pulse"
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, delta_time: f32) {
        self.elapsed += delta_time;
        let factor = self.factor_at(self.elapsed);
        if let (Some(base), Some(transform)) = (self.base_scale, ctx.transform_mut()) {
            transform.scale = base * factor;
        }
    }

    fn serialize_fields(&self, fields: &mut FieldMap) {
        encode_fields(self, fields);
    }

    fn deserialize_fields(&mut self, fields: &FieldMap) -> Result<(), FieldError> {
        read_field(fields, "amplitude", &mut self.amplitude)?;
        read_field(fields, "frequency", &mut self.frequency)
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

impl Script for Pulse {
    fn start(&mut self, ctx: &mut ComponentContext<'_>) {
        self.base_scale = ctx.transform().map(|transform| transform.scale);
        self.elapsed = 0.0;
    }
}
