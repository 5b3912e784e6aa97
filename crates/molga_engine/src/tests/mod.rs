//! Cross-module scenarios
//!
//! Each file drives the engine through a full workflow: building a scene,
//! persisting it, and loading or reloading behavior modules through the
//! static backend.

mod scene_persistence;
mod module_lifecycle;

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::ecs::{
    encode_fields, read_field, Component, ComponentContext, FieldError, FieldMap,
};
use crate::scripting::{
    ModuleDeclaration, ModuleRegistrar, Script, StaticModuleBackend, ABI_VERSION, ENGINE_VERSION,
};

/// Path the motion module is registered under in the static backend
pub const MOTION_MODULE: &str = "modules/motion.so";

/// Module-provided script spinning its owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spinner {
    pub speed: f32,
    #[serde(skip)]
    pub started: u32,
}

impl Default for Spinner {
    fn default() -> Self {
        Self { speed: 180.0, started: 0 }
    }
}

impl Component for Spinner {
    fn type_name(&self) -> &'static str {
        "Spinner"
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, delta_time: f32) {
        if let Some(transform) = ctx.transform_mut() {
            transform.rotate(self.speed * delta_time);
        }
    }

    fn serialize_fields(&self, fields: &mut FieldMap) {
        encode_fields(self, fields);
    }

    fn deserialize_fields(&mut self, fields: &FieldMap) -> Result<(), FieldError> {
        read_field(fields, "speed", &mut self.speed)
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

impl Script for Spinner {
    fn start(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.started += 1;
    }
}

fn register_motion(registrar: &mut ModuleRegistrar<'_>) {
    registrar.register_default::<Spinner>();
}

/// Static backend exposing the motion module
pub fn motion_backend() -> StaticModuleBackend {
    StaticModuleBackend::new().with_module(
        MOTION_MODULE,
        ModuleDeclaration {
            abi_version: ABI_VERSION,
            engine_version: ENGINE_VERSION,
            register: register_motion,
        },
    )
}
