//! Pickup counter

use std::any::Any;

use molga_engine::ecs::{read_field, write_field, Component, ComponentContext, EntityId, FieldError, FieldMap};
use molga_engine::scripting::Script;

/// Counts trigger volumes the owner runs into
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collector {
    /// Triggers entered so far
    pub collected: u32,
}

impl Component for Collector {
    fn type_name(&self) -> &'static str {
        "Collector"
    }

    fn serialize_fields(&self, fields: &mut FieldMap) {
        write_field(fields, "collected", &self.collected);
    }

    fn deserialize_fields(&mut self, fields: &FieldMap) -> Result<(), FieldError> {
        read_field(fields, "collected", &mut self.collected)
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

impl Script for Collector {
    fn on_trigger_enter(&mut self, ctx: &mut ComponentContext<'_>, other: EntityId) {
        self.collected += 1;
        log::info!("{} collected {} (total {})", ctx.entity_name(), other, self.collected);
    }
}
