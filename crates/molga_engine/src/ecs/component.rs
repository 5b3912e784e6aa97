//! Component capability and runtime wrapper
//!
//! A [`Component`] is a unit of data or behavior attached to exactly one
//! [`Entity`](crate::ecs::Entity). Implementations only describe behavior;
//! the state the runtime manages for them (enabled flag, owner, start-once
//! flag, origin module) lives in the [`ComponentInstance`] that wraps them.

use std::any::Any;
use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::ecs::components::Transform;
use crate::ecs::entity::EntityId;
use crate::ecs::provenance::Provenance;
use crate::scene::RenderContext;
use crate::scripting::{CollisionEvent, Script};

/// Serialized fields of a single component
///
/// The keys `type` and `enabled` are reserved by the scene document.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// A component could not decode its serialized fields
#[derive(Error, Debug)]
pub enum FieldError {
    /// A field had the wrong shape
    #[error("invalid field `{field}`: {message}")]
    Invalid {
        /// Field name
        field: String,
        /// Decoder diagnostic
        message: String,
    },

    /// The field map as a whole could not be decoded
    #[error("invalid fields: {0}")]
    Malformed(String),
}

/// Polymorphic contract every attachable behavior unit satisfies
pub trait Component: Any {
    /// Stable type name, used as the registry and serialization key
    fn type_name(&self) -> &'static str;

    /// Called once, right after the component is attached to `owner`
    fn on_attach(&mut self, _owner: EntityId) {}

    /// Called once, right before the component leaves its owner
    fn on_detach(&mut self) {}

    /// Per-frame update
    fn update(&mut self, _ctx: &mut ComponentContext<'_>, _delta_time: f32) {}

    /// Submit draw commands
    fn render(&self, _ctx: &mut RenderContext<'_>) {}

    /// Write this component's fields
    ///
    /// Each component owns its field layout. The default writes nothing.
    fn serialize_fields(&self, _fields: &mut FieldMap) {}

    /// Restore this component's fields
    ///
    /// Missing fields keep their current value, so a factory-built instance
    /// keeps its constructor arguments for anything the record omits.
    fn deserialize_fields(&mut self, _fields: &FieldMap) -> Result<(), FieldError> {
        Ok(())
    }

    /// Upcast for typed lookup
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed lookup
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Script view of this component, if it is one
    fn as_script(&self) -> Option<&dyn Script> {
        None
    }

    /// Mutable script view of this component, if it is one
    fn as_script_mut(&mut self) -> Option<&mut dyn Script> {
        None
    }
}

/// Write every field of a serde-serializable component into `fields`
pub fn encode_fields<T: Serialize>(value: &T, fields: &mut FieldMap) {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => fields.extend(map),
        Ok(other) => log::warn!("Component serialized to a non-object value: {}", other),
        Err(e) => log::warn!("Failed to serialize component fields: {}", e),
    }
}

/// Decode a serde-deserializable component from `fields`
///
/// Builds a fresh value: with `#[serde(default)]` missing fields take the
/// type's defaults. Restoring in place goes through [`read_field`].
pub fn decode_fields<T: DeserializeOwned>(fields: &FieldMap) -> Result<T, FieldError> {
    serde_json::from_value(serde_json::Value::Object(fields.clone()))
        .map_err(|e| FieldError::Malformed(e.to_string()))
}

/// Decode a single field, leaving `target` untouched if the field is absent
pub fn read_field<T: DeserializeOwned>(
    fields: &FieldMap,
    name: &str,
    target: &mut T,
) -> Result<(), FieldError> {
    if let Some(value) = fields.get(name) {
        *target = serde_json::from_value(value.clone()).map_err(|e| FieldError::Invalid {
            field: name.to_string(),
            message: e.to_string(),
        })?;
    }
    Ok(())
}

/// Encode a single field
pub fn write_field<T: Serialize>(fields: &mut FieldMap, name: &str, value: &T) {
    match serde_json::to_value(value) {
        Ok(value) => {
            fields.insert(name.to_string(), value);
        }
        Err(e) => log::warn!("Failed to serialize field `{}`: {}", name, e),
    }
}

/// A component as held by its owning entity
pub struct ComponentInstance {
    component: Box<dyn Component>,
    enabled: bool,
    owner: Option<EntityId>,
    started: bool,
    provenance: Option<Provenance>,
    registered_as: Option<String>,
}

impl ComponentInstance {
    /// Wrap a constructed, unattached component
    pub fn new(component: Box<dyn Component>) -> Self {
        Self {
            component,
            enabled: true,
            owner: None,
            started: false,
            provenance: None,
            registered_as: None,
        }
    }

    pub(crate) fn with_provenance(mut self, provenance: Option<Provenance>) -> Self {
        self.provenance = provenance;
        self
    }

    pub(crate) fn with_registered_name(mut self, type_name: &str) -> Self {
        self.registered_as = Some(type_name.to_string());
        self
    }

    /// Type name this instance is known by
    ///
    /// The registry name it was created under, or the component's own
    /// type name when it was built directly.
    pub fn type_name(&self) -> &str {
        self.registered_as
            .as_deref()
            .unwrap_or_else(|| self.component.type_name())
    }

    /// The wrapped component
    pub fn component(&self) -> &dyn Component {
        self.component.as_ref()
    }

    /// The wrapped component, mutably
    pub fn component_mut(&mut self) -> &mut dyn Component {
        self.component.as_mut()
    }

    /// Typed view of the wrapped component
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.component.as_any().downcast_ref::<T>()
    }

    /// Typed mutable view of the wrapped component
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.component.as_any_mut().downcast_mut::<T>()
    }

    /// Whether the component is a script
    pub fn is_script(&self) -> bool {
        self.component.as_script().is_some()
    }

    /// Whether per-frame dispatch reaches this component
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Toggle per-frame dispatch
    ///
    /// Attached scripts receive `on_enable`/`on_disable` when the flag
    /// actually changes.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;

        if self.owner.is_none() {
            return;
        }
        if let Some(script) = self.component.as_script_mut() {
            if enabled {
                script.on_enable();
            } else {
                script.on_disable();
            }
        }
    }

    /// Entity this component is attached to
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Whether a script's `start` has already run
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Module that produced this instance, `None` for built-in types
    pub fn provenance(&self) -> Option<&Provenance> {
        self.provenance.as_ref()
    }

    pub(crate) fn attach(&mut self, owner: EntityId) {
        self.owner = Some(owner);
        self.component.on_attach(owner);
    }

    pub(crate) fn detach(&mut self) {
        if self.owner.take().is_some() {
            self.component.on_detach();
        }
    }

    pub(crate) fn dispatch_update(&mut self, ctx: &mut ComponentContext<'_>, delta_time: f32) {
        if !self.enabled {
            return;
        }
        if !self.started {
            if let Some(script) = self.component.as_script_mut() {
                script.start(ctx);
                self.started = true;
            }
        }
        self.component.update(ctx, delta_time);
    }

    pub(crate) fn dispatch_fixed_update(&mut self, ctx: &mut ComponentContext<'_>, fixed_delta: f32) {
        if !self.enabled {
            return;
        }
        if let Some(script) = self.component.as_script_mut() {
            script.fixed_update(ctx, fixed_delta);
        }
    }

    pub(crate) fn dispatch_late_update(&mut self, ctx: &mut ComponentContext<'_>, delta_time: f32) {
        if !self.enabled {
            return;
        }
        if let Some(script) = self.component.as_script_mut() {
            script.late_update(ctx, delta_time);
        }
    }

    pub(crate) fn dispatch_collision(
        &mut self,
        ctx: &mut ComponentContext<'_>,
        event: CollisionEvent,
        other: EntityId,
    ) {
        if !self.enabled {
            return;
        }
        let Some(script) = self.component.as_script_mut() else {
            return;
        };
        match event {
            CollisionEvent::CollisionEnter => script.on_collision_enter(ctx, other),
            CollisionEvent::CollisionStay => script.on_collision_stay(ctx, other),
            CollisionEvent::CollisionExit => script.on_collision_exit(ctx, other),
            CollisionEvent::TriggerEnter => script.on_trigger_enter(ctx, other),
            CollisionEvent::TriggerStay => script.on_trigger_stay(ctx, other),
            CollisionEvent::TriggerExit => script.on_trigger_exit(ctx, other),
        }
    }

    pub(crate) fn dispatch_render(&self, ctx: &mut RenderContext<'_>) {
        if self.enabled {
            self.component.render(ctx);
        }
    }
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("type_name", &self.type_name())
            .field("enabled", &self.enabled)
            .field("owner", &self.owner)
            .field("started", &self.started)
            .field("module", &self.provenance.as_ref().map(Provenance::path))
            .finish()
    }
}

/// Mutable handle to a component attached to an entity
///
/// Edits and toggles the component in place; the instance itself cannot be
/// moved out of or swapped between entities.
pub struct ComponentMut<'a>(&'a mut ComponentInstance);

impl<'a> ComponentMut<'a> {
    pub(crate) fn new(instance: &'a mut ComponentInstance) -> Self {
        Self(instance)
    }

    /// Toggle per-frame dispatch, see [`ComponentInstance::set_enabled`]
    pub fn set_enabled(&mut self, enabled: bool) {
        self.0.set_enabled(enabled);
    }

    /// The wrapped component, mutably
    pub fn component_mut(&mut self) -> &mut dyn Component {
        self.0.component_mut()
    }

    /// Typed mutable view of the wrapped component
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.0.downcast_mut::<T>()
    }
}

impl std::ops::Deref for ComponentMut<'_> {
    type Target = ComponentInstance;

    fn deref(&self) -> &ComponentInstance {
        self.0
    }
}

impl fmt::Debug for ComponentMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// View of the owning entity handed to component hooks
///
/// The component being dispatched is split out of its owner's list, so the
/// context only reaches the *other* components. Attaching or removing
/// components from inside a hook is therefore impossible.
pub struct ComponentContext<'a> {
    entity: EntityId,
    entity_name: &'a str,
    before: &'a mut [ComponentInstance],
    after: &'a mut [ComponentInstance],
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(
        entity: EntityId,
        entity_name: &'a str,
        before: &'a mut [ComponentInstance],
        after: &'a mut [ComponentInstance],
    ) -> Self {
        Self {
            entity,
            entity_name,
            before,
            after,
        }
    }

    /// Owning entity
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Owning entity's name
    pub fn entity_name(&self) -> &str {
        self.entity_name
    }

    /// First sibling component of type `T`
    pub fn get<T: Component>(&self) -> Option<&T> {
        self.siblings().find_map(ComponentInstance::downcast_ref::<T>)
    }

    /// First sibling component of type `T`, mutably
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .find_map(ComponentInstance::downcast_mut::<T>)
    }

    /// First sibling component with the given type name
    pub fn get_by_type_name(&self, type_name: &str) -> Option<&dyn Component> {
        self.siblings()
            .find(|instance| instance.type_name() == type_name)
            .map(ComponentInstance::component)
    }

    /// Owner's transform, if it has one
    pub fn transform(&self) -> Option<&Transform> {
        self.get::<Transform>()
    }

    /// Owner's transform, mutably
    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        self.get_mut::<Transform>()
    }

    fn siblings(&self) -> impl Iterator<Item = &ComponentInstance> {
        self.before.iter().chain(self.after.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Health {
        current: i32,
        max: i32,
    }

    impl Component for Health {
        fn type_name(&self) -> &'static str {
            "Health"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_encode_and_decode_fields() {
        let mut fields = FieldMap::new();
        encode_fields(&Health { current: 3, max: 10 }, &mut fields);
        assert_eq!(fields.get("max"), Some(&serde_json::json!(10)));

        fields.remove("current");
        let loaded: Health = decode_fields(&fields).unwrap();
        assert_eq!(loaded, Health { current: 0, max: 10 });
    }

    #[test]
    fn test_read_field_keeps_value_when_absent() {
        let mut fields = FieldMap::new();
        write_field(&mut fields, "speed", &4.5_f32);

        let mut speed = 0.0_f32;
        let mut range = 7.0_f32;
        read_field(&fields, "speed", &mut speed).unwrap();
        read_field(&fields, "range", &mut range).unwrap();
        assert_eq!(speed, 4.5);
        assert_eq!(range, 7.0);
    }

    #[test]
    fn test_read_field_reports_field_name() {
        let mut fields = FieldMap::new();
        fields.insert("speed".into(), serde_json::json!("fast"));

        let mut speed = 0.0_f32;
        match read_field(&fields, "speed", &mut speed) {
            Err(FieldError::Invalid { field, .. }) => assert_eq!(field, "speed"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_instance_downcast_and_enable() {
        let mut instance = ComponentInstance::new(Box::new(Health::default()));
        assert_eq!(instance.type_name(), "Health");
        assert!(instance.is_enabled());
        assert!(!instance.is_script());

        instance.downcast_mut::<Health>().unwrap().max = 5;
        assert_eq!(instance.downcast_ref::<Health>().unwrap().max, 5);

        instance.set_enabled(false);
        assert!(!instance.is_enabled());
        assert!(instance.provenance().is_none());
    }
}
