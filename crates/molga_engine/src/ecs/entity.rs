//! Entity implementation
//!
//! An entity is a named node owning an ordered list of components. Parent
//! and child links are plain ids maintained by the owning
//! [`Scene`](crate::scene::Scene); the entity never owns its children.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ecs::component::{Component, ComponentContext, ComponentInstance, ComponentMut};
use crate::ecs::registry::ComponentRegistry;
use crate::scene::RenderContext;
use crate::scripting::CollisionEvent;

static NEXT_ENTITY_ID: AtomicU32 = AtomicU32::new(1);

/// Entity identifier
///
/// Ids are unique for the lifetime of the process and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u32);

impl EntityId {
    fn next() -> Self {
        Self(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entity-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    /// No factory is registered under the requested type name
    #[error("unknown component type '{0}'")]
    UnknownComponentType(String),
}

/// A named, uniquely identified node in the scene graph
pub struct Entity {
    id: EntityId,
    name: String,
    active: bool,
    components: Vec<ComponentInstance>,
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,
}

impl Entity {
    /// Create an active entity with a fresh id and no components
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::next(),
            name: name.into(),
            active: true,
            components: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Get the entity id
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the entity
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Whether update and render reach this entity
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Toggle update and render dispatch for this entity only
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Parent entity, if any
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Child entities in attachment order
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// Attach a component and return it
    pub fn add_component<T: Component>(&mut self, component: T) -> &mut T {
        self.push_attached(ComponentInstance::new(Box::new(component)))
            .downcast_mut::<T>()
            .expect("attached component keeps its type")
    }

    /// Construct a component through the registry and attach it
    pub fn add_component_by_type_name(
        &mut self,
        registry: &ComponentRegistry,
        type_name: &str,
    ) -> Result<ComponentMut<'_>, EntityError> {
        let instance = registry
            .create(type_name)
            .ok_or_else(|| EntityError::UnknownComponentType(type_name.to_string()))?;
        Ok(self.attach(instance))
    }

    /// Attach an already constructed component instance
    pub fn attach(&mut self, instance: ComponentInstance) -> ComponentMut<'_> {
        ComponentMut::new(self.push_attached(instance))
    }

    fn push_attached(&mut self, mut instance: ComponentInstance) -> &mut ComponentInstance {
        instance.attach(self.id);
        let index = self.components.len();
        self.components.push(instance);
        &mut self.components[index]
    }

    /// First component of type `T`
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.components.iter().find_map(ComponentInstance::downcast_ref::<T>)
    }

    /// First component of type `T`, mutably
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components.iter_mut().find_map(ComponentInstance::downcast_mut::<T>)
    }

    /// Whether a component of type `T` is attached
    pub fn has_component<T: Component>(&self) -> bool {
        self.get_component::<T>().is_some()
    }

    /// First component with the given type name
    pub fn get_component_by_type_name(&self, type_name: &str) -> Option<&ComponentInstance> {
        self.components.iter().find(|instance| instance.type_name() == type_name)
    }

    /// First component with the given type name, mutably
    pub fn get_component_by_type_name_mut(&mut self, type_name: &str) -> Option<ComponentMut<'_>> {
        self.components
            .iter_mut()
            .find(|instance| instance.type_name() == type_name)
            .map(ComponentMut::new)
    }

    /// Detach and destroy the first component of type `T`
    ///
    /// Returns whether a component was removed.
    pub fn remove_component<T: Component>(&mut self) -> bool {
        let index = self
            .components
            .iter()
            .position(|instance| instance.downcast_ref::<T>().is_some());
        index.map(|index| self.remove_component_at(index)).is_some()
    }

    /// Detach and destroy the first component with the given type name
    pub fn remove_component_by_type_name(&mut self, type_name: &str) -> bool {
        let index = self
            .components
            .iter()
            .position(|instance| instance.type_name() == type_name);
        index.map(|index| self.remove_component_at(index)).is_some()
    }

    /// Detach and destroy every component matching `predicate`
    ///
    /// Returns the number of components removed.
    pub fn remove_components_where(&mut self, mut predicate: impl FnMut(&ComponentInstance) -> bool) -> usize {
        let mut removed = 0;
        let mut index = 0;
        while index < self.components.len() {
            if predicate(&self.components[index]) {
                self.remove_component_at(index);
                removed += 1;
            } else {
                index += 1;
            }
        }
        removed
    }

    pub(crate) fn remove_component_at(&mut self, index: usize) -> ComponentInstance {
        let mut instance = self.components.remove(index);
        instance.detach();
        instance
    }

    /// Attached components in attachment order
    pub fn components(&self) -> &[ComponentInstance] {
        &self.components
    }

    /// Enable or disable the component at `index`
    ///
    /// Returns `false` if there is no component at `index`.
    pub fn set_component_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.components.get_mut(index) {
            Some(instance) => {
                instance.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Update every enabled component, running script `start` first where due
    pub fn update(&mut self, delta_time: f32) {
        if !self.active {
            return;
        }
        self.for_each_instance(|instance, ctx| instance.dispatch_update(ctx, delta_time));
    }

    /// Fixed-step update of every enabled script
    pub fn fixed_update(&mut self, fixed_delta: f32) {
        if !self.active {
            return;
        }
        self.for_each_instance(|instance, ctx| instance.dispatch_fixed_update(ctx, fixed_delta));
    }

    /// Late update of every enabled script
    pub fn late_update(&mut self, delta_time: f32) {
        if !self.active {
            return;
        }
        self.for_each_instance(|instance, ctx| instance.dispatch_late_update(ctx, delta_time));
    }

    /// Deliver a collision or trigger transition to every enabled script
    pub fn dispatch_collision(&mut self, event: CollisionEvent, other: EntityId) {
        if !self.active {
            return;
        }
        self.for_each_instance(|instance, ctx| instance.dispatch_collision(ctx, event, other));
    }

    /// Let every enabled component submit draw commands
    pub fn render(&self, ctx: &mut RenderContext<'_>) {
        if !self.active {
            return;
        }
        for instance in &self.components {
            instance.dispatch_render(ctx);
        }
    }

    fn for_each_instance(&mut self, mut f: impl FnMut(&mut ComponentInstance, &mut ComponentContext<'_>)) {
        let id = self.id;
        let name = self.name.as_str();
        for index in 0..self.components.len() {
            let (before, rest) = self.components.split_at_mut(index);
            if let Some((current, after)) = rest.split_first_mut() {
                let mut ctx = ComponentContext::new(id, name, before, after);
                f(current, &mut ctx);
            }
        }
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        for instance in &mut self.components {
            instance.detach();
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("active", &self.active)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("components", &self.components)
            .finish()
    }
}
