//! Scene container
//!
//! The [`Scene`] owns every entity. Parent/child edges are navigation links
//! stored as ids on the entities, never ownership: destroying a parent
//! leaves its children alive as roots.

use thiserror::Error;

use crate::ecs::provenance::ModuleKey;
use crate::ecs::{Entity, EntityId, Transform};
use crate::foundation::math::WorldTransform;
use crate::scene::render_queue::{RenderContext, RenderQueue};
use crate::scripting::CollisionEvent;

/// Hierarchy errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// No entity with this id lives in the scene
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    /// The new parent is a descendant of the child
    #[error("cannot parent {child} to its descendant {parent}")]
    CyclicParent {
        /// Entity being reparented
        child: EntityId,
        /// Requested parent
        parent: EntityId,
    },

    /// An entity cannot be its own parent
    #[error("cannot parent {0} to itself")]
    SelfParent(EntityId),
}

/// Top-level container owning an entity forest
#[derive(Debug)]
pub struct Scene {
    name: String,
    // Sorted by id, which is also creation order.
    entities: Vec<Entity>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Untitled Scene")
    }
}

impl Scene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: Vec::new(),
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the scene
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Create a root entity and return it
    pub fn create_entity(&mut self, name: impl Into<String>) -> &mut Entity {
        let id = self.insert(Entity::new(name));
        let index = self.index_of(id).unwrap_or(self.entities.len() - 1);
        &mut self.entities[index]
    }

    /// Take ownership of an entity
    ///
    /// Hierarchy links the entity carries from elsewhere are dropped; it
    /// enters the scene as a root.
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        entity.parent = None;
        entity.children.clear();
        let id = entity.id();
        let index = self.entities.partition_point(|existing| existing.id() < id);
        self.entities.insert(index, entity);
        id
    }

    /// Entity by id
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|index| &self.entities[index])
    }

    /// Entity by id, mutably
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index_of(id).map(move |index| &mut self.entities[index])
    }

    /// Whether the entity lives in this scene
    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    /// Destroy an entity
    ///
    /// The entity leaves its parent's child list, its children become roots
    /// and its components receive their detach notification. Returns
    /// whether the entity existed.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let entity = self.entities.remove(index);

        if let Some(parent) = entity.parent.and_then(|parent| self.get_mut(parent)) {
            parent.children.retain(|child| *child != id);
        }
        for child in &entity.children {
            if let Some(child) = self.get_mut(*child) {
                child.parent = None;
            }
        }

        log::debug!("Destroyed entity '{}' {}", entity.name(), id);
        true
    }

    /// Reparent `child` under `parent`, or make it a root with `None`
    ///
    /// The change is atomic: on error nothing is modified.
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> Result<(), SceneError> {
        if !self.contains(child) {
            return Err(SceneError::EntityNotFound(child));
        }
        if let Some(parent) = parent {
            if parent == child {
                return Err(SceneError::SelfParent(child));
            }
            if !self.contains(parent) {
                return Err(SceneError::EntityNotFound(parent));
            }
            if self.ancestors(parent).any(|ancestor| ancestor == child) {
                return Err(SceneError::CyclicParent { child, parent });
            }
        }

        let old_parent = self.get(child).and_then(Entity::parent);
        if let Some(old) = old_parent.and_then(|old| self.get_mut(old)) {
            old.children.retain(|existing| *existing != child);
        }
        if let Some(entity) = self.get_mut(child) {
            entity.parent = parent;
        }
        if let Some(new) = parent.and_then(|parent| self.get_mut(parent)) {
            new.children.push(child);
        }
        Ok(())
    }

    /// Walk from the parent of `id` up to its root
    pub fn ancestors(&self, id: EntityId) -> Ancestors<'_> {
        Ancestors {
            scene: self,
            next: self.get(id).and_then(Entity::parent),
        }
    }

    /// Entities without a parent, in creation order
    pub fn roots(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|entity| entity.parent().is_none())
    }

    /// Children of `id`, empty if it has none or does not exist
    pub fn children_of(&self, id: EntityId) -> &[EntityId] {
        self.get(id).map(Entity::children).unwrap_or_default()
    }

    /// First entity with the given name
    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.name() == name)
    }

    /// First entity with the given name, mutably
    pub fn find_by_name_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.name() == name)
    }

    /// All entities in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// All entities in creation order, mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Get the number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene holds no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Destroy every entity
    pub fn clear(&mut self) {
        let count = self.entities.len();
        self.entities.clear();
        log::debug!("Cleared scene '{}' ({} entities)", self.name, count);
    }

    /// Update every entity once, in creation order
    pub fn update(&mut self, delta_time: f32) {
        for entity in &mut self.entities {
            entity.update(delta_time);
        }
    }

    /// Fixed-step update of every entity
    pub fn fixed_update(&mut self, fixed_delta: f32) {
        for entity in &mut self.entities {
            entity.fixed_update(fixed_delta);
        }
    }

    /// Late update of every entity
    pub fn late_update(&mut self, delta_time: f32) {
        for entity in &mut self.entities {
            entity.late_update(delta_time);
        }
    }

    /// Let every active entity submit draw commands
    pub fn render(&self, queue: &mut RenderQueue) {
        for entity in self.entities.iter().filter(|entity| entity.is_active()) {
            let world = self.world_transform(entity.id()).unwrap_or_default();
            let mut ctx = RenderContext::new(queue, entity.id(), world);
            entity.render(&mut ctx);
        }
    }

    /// World-space transform of an entity
    ///
    /// Composes the entity's [`Transform`] with those of its ancestors, up to
    /// the first ancestor without one. `None` if the entity is missing or
    /// has no transform.
    pub fn world_transform(&self, id: EntityId) -> Option<WorldTransform> {
        let local = self.get(id)?.get_component::<Transform>()?;

        let mut chain = vec![local];
        for ancestor in self.ancestors(id) {
            match self.get(ancestor).and_then(Entity::get_component::<Transform>) {
                Some(transform) => chain.push(transform),
                None => break,
            }
        }

        Some(chain.iter().rev().fold(WorldTransform::identity(), |world, transform| {
            world.combine(transform.position, transform.rotation, transform.scale)
        }))
    }

    /// Deliver a collision or trigger transition to one entity
    pub fn dispatch_collision(&mut self, id: EntityId, event: CollisionEvent, other: EntityId) {
        if let Some(entity) = self.get_mut(id) {
            entity.dispatch_collision(event, other);
        }
    }

    /// Detach and destroy every component built by the given module
    ///
    /// Returns the number of components removed.
    pub fn release_module(&mut self, module: ModuleKey) -> usize {
        let removed: usize = self
            .entities
            .iter_mut()
            .map(|entity| {
                entity.remove_components_where(|instance| {
                    instance.provenance().is_some_and(|origin| origin.module() == module)
                })
            })
            .sum();

        if removed > 0 {
            log::info!("Released {} component(s) from scene '{}'", removed, self.name);
        }
        removed
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, Entity::id).ok()
    }
}

/// Iterator over the ancestors of an entity, nearest first
pub struct Ancestors<'a> {
    scene: &'a Scene,
    next: Option<EntityId>,
}

impl Iterator for Ancestors<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        let current = self.next?;
        self.next = self.scene.get(current).and_then(Entity::parent);
        Some(current)
    }
}
