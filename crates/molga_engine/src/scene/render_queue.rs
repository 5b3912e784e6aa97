//! Render queue for sprite submission
//!
//! Components submit [`SpriteCommand`]s during [`Scene::render`](crate::scene::Scene::render);
//! the host's renderer drains them in sorting order. The engine core never
//! draws anything itself.

use crate::ecs::EntityId;
use crate::foundation::math::{Color, Vec2, WorldTransform};

/// A single sprite to draw
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteCommand {
    /// Entity that submitted the sprite
    pub entity: EntityId,
    /// World position
    pub position: Vec2,
    /// World size, already scaled
    pub size: Vec2,
    /// World rotation in degrees
    pub rotation: f32,
    /// Tint color
    pub color: Color,
    /// Mirror horizontally
    pub flip_x: bool,
    /// Mirror vertically
    pub flip_y: bool,
    /// Draw order, lower first
    pub sorting_order: i32,
    /// Project-relative texture path
    pub texture_path: String,
}

/// Sprite commands collected for one frame
#[derive(Debug, Default)]
pub struct RenderQueue {
    commands: Vec<SpriteCommand>,
    sorted: bool,
}

impl RenderQueue {
    /// Create an empty render queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command
    pub fn push(&mut self, command: SpriteCommand) {
        self.commands.push(command);
        self.sorted = false;
    }

    /// Commands in draw order
    ///
    /// Sorted by sorting order; equal orders keep submission order.
    pub fn sorted_commands(&mut self) -> &[SpriteCommand] {
        if !self.sorted {
            self.commands.sort_by_key(|command| command.sorting_order);
            self.sorted = true;
        }
        &self.commands
    }

    /// Remove and return all commands in draw order
    pub fn drain_sorted(&mut self) -> Vec<SpriteCommand> {
        self.sorted_commands();
        self.sorted = false;
        std::mem::take(&mut self.commands)
    }

    /// Get the number of commands in the queue
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop all commands
    pub fn clear(&mut self) {
        self.commands.clear();
        self.sorted = false;
    }
}

/// Render-time view handed to [`Component::render`](crate::ecs::Component::render)
pub struct RenderContext<'a> {
    queue: &'a mut RenderQueue,
    world: WorldTransform,
    entity: EntityId,
}

impl<'a> RenderContext<'a> {
    /// Create a context for one entity
    pub fn new(queue: &'a mut RenderQueue, entity: EntityId, world: WorldTransform) -> Self {
        Self { queue, world, entity }
    }

    /// Entity being rendered
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// World transform of the entity being rendered
    pub fn world(&self) -> WorldTransform {
        self.world
    }

    /// Submit a sprite
    pub fn submit(&mut self, command: SpriteCommand) {
        self.queue.push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Entity;

    fn command(entity: EntityId, sorting_order: i32, texture: &str) -> SpriteCommand {
        SpriteCommand {
            entity,
            position: Vec2::zeros(),
            size: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            color: Color::WHITE,
            flip_x: false,
            flip_y: false,
            sorting_order,
            texture_path: texture.to_string(),
        }
    }

    #[test]
    fn test_sort_is_stable_by_sorting_order() {
        let id = Entity::new("sprite").id();
        let mut queue = RenderQueue::new();
        queue.push(command(id, 2, "front"));
        queue.push(command(id, 0, "back_a"));
        queue.push(command(id, 1, "middle"));
        queue.push(command(id, 0, "back_b"));

        let order: Vec<&str> = queue
            .sorted_commands()
            .iter()
            .map(|c| c.texture_path.as_str())
            .collect();
        assert_eq!(order, vec!["back_a", "back_b", "middle", "front"]);
    }

    #[test]
    fn test_drain_empties_queue() {
        let id = Entity::new("sprite").id();
        let mut queue = RenderQueue::new();
        queue.push(command(id, 1, "b"));
        queue.push(command(id, 0, "a"));

        let drained = queue.drain_sorted();
        assert_eq!(drained[0].texture_path, "a");
        assert!(queue.is_empty());
    }
}
