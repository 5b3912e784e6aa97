//! Built-in components
//!
//! Plain data components shipped with the engine. Script behaviors live in
//! [`crate::scripting`].

pub mod transform;
pub mod sprite_renderer;
pub mod box_collider;

pub use transform::Transform;
pub use sprite_renderer::SpriteRenderer;
pub use box_collider::BoxCollider2D;

use crate::ecs::registry::ComponentRegistry;

/// Register `Transform`, `SpriteRenderer` and `BoxCollider2D`
pub fn register_builtin_components(registry: &mut ComponentRegistry) {
    registry.register_default::<Transform>();
    registry.register_default::<SpriteRenderer>();
    registry.register_default::<BoxCollider2D>();
}
