//! Sprite renderer component

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::ecs::component::{encode_fields, read_field, Component, FieldError, FieldMap};
use crate::foundation::math::{Color, Vec2};
use crate::scene::{RenderContext, SpriteCommand};

/// Draws a colored, optionally textured quad at the owner's world transform
///
/// `texture_path` is project-relative and resolved by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpriteRenderer {
    /// Tint color
    pub color: Color,
    /// Size in world units before scaling
    pub size: Vec2,
    /// Mirror horizontally
    pub flip_x: bool,
    /// Mirror vertically
    pub flip_y: bool,
    /// Draw order, lower first
    pub sorting_order: i32,
    /// Project-relative texture path, empty for an untextured quad
    pub texture_path: String,
}

impl Default for SpriteRenderer {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            size: Vec2::new(32.0, 32.0),
            flip_x: false,
            flip_y: false,
            sorting_order: 0,
            texture_path: String::new(),
        }
    }
}

impl SpriteRenderer {
    /// Create a sprite of the given size and color
    pub fn new(size: Vec2, color: Color) -> Self {
        Self {
            size,
            color,
            ..Default::default()
        }
    }

    /// Builder pattern: Set texture path
    pub fn with_texture(mut self, path: impl Into<String>) -> Self {
        self.texture_path = path.into();
        self
    }

    /// Builder pattern: Set sorting order
    pub fn with_sorting_order(mut self, order: i32) -> Self {
        self.sorting_order = order;
        self
    }
}

impl Component for SpriteRenderer {
    fn type_name(&self) -> &'static str {
        "SpriteRenderer"
    }

    fn render(&self, ctx: &mut RenderContext<'_>) {
        let world = ctx.world();
        ctx.submit(SpriteCommand {
            entity: ctx.entity(),
            position: world.position,
            size: self.size.component_mul(&world.scale),
            rotation: world.rotation,
            color: self.color,
            flip_x: self.flip_x,
            flip_y: self.flip_y,
            sorting_order: self.sorting_order,
            texture_path: self.texture_path.clone(),
        });
    }

    fn serialize_fields(&self, fields: &mut FieldMap) {
        encode_fields(self, fields);
    }

    fn deserialize_fields(&mut self, fields: &FieldMap) -> Result<(), FieldError> {
        read_field(fields, "color", &mut self.color)?;
        read_field(fields, "size", &mut self.size)?;
        read_field(fields, "flipX", &mut self.flip_x)?;
        read_field(fields, "flipY", &mut self.flip_y)?;
        read_field(fields, "sortingOrder", &mut self.sorting_order)?;
        read_field(fields, "texturePath", &mut self.texture_path)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
