//! Entity and component object model
//!
//! Entities own ordered lists of polymorphic components. Components are
//! constructed either directly or by name through the [`ComponentRegistry`].

pub mod entity;
pub mod component;
pub mod registry;
pub mod provenance;
pub mod components;

pub use entity::{Entity, EntityError, EntityId};
pub use component::{
    decode_fields, read_field, encode_fields, write_field, Component, ComponentContext,
    ComponentInstance, ComponentMut, FieldError, FieldMap,
};
pub use registry::{ComponentFactory, ComponentRegistry};
pub use provenance::{ModuleKey, ModuleTag, Provenance};
pub use components::{register_builtin_components, BoxCollider2D, SpriteRenderer, Transform};
