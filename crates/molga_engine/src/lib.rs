//! # Molga Engine
//!
//! Runtime object model of a modular 2D game engine.
//!
//! ## Features
//!
//! - **Entities and Components**: named entities owning ordered lists of
//!   polymorphic components, arranged in a parent/child hierarchy
//! - **Component Registry**: components constructed by type name
//! - **Scripts**: components with start, fixed/late update, enable and
//!   collision hooks
//! - **Behavior Modules**: externally compiled libraries that register new
//!   component types at runtime and can be hot reloaded
//! - **Scene Serialization**: versioned JSON or RON scene documents
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use molga_engine::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let player = engine.scene_mut().create_entity("Player").id();
//!         engine.add_component_by_type_name(player, "Transform")?;
//!         engine.add_component_by_type_name(player, "Rotator")?;
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         if engine.timer().total_time() > 5.0 {
//!             engine.stop();
//!         }
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, engine: &mut Engine) {
//!         if let Err(e) = engine.save_scene("level.json") {
//!             log::error!("Failed to save scene: {}", e);
//!         }
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let mut app = MyApp;
//!     Engine::run(config, &mut app)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;

pub mod foundation;
pub mod ecs;
pub mod scene;
pub mod scripting;
pub mod physics;

mod application;
mod engine;

pub use application::{Application, AppError};
pub use crate::core::config::EngineConfig;
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Application, AppError,
        Engine, EngineConfig, EngineError,
        config::Config,
        foundation::{
            math::{Color, Vec2, WorldTransform},
            time::{Timer, Stopwatch},
        },
        ecs::{
            Component, ComponentContext, ComponentInstance, ComponentMut, ComponentRegistry, Entity, EntityId,
            FieldError, FieldMap, BoxCollider2D, SpriteRenderer, Transform,
        },
        scene::{RenderQueue, Scene, SceneFormat, SceneSerializer, SpriteCommand},
        scripting::{CollisionEvent, ModuleLoader, ModuleRegistrar, Script},
    };
}

#[cfg(test)]
mod tests;
