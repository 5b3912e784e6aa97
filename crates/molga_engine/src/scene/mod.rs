//! Scene management
//!
//! A [`Scene`] owns a forest of entities and drives their per-frame
//! callbacks. Scenes persist through the [`SceneSerializer`], which writes
//! a versioned tree document:
//!
//! ```text
//! Scene
//!  ├─ Entity (name, active, parent)
//!  │   └─ Component records (type, enabled, fields...)
//!  └─ ...
//! ```
//!
//! Rendering is limited to collecting [`SpriteCommand`]s into a
//! [`RenderQueue`] for the host to draw.

mod scene_graph;
mod render_queue;
pub mod document;
pub mod serializer;

pub use scene_graph::{Ancestors, Scene, SceneError};
pub use render_queue::{RenderContext, RenderQueue, SpriteCommand};
pub use document::{ComponentRecord, EntityRecord, SceneDocument, SceneFormat, SCENE_DOCUMENT_VERSION};
pub use serializer::{LoadSummary, SceneSerializer, SerializerError};
