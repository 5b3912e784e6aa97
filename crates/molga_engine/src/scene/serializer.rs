//! Scene serializer
//!
//! Converts scenes to and from [`SceneDocument`]s. The serializer only walks
//! entities and resolves type names through the registry; every component
//! encodes and decodes its own fields.
//!
//! A component record whose type is not registered, or whose fields fail to
//! decode, is skipped with a warning. The rest of the document still loads,
//! so a scene survives one of its behavior modules being unavailable.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ecs::{ComponentRegistry, Entity, EntityId, FieldMap};
use crate::scene::document::{
    ComponentRecord, EntityRecord, SceneDocument, SceneFormat, SCENE_DOCUMENT_VERSION,
};
use crate::scene::Scene;

/// Scene persistence errors
#[derive(Error, Debug)]
pub enum SerializerError {
    /// Reading or writing the document failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is malformed
    #[error("Parse error: {0}")]
    Parse(String),

    /// The path has no supported extension
    #[error("Unsupported scene format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The document could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),
}

/// Outcome of restoring a document into a scene
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Entities created
    pub entities: usize,
    /// Components attached
    pub components: usize,
    /// Component records skipped
    pub skipped: usize,
}

/// Saves and restores scenes using a component registry
#[derive(Debug, Clone, Copy)]
pub struct SceneSerializer<'a> {
    registry: &'a ComponentRegistry,
}

impl<'a> SceneSerializer<'a> {
    /// Create a serializer resolving component types through `registry`
    pub fn new(registry: &'a ComponentRegistry) -> Self {
        Self { registry }
    }

    /// Write `scene` to `path`
    ///
    /// The format follows the extension (`.json` or `.ron`). The document is
    /// written to a temporary sibling and renamed over `path`, so a failed
    /// save never leaves a partial file behind.
    pub fn save(&self, path: impl AsRef<Path>, scene: &Scene) -> Result<(), SerializerError> {
        let path = path.as_ref();
        let format = SceneFormat::from_path(path)?;
        let text = format.encode(&self.to_document(scene))?;

        let temp_path = temporary_path(path);
        if let Err(e) = fs::write(&temp_path, text).and_then(|()| fs::rename(&temp_path, path)) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        log::info!(
            "Saved scene '{}' to {} ({} entities)",
            scene.name(),
            path.display(),
            scene.len()
        );
        Ok(())
    }

    /// Replace the contents of `scene` with the document at `path`
    ///
    /// On I/O or parse failure `scene` is left untouched.
    pub fn load(&self, path: impl AsRef<Path>, scene: &mut Scene) -> Result<LoadSummary, SerializerError> {
        let path = path.as_ref();
        let format = SceneFormat::from_path(path)?;
        let text = fs::read_to_string(path)?;
        let document = format.decode(&text)?;

        let summary = self.from_document(&document, scene);
        log::info!(
            "Loaded scene '{}' from {} ({} entities, {} components, {} skipped)",
            scene.name(),
            path.display(),
            summary.entities,
            summary.components,
            summary.skipped
        );
        Ok(summary)
    }

    /// Encode `scene` as text
    pub fn to_string(&self, scene: &Scene, format: SceneFormat) -> Result<String, SerializerError> {
        format.encode(&self.to_document(scene))
    }

    /// Replace the contents of `scene` with a document held in `text`
    pub fn from_str(&self, text: &str, format: SceneFormat, scene: &mut Scene) -> Result<LoadSummary, SerializerError> {
        let document = format.decode(text)?;
        Ok(self.from_document(&document, scene))
    }

    /// Snapshot `scene` as a document
    pub fn to_document(&self, scene: &Scene) -> SceneDocument {
        let mut document = SceneDocument::new(scene.name());
        document.entities = scene.iter().map(entity_record).collect();
        document
    }

    /// Replace the contents of `scene` with `document`
    ///
    /// Entities get fresh ids; parent links are remapped to them.
    pub fn from_document(&self, document: &SceneDocument, scene: &mut Scene) -> LoadSummary {
        if document.version != SCENE_DOCUMENT_VERSION {
            log::warn!(
                "Scene document version {} differs from {}, loading anyway",
                document.version,
                SCENE_DOCUMENT_VERSION
            );
        }

        let mut summary = LoadSummary::default();
        let entities: Vec<Entity> = document
            .entities
            .iter()
            .map(|record| self.build_entity(record, &mut summary))
            .collect();

        scene.clear();
        scene.set_name(document.name.clone());

        let mut id_map: HashMap<u32, EntityId> = HashMap::new();
        for (record, entity) in document.entities.iter().zip(entities) {
            id_map.insert(record.id, scene.insert(entity));
            summary.entities += 1;
        }

        for record in &document.entities {
            let (Some(parent), Some(&child)) = (record.parent, id_map.get(&record.id)) else {
                continue;
            };
            match id_map.get(&parent) {
                Some(&parent) => {
                    if let Err(e) = scene.set_parent(child, Some(parent)) {
                        log::warn!("Entity '{}' keeps no parent: {}", record.name, e);
                    }
                }
                None => log::warn!(
                    "Entity '{}' references missing parent {}, loading it as a root",
                    record.name,
                    parent
                ),
            }
        }

        summary
    }

    /// Encode a single entity as JSON text
    pub fn serialize_entity(&self, entity: &Entity) -> Result<String, SerializerError> {
        serde_json::to_string_pretty(&entity_record(entity)).map_err(|e| SerializerError::Encode(e.to_string()))
    }

    /// Build a detached entity with a fresh id from JSON text
    pub fn deserialize_entity(&self, text: &str) -> Result<Entity, SerializerError> {
        let record: EntityRecord = serde_json::from_str(text).map_err(|e| SerializerError::Parse(e.to_string()))?;
        let mut summary = LoadSummary::default();
        Ok(self.build_entity(&record, &mut summary))
    }

    fn build_entity(&self, record: &EntityRecord, summary: &mut LoadSummary) -> Entity {
        let mut entity = Entity::new(record.name.clone());
        entity.set_active(record.active);

        for component in &record.components {
            if self.attach_component(&mut entity, component) {
                summary.components += 1;
            } else {
                summary.skipped += 1;
            }
        }
        entity
    }

    fn attach_component(&self, entity: &mut Entity, record: &ComponentRecord) -> bool {
        let mut instance = match entity.add_component_by_type_name(self.registry, &record.type_name) {
            Ok(instance) => instance,
            Err(e) => {
                log::warn!("Skipping component on entity '{}': {}", entity.name(), e);
                return false;
            }
        };

        match instance.component_mut().deserialize_fields(&record.fields) {
            Ok(()) => {
                instance.set_enabled(record.enabled);
                true
            }
            Err(e) => {
                log::warn!(
                    "Dropping component '{}' on entity '{}': {}",
                    record.type_name,
                    entity.name(),
                    e
                );
                let last = entity.component_count() - 1;
                entity.remove_component_at(last);
                false
            }
        }
    }
}

fn entity_record(entity: &Entity) -> EntityRecord {
    EntityRecord {
        name: entity.name().to_string(),
        id: entity.id().raw(),
        active: entity.is_active(),
        parent: entity.parent().map(EntityId::raw),
        components: entity
            .components()
            .iter()
            .map(|instance| {
                let mut fields = FieldMap::new();
                instance.component().serialize_fields(&mut fields);
                ComponentRecord {
                    type_name: instance.type_name().to_string(),
                    enabled: instance.is_enabled(),
                    fields,
                }
            })
            .collect(),
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{register_builtin_components, BoxCollider2D, SpriteRenderer, Transform};
    use crate::foundation::math::{Color, Vec2};
    use crate::scripting::Rotator;

    fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        register_builtin_components(&mut registry);
        registry
    }

    fn sample_scene() -> Scene {
        let mut scene = Scene::new("Level 1");
        let player = scene.create_entity("Player");
        player.add_component(Transform::from_position(Vec2::new(10.0, 20.0)));
        player.add_component(SpriteRenderer::new(Vec2::new(32.0, 32.0), Color::new(0.2, 0.8, 0.3, 1.0)));
        let player = player.id();

        let sensor = scene.create_entity("Sensor");
        sensor.add_component(Transform::default());
        sensor.add_component(BoxCollider2D::default().as_trigger());
        sensor.set_active(false);
        let sensor = sensor.id();

        scene.set_parent(sensor, Some(player)).unwrap();
        scene
    }

    #[test]
    fn test_document_round_trip_reassigns_ids() {
        let registry = registry();
        let serializer = SceneSerializer::new(&registry);
        let original = sample_scene();

        let document = serializer.to_document(&original);
        let mut restored = Scene::new("empty");
        let summary = serializer.from_document(&document, &mut restored);

        assert_eq!(summary, LoadSummary { entities: 2, components: 4, skipped: 0 });
        assert_eq!(restored.name(), "Level 1");

        let player = restored.find_by_name("Player").unwrap();
        let sensor = restored.find_by_name("Sensor").unwrap();
        assert_ne!(player.id(), original.find_by_name("Player").unwrap().id());
        assert!(!sensor.is_active());
        assert_eq!(sensor.parent(), Some(player.id()));
        assert!(sensor.get_component::<BoxCollider2D>().unwrap().is_trigger);
        assert_eq!(serializer.to_document(&restored).entities[0].components, document.entities[0].components);
    }

    #[test]
    fn test_disabled_flag_survives() {
        let registry = registry();
        let serializer = SceneSerializer::new(&registry);
        let mut scene = Scene::new("Flags");
        let entity = scene.create_entity("Lamp");
        entity.add_component(SpriteRenderer::default());
        entity.set_component_enabled(0, false);

        let text = serializer.to_string(&scene, SceneFormat::Json).unwrap();
        let mut restored = Scene::default();
        serializer.from_str(&text, SceneFormat::Json, &mut restored).unwrap();

        let lamp = restored.find_by_name("Lamp").unwrap();
        assert!(!lamp.components()[0].is_enabled());
    }

    #[test]
    fn test_aliased_registration_keeps_registry_name() {
        let mut registry = registry();
        registry.register("FastSpinner", || Box::new(Rotator::new(720.0)));
        let serializer = SceneSerializer::new(&registry);

        let mut scene = Scene::new("Aliases");
        scene
            .create_entity("Fan")
            .add_component_by_type_name(&registry, "FastSpinner")
            .unwrap();

        let document = serializer.to_document(&scene);
        assert_eq!(document.entities[0].components[0].type_name, "FastSpinner");

        let mut restored = Scene::default();
        let summary = serializer.from_document(&document, &mut restored);
        assert_eq!(summary, LoadSummary { entities: 1, components: 1, skipped: 0 });

        let fan = restored.find_by_name("Fan").unwrap();
        let spinner = fan.get_component_by_type_name("FastSpinner").unwrap();
        assert_eq!(spinner.downcast_ref::<Rotator>().unwrap().rotation_speed, 720.0);
    }

    #[test]
    fn test_missing_fields_keep_factory_values() {
        let mut registry = registry();
        registry.register("FastSpinner", || Box::new(Rotator::new(720.0)));
        let serializer = SceneSerializer::new(&registry);
        let text = r#"{
            "version": "1.0",
            "name": "Sparse",
            "entities": [
                { "name": "Fan", "id": 1, "active": true, "components": [
                    { "type": "FastSpinner" }
                ] }
            ]
        }"#;

        let mut scene = Scene::default();
        let summary = serializer.from_str(text, SceneFormat::Json, &mut scene).unwrap();
        assert_eq!(summary.skipped, 0);

        let fan = scene.find_by_name("Fan").unwrap();
        assert_eq!(fan.get_component::<Rotator>().unwrap().rotation_speed, 720.0);
    }

    #[test]
    fn test_undecodable_component_is_dropped() {
        let registry = registry();
        let serializer = SceneSerializer::new(&registry);
        let text = r#"{
            "version": "1.0",
            "name": "Broken",
            "entities": [
                { "name": "Box", "id": 7, "active": true, "components": [
                    { "type": "Transform", "position": "up" },
                    { "type": "BoxCollider2D" }
                ] }
            ]
        }"#;

        let mut scene = Scene::default();
        let summary = serializer.from_str(text, SceneFormat::Json, &mut scene).unwrap();
        assert_eq!(summary, LoadSummary { entities: 1, components: 1, skipped: 1 });

        let entity = scene.find_by_name("Box").unwrap();
        assert!(!entity.has_component::<Transform>());
        assert!(entity.has_component::<BoxCollider2D>());
    }

    #[test]
    fn test_missing_parent_loads_as_root() {
        let registry = registry();
        let serializer = SceneSerializer::new(&registry);
        let text = r#"{ "version": "1.0", "name": "Orphans", "entities": [ { "name": "Lost", "id": 2, "parent": 99 } ] }"#;

        let mut scene = Scene::default();
        serializer.from_str(text, SceneFormat::Json, &mut scene).unwrap();
        assert!(scene.find_by_name("Lost").unwrap().parent().is_none());
    }

    #[test]
    fn test_parse_error_leaves_scene_untouched() {
        let registry = registry();
        let serializer = SceneSerializer::new(&registry);
        let mut scene = sample_scene();

        let result = serializer.from_str("{ \"version\": ", SceneFormat::Json, &mut scene);
        assert!(matches!(result, Err(SerializerError::Parse(_))));
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.name(), "Level 1");
    }

    #[test]
    fn test_save_and_load_files() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry();
        let serializer = SceneSerializer::new(&registry);
        let scene = sample_scene();

        for file in ["level.json", "level.ron"] {
            let path = dir.path().join(file);
            serializer.save(&path, &scene).unwrap();
            assert!(!temporary_path(&path).exists());

            let mut restored = Scene::default();
            let summary = serializer.load(&path, &mut restored).unwrap();
            assert_eq!(summary.entities, 2, "{}", file);

            let transform = restored.find_by_name("Player").unwrap().get_component::<Transform>().unwrap();
            assert_eq!(transform.position, Vec2::new(10.0, 20.0), "{}", file);
        }
    }

    #[test]
    fn test_save_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry();
        let serializer = SceneSerializer::new(&registry);
        let path = dir.path().join("level.yaml");

        let result = serializer.save(&path, &sample_scene());
        assert!(matches!(result, Err(SerializerError::UnsupportedFormat(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry();
        let serializer = SceneSerializer::new(&registry);
        let mut scene = sample_scene();

        let result = serializer.load(dir.path().join("absent.json"), &mut scene);
        assert!(matches!(result, Err(SerializerError::Io(_))));
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_entity_clipboard_round_trip() {
        let registry = registry();
        let serializer = SceneSerializer::new(&registry);
        let scene = sample_scene();
        let player = scene.find_by_name("Player").unwrap();

        let text = serializer.serialize_entity(player).unwrap();
        let copy = serializer.deserialize_entity(&text).unwrap();

        assert_ne!(copy.id(), player.id());
        assert_eq!(copy.name(), "Player");
        assert_eq!(copy.component_count(), 2);
        assert_eq!(
            copy.get_component::<SpriteRenderer>().unwrap().color,
            Color::new(0.2, 0.8, 0.3, 1.0)
        );
        assert!(serializer.deserialize_entity("[]").is_err());
    }
}
