//! Scene document format
//!
//! The persisted tree form of a scene:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "name": "Level 1",
//!   "entities": [
//!     {
//!       "name": "Player",
//!       "id": 1,
//!       "active": true,
//!       "components": [
//!         { "type": "Transform", "enabled": true, "position": [10.0, 20.0], "rotation": 0.0, "scale": [1.0, 1.0] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Component fields sit beside the reserved `type` and `enabled` keys; their
//! layout belongs to each component type.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ecs::FieldMap;
use crate::scene::serializer::SerializerError;

/// Document version written by this engine
pub const SCENE_DOCUMENT_VERSION: &str = "1.0";

/// Serialized scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Document version
    pub version: String,
    /// Scene name
    #[serde(default)]
    pub name: String,
    /// Entity records in scene order
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

impl SceneDocument {
    /// Empty document at the current version
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: SCENE_DOCUMENT_VERSION.to_string(),
            name: name.into(),
            entities: Vec::new(),
        }
    }
}

/// Serialized entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Display name
    #[serde(default = "default_entity_name")]
    pub name: String,
    /// Id at save time; only used to resolve `parent`
    #[serde(default)]
    pub id: u32,
    /// Active flag
    #[serde(default = "default_true")]
    pub active: bool,
    /// Save-time id of the parent entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u32>,
    /// Component records in attachment order
    #[serde(default)]
    pub components: Vec<ComponentRecord>,
}

/// Serialized component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Registry key
    #[serde(rename = "type")]
    pub type_name: String,
    /// Enabled flag
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Type-specific fields
    #[serde(flatten)]
    pub fields: FieldMap,
}

fn default_true() -> bool {
    true
}

fn default_entity_name() -> String {
    "Entity".to_string()
}

/// On-disk encoding of a scene document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneFormat {
    /// Pretty-printed JSON
    Json,
    /// Pretty-printed RON
    Ron,
}

impl SceneFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, SerializerError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("ron") => Ok(Self::Ron),
            _ => Err(SerializerError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// File extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Ron => "ron",
        }
    }

    /// Encode a document
    pub fn encode(self, document: &SceneDocument) -> Result<String, SerializerError> {
        match self {
            Self::Json => serde_json::to_string_pretty(document).map_err(|e| SerializerError::Encode(e.to_string())),
            Self::Ron => ron::ser::to_string_pretty(document, ron::ser::PrettyConfig::default())
                .map_err(|e| SerializerError::Encode(e.to_string())),
        }
    }

    /// Decode a document
    pub fn decode(self, text: &str) -> Result<SceneDocument, SerializerError> {
        match self {
            Self::Json => serde_json::from_str(text).map_err(|e| SerializerError::Parse(e.to_string())),
            Self::Ron => ron::from_str(text).map_err(|e| SerializerError::Parse(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_fields_are_flattened() {
        let mut fields = FieldMap::new();
        fields.insert("rotation".into(), serde_json::json!(45.0));
        let record = ComponentRecord {
            type_name: "Transform".into(),
            enabled: true,
            fields,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "Transform");
        assert_eq!(value["rotation"], 45.0);

        let back: ComponentRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let text = r#"{ "version": "1.0", "entities": [ { "components": [ { "type": "Transform" } ] } ] }"#;
        let document = SceneFormat::Json.decode(text).unwrap();

        let entity = &document.entities[0];
        assert_eq!(entity.name, "Entity");
        assert!(entity.active);
        assert!(entity.parent.is_none());
        assert!(entity.components[0].enabled);
        assert!(entity.components[0].fields.is_empty());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SceneFormat::from_path(Path::new("level.json")).unwrap(), SceneFormat::Json);
        assert_eq!(SceneFormat::from_path(Path::new("level.ron")).unwrap(), SceneFormat::Ron);
        assert!(matches!(
            SceneFormat::from_path(Path::new("level.xml")),
            Err(SerializerError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            SceneFormat::Json.decode("{ not json"),
            Err(SerializerError::Parse(_))
        ));
    }
}
