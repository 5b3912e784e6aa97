//! # Unified Configuration System
//!
//! All engine configuration lives here. Each section can be omitted from a
//! config file; missing sections and fields take their defaults.
//!
//! ## Configuration Categories
//!
//! - **Scene Config**: default scene name and document format
//! - **Module Config**: behavior modules loaded at startup, hot reload switch
//! - **Time Config**: fixed-step length and catch-up cap
//! - **Logging Config**: fallback log level when `RUST_LOG` is not set

use serde::{Serialize, Deserialize};
use std::path::PathBuf;

use crate::scene::SceneFormat;

pub use crate::config::{Config, ConfigError};

/// # Scene Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Name given to freshly created scenes
    pub default_name: String,
    /// Preferred document format when saving without an explicit extension
    pub format: SceneFormat,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            default_name: "Untitled Scene".to_string(),
            format: SceneFormat::Json,
        }
    }
}

/// # Behavior Module Configuration
///
/// Modules listed in `autoload` are loaded, in order, when the engine starts.
/// A module that fails to load is logged and skipped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Module paths to load at startup
    pub autoload: Vec<PathBuf>,
    /// Whether the host is allowed to hot reload modules at runtime
    pub hot_reload: bool,
}

/// # Time Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Fixed-step length in seconds
    pub fixed_timestep: f32,
    /// Maximum fixed steps run in a single frame
    pub max_fixed_steps: u32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_fixed_steps: 5,
        }
    }
}

/// # Logging Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback filter, in `env_logger` syntax
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// # Engine Configuration
///
/// Top-level configuration handed to [`crate::Engine::new`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scene defaults
    pub scene: SceneConfig,
    /// Behavior modules
    pub modules: ModuleConfig,
    /// Frame pacing
    pub time: TimeConfig,
    /// Logging
    pub logging: LoggingConfig,
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Add a module to the autoload list
    pub fn with_module(mut self, path: impl Into<PathBuf>) -> Self {
        self.modules.autoload.push(path.into());
        self
    }

    /// Allow or forbid hot reloading behavior modules
    pub fn with_hot_reload(mut self, enabled: bool) -> Self {
        self.modules.hot_reload = enabled;
        self
    }

    /// Set the fixed-step length in seconds
    pub fn with_fixed_timestep(mut self, seconds: f32) -> Self {
        self.time.fixed_timestep = seconds;
        self
    }

    /// Set the fallback log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");

        let config = EngineConfig::default()
            .with_module("scripts/libgame_scripts.so")
            .with_fixed_timestep(0.02)
            .with_log_level("debug");
        config.save_to_file(&path).unwrap();

        let loaded = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ron_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.ron");

        let mut config = EngineConfig::default();
        config.scene.format = SceneFormat::Ron;
        config.modules.hot_reload = true;
        config.save_to_file(&path).unwrap();

        let loaded = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "[time]\nmax_fixed_steps = 2\n").unwrap();

        let loaded = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.time.max_fixed_steps, 2);
        assert_eq!(loaded.scene, SceneConfig::default());
        assert!(loaded.modules.autoload.is_empty());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.yaml");
        std::fs::write(&path, "").unwrap();

        let result = EngineConfig::load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = EngineConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, EngineConfig::default());
    }
}
