//! # Core Engine Module
//!
//! Shared configuration types used by the engine and its host applications.

pub mod config;

pub use config::{
    Config,
    ConfigError,
    EngineConfig,
    LoggingConfig,
    ModuleConfig,
    SceneConfig,
    TimeConfig,
};
