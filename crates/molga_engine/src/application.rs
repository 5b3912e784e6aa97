//! Application trait and lifecycle management

use crate::config::ConfigError;
use crate::engine::{Engine, EngineError};
use crate::scene::SpriteCommand;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to drive the engine from a host program.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once after the engine is initialized. Use this to build or load
    /// the initial scene and load behavior modules.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called every frame, before the engine ticks the scene.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Draw the frame
    ///
    /// Receives the frame's sprites in draw order. The default draws nothing.
    fn render(&mut self, _engine: &Engine, _sprites: &[SpriteCommand]) -> Result<(), AppError> {
        Ok(())
    }

    /// Cleanup the application
    ///
    /// Called when the main loop ends. Use this to save state.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;

    /// Stops after a fixed number of frames
    struct FrameCounter {
        frames: u32,
        limit: u32,
        cleaned_up: bool,
    }

    impl Application for FrameCounter {
        fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
            engine.scene_mut().create_entity("Counter");
            Ok(())
        }

        fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
            self.frames += 1;
            if self.frames >= self.limit {
                engine.stop();
            }
            Ok(())
        }

        fn cleanup(&mut self, engine: &mut Engine) {
            self.cleaned_up = engine.scene().find_by_name("Counter").is_some();
        }
    }

    struct FailingApp;

    impl Application for FailingApp {
        fn initialize(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
            Err(AppError::Custom("no scene".into()))
        }

        fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
            Ok(())
        }

        fn cleanup(&mut self, _engine: &mut Engine) {}
    }

    #[test]
    fn test_run_until_stopped() {
        let mut app = FrameCounter { frames: 0, limit: 3, cleaned_up: false };
        Engine::run(EngineConfig::default(), &mut app).unwrap();

        assert_eq!(app.frames, 3);
        assert!(app.cleaned_up);
    }

    #[test]
    fn test_initialize_error_aborts_run() {
        let result = Engine::run(EngineConfig::default(), &mut FailingApp);
        assert!(matches!(result, Err(EngineError::Application(message)) if message.contains("no scene")));
    }
}
