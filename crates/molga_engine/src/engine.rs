//! Core engine implementation

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{
    application::Application,
    config::ConfigError,
    core::config::EngineConfig,
    ecs::{register_builtin_components, ComponentMut, ComponentRegistry, EntityError, EntityId},
    foundation::time::{FixedTimestep, Stopwatch, Timer},
    physics::OverlapTracker,
    scene::{LoadSummary, RenderQueue, Scene, SceneError, SceneSerializer, SerializerError},
    scripting::{register_builtin_scripts, ModuleBackend, ModuleError, ModuleLoader},
};

/// Main engine struct
///
/// The engine owns the scene, the component registry and the module loader,
/// and drives the frame loop.
pub struct Engine {
    // Field order is drop order: components built from module code must go
    // before the registry's factories, and both before the libraries.
    scene: Scene,
    registry: ComponentRegistry,
    loader: ModuleLoader,

    /// Overlap state between ticks
    overlaps: OverlapTracker,

    /// Fixed-step accumulator
    fixed_step: FixedTimestep,

    /// Frame timing
    timer: Timer,

    /// Engine configuration
    config: EngineConfig,

    /// Whether the engine should continue running
    running: bool,
}

impl Engine {
    /// Create a new engine instance
    ///
    /// Built-in components and scripts are registered, then every module in
    /// the autoload list is loaded. Modules that fail to load are logged and
    /// skipped.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_loader(config, ModuleLoader::new())
    }

    /// Create an engine loading modules through `backend`
    pub fn with_backend(config: EngineConfig, backend: impl ModuleBackend + 'static) -> Self {
        Self::with_loader(config, ModuleLoader::with_backend(backend))
    }

    fn with_loader(config: EngineConfig, loader: ModuleLoader) -> Self {
        log::info!("Initializing engine...");

        let mut registry = ComponentRegistry::new();
        register_builtin_components(&mut registry);
        register_builtin_scripts(&mut registry);

        let mut engine = Self {
            scene: Scene::new(config.scene.default_name.clone()),
            registry,
            loader,
            overlaps: OverlapTracker::new(),
            fixed_step: FixedTimestep::new(config.time.fixed_timestep, config.time.max_fixed_steps),
            timer: Timer::new(),
            config,
            running: true,
        };

        for path in engine.config.modules.autoload.clone() {
            if let Err(e) = engine.loader.load_module(&path, &mut engine.registry) {
                log::error!("Failed to autoload module {}: {}", path.display(), e);
            }
        }

        log::info!(
            "Engine ready ({} component types, {} module(s))",
            engine.registry.len(),
            engine.loader.len()
        );
        engine
    }

    /// Run the engine main loop with the given application
    ///
    /// Frames run until [`Engine::stop`] is called.
    pub fn run<T: Application>(config: EngineConfig, app: &mut T) -> Result<(), EngineError> {
        let mut engine = Self::new(config);

        app.initialize(&mut engine)
            .map_err(|e| EngineError::Application(format!("App initialization: {}", e)))?;

        log::info!("Starting main loop...");

        let mut queue = RenderQueue::new();
        while engine.running {
            engine.timer.update();
            let delta_time = engine.timer.delta_time();

            app.update(&mut engine, delta_time)
                .map_err(|e| EngineError::Application(format!("App update: {}", e)))?;

            engine.tick(delta_time);

            engine.render(&mut queue);
            app.render(&engine, queue.sorted_commands())
                .map_err(|e| EngineError::Application(format!("App render: {}", e)))?;
            queue.clear();
        }

        app.cleanup(&mut engine);
        engine.shutdown();

        log::info!("Engine shutdown complete ({} frames)", engine.timer.frame_count());
        Ok(())
    }

    /// Clear the scene and unload every behavior module
    ///
    /// Modules still referenced from outside the scene stay loaded and are
    /// reported.
    pub fn shutdown(&mut self) {
        self.scene.clear();
        self.overlaps.clear();
        if let Err(e) = self.loader.shutdown(&mut self.registry) {
            log::error!("Module shutdown incomplete: {}", e);
        }
    }

    /// Advance the scene by one frame
    ///
    /// Runs update, then every due fixed step, then late update, then
    /// overlap detection. Returns the number of fixed steps run.
    pub fn tick(&mut self, delta_time: f32) -> u32 {
        self.scene.update(delta_time);

        let steps = self.fixed_step.drain(delta_time);
        let fixed_delta = self.fixed_step.step();
        for _ in 0..steps {
            self.scene.fixed_update(fixed_delta);
        }

        self.scene.late_update(delta_time);
        self.overlaps.step(&mut self.scene);
        steps
    }

    /// Collect this frame's sprites
    pub fn render(&self, queue: &mut RenderQueue) {
        self.scene.render(queue);
    }

    /// Attach a component to an entity by registered type name
    pub fn add_component_by_type_name(
        &mut self,
        entity: EntityId,
        type_name: &str,
    ) -> Result<ComponentMut<'_>, EngineError> {
        let entity = self.scene.get_mut(entity).ok_or(SceneError::EntityNotFound(entity))?;
        Ok(entity.add_component_by_type_name(&self.registry, type_name)?)
    }

    /// Save the scene
    ///
    /// A path without an extension gets the configured format's extension.
    /// Returns the path written.
    pub fn save_scene(&self, path: impl AsRef<Path>) -> Result<PathBuf, EngineError> {
        let path = path.as_ref();
        let path = if path.extension().is_some() {
            path.to_path_buf()
        } else {
            path.with_extension(self.config.scene.format.extension())
        };

        SceneSerializer::new(&self.registry).save(&path, &self.scene)?;
        Ok(path)
    }

    /// Replace the scene with the document at `path`
    pub fn load_scene(&mut self, path: impl AsRef<Path>) -> Result<LoadSummary, EngineError> {
        let summary = SceneSerializer::new(&self.registry).load(path, &mut self.scene)?;
        self.overlaps.clear();
        Ok(summary)
    }

    /// Load a behavior module
    pub fn load_module(&mut self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        self.loader.load_module(path, &mut self.registry)?;
        Ok(())
    }

    /// Unload a behavior module
    ///
    /// Refused while the scene (or anything else) still holds components the
    /// module built.
    pub fn unload_module(&mut self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let path = path.as_ref();
        if let Err(e) = self.loader.unload_module(path, &mut self.registry) {
            log::warn!("Refusing to unload {}: {}", path.display(), e);
            return Err(e.into());
        }
        Ok(())
    }

    /// Detach every scene component the module built, then unload it
    ///
    /// Returns the number of components detached.
    pub fn force_unload_module(&mut self, path: impl AsRef<Path>) -> Result<usize, EngineError> {
        let path = path.as_ref();
        let Some(key) = self.loader.module_key(path) else {
            return Ok(0);
        };

        let released = self.scene.release_module(key);
        self.overlaps.clear();
        self.unload_module(path)?;
        Ok(released)
    }

    /// Reload every module, preserving the scene
    ///
    /// The scene is snapshotted, cleared, and restored after the reload, so
    /// components pick up the reloaded factories. Entity ids change. The
    /// scene is restored even if a module fails to reload; the first failure
    /// is returned afterwards.
    pub fn hot_reload(&mut self) -> Result<LoadSummary, EngineError> {
        if !self.config.modules.hot_reload {
            return Err(EngineError::HotReloadDisabled);
        }

        let stopwatch = Stopwatch::start_new();
        let snapshot = SceneSerializer::new(&self.registry).to_document(&self.scene);
        self.scene.clear();
        self.overlaps.clear();

        let reloaded = self.loader.reload_all(&mut self.registry);
        let summary = SceneSerializer::new(&self.registry).from_document(&snapshot, &mut self.scene);

        log::info!(
            "Hot reload finished in {:.1} ms ({} entities, {} skipped components)",
            stopwatch.elapsed_millis(),
            summary.entities,
            summary.skipped
        );
        reloaded?;
        Ok(summary)
    }

    /// Request engine shutdown
    pub fn stop(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the main loop keeps going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Get the scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Get the scene mutably
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Get the component registry
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Get the component registry mutably
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// Get the module loader
    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    /// Get the overlap tracker
    pub fn overlaps(&self) -> &OverlapTracker {
        &self.overlaps
    }

    /// Get engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get frame timing
    pub fn timer(&self) -> &Timer {
        &self.timer
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Scene hierarchy error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Component could not be created
    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),

    /// Behavior module error
    #[error("Module error: {0}")]
    Module(#[from] ModuleError),

    /// Scene persistence error
    #[error("Serializer error: {0}")]
    Serializer(#[from] SerializerError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Hot reload is switched off in the configuration
    #[error("Hot reload is disabled")]
    HotReloadDisabled,

    /// Application error
    #[error("Application error: {0}")]
    Application(String),
}
