//! Sandbox application
//!
//! Runs a small scene headless for a fixed number of frames: builds the scene
//! (or loads the one saved by the previous run), hot reloads the behavior
//! modules halfway through, and saves the scene on exit.
//!
//! Usage: `sandbox [config.toml] [scene.json]`

use std::path::PathBuf;

use molga_engine::foundation::logging;
use molga_engine::prelude::*;

const FRAME_LIMIT: u32 = 240;
const RELOAD_FRAME: u32 = FRAME_LIMIT / 2;

struct SandboxApp {
    scene_path: PathBuf,
    frames: u32,
    sprites_drawn: usize,
}

impl SandboxApp {
    fn new(scene_path: PathBuf) -> Self {
        Self {
            scene_path,
            frames: 0,
            sprites_drawn: 0,
        }
    }

    fn build_scene(engine: &mut Engine) -> Result<(), AppError> {
        let scene = engine.scene_mut();

        let player = scene.create_entity("Player");
        player.add_component(Transform::from_position(Vec2::new(0.0, 0.0)));
        player.add_component(SpriteRenderer::new(Vec2::new(32.0, 32.0), Color::rgb(0.2, 0.6, 1.0)).with_sorting_order(1));
        player.add_component(BoxCollider2D::default());
        let player = player.id();

        let orbiter = scene.create_entity("Orbiter");
        orbiter.add_component(Transform::from_position(Vec2::new(48.0, 0.0)));
        orbiter.add_component(SpriteRenderer::new(Vec2::new(8.0, 8.0), Color::WHITE));
        let orbiter = orbiter.id();
        scene.set_parent(orbiter, Some(player)).map_err(EngineError::from)?;

        let coin = scene.create_entity("Coin");
        coin.add_component(Transform::from_position(Vec2::new(40.0, 8.0)));
        coin.add_component(BoxCollider2D::new(Vec2::new(8.0, 8.0)).as_trigger());
        coin.add_component(SpriteRenderer::new(Vec2::new(8.0, 8.0), Color::rgb(1.0, 0.85, 0.1)).with_texture("textures/coin.png"));
        let coin = coin.id();

        engine.add_component_by_type_name(player, "Rotator")?;
        engine.add_component_by_type_name(coin, "Oscillator")?;

        // Module types are optional; the sandbox still runs without them.
        for (entity, type_name) in [(player, "Collector"), (orbiter, "Spinner"), (coin, "Pulse")] {
            if let Err(e) = engine.add_component_by_type_name(entity, type_name) {
                log::warn!("Skipping {}: {}", type_name, e);
            }
        }
        Ok(())
    }
}

impl Application for SandboxApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        if self.scene_path.exists() {
            let summary = engine.load_scene(&self.scene_path)?;
            log::info!(
                "Resumed scene from {} ({} entities, {} skipped components)",
                self.scene_path.display(),
                summary.entities,
                summary.skipped
            );
        } else {
            Self::build_scene(engine)?;
            log::info!("Built demo scene with {} entities", engine.scene().len());
        }
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        self.frames += 1;

        if self.frames == RELOAD_FRAME && engine.config().modules.hot_reload {
            match engine.hot_reload() {
                Ok(summary) => log::info!("Hot reload restored {} entities", summary.entities),
                Err(e) => log::error!("Hot reload failed: {}", e),
            }
        }

        if self.frames >= FRAME_LIMIT {
            engine.stop();
        }
        Ok(())
    }

    fn render(&mut self, _engine: &Engine, sprites: &[SpriteCommand]) -> Result<(), AppError> {
        self.sprites_drawn += sprites.len();
        if self.frames % 60 == 0 {
            for sprite in sprites {
                log::debug!(
                    "{} at ({:.1}, {:.1}) rot {:.1} order {}",
                    sprite.entity,
                    sprite.position.x,
                    sprite.position.y,
                    sprite.rotation,
                    sprite.sorting_order
                );
            }
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        log::info!("Ran {} frames, {} sprites submitted", self.frames, self.sprites_drawn);
        match engine.save_scene(&self.scene_path) {
            Ok(path) => log::info!("Saved scene to {}", path.display()),
            Err(e) => log::error!("Failed to save scene: {}", e),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "sandbox_app/sandbox.toml".to_string());
    let scene_path = args.next().unwrap_or_else(|| "sandbox_scene.json".to_string());

    let config = EngineConfig::load_or_default(&config_path)?;
    logging::init_with_level(&config.logging.level);
    log::info!("Sandbox starting with config {}", config_path);

    let mut app = SandboxApp::new(PathBuf::from(scene_path));
    Engine::run(config, &mut app)?;
    Ok(())
}
