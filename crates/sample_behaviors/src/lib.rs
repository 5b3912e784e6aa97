//! Sample behavior module
//!
//! Built as a dynamic library and loaded by the engine at runtime. Provides
//! three scripts: [`Spinner`], [`Pulse`] and [`Collector`].

mod collector;
mod pulse;
mod spinner;

use molga_engine::scripting::ModuleRegistrar;

pub use collector::Collector;
pub use pulse::Pulse;
pub use spinner::Spinner;

fn register(registrar: &mut ModuleRegistrar<'_>) {
    registrar.register_default::<Spinner>();
    registrar.register_default::<Pulse>();
    registrar.register_default::<Collector>();
}

molga_engine::declare_module!(register);

#[cfg(test)]
mod tests {
    use super::*;
    use molga_engine::ecs::{BoxCollider2D, ComponentRegistry, Entity, Transform};
    use molga_engine::foundation::math::Vec2;
    use molga_engine::physics::OverlapTracker;
    use molga_engine::scene::Scene;
    use molga_engine::scripting::{ModuleLoader, StaticModuleBackend};

    fn loaded() -> (ModuleLoader, ComponentRegistry) {
        let backend = StaticModuleBackend::new().with_module("sample_behaviors", molga_module_declaration);
        let mut loader = ModuleLoader::with_backend(backend);
        let mut registry = ComponentRegistry::new();
        loader.load_module("sample_behaviors", &mut registry).unwrap();
        (loader, registry)
    }

    #[test]
    fn test_declaration_registers_all_scripts() {
        let (loader, registry) = loaded();
        assert_eq!(
            loader.module_types("sample_behaviors").unwrap(),
            ["Spinner".to_string(), "Pulse".to_string(), "Collector".to_string()]
        );
        for name in ["Spinner", "Pulse", "Collector"] {
            assert_eq!(registry.origin_of(name).unwrap().path().to_str(), Some("sample_behaviors"));
        }
    }

    #[test]
    fn test_collector_counts_trigger_entries() {
        let (_loader, registry) = loaded();
        let mut scene = Scene::new("pickup");

        let player = scene.create_entity("Player");
        player.add_component(Transform::default());
        player.add_component(BoxCollider2D::default());
        player.add_component_by_type_name(&registry, "Collector").unwrap();
        let player = player.id();

        let coin = scene.create_entity("Coin");
        coin.add_component(Transform::from_position(Vec2::new(8.0, 8.0)));
        coin.add_component(BoxCollider2D::new(Vec2::new(4.0, 4.0)).as_trigger());

        let mut tracker = OverlapTracker::new();
        tracker.step(&mut scene);
        tracker.step(&mut scene);

        let collector = scene.get(player).unwrap().get_component::<Collector>().unwrap();
        assert_eq!(collector.collected, 1);
    }

    #[test]
    fn test_instances_keep_module_alive() {
        let (mut loader, mut registry) = loaded();
        let mut entity = Entity::new("Top");
        entity.add_component_by_type_name(&registry, "Spinner").unwrap();

        assert!(loader.unload_module("sample_behaviors", &mut registry).is_err());
        drop(entity);
        loader.unload_module("sample_behaviors", &mut registry).unwrap();
        assert!(registry.is_empty());
    }
}
