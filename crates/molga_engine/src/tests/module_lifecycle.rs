//! Behavior module load, unload and hot reload workflows

#[cfg(test)]
mod tests {
    use crate::core::config::EngineConfig;
    use crate::ecs::{ComponentRegistry, Entity, EntityId, Transform};
    use crate::scripting::{ModuleError, Oscillator, Rotator};
    use crate::tests::{motion_backend, Spinner, MOTION_MODULE};
    use crate::{Engine, EngineError};

    fn modded_engine() -> Engine {
        let config = EngineConfig::default().with_module(MOTION_MODULE).with_hot_reload(true);
        Engine::with_backend(config, motion_backend())
    }

    fn spawn_fan(engine: &mut Engine) -> EntityId {
        let id = engine.scene_mut().create_entity("Fan").id();
        engine.add_component_by_type_name(id, "Transform").unwrap();
        engine.add_component_by_type_name(id, "Spinner").unwrap();
        id
    }

    #[test]
    fn test_replaced_factory_leaves_existing_instances_alone() {
        let mut registry = ComponentRegistry::new();
        registry.register("A", || Box::new(Rotator::new(1.0)));
        let mut first = Entity::new("First");
        first.add_component_by_type_name(&registry, "A").unwrap();

        registry.register("A", || Box::new(Oscillator::default()));
        let mut second = Entity::new("Second");
        second.add_component_by_type_name(&registry, "A").unwrap();

        assert_eq!(registry.len(), 1);
        assert!(first.components()[0].downcast_ref::<Rotator>().is_some());
        assert!(second.components()[0].downcast_ref::<Oscillator>().is_some());
    }

    #[test]
    fn test_autoloaded_module_types_are_usable() {
        let mut engine = modded_engine();
        assert!(engine.loader().is_loaded(MOTION_MODULE));
        assert_eq!(engine.loader().module_types(MOTION_MODULE).unwrap(), ["Spinner".to_string()]);

        let id = spawn_fan(&mut engine);
        engine.tick(0.5);

        let fan = engine.scene().get(id).unwrap();
        assert_eq!(fan.get_component::<Spinner>().unwrap().started, 1);
        assert_eq!(fan.get_component::<Transform>().unwrap().rotation, 90.0);
    }

    #[test]
    fn test_unload_refused_while_scene_uses_module() {
        let mut engine = modded_engine();
        spawn_fan(&mut engine);
        assert_eq!(engine.loader().live_instances(MOTION_MODULE), Some(1));

        assert!(matches!(
            engine.unload_module(MOTION_MODULE),
            Err(EngineError::Module(ModuleError::InUse { live_instances: 1, .. }))
        ));
        assert!(engine.loader().is_loaded(MOTION_MODULE));
        assert!(engine.registry().contains("Spinner"));
    }

    #[test]
    fn test_force_unload_detaches_module_components() {
        let mut engine = modded_engine();
        let id = spawn_fan(&mut engine);

        assert_eq!(engine.force_unload_module(MOTION_MODULE).unwrap(), 1);
        assert!(!engine.loader().is_loaded(MOTION_MODULE));
        assert!(!engine.registry().contains("Spinner"));

        let fan = engine.scene().get(id).unwrap();
        assert!(fan.has_component::<Transform>());
        assert!(!fan.has_component::<Spinner>());
        assert_eq!(engine.force_unload_module(MOTION_MODULE).unwrap(), 0);
    }

    #[test]
    fn test_hot_reload_preserves_scene_state() {
        let mut engine = modded_engine();
        let id = spawn_fan(&mut engine);
        engine.scene_mut().get_mut(id).unwrap().get_component_mut::<Spinner>().unwrap().speed = 45.0;
        engine.tick(0.1);
        let key_before = engine.loader().module_key(MOTION_MODULE).unwrap();

        let summary = engine.hot_reload().unwrap();
        assert_eq!(summary.entities, 1);
        assert_eq!(summary.skipped, 0);

        let fan = engine.scene().find_by_name("Fan").unwrap();
        let spinner = fan.get_component_by_type_name("Spinner").unwrap();
        assert!(!spinner.is_started());
        assert_eq!(spinner.downcast_ref::<Spinner>().unwrap().speed, 45.0);
        assert_eq!(spinner.component().type_name(), "Spinner");

        let key_after = engine.loader().module_key(MOTION_MODULE).unwrap();
        assert_ne!(key_before, key_after);
        assert_eq!(spinner.provenance().unwrap().module(), key_after);
        assert_eq!(engine.loader().live_instances(MOTION_MODULE), Some(1));
    }

    #[test]
    fn test_hot_reload_refused_while_instances_held_outside_scene() {
        let mut engine = modded_engine();
        spawn_fan(&mut engine);
        let held = engine.registry().create("Spinner").unwrap();

        assert!(matches!(
            engine.hot_reload(),
            Err(EngineError::Module(ModuleError::InUse { .. }))
        ));
        assert!(engine.scene().find_by_name("Fan").unwrap().has_component::<Spinner>());
        drop(held);
    }

    #[test]
    fn test_shutdown_unloads_modules_after_clearing_scene() {
        let mut engine = modded_engine();
        spawn_fan(&mut engine);

        engine.shutdown();
        assert!(engine.scene().is_empty());
        assert!(engine.loader().is_empty());
        assert!(!engine.registry().contains("Spinner"));
        assert!(engine.registry().contains("Rotator"));
    }

    #[test]
    fn test_shutdown_keeps_module_held_outside_scene() {
        let mut engine = modded_engine();
        let held = engine.registry().create("Spinner").unwrap();

        engine.shutdown();
        assert!(engine.loader().is_loaded(MOTION_MODULE));
        assert_eq!(held.downcast_ref::<Spinner>().unwrap().speed, 180.0);
    }
}
