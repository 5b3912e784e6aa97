//! Scene save/load workflows

#[cfg(test)]
mod tests {
    use crate::core::config::EngineConfig;
    use crate::ecs::{ComponentRegistry, SpriteRenderer, Transform};
    use crate::foundation::math::{Color, Vec2};
    use crate::scene::{Scene, SceneFormat, SceneSerializer};
    use crate::scripting::{Oscillator, Rotator};
    use crate::tests::{motion_backend, Spinner, MOTION_MODULE};
    use crate::Engine;
    use approx::assert_relative_eq;

    #[test]
    fn test_player_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player.json");

        let mut engine = Engine::new(EngineConfig::default());
        let player = engine.scene_mut().create_entity("Player");
        player.add_component(Transform::from_position(Vec2::new(10.0, 20.0)).with_rotation(45.0));
        player.add_component(SpriteRenderer::new(Vec2::new(64.0, 32.0), Color::new(1.0, 0.0, 0.0, 1.0)).with_sorting_order(3));
        player.add_component(Rotator::new(30.0));
        engine.save_scene(&path).unwrap();

        let mut restored = Engine::new(EngineConfig::default());
        let summary = restored.load_scene(&path).unwrap();
        assert_eq!(summary.entities, 1);
        assert_eq!(summary.components, 3);

        let player = restored.scene().find_by_name("Player").unwrap();
        let transform = player.get_component::<Transform>().unwrap();
        assert_eq!(transform.position, Vec2::new(10.0, 20.0));
        assert_relative_eq!(transform.rotation, 45.0);

        let sprite = player.get_component::<SpriteRenderer>().unwrap();
        assert_eq!(sprite.size, Vec2::new(64.0, 32.0));
        assert_eq!(sprite.sorting_order, 3);
        assert_eq!(player.get_component::<Rotator>().unwrap().rotation_speed, 30.0);
    }

    #[test]
    fn test_document_keys_follow_component_fields() {
        let registry = ComponentRegistry::new();
        let mut scene = Scene::new("Keys");
        let entity = scene.create_entity("Lamp");
        entity.add_component(SpriteRenderer::default().with_texture("textures/lamp.png"));

        let text = SceneSerializer::new(&registry).to_string(&scene, SceneFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let component = &value["entities"][0]["components"][0];

        assert_eq!(component["type"], "SpriteRenderer");
        assert_eq!(component["enabled"], true);
        assert_eq!(component["texturePath"], "textures/lamp.png");
        assert_eq!(component["flipX"], false);
    }

    #[test]
    fn test_hierarchy_and_world_transform_survive_ron() {
        let mut engine = Engine::new(EngineConfig::default());
        let scene = engine.scene_mut();
        let ship = scene.create_entity("Ship");
        ship.add_component(Transform::from_position(Vec2::new(100.0, 0.0)).with_scale(Vec2::new(2.0, 2.0)));
        let ship = ship.id();
        let turret = scene.create_entity("Turret");
        turret.add_component(Transform::from_position(Vec2::new(5.0, 0.0)));
        let turret = turret.id();
        scene.set_parent(turret, Some(ship)).unwrap();

        let text = SceneSerializer::new(engine.registry())
            .to_string(engine.scene(), SceneFormat::Ron)
            .unwrap();

        let mut restored = Scene::default();
        SceneSerializer::new(engine.registry())
            .from_str(&text, SceneFormat::Ron, &mut restored)
            .unwrap();

        let turret = restored.find_by_name("Turret").unwrap();
        let ship = restored.find_by_name("Ship").unwrap();
        assert_eq!(turret.parent(), Some(ship.id()));

        let world = restored.world_transform(turret.id()).unwrap();
        assert_relative_eq!(world.position.x, 110.0, epsilon = 1e-4);
        assert_relative_eq!(world.scale.x, 2.0);
    }

    #[test]
    fn test_unknown_module_type_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modded.json");

        let mut modded = Engine::with_backend(EngineConfig::default().with_module(MOTION_MODULE), motion_backend());
        let id = modded.scene_mut().create_entity("Fan").id();
        modded.add_component_by_type_name(id, "Transform").unwrap();
        modded.add_component_by_type_name(id, "Spinner").unwrap();
        modded.add_component_by_type_name(id, "Oscillator").unwrap();
        modded.save_scene(&path).unwrap();

        let mut vanilla = Engine::new(EngineConfig::default());
        let summary = vanilla.load_scene(&path).unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.components, 2);

        let fan = vanilla.scene().find_by_name("Fan").unwrap();
        assert!(fan.get_component::<Spinner>().is_none());
        assert!(fan.has_component::<Oscillator>());
        let names: Vec<&str> = fan.components().iter().map(|c| c.type_name()).collect();
        assert_eq!(names, vec!["Transform", "Oscillator"]);
    }
}
