//! Checks that the shipped demo scene loads and behaves as the demo expects

use quadrant::config::AppConfig;
use quadrant_core::{CollisionLayer, Rect, SceneTemplate, Vec2, World};

fn demo_world() -> World {
    let scene = SceneTemplate::load("scenes/demo.ron").unwrap();
    let mut world = World::with_spatial_hash(AppConfig::default().physics.spatial_hash()).unwrap();
    scene.instantiate(&mut world).unwrap();
    world
}

#[test]
fn test_demo_scene_instantiates() {
    let world = demo_world();

    assert_eq!(world.entity_count(), 5);
    for name in ["mover_a", "mover_b", "pillar", "wall", "sleeper"] {
        assert!(world.find_by_name(name).is_some(), "missing {name}");
    }

    let sleeper = world.find_by_name("sleeper").unwrap();
    assert!(!world.entity(sleeper).unwrap().is_enabled());
    // Every collider except the sleeper's is indexed
    assert_eq!(world.physics().len(), 6);
    assert_eq!(world.physics().index().len(), 5);
}

#[test]
fn test_mover_reaches_pillar() {
    let mut world = demo_world();
    let mover = world.find_by_name("mover_a").unwrap();
    let pillar = world.find_by_name("pillar").unwrap();
    let around = |world: &World| {
        let position = world.entity(mover).unwrap().position();
        world.overlapping(&Rect::from_center_size(position, Vec2::splat(40.0)), CollisionLayer::WORLD)
    };

    assert!(around(&world).is_empty());
    for _ in 0..4 {
        world.translate(mover, Vec2::new(40.0, 0.0)).unwrap();
    }
    assert_eq!(around(&world), vec![pillar]);
}
