//! Quadrant - collider lifecycle demo
//!
//! Loads a scene, walks its movers across the world and logs what the
//! broad phase sees after every step.

use std::error::Error;

use quadrant::config::AppConfig;
use quadrant_core::{
    CollisionLayer, ColliderTemplate, DebugDrawList, EntityKey, EntityTemplate, SceneTemplate, Vec2, World,
    vertex_bytes,
};

/// Scene used when the configured scene file can't be loaded
fn fallback_scene() -> SceneTemplate {
    let mut scene = SceneTemplate::new("fallback");
    scene.add_entity(
        EntityTemplate::new(Vec2::new(0.0, 0.0))
            .with_name("mover")
            .with_collider(ColliderTemplate::circle(8.0)),
    );
    scene.add_entity(
        EntityTemplate::new(Vec2::new(160.0, 0.0))
            .with_name("wall")
            .with_collider(ColliderTemplate::rect(20.0, 200.0)),
    );
    scene
}

/// Other entities whose colliders overlap any collider of `entity`
fn contacts(world: &World, entity: EntityKey) -> usize {
    let mut others: Vec<EntityKey> = Vec::new();
    for (_, collider) in world.colliders_of(entity) {
        for hit in world.overlapping(&collider.bounds(), CollisionLayer::ALL) {
            if hit != entity && !others.contains(&hit) {
                others.push(hit);
            }
        }
    }
    others.len()
}

fn log_contacts(world: &World, step: u32) {
    for (key, entity) in world.iter().filter(|(_, e)| e.is_active()) {
        let count = contacts(world, key);
        if count > 0 {
            log::info!(
                "step {}: '{}' touches {} other entit{}",
                step,
                entity.name.as_deref().unwrap_or("unnamed"),
                count,
                if count == 1 { "y" } else { "ies" }
            );
        }
    }
}

fn run(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let scene = SceneTemplate::load(&config.demo.scene).unwrap_or_else(|e| {
        log::warn!("Failed to load scene {:?}: {}. Using fallback scene.", config.demo.scene, e);
        fallback_scene()
    });

    let mut world = World::with_spatial_hash(config.physics.spatial_hash())?;
    scene.instantiate(&mut world)?;

    let movers: Vec<EntityKey> = world
        .iter()
        .filter(|(_, e)| e.name.as_deref().is_some_and(|n| n.starts_with("mover")))
        .map(|(key, _)| key)
        .collect();
    log::info!("{} mover(s) among {} entities", movers.len(), world.entity_count());

    let mut draw_list = DebugDrawList::new();
    let step_delta = Vec2::new(config.demo.step_distance, 0.0);
    for step in 1..=config.demo.steps {
        for &mover in &movers {
            world.translate(mover, step_delta)?;
        }

        // Halfway through, take the movers out of the broad phase for one step
        let parked = step == config.demo.steps / 2;
        if parked {
            for &mover in &movers {
                world.set_enabled(mover, false)?;
            }
            log::info!("step {}: movers disabled, {} collider(s) indexed", step, world.physics().index().len());
        }

        log_contacts(&world, step);

        if config.debug.render_colliders {
            draw_list.clear();
            world.debug_render(&mut draw_list);
            let vertices = draw_list.line_vertices();
            log::debug!(
                "step {}: {} debug shapes, {} vertices ({} bytes)",
                step,
                draw_list.len(),
                vertices.len(),
                vertex_bytes(&vertices).len()
            );
        }

        if parked {
            for &mover in &movers {
                world.set_enabled(mover, true)?;
            }
        }
    }

    log::info!("Finished {} steps with {} collider(s) indexed", config.demo.steps, world.physics().index().len());
    Ok(())
}

fn main() {
    let config = AppConfig::load();

    // Initialize logging, level from config unless RUST_LOG is set
    let level = config
        .as_ref()
        .map(|c| c.debug.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::info!("Starting Quadrant");

    let config = config.unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    if let Err(e) = run(&config) {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}
