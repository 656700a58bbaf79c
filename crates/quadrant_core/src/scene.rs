//! Scene serialization
//!
//! Provides SceneTemplate for loading/saving entity layouts from RON files
//! and instantiating them into a [`World`].

use std::fs;
use std::io;
use std::path::Path;

use quadrant_math::Vec2;
use quadrant_physics::CollisionLayer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::EntityKey;
use crate::shapes::{BoxCollider, CircleCollider};
use crate::world::{World, WorldError};

fn default_enabled() -> bool {
    true
}

/// A serializable collider description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderTemplate {
    Box {
        width: f32,
        height: f32,
        #[serde(default)]
        offset: Vec2,
        #[serde(default)]
        layer: CollisionLayer,
        #[serde(default)]
        trigger: bool,
    },
    Circle {
        radius: f32,
        #[serde(default)]
        offset: Vec2,
        #[serde(default)]
        layer: CollisionLayer,
        #[serde(default)]
        trigger: bool,
    },
}

impl ColliderTemplate {
    /// Solid box on the default layer
    pub fn rect(width: f32, height: f32) -> Self {
        ColliderTemplate::Box {
            width,
            height,
            offset: Vec2::ZERO,
            layer: CollisionLayer::DEFAULT,
            trigger: false,
        }
    }

    /// Solid circle on the default layer
    pub fn circle(radius: f32) -> Self {
        ColliderTemplate::Circle {
            radius,
            offset: Vec2::ZERO,
            layer: CollisionLayer::DEFAULT,
            trigger: false,
        }
    }

    fn attach_to(&self, world: &mut World, entity: EntityKey) -> Result<(), WorldError> {
        match *self {
            ColliderTemplate::Box { width, height, offset, layer, trigger } => {
                let mut collider = BoxCollider::new(width, height).with_offset(offset).with_layer(layer);
                if trigger {
                    collider = collider.as_trigger();
                }
                world.attach_collider(entity, collider)?;
            }
            ColliderTemplate::Circle { radius, offset, layer, trigger } => {
                let mut collider = CircleCollider::new(radius).with_offset(offset).with_layer(layer);
                if trigger {
                    collider = collider.as_trigger();
                }
                world.attach_collider(entity, collider)?;
            }
        }
        Ok(())
    }
}

/// A serializable entity description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTemplate {
    /// Optional name for this entity (for lookup)
    #[serde(default)]
    pub name: Option<String>,
    pub position: Vec2,
    /// Disabled entities join the scene with their colliders unindexed
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub colliders: Vec<ColliderTemplate>,
}

impl EntityTemplate {
    pub fn new(position: Vec2) -> Self {
        Self {
            name: None,
            position,
            enabled: true,
            colliders: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_collider(mut self, collider: ColliderTemplate) -> Self {
        self.colliders.push(collider);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// A serializable scene containing entity templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneTemplate {
    /// Scene name (for display/debugging)
    pub name: String,
    #[serde(default)]
    pub entities: Vec<EntityTemplate>,
}

impl SceneTemplate {
    /// Create a new empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: Vec::new(),
        }
    }

    /// Load a scene from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneLoadError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    /// Parse a scene from RON text
    pub fn from_ron(contents: &str) -> Result<Self, SceneLoadError> {
        Ok(ron::from_str(contents)?)
    }

    /// Save a scene to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneSaveError> {
        let pretty = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .enumerate_arrays(false);
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn add_entity(&mut self, entity: EntityTemplate) {
        self.entities.push(entity);
    }

    /// Create every entity in `world`, attach its colliders and add it to the scene
    ///
    /// Returns the new entity keys in template order.
    pub fn instantiate(&self, world: &mut World) -> Result<Vec<EntityKey>, WorldError> {
        let mut keys = Vec::with_capacity(self.entities.len());
        for template in &self.entities {
            let key = match &template.name {
                Some(name) => world.create_named(name.clone(), template.position),
                None => world.create_entity(template.position),
            };
            world.set_enabled(key, template.enabled)?;
            for collider in &template.colliders {
                collider.attach_to(world, key)?;
            }
            world.add_to_scene(key)?;
            keys.push(key);
        }
        log::info!("Instantiated scene '{}' with {} entities", self.name, keys.len());
        Ok(keys)
    }
}

/// Error loading a scene
#[derive(Debug, Error)]
pub enum SceneLoadError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Error saving a scene
#[derive(Debug, Error)]
pub enum SceneSaveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
}
