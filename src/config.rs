//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`QD_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use quadrant_physics::SpatialHashConfig;
use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Broad-phase configuration
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
    /// Demo run configuration
    #[serde(default)]
    pub demo: DemoConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`QD_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Optional, never committed
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // QD_PHYSICS__CELL_SIZE=32 -> physics.cell_size = 32.0
        figment = figment.merge(Env::prefixed("QD_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Broad-phase configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Side length of a spatial hash cell in world units
    pub cell_size: f32,
    /// Upper bound on the cells a single collider may occupy
    pub max_cells_per_collider: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let hash = SpatialHashConfig::default();
        Self {
            cell_size: hash.cell_size,
            max_cells_per_collider: hash.max_cells_per_collider,
        }
    }
}

impl PhysicsConfig {
    pub fn spatial_hash(&self) -> SpatialHashConfig {
        SpatialHashConfig {
            cell_size: self.cell_size,
            max_cells_per_collider: self.max_cells_per_collider,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Record collider outlines every step
    pub render_colliders: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            render_colliders: true,
        }
    }
}

/// Demo run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Scene file to instantiate
    pub scene: PathBuf,
    /// Number of simulation steps
    pub steps: u32,
    /// Distance movers travel per step
    pub step_distance: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            scene: PathBuf::from("scenes/demo.ron"),
            steps: 8,
            step_distance: 40.0,
        }
    }
}

/// Configuration error
#[derive(Debug, Error)]
#[error("Configuration error: {0}")]
pub struct ConfigError(#[from] figment::Error);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.physics.cell_size, 100.0);
        assert_eq!(config.debug.log_level, "info");
        assert_eq!(config.demo.scene, PathBuf::from("scenes/demo.ron"));
    }

    #[test]
    fn test_spatial_hash_config() {
        let physics = PhysicsConfig {
            cell_size: 16.0,
            max_cells_per_collider: 8,
        };
        let hash = physics.spatial_hash();
        assert_eq!(hash.cell_size, 16.0);
        assert_eq!(hash.max_cells_per_collider, 8);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("cell_size"));
        assert!(toml.contains("log_level"));
        assert!(toml.contains("step_distance"));
    }

    #[test]
    fn test_missing_directory_uses_defaults() {
        let config = AppConfig::load_from("/nonexistent/quadrant/config").unwrap();
        assert_eq!(config.demo.steps, DemoConfig::default().steps);
    }
}
