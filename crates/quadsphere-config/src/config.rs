//! Configuration sections, defaults, and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name looked up inside the config directory.
pub const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Sphere geometry.
    pub sphere: SphereConfig,
    /// Refinement thresholds.
    pub lod: LodConfig,
    /// Welding and neighbour matching.
    pub mesh: MeshConfig,
    /// Simulated fly-by.
    pub demo: DemoConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Sphere geometry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SphereConfig {
    /// Sphere radius.
    pub radius: f64,
    /// Grid samples per patch row; odd and at least 3.
    pub segments: u32,
    /// Deepest subdivision level.
    pub max_level: u32,
    /// Lay faces out in one cube-cross atlas instead of full UVs per face.
    pub uv_atlas: bool,
}

/// Refinement thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// Split a leaf when the viewer is closer than `radius * split_factor`.
    pub split_factor: f64,
    /// Extra distance factor (> 1) before a parent is collapsed again.
    pub unify_hysteresis: f64,
}

/// Welding and neighbour matching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshConfig {
    /// Bucket size for vertex welding.
    pub weld_precision: f64,
    /// Base tolerance when matching neighbour edges.
    pub neighbor_tolerance: f64,
}

/// Simulated viewer descending toward the sphere and back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of simulated frames.
    pub frames: u32,
    /// Altitude above the surface at the first frame.
    pub start_altitude: f64,
    /// Lowest altitude, reached halfway through.
    pub end_altitude: f64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            segments: 5,
            max_level: 6,
            uv_atlas: false,
        }
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            split_factor: 2.0,
            unify_hysteresis: 1.5,
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            weld_precision: 1e-4,
            neighbor_tolerance: 1e-3,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frames: 240,
            start_altitude: 4.0,
            end_altitude: 0.01,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load config from `config_dir`, writing a default file if none exists.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to `config_dir` as [`CONFIG_FILE`].
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Re-read the file; `Some` only if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;
        if &new_config == self {
            return Ok(None);
        }
        log::info!("Config reloaded with changes");
        Ok(Some(new_config))
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}
