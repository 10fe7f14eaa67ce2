//! Engine configuration.
//!
//! Wraps the world settings with viewport and fly-through parameters.
//! Configuration can be loaded from and saved to a TOML file.

use meadow_common::ConfigError;
use meadow_world::WorldConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "meadow.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Viewport Settings ===
    /// Viewport width in pixels
    pub viewport_width: f64,
    /// Viewport height in pixels
    pub viewport_height: f64,
    /// Camera zoom (pixels per world unit)
    pub zoom: f64,

    // === Fly-through Settings ===
    /// Camera movement per step in world units (x, y)
    pub pan_step: [f64; 2],
    /// Number of camera steps
    pub steps: u32,

    // === World Settings ===
    /// Terrain and streaming parameters
    pub world: WorldConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Viewport
            viewport_width: 1280.0,
            viewport_height: 720.0,
            zoom: 1.0,

            // Fly-through
            pan_step: [256.0, 96.0],
            steps: 8,

            // World
            world: WorldConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a path.
    ///
    /// Fails if the file cannot be read, parsed, or validated.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut config: Self = toml::from_str(&contents)?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a path.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_error = |source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        };

        // Create parent directories if needed
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(io_error)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamp viewport values to sensible ranges and validate the world.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        // Viewport
        self.viewport_width = self.viewport_width.clamp(1.0, 16_384.0);
        self.viewport_height = self.viewport_height.clamp(1.0, 16_384.0);
        self.zoom = self.zoom.clamp(meadow_world::MIN_ZOOM, 64.0);

        if self.pan_step.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::invalid("pan_step", "must be finite"));
        }

        self.world.validate()
    }
}
