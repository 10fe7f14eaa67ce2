//! World generation and streaming configuration.

use meadow_common::ConfigError;
use serde::{Deserialize, Serialize};

/// Default world seed.
pub const DEFAULT_SEED: &str = "procgentown";

/// Default chunk size in tiles.
pub const DEFAULT_CHUNK_SIZE: u32 = 16;

/// Default padding margin around a chunk during classification, in tiles.
pub const DEFAULT_PADDING: u32 = 8;

/// Default render distance margin, in chunks.
pub const DEFAULT_RENDER_DISTANCE: u32 = 2;

/// Largest accepted chunk size, in tiles.
pub const MAX_CHUNK_SIZE: u32 = 4096;

/// Largest accepted render distance, in chunks.
pub const MAX_RENDER_DISTANCE: u32 = 64;

/// Default noise sampling scale (noise units per tile).
pub const DEFAULT_NOISE_SCALE: f64 = 0.1;

/// Default water threshold on normalized noise.
pub const DEFAULT_WATER_THRESHOLD: f64 = 0.2;

/// Default minimum water cluster size, in tiles.
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 4;

/// Tile art dimensions used to derive the isometric projection steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Width of the tile's diamond footprint in world units
    pub tile_width: f64,
    /// Height of the tile's diamond footprint in world units
    pub tile_height: f64,
    /// Visual overlap between neighboring tiles in world units
    pub overlap: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            tile_width: 64.0,
            tile_height: 32.0,
            overlap: 0.0,
        }
    }
}

/// Configuration for terrain generation and the chunk cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed
    pub seed: String,
    /// Chunk size in tiles
    pub chunk_size: u32,
    /// Classification padding around each chunk, in tiles
    pub padding: u32,
    /// Extra chunks kept around the viewport on every side
    pub render_distance: u32,
    /// Noise sampling scale (noise units per tile)
    pub noise_scale: f64,
    /// Normalized noise below this value is water (0.0-1.0)
    pub water_threshold: f64,
    /// Water clusters smaller than this become grass
    pub min_cluster_size: usize,
    /// Whether edge/corner autotile variants are selected
    pub smoothing: bool,
    /// Isometric projection parameters
    pub projection: ProjectionConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            padding: DEFAULT_PADDING,
            render_distance: DEFAULT_RENDER_DISTANCE,
            noise_scale: DEFAULT_NOISE_SCALE,
            water_threshold: DEFAULT_WATER_THRESHOLD,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            smoothing: true,
            projection: ProjectionConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Creates a default config with the given seed.
    #[must_use]
    pub fn with_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            ..Default::default()
        }
    }

    /// Parses a config from TOML text. Missing fields take default values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the config to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks that every field holds a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_CHUNK_SIZE).contains(&self.chunk_size) {
            return Err(ConfigError::invalid(
                "chunk_size",
                format!("must be within 1-{MAX_CHUNK_SIZE}, got {}", self.chunk_size),
            ));
        }
        if self.padding > self.chunk_size {
            return Err(ConfigError::invalid(
                "padding",
                format!(
                    "must not exceed chunk_size ({}), got {}",
                    self.chunk_size, self.padding
                ),
            ));
        }
        if self.render_distance > MAX_RENDER_DISTANCE {
            return Err(ConfigError::invalid(
                "render_distance",
                format!(
                    "must be at most {MAX_RENDER_DISTANCE}, got {}",
                    self.render_distance
                ),
            ));
        }
        if !is_positive(self.noise_scale) {
            return Err(ConfigError::invalid(
                "noise_scale",
                format!("must be a positive number, got {}", self.noise_scale),
            ));
        }
        if !(0.0..=1.0).contains(&self.water_threshold) {
            return Err(ConfigError::invalid(
                "water_threshold",
                format!("must be within 0.0-1.0, got {}", self.water_threshold),
            ));
        }
        let projection = &self.projection;
        if !is_positive(projection.tile_width - projection.overlap) {
            return Err(ConfigError::invalid(
                "projection.tile_width",
                "must exceed the overlap",
            ));
        }
        if !is_positive(projection.tile_height - projection.overlap) {
            return Err(ConfigError::invalid(
                "projection.tile_height",
                "must exceed the overlap",
            ));
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
