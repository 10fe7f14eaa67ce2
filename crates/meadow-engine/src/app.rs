//! Scripted camera fly-through.
//!
//! Drives the chunk cache the way an interactive client would: the camera
//! pans by a fixed step each frame and the cache is brought up to date
//! before the frame's tiles are queried.

use anyhow::{Context, Result};
use glam::DVec2;
use meadow_common::TileCoord;
use meadow_world::{ChunkCache, UpdateSummary, Viewport};
use std::time::Instant;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::minimap::render_minimap;
use crate::sink::LoggingSink;

/// Camera fly-through over a streaming chunk cache.
#[derive(Debug)]
pub struct FlyThrough {
    /// Chunk cache with a logging sink attached
    cache: ChunkCache<LoggingSink>,
    /// Current camera view
    viewport: Viewport,
    /// Camera movement per step
    pan: DVec2,
    /// Steps taken so far
    step: u32,
}

impl FlyThrough {
    /// Creates a fly-through starting over tile (0, 0).
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let cache = ChunkCache::new(&config.world, LoggingSink::new())
            .context("Failed to create chunk cache")?;
        let start = cache.projection().tile_center(TileCoord::new(0, 0));

        Ok(Self {
            cache,
            viewport: Viewport::new(
                start.x,
                start.y,
                config.viewport_width,
                config.viewport_height,
                config.zoom,
            ),
            pan: DVec2::from_array(config.pan_step),
            step: 0,
        })
    }

    /// Returns the cache.
    #[must_use]
    pub const fn cache(&self) -> &ChunkCache<LoggingSink> {
        &self.cache
    }

    /// Returns the cache mutably.
    pub fn cache_mut(&mut self) -> &mut ChunkCache<LoggingSink> {
        &mut self.cache
    }

    /// Returns the current viewport.
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Tile under the camera center.
    #[must_use]
    pub fn camera_tile(&self) -> TileCoord {
        self.cache.projection().world_to_tile(self.viewport.center)
    }

    /// Brings the cache up to date without moving.
    pub fn refresh(&mut self) -> UpdateSummary {
        self.cache.update_visible_chunks(&self.viewport)
    }

    /// Moves the camera one step and updates the cache.
    pub fn advance(&mut self) -> UpdateSummary {
        self.viewport.center += self.pan;
        self.step += 1;
        let summary = self.refresh();

        let tile = self.camera_tile();
        debug!(
            "Step {}: camera over {tile} ({:?}, {:?})",
            self.step,
            self.cache.get_tile_type(tile.col, tile.row),
            self.cache.get_tile_variant(tile.col, tile.row)
        );
        summary
    }
}

/// Options of a single run that are not part of the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Print a minimap of this radius around the final camera tile
    pub minimap_radius: Option<u32>,
    /// Flip smoothing before this step
    pub toggle_smoothing_at: Option<u32>,
}

/// Runs the fly-through and optionally prints a minimap of the final view.
pub fn run(config: &EngineConfig, options: RunOptions) -> Result<()> {
    let mut fly = FlyThrough::new(config)?;
    let started = Instant::now();

    let half = fly.viewport().half_extents();
    let initial = fly.refresh();
    info!(
        "Initial view: {:.0}x{:.0} world units, {} chunks loaded",
        half.x * 2.0,
        half.y * 2.0,
        initial.created
    );

    for step in 0..config.steps {
        if options.toggle_smoothing_at == Some(step) {
            let enabled = fly.cache_mut().toggle_smoothing();
            info!("Smoothing {}", if enabled { "enabled" } else { "disabled" });
        }
        let summary = fly.advance();
        let stats = fly.cache().stats();
        let published = fly.cache().sink().last_publish();
        info!(
            "Camera at {}: +{} / -{} chunks, {} resident ({} tiles, {} water)",
            fly.camera_tile(),
            summary.created,
            summary.evicted,
            stats.resident_chunks,
            stats.resident_tiles,
            published.water
        );
    }

    let stats = fly.cache().stats();
    let sink = fly.cache().sink();
    info!(
        "Fly-through finished in {:.1?}: {} chunks generated, {} evicted, {} publishes",
        started.elapsed(),
        stats.chunks_generated,
        stats.chunks_evicted,
        sink.publishes()
    );
    debug!(
        "Sink: {} live tiles, {} registered, {} unregistered",
        sink.live(),
        sink.registered_total(),
        sink.unregistered_total()
    );

    if let Some(radius) = options.minimap_radius {
        println!("{}", render_minimap(fly.cache(), fly.camera_tile(), radius));
    }

    Ok(())
}
