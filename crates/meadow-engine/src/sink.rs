//! Tile sink that tracks registrations and logs published tile sets.

use meadow_common::TileCoord;
use meadow_world::{ProxyHandle, RenderTile, TileSink, TileVariant};
use tracing::{debug, trace};

/// Summary of the last published tile set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSummary {
    /// Tiles in the set
    pub tiles: usize,
    /// Water tiles of any variant
    pub water: usize,
    /// Edge and corner water tiles
    pub shoreline: usize,
}

/// Sink standing in for a renderer: counts residency and logs each publish.
#[derive(Debug, Default)]
pub struct LoggingSink {
    /// Currently registered tiles
    live: usize,
    /// Registrations since creation
    registered_total: u64,
    /// Unregistrations since creation
    unregistered_total: u64,
    /// Number of publishes received
    publishes: u64,
    /// Last published set
    last: PublishSummary,
}

impl LoggingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently registered tiles.
    #[must_use]
    pub const fn live(&self) -> usize {
        self.live
    }

    /// Registrations since creation.
    #[must_use]
    pub const fn registered_total(&self) -> u64 {
        self.registered_total
    }

    /// Unregistrations since creation.
    #[must_use]
    pub const fn unregistered_total(&self) -> u64 {
        self.unregistered_total
    }

    /// Number of publishes received.
    #[must_use]
    pub const fn publishes(&self) -> u64 {
        self.publishes
    }

    /// Summary of the last published set.
    #[must_use]
    pub const fn last_publish(&self) -> PublishSummary {
        self.last
    }
}

impl TileSink for LoggingSink {
    fn register_tile(&mut self, proxy: ProxyHandle, tile: TileCoord) {
        trace!("register {tile} as #{}", proxy.raw());
        self.live += 1;
        self.registered_total += 1;
    }

    fn unregister_tile(&mut self, tile: TileCoord) {
        trace!("unregister {tile}");
        self.live = self.live.saturating_sub(1);
        self.unregistered_total += 1;
    }

    fn publish(&mut self, tiles: &[RenderTile]) {
        let water = tiles.iter().filter(|t| t.terrain.is_water()).count();
        let shoreline = tiles
            .iter()
            .filter(|t| t.variant != TileVariant::Water && t.terrain.is_water())
            .count();
        self.last = PublishSummary {
            tiles: tiles.len(),
            water,
            shoreline,
        };
        self.publishes += 1;
        debug!(
            "Published {} tiles ({} water, {} shoreline)",
            self.last.tiles, self.last.water, self.last.shoreline
        );
    }
}
