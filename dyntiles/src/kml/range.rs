//! Per-zoom tile ranges covering a geographic extent.

use crate::coord::{clip_latitude, GlobalMercator, TileAddress, ZOOM_LEVELS};
use crate::query::Extent;

/// Inclusive column/row range at one zoom. Empty when `min > max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub min_col: i64,
    pub min_row: i64,
    pub max_col: i64,
    pub max_row: i64,
}

impl TileRange {
    pub fn contains(&self, col: u32, row: u32) -> bool {
        let (col, row) = (i64::from(col), i64::from(row));
        col >= self.min_col && col <= self.max_col && row >= self.min_row && row <= self.max_row
    }

    pub fn is_empty(&self) -> bool {
        self.min_col > self.max_col || self.min_row > self.max_row
    }

    /// Number of tiles in the range, saturating at `u64::MAX`.
    pub fn tile_count(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        let cols = (self.max_col - self.min_col + 1) as u64;
        let rows = (self.max_row - self.min_row + 1) as u64;
        cols.saturating_mul(rows)
    }
}

/// Min/max tile table for every zoom level, clamped to the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRangeTable {
    ranges: Vec<TileRange>,
}

impl TileRangeTable {
    pub fn new(mercator: &GlobalMercator, extent: &Extent) -> Self {
        let min = mercator.geo_to_projected(clip_latitude(extent.south), extent.west);
        let max = mercator.geo_to_projected(clip_latitude(extent.north), extent.east);

        let ranges = (0..ZOOM_LEVELS)
            .map(|zoom| {
                let (min_col, min_row) = mercator.projected_to_tile(min, zoom);
                let (max_col, max_row) = mercator.projected_to_tile(max, zoom);
                let last = (1i64 << zoom) - 1;
                TileRange {
                    min_col: min_col.max(0),
                    min_row: min_row.max(0),
                    max_col: max_col.min(last),
                    max_row: max_row.min(last),
                }
            })
            .collect();

        Self { ranges }
    }

    pub fn range(&self, zoom: u8) -> Option<&TileRange> {
        self.ranges.get(usize::from(zoom))
    }

    pub fn contains(&self, tile: &TileAddress) -> bool {
        self.range(tile.zoom)
            .is_some_and(|r| r.contains(tile.col, tile.row))
    }

    /// Every tile at `zoom` inside the extent, column-major.
    pub fn tiles_at(&self, zoom: u8) -> Vec<TileAddress> {
        let Some(range) = self.range(zoom) else {
            return Vec::new();
        };
        let mut tiles = Vec::new();
        for col in range.min_col..=range.max_col {
            for row in range.min_row..=range.max_row {
                tiles.push(TileAddress {
                    zoom,
                    col: col as u32,
                    row: row as u32,
                });
            }
        }
        tiles
    }

    /// Quadtree children of `tile` that lie inside the extent, or none once
    /// `tile` has reached `max_zoom`.
    pub fn children(&self, tile: &TileAddress, max_zoom: u8) -> Vec<TileAddress> {
        if tile.zoom >= max_zoom {
            return Vec::new();
        }
        tile.children()
            .map(|children| children.into_iter().filter(|c| self.contains(c)).collect())
            .unwrap_or_default()
    }
}
