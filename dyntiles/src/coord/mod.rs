//! Coordinate conversion module
//!
//! Converts between geographic coordinates (latitude/longitude), Spherical
//! Mercator meters, pyramid pixels and integer tile addresses.
//!
//! ```text
//!   LatLon      <->      Meters      <->     Pixels     <->      Tile
//!  EPSG:4326          EPSG:3857         XY at zoom Z       (z, col, row)
//! ```
//!
//! Tile rows use the bottom-left (TMS) origin throughout. Client-facing code
//! converts with [`to_top_left_row`].

mod types;

pub use types::{
    BoundingBox, CoordError, GeoPoint, ProjectedPoint, TileAddress, MAX_LAT, MAX_LON, MAX_ZOOM,
    MIN_LAT, MIN_LON, ZOOM_LEVELS,
};

use std::f64::consts::PI;
use types::grid_side;

/// Equatorial radius of the WGS84 ellipsoid, used as the sphere radius.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Half the projected width of the world: `π · 6378137`.
pub const ORIGIN_SHIFT: f64 = PI * EARTH_RADIUS;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Spherical Mercator tile pyramid for a fixed tile size.
///
/// All operations are pure functions of the tile size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalMercator {
    tile_size: u32,
    initial_resolution: f64,
}

impl Default for GlobalMercator {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE)
    }
}

impl GlobalMercator {
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size,
            initial_resolution: 2.0 * PI * EARTH_RADIUS / f64::from(tile_size),
        }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Forward Mercator projection.
    ///
    /// Diverges as |lat| approaches 90; clip latitude to [`MAX_LAT`] first
    /// when a finite result matters.
    #[inline]
    pub fn geo_to_projected(&self, lat: f64, lon: f64) -> ProjectedPoint {
        let x = lon * ORIGIN_SHIFT / 180.0;
        let y = ((90.0 + lat) * PI / 360.0).tan().ln() / (PI / 180.0);
        ProjectedPoint::new(x, y * ORIGIN_SHIFT / 180.0)
    }

    /// Inverse Mercator projection.
    #[inline]
    pub fn projected_to_geo(&self, x: f64, y: f64) -> GeoPoint {
        let lon = (x / ORIGIN_SHIFT) * 180.0;
        let lat = (y / ORIGIN_SHIFT) * 180.0;
        let lat = 180.0 / PI * (2.0 * (lat * PI / 180.0).exp().atan() - PI / 2.0);
        GeoPoint::new(lat, lon)
    }

    /// Meters per pixel at `zoom`, measured at the equator.
    #[inline]
    pub fn resolution(&self, zoom: u8) -> f64 {
        self.initial_resolution / 2f64.powi(i32::from(zoom))
    }

    /// Projected meters to pyramid pixels at `zoom` (bottom-left origin).
    pub fn projected_to_pixel(&self, point: ProjectedPoint, zoom: u8) -> (f64, f64) {
        let res = self.resolution(zoom);
        ((point.x + ORIGIN_SHIFT) / res, (point.y + ORIGIN_SHIFT) / res)
    }

    /// Pyramid pixels at `zoom` to projected meters.
    pub fn pixel_to_projected(&self, px: f64, py: f64, zoom: u8) -> ProjectedPoint {
        let res = self.resolution(zoom);
        ProjectedPoint::new(px * res - ORIGIN_SHIFT, py * res - ORIGIN_SHIFT)
    }

    /// Tile containing the given pixel.
    ///
    /// Uses `ceil(p / tileSize) - 1`, so a pixel lying exactly on a tile edge
    /// belongs to the tile to its left/below. Pixel 0 therefore maps to -1;
    /// callers clamp to the grid.
    ///
    /// Infinite pixels saturate at the `i64` limits.
    pub fn pixel_to_tile(&self, px: f64, py: f64) -> (i64, i64) {
        let size = f64::from(self.tile_size);
        let col = ((px / size).ceil() as i64).saturating_sub(1);
        let row = ((py / size).ceil() as i64).saturating_sub(1);
        (col, row)
    }

    /// Moves the pixel origin to the top-left corner of the map.
    pub fn pixel_to_raster(&self, px: f64, py: f64, zoom: u8) -> (f64, f64) {
        let map_size = f64::from(self.tile_size) * grid_side(zoom) as f64;
        (px, map_size - py)
    }

    /// Unclamped tile indices for a projected point.
    pub fn projected_to_tile(&self, point: ProjectedPoint, zoom: u8) -> (i64, i64) {
        let (px, py) = self.projected_to_pixel(point, zoom);
        self.pixel_to_tile(px, py)
    }

    /// Tile containing a geographic point, clamped to the grid.
    pub fn tile_from_point(&self, point: GeoPoint, zoom: u8) -> TileAddress {
        let projected = self.geo_to_projected(clip_latitude(point.lat), point.lon);
        let (col, row) = self.projected_to_tile(projected, zoom);
        let max = grid_side(zoom) as i64 - 1;
        TileAddress {
            zoom,
            col: col.clamp(0, max) as u32,
            row: row.clamp(0, max) as u32,
        }
    }

    /// Projected `(min, max)` corners of a tile.
    pub fn tile_bounds(&self, col: u32, row: u32, zoom: u8) -> (ProjectedPoint, ProjectedPoint) {
        let size = f64::from(self.tile_size);
        let (col, row) = (f64::from(col), f64::from(row));
        let min = self.pixel_to_projected(col * size, row * size, zoom);
        let max = self.pixel_to_projected((col + 1.0) * size, (row + 1.0) * size, zoom);
        (min, max)
    }

    /// Geographic bounds of a tile.
    pub fn tile_lat_lon_bounds(&self, col: u32, row: u32, zoom: u8) -> BoundingBox {
        let (min, max) = self.tile_bounds(col, row, zoom);
        let sw = self.projected_to_geo(min.x, min.y);
        let ne = self.projected_to_geo(max.x, max.y);
        BoundingBox::new(sw.lat, sw.lon, ne.lat, ne.lon)
    }

    /// Geographic bounds of a tile address.
    pub fn address_bounds(&self, tile: &TileAddress) -> BoundingBox {
        self.tile_lat_lon_bounds(tile.col, tile.row, tile.zoom)
    }

    /// Coarsest zoom that does not scale a source of the given pixel size up.
    ///
    /// Scans zooms ascending and stops at the first one whose resolution is
    /// at or below the target, then steps back one level (except at zoom 0).
    /// If no level is fine enough, the deepest zoom is returned.
    pub fn zoom_for_pixel_size(&self, meters_per_pixel: f64) -> u8 {
        for zoom in 0..ZOOM_LEVELS {
            if self.resolution(zoom) <= meters_per_pixel {
                return zoom.saturating_sub(1);
            }
        }
        MAX_ZOOM
    }
}

/// Clamps a latitude to the range the projection maps to finite meters.
#[inline]
pub fn clip_latitude(lat: f64) -> f64 {
    lat.clamp(MIN_LAT, MAX_LAT)
}

/// Converts a bottom-left row index to the top-left convention.
#[inline]
pub fn to_top_left_row(row: u32, zoom: u8) -> u32 {
    (grid_side(zoom) - 1 - u64::from(row)) as u32
}

/// Microsoft quadkey for a tile given in bottom-left row convention.
pub fn quadkey(col: u32, row: u32, zoom: u8) -> String {
    let row = to_top_left_row(row, zoom);
    (1..=zoom)
        .rev()
        .map(|i| {
            let mask = 1u32 << (i - 1);
            let mut digit = 0u8;
            if col & mask != 0 {
                digit += 1;
            }
            if row & mask != 0 {
                digit += 2;
            }
            char::from(b'0' + digit)
        })
        .collect()
}
