//! Coordinate type definitions

use std::fmt;
use std::str::FromStr;

/// Web Mercator valid latitude range. Polar areas beyond this are clipped.
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Number of zoom levels in the pyramid; valid zooms are `0..ZOOM_LEVELS`.
pub const ZOOM_LEVELS: u8 = 32;

/// Highest addressable zoom level.
pub const MAX_ZOOM: u8 = ZOOM_LEVELS - 1;

/// Geographic coordinate in the WGS84 datum, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Spherical Mercator coordinate in meters, origin at the projection center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Geographic extent of a tile (or any region) in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Closed-interval containment test.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lon >= self.west
            && point.lon <= self.east
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }
}

/// Address of one tile in the pyramid.
///
/// Rows use the bottom-left (TMS) origin. Use [`TileAddress::top_left_row`]
/// when talking to clients that count rows from the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileAddress {
    /// Zoom level (0-31)
    pub zoom: u8,
    /// X coordinate (west-east), 0 at west
    pub col: u32,
    /// Y coordinate (south-north), 0 at south
    pub row: u32,
}

impl TileAddress {
    /// Creates a tile address, validating it against the grid at `zoom`.
    pub fn new(zoom: u8, col: u32, row: u32) -> Result<Self, CoordError> {
        if zoom >= ZOOM_LEVELS {
            return Err(CoordError::InvalidZoom(zoom));
        }
        let side = grid_side(zoom);
        if u64::from(col) >= side || u64::from(row) >= side {
            return Err(CoordError::OutOfGrid { zoom, col, row });
        }
        Ok(Self { zoom, col, row })
    }

    /// Row index counted from the top edge of the grid.
    #[inline]
    pub fn top_left_row(&self) -> u32 {
        super::to_top_left_row(self.row, self.zoom)
    }

    /// The four quadtree children, in `(2x,2y) (2x+1,2y) (2x,2y+1) (2x+1,2y+1)` order.
    ///
    /// Returns `None` at the deepest zoom level.
    pub fn children(&self) -> Option<[TileAddress; 4]> {
        if self.zoom >= MAX_ZOOM {
            return None;
        }
        let zoom = self.zoom + 1;
        let (x, y) = (self.col * 2, self.row * 2);
        Some([
            TileAddress { zoom, col: x, row: y },
            TileAddress { zoom, col: x + 1, row: y },
            TileAddress { zoom, col: x, row: y + 1 },
            TileAddress { zoom, col: x + 1, row: y + 1 },
        ])
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.col, self.row)
    }
}

/// Parses the `z/x/y` form used by the `zxy` request parameter.
impl FromStr for TileAddress {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoordError::InvalidAddress(s.to_string());
        let mut parts = s.trim().split('/');
        let zoom = parts.next().ok_or_else(invalid)?;
        let col = parts.next().ok_or_else(invalid)?;
        let row = parts.next().ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        let zoom: u8 = zoom.parse().map_err(|_| invalid())?;
        let col: u32 = col.parse().map_err(|_| invalid())?;
        let row: u32 = row.parse().map_err(|_| invalid())?;
        TileAddress::new(zoom, col, row)
    }
}

/// Number of tiles along one axis at `zoom`.
#[inline]
pub(crate) fn grid_side(zoom: u8) -> u64 {
    1u64 << zoom
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Zoom level is outside valid range (0 to 31)
    InvalidZoom(u8),
    /// Column or row does not exist at this zoom
    OutOfGrid { zoom: u8, col: u32, row: u32 },
    /// Tile address string is not of the form `z/x/y`
    InvalidAddress(String),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidZoom(zoom) => {
                write!(
                    f,
                    "Invalid zoom level: {} (must be between 0 and {})",
                    zoom, MAX_ZOOM
                )
            }
            CoordError::OutOfGrid { zoom, col, row } => {
                write!(
                    f,
                    "Tile {}/{}/{} is outside the {}x{} grid",
                    zoom,
                    col,
                    row,
                    grid_side(*zoom),
                    grid_side(*zoom)
                )
            }
            CoordError::InvalidAddress(value) => {
                write!(f, "Invalid tile address: '{}' (expected z/x/y)", value)
            }
        }
    }
}

impl std::error::Error for CoordError {}
