//! Request arguments.
//!
//! [`QueryString`] tokenizes the raw query text (including the `;&`
//! terminator used by source parameters) and [`TileQuery`] turns it into a
//! typed request with every default filled in.
//!
//! | key           | default              |
//! |---------------|----------------------|
//! | `url`         | required             |
//! | `bgurl`       | none                 |
//! | `clrfile`     | none                 |
//! | `shpfile`     | none                 |
//! | `blend`       | `0.5`                |
//! | `outsideMask` | absent               |
//! | `checkStatus` | absent               |
//! | `cachedir`    | none                 |
//! | `resample`    | `near`               |
//! | `zxy`         | `0/0/0`              |
//! | `zoom`        | `1-16`               |
//! | `ullr`        | `-180_90_180_-89.9`  |

mod parser;

pub use parser::{normalize_value, QueryString, DELIMITED_KEYS, VALUE_TERMINATOR};

use crate::coord::{CoordError, TileAddress, MAX_ZOOM};
use crate::raster::Resampling;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_BLEND: f32 = 0.5;
pub const DEFAULT_ZOOM: &str = "1-16";
pub const DEFAULT_ULLR: &str = "-180_90_180_-89.9";
pub const DEFAULT_ZXY: &str = "0/0/0";

/// Request argument errors. All of these are raised before any raster work.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Missing required parameter '{0}'")]
    Missing(&'static str),

    #[error("Invalid value for '{key}': '{value}' - {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid tile address: {0}")]
    Address(#[from] CoordError),
}

impl QueryError {
    fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        QueryError::Invalid {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Inclusive zoom range given as `min-max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomRange {
    pub min: u8,
    pub max: u8,
}

impl ZoomRange {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self::new(1, 16)
    }
}

impl fmt::Display for ZoomRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

impl FromStr for ZoomRange {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, max) = s
            .split_once('-')
            .ok_or_else(|| QueryError::invalid("zoom", s, "expected min-max"))?;
        let min: u8 = min
            .trim()
            .parse()
            .map_err(|_| QueryError::invalid("zoom", s, "minimum is not a zoom level"))?;
        let max: u8 = max
            .trim()
            .parse()
            .map_err(|_| QueryError::invalid("zoom", s, "maximum is not a zoom level"))?;

        if max > MAX_ZOOM {
            return Err(QueryError::invalid(
                "zoom",
                s,
                format!("maximum must not exceed {}", MAX_ZOOM),
            ));
        }
        if min > max {
            return Err(QueryError::invalid("zoom", s, "minimum exceeds maximum"));
        }
        Ok(Self { min, max })
    }
}

/// Geographic extent given as `west_north_east_south` (upper-left, lower-right).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub west: f64,
    pub north: f64,
    pub east: f64,
    pub south: f64,
}

impl Extent {
    pub fn new(west: f64, north: f64, east: f64, south: f64) -> Self {
        Self {
            west,
            north,
            east,
            south,
        }
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::new(-180.0, 90.0, 180.0, -89.9)
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}_{}", self.west, self.north, self.east, self.south)
    }
}

impl FromStr for Extent {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split('_')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| QueryError::invalid("ullr", s, "expected four numbers"))?;

        let &[west, north, east, south] = values.as_slice() else {
            return Err(QueryError::invalid(
                "ullr",
                s,
                "expected west_north_east_south",
            ));
        };

        let in_range = |v: f64, limit: f64| v.is_finite() && (-limit..=limit).contains(&v);
        if !(in_range(west, 180.0) && in_range(east, 180.0)) {
            return Err(QueryError::invalid("ullr", s, "longitude outside -180..180"));
        }
        if !(in_range(north, 90.0) && in_range(south, 90.0)) {
            return Err(QueryError::invalid("ullr", s, "latitude outside -90..90"));
        }
        if south >= north {
            return Err(QueryError::invalid("ullr", s, "south must be below north"));
        }
        if west >= east {
            return Err(QueryError::invalid("ullr", s, "west must be left of east"));
        }
        Ok(Self::new(west, north, east, south))
    }
}

/// Fully-defaulted request arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct TileQuery {
    /// Primary source: URL template, pyramid index or dataset path
    pub url: String,
    /// Background / relief source, same syntax as `url`
    pub bgurl: Option<String>,
    /// Color ramp file for single-band data
    pub clrfile: Option<PathBuf>,
    /// Vector mask burned into the alpha band
    pub shpfile: Option<PathBuf>,
    /// Cross-blend factor toward the background (0.0-1.0)
    pub blend: f32,
    /// Keep the region outside the mask instead of inside
    pub outside_mask: bool,
    /// Probe remote tiles before linking them
    pub check_status: bool,
    /// Cache subdirectory under the cache root
    pub cachedir: Option<String>,
    /// Resampling method name handed to the raster service
    pub resample: Resampling,
    /// Requested tile; `None` selects the root document
    pub zxy: Option<TileAddress>,
    /// Covering zoom range
    pub zoom: ZoomRange,
    /// Geographic extent
    pub ullr: Extent,
    /// Whether `zoom` / `ullr` were given explicitly
    pub zoom_given: bool,
    pub ullr_given: bool,
    query: QueryString,
}

impl TileQuery {
    /// Parses and validates a raw query string.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let query = QueryString::parse(raw);

        let url = query
            .get_non_empty("url")
            .ok_or(QueryError::Missing("url"))?
            .to_string();

        let blend = match query.get_non_empty("blend") {
            Some(v) => {
                let blend: f32 = v
                    .parse()
                    .map_err(|_| QueryError::invalid("blend", v, "not a number"))?;
                if !(0.0..=1.0).contains(&blend) {
                    return Err(QueryError::invalid("blend", v, "must be between 0 and 1"));
                }
                blend
            }
            None => DEFAULT_BLEND,
        };

        let cachedir = match query.get_non_empty("cachedir") {
            Some(dir) => {
                let escapes = dir
                    .split('/')
                    .any(|part| part == ".." || part.contains(':'));
                if dir.starts_with('/') || escapes {
                    return Err(QueryError::invalid(
                        "cachedir",
                        dir,
                        "must be a relative path inside the cache root",
                    ));
                }
                Some(dir.to_string())
            }
            None => None,
        };

        let resample = match query.get_non_empty("resample") {
            Some(v) => v
                .parse()
                .map_err(|_| QueryError::invalid("resample", v, "unknown resampling method"))?,
            None => Resampling::default(),
        };

        let zxy = match query.get_non_empty("zxy") {
            Some(v) => Some(v.parse::<TileAddress>()?),
            None => None,
        };

        let zoom = match query.get_non_empty("zoom") {
            Some(v) => v.parse()?,
            None => ZoomRange::default(),
        };

        let ullr = match query.get_non_empty("ullr") {
            Some(v) => v.parse()?,
            None => Extent::default(),
        };

        Ok(Self {
            url,
            bgurl: query.get_non_empty("bgurl").map(str::to_string),
            clrfile: query.get_non_empty("clrfile").map(PathBuf::from),
            shpfile: query.get_non_empty("shpfile").map(PathBuf::from),
            blend,
            outside_mask: query.contains("outsideMask"),
            check_status: query.contains("checkStatus"),
            cachedir,
            resample,
            zxy,
            zoom,
            ullr,
            zoom_given: query.get_non_empty("zoom").is_some(),
            ullr_given: query.get_non_empty("ullr").is_some(),
            query,
        })
    }

    /// The requested tile, defaulting to `0/0/0`.
    pub fn address(&self) -> TileAddress {
        self.zxy.unwrap_or_default()
    }

    /// Whether the primary source is a web tile URL template.
    pub fn is_web_tiles(&self) -> bool {
        crate::source::is_url_template(&self.url)
    }

    /// Whether anything beyond showing the raw web tiles was requested.
    pub fn needs_compositing(&self) -> bool {
        !self.is_web_tiles()
            || self.bgurl.is_some()
            || self.shpfile.is_some()
            || self.clrfile.is_some()
    }

    /// The original query text without `zxy`, ready to be re-entered with
    /// a new tile address appended.
    pub fn reentrant_query(&self) -> String {
        self.query.raw_without(&["zxy"])
    }

    pub fn query_string(&self) -> &QueryString {
        &self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let q = TileQuery::parse("url=http://t/{$z}/{$x}/{$y}.png;&").unwrap();
        assert_eq!(q.url, "http://t/{$z}/{$x}/{$y}.png");
        assert_eq!(q.blend, 0.5);
        assert!(!q.outside_mask);
        assert!(!q.check_status);
        assert_eq!(q.cachedir, None);
        assert_eq!(q.resample, Resampling::Near);
        assert_eq!(q.zxy, None);
        assert_eq!(q.address(), TileAddress { zoom: 0, col: 0, row: 0 });
        assert_eq!(q.zoom, ZoomRange::new(1, 16));
        assert_eq!(q.ullr, Extent::new(-180.0, 90.0, 180.0, -89.9));
        assert!(!q.zoom_given);
        assert!(!q.ullr_given);
        assert_eq!(q.zoom.to_string(), DEFAULT_ZOOM);
        assert_eq!(q.ullr.to_string(), DEFAULT_ULLR);
        assert_eq!(q.address().to_string(), DEFAULT_ZXY);
    }

    #[test]
    fn test_full_request() {
        let q = TileQuery::parse(
            "url=/data/dem.pyr;&clrfile=/data/ramp.txt;&bgurl=http://r/{$z}/{$x}/{$invY}.png;&\
             shpfile=/data/lake.shp;&blend=0.3&outsideMask&cachedir=dem&resample=bilinear&\
             zxy=5/10/20&zoom=3-12&ullr=-120_50_-100_30&checkStatus",
        )
        .unwrap();

        assert_eq!(q.url, "/data/dem.pyr");
        assert_eq!(q.clrfile, Some(PathBuf::from("/data/ramp.txt")));
        assert_eq!(q.bgurl.as_deref(), Some("http://r/{$z}/{$x}/{$invY}.png"));
        assert_eq!(q.shpfile, Some(PathBuf::from("/data/lake.shp")));
        assert!((q.blend - 0.3).abs() < f32::EPSILON);
        assert!(q.outside_mask);
        assert!(q.check_status);
        assert_eq!(q.cachedir.as_deref(), Some("dem"));
        assert_eq!(q.resample, Resampling::Bilinear);
        assert_eq!(q.zxy, Some(TileAddress { zoom: 5, col: 10, row: 20 }));
        assert_eq!(q.zoom, ZoomRange::new(3, 12));
        assert_eq!(q.ullr, Extent::new(-120.0, 50.0, -100.0, 30.0));
        assert!(q.needs_compositing());
    }

    #[test]
    fn test_missing_url_fails() {
        assert!(matches!(
            TileQuery::parse("zoom=1-4"),
            Err(QueryError::Missing("url"))
        ));
        assert!(matches!(
            TileQuery::parse("url=;&zoom=1-4"),
            Err(QueryError::Missing("url"))
        ));
    }

    #[test]
    fn test_invalid_values_fail() {
        let base = "url=/data/dem.tif;&";
        for bad in [
            "blend=abc",
            "blend=1.5",
            "zoom=5",
            "zoom=9-3",
            "zoom=1-40",
            "ullr=1_2_3",
            "ullr=a_b_c_d",
            "ullr=0_10_10_20",
            "ullr=20_10_10_0",
            "ullr=-190_10_10_0",
            "ullr=0_95_10_0",
            "ullr=0_10_10_-91",
            "zxy=3/9/0",
            "resample=sharpen",
            "cachedir=../etc",
            "cachedir=/abs",
        ] {
            let raw = format!("{}{}", base, bad);
            assert!(TileQuery::parse(&raw).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_passthrough_detection() {
        let q = TileQuery::parse("url=http://t/{$z}/{$x}/{$y}.png;&").unwrap();
        assert!(q.is_web_tiles());
        assert!(!q.needs_compositing());

        let q = TileQuery::parse("url=http://t/{$z}/{$x}/{$y}.png;&shpfile=/m.shp;&").unwrap();
        assert!(q.needs_compositing());

        let q = TileQuery::parse("url=/data/dem.tif;&").unwrap();
        assert!(!q.is_web_tiles());
        assert!(q.needs_compositing());
    }

    #[test]
    fn test_reentrant_query_drops_zxy() {
        let q = TileQuery::parse("url=http://t/?z={$z}&x={$x}&y={$y};&zoom=1-4&zxy=2/1/1").unwrap();
        assert_eq!(q.reentrant_query(), "url=http://t/?z={$z}&x={$x}&y={$y};&zoom=1-4");
    }
}
