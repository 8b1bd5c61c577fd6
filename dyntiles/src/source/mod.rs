//! Tile source descriptions.
//!
//! A source value is one of:
//!
//! - a web tile URL template containing `{$z}` plus `{$x}`, `{$y}` or `{$invY}`
//! - a pyramid index file (`*.pyr`) listing `<max zoom> <dataset>` lines
//! - a path to any other raster dataset
//!
//! Template rows are substituted in the top-left convention unless the
//! template mentions `invY`, in which case the bottom-left row is used as is.

mod pyramid;

pub use pyramid::{PyramidEntry, PyramidIndex};

use crate::coord::TileAddress;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Marker that identifies a web tile template.
pub const ZOOM_PLACEHOLDER: &str = "{$z}";

/// Marker that identifies a pyramid index file.
pub const PYRAMID_MARKER: &str = ".pyr";

/// Errors raised while resolving a source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read pyramid index {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed pyramid index {path} line {line}: '{text}'")]
    Malformed {
        path: PathBuf,
        line: usize,
        text: String,
    },

    #[error("Pyramid index {path} has no entry for zoom {zoom}")]
    NoEntry { path: PathBuf, zoom: u8 },

    #[error("Pyramid index {0} is empty")]
    Empty(PathBuf),
}

/// Whether a source value is a web tile URL template.
pub fn is_url_template(value: &str) -> bool {
    value.contains(ZOOM_PLACEHOLDER)
}

/// Web tile URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    template: String,
    invert_y: bool,
}

impl UrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let invert_y = template.contains("invY");
        Self { template, invert_y }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Whether the template already expects bottom-left rows.
    pub fn invert_y(&self) -> bool {
        self.invert_y
    }

    /// Row index to place in the URL for `tile`.
    pub fn row_for(&self, tile: &TileAddress) -> u32 {
        if self.invert_y {
            tile.row
        } else {
            tile.top_left_row()
        }
    }

    /// Concrete URL for one tile.
    ///
    /// # Example
    ///
    /// ```
    /// use dyntiles::coord::TileAddress;
    /// use dyntiles::source::UrlTemplate;
    ///
    /// let template = UrlTemplate::new("http://tiles.example.com/{$z}/{$x}/{$y}.png");
    /// let tile = TileAddress::new(2, 1, 1).unwrap();
    /// assert_eq!(template.substitute(&tile), "http://tiles.example.com/2/1/2.png");
    /// ```
    pub fn substitute(&self, tile: &TileAddress) -> String {
        let row = self.row_for(tile).to_string();
        self.template
            .replace("{$x}", &tile.col.to_string())
            .replace("{$y}", &row)
            .replace("{$invY}", &row)
            .replace(ZOOM_PLACEHOLDER, &tile.zoom.to_string())
    }
}

/// Where the pixels for a tile come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileSource {
    WebTiles(UrlTemplate),
    Pyramid(PathBuf),
    Dataset(PathBuf),
}

impl TileSource {
    /// Classifies a decoded `url` / `bgurl` value.
    pub fn parse(value: &str) -> Self {
        if is_url_template(value) {
            TileSource::WebTiles(UrlTemplate::new(value))
        } else if value.contains(PYRAMID_MARKER) {
            TileSource::Pyramid(PathBuf::from(value))
        } else {
            TileSource::Dataset(PathBuf::from(value))
        }
    }

    /// Concrete input for one tile: a substituted URL or a dataset path.
    pub fn resolve(&self, tile: &TileAddress) -> Result<ResolvedSource, SourceError> {
        match self {
            TileSource::WebTiles(template) => Ok(ResolvedSource::Remote(template.substitute(tile))),
            TileSource::Pyramid(index) => Ok(ResolvedSource::Local(
                PyramidIndex::load(index)?.lookup(tile.zoom)?,
            )),
            TileSource::Dataset(path) => Ok(ResolvedSource::Local(path.clone())),
        }
    }

    /// Dataset used to discover the extent of a local source.
    ///
    /// For a pyramid index this is its first entry.
    pub fn root_dataset(&self) -> Result<Option<PathBuf>, SourceError> {
        match self {
            TileSource::WebTiles(_) => Ok(None),
            TileSource::Pyramid(index) => Ok(Some(PyramidIndex::load(index)?.first()?)),
            TileSource::Dataset(path) => Ok(Some(path.clone())),
        }
    }
}

/// A source resolved for a specific tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSource {
    Remote(String),
    Local(PathBuf),
}

/// Resolves a dataset name relative to the directory of the index naming it.
pub(crate) fn sibling_path(index: &Path, name: &str) -> PathBuf {
    match index.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(matches!(
            TileSource::parse("http://t/{$z}/{$x}/{$y}.png"),
            TileSource::WebTiles(_)
        ));
        assert_eq!(
            TileSource::parse("/data/dem.pyr"),
            TileSource::Pyramid(PathBuf::from("/data/dem.pyr"))
        );
        assert_eq!(
            TileSource::parse("/data/dem.tif"),
            TileSource::Dataset(PathBuf::from("/data/dem.tif"))
        );
    }

    #[test]
    fn test_substitute_uses_top_left_rows() {
        let template = UrlTemplate::new("http://t/{$z}/{$x}/{$y}.png");
        assert!(!template.invert_y());
        let tile = TileAddress::new(3, 5, 1).unwrap();
        assert_eq!(template.substitute(&tile), "http://t/3/5/6.png");
    }

    #[test]
    fn test_substitute_inv_y_keeps_bottom_left_rows() {
        let template = UrlTemplate::new("http://t/{$z}/{$x}/{$invY}.png");
        assert!(template.invert_y());
        let tile = TileAddress::new(3, 5, 1).unwrap();
        assert_eq!(template.substitute(&tile), "http://t/3/5/1.png");
    }

    #[test]
    fn test_substitute_query_style_template() {
        let template = UrlTemplate::new("http://t/tile?x={$x}&y={$y}&z={$z}");
        let tile = TileAddress::new(0, 0, 0).unwrap();
        assert_eq!(template.substitute(&tile), "http://t/tile?x=0&y=0&z=0");
    }

    #[test]
    fn test_resolve() {
        let tile = TileAddress::new(1, 1, 0).unwrap();
        let web = TileSource::parse("http://t/{$z}/{$x}/{$y}.png");
        assert_eq!(
            web.resolve(&tile).unwrap(),
            ResolvedSource::Remote("http://t/1/1/1.png".to_string())
        );
        assert_eq!(web.root_dataset().unwrap(), None);

        let local = TileSource::parse("/data/dem.tif");
        assert_eq!(
            local.resolve(&tile).unwrap(),
            ResolvedSource::Local(PathBuf::from("/data/dem.tif"))
        );
        assert!(TileSource::parse("/missing/dem.pyr").resolve(&tile).is_err());
    }

    #[test]
    fn test_sibling_path() {
        assert_eq!(
            sibling_path(Path::new("/data/dem.pyr"), "dem_z8.tif"),
            PathBuf::from("/data/dem_z8.tif")
        );
    }
}
