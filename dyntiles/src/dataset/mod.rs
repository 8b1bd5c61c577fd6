//! Root extent discovery for local datasets.
//!
//! A root document for a local dataset is not given an extent by the
//! caller. The dataset is reprojected to geographic coordinates through the
//! raster service, its footprint is clamped to the renderable range, and the
//! coarsest zoom that still shows it at native resolution becomes the first
//! level of the link tree.

use crate::compositor::ScratchDir;
use crate::coord::{GlobalMercator, MAX_ZOOM};
use crate::kml::LinkContext;
use crate::query::{Extent, TileQuery, ZoomRange};
use crate::raster::{RasterError, RasterService};
use crate::source::{SourceError, TileSource};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Latitude limit applied to discovered extents.
pub const MAX_EXTENT_LAT: f64 = 89.9;

/// Longitude limit applied to discovered extents.
pub const MAX_EXTENT_LON: f64 = 180.0;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Source has no local dataset to open")]
    NotLocal,

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error("Failed to create scratch directory: {0}")]
    Scratch(#[from] std::io::Error),

    #[error("Raster {0} has no pixels")]
    Empty(PathBuf),
}

/// Geographic footprint and starting zoom of a local dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetRoot {
    pub extent: Extent,
    pub start_zoom: u8,
    pub cols: u32,
    pub rows: u32,
    /// Pixel width in projected meters
    pub pixel_width: f64,
}

impl DatasetRoot {
    /// Opens the dataset behind `source` and derives its root parameters.
    ///
    /// For a pyramid index the first entry is opened.
    pub fn discover(
        raster: &dyn RasterService,
        mercator: &GlobalMercator,
        source: &TileSource,
        scratch_root: Option<&Path>,
    ) -> Result<Self, DatasetError> {
        let dataset = source.root_dataset()?.ok_or(DatasetError::NotLocal)?;
        let scratch = ScratchDir::new(scratch_root)?;

        let info = raster.describe(&dataset, scratch.path())?;
        if info.cols == 0 || info.rows == 0 {
            return Err(DatasetError::Empty(dataset));
        }

        let (ulx, uly, lrx, lry) = info.corners();
        let extent = Extent::new(
            ulx.max(-MAX_EXTENT_LON),
            uly.min(MAX_EXTENT_LAT),
            lrx.min(MAX_EXTENT_LON),
            lry.max(-MAX_EXTENT_LAT),
        );

        let min = mercator.geo_to_projected(extent.north, extent.west);
        let max = mercator.geo_to_projected(extent.south, extent.east);
        let pixel_width = (max.x - min.x) / f64::from(info.cols);

        let longest = f64::from(info.cols.max(info.rows));
        let start_zoom =
            mercator.zoom_for_pixel_size(pixel_width * longest / f64::from(mercator.tile_size()));

        info!(
            dataset = %dataset.display(),
            extent = %extent,
            start_zoom,
            "Discovered dataset root"
        );

        Ok(Self {
            extent,
            start_zoom,
            cols: info.cols,
            rows: info.rows,
            pixel_width,
        })
    }

    /// Zoom range for the link tree: the caller's if given, otherwise from
    /// the start zoom to the deepest level.
    pub fn zoom_range(&self, query: &TileQuery) -> ZoomRange {
        if query.zoom_given {
            query.zoom
        } else {
            ZoomRange::new(self.start_zoom, MAX_ZOOM)
        }
    }

    /// Link context whose re-entrant links carry the discovered extent and,
    /// when the caller gave none, the derived zoom range.
    pub fn link_context(&self, mercator: &GlobalMercator, query: &TileQuery) -> LinkContext {
        let zoom = self.zoom_range(query);

        let mut base = query.query_string().raw_without(&["zxy", "ullr"]);
        base.push_str(&format!("&ullr={}", self.extent));
        if !query.zoom_given {
            base.push_str(&format!("&zoom={}", zoom));
        }

        debug!(base = %base, "Dataset link base");
        LinkContext::new(mercator, self.extent, zoom, base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{DatasetInfo, MockRasterService};
    use tempfile::TempDir;

    fn info(geo_transform: [f64; 6], cols: u32, rows: u32) -> DatasetInfo {
        DatasetInfo {
            cols,
            rows,
            geo_transform,
        }
    }

    fn discover(raster: &MockRasterService, url: &str) -> Result<DatasetRoot, DatasetError> {
        let scratch = TempDir::new().unwrap();
        DatasetRoot::discover(
            raster,
            &GlobalMercator::default(),
            &TileSource::parse(url),
            Some(scratch.path()),
        )
    }

    #[test]
    fn test_extent_is_clamped() {
        let raster = MockRasterService::new()
            .with_describe(info([-200.0, 1.0, 0.0, 95.0, 0.0, -1.0], 400, 190));
        let root = discover(&raster, "/data/world.tif").unwrap();

        assert_eq!(root.extent, Extent::new(-180.0, 89.9, 180.0, -89.9));
        assert_eq!(raster.calls(), vec!["describe /data/world.tif".to_string()]);
    }

    #[test]
    fn test_start_zoom_from_native_resolution() {
        // 10 degrees at 0.01 degree pixels
        let raster = MockRasterService::new()
            .with_describe(info([0.0, 0.01, 0.0, 10.0, 0.0, -0.01], 1000, 1000));
        let root = discover(&raster, "/data/tile.tif").unwrap();

        let mercator = GlobalMercator::default();
        let expected = mercator.zoom_for_pixel_size(root.pixel_width * 1000.0 / 256.0);
        assert_eq!(root.start_zoom, expected);
        assert_eq!(root.start_zoom, 5);
        assert!((root.pixel_width - 1113.1949).abs() < 0.01);
    }

    #[test]
    fn test_pyramid_opens_first_entry() {
        let dir = TempDir::new().unwrap();
        let index = dir.path().join("dem.pyr");
        std::fs::write(&index, "6 coarse.tif\n12 fine.tif\n").unwrap();

        let raster = MockRasterService::new()
            .with_describe(info([0.0, 0.01, 0.0, 10.0, 0.0, -0.01], 1000, 1000));
        discover(&raster, index.to_str().unwrap()).unwrap();

        let expected = format!("describe {}", dir.path().join("coarse.tif").display());
        assert_eq!(raster.calls(), vec![expected]);
    }

    #[test]
    fn test_unreadable_dataset() {
        let raster = MockRasterService::new();
        let result = discover(&raster, "/data/missing.tif");
        assert!(matches!(result, Err(DatasetError::Raster(_))));
    }

    #[test]
    fn test_web_tiles_have_no_dataset() {
        let raster = MockRasterService::new();
        let result = discover(&raster, "http://t/{$z}/{$x}/{$y}.png");
        assert!(matches!(result, Err(DatasetError::NotLocal)));
        assert_eq!(raster.call_count(), 0);
    }

    #[test]
    fn test_empty_raster() {
        let raster =
            MockRasterService::new().with_describe(info([0.0, 1.0, 0.0, 0.0, 0.0, -1.0], 0, 10));
        assert!(matches!(
            discover(&raster, "/data/empty.tif"),
            Err(DatasetError::Empty(_))
        ));
    }

    #[test]
    fn test_link_context_carries_derived_extent_and_zoom() {
        let root = DatasetRoot {
            extent: Extent::new(0.0, 10.0, 10.0, 0.0),
            start_zoom: 5,
            cols: 1000,
            rows: 1000,
            pixel_width: 1113.19,
        };
        let mercator = GlobalMercator::default();

        let query = TileQuery::parse("url=/data/tile.tif;&ullr=1_4_3_2&blend=0.3").unwrap();
        let ctx = root.link_context(&mercator, &query);
        assert_eq!(ctx.zoom, ZoomRange::new(5, 31));
        assert_eq!(ctx.base_query, "url=/data/tile.tif;&blend=0.3&ullr=0_10_10_0&zoom=5-31");

        let query = TileQuery::parse("url=/data/tile.tif;&zoom=3-9").unwrap();
        let ctx = root.link_context(&mercator, &query);
        assert_eq!(ctx.zoom, ZoomRange::new(3, 9));
        assert_eq!(ctx.base_query, "url=/data/tile.tif;&zoom=3-9&ullr=0_10_10_0");
    }
}
