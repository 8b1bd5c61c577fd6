//! Compositing pipeline.

use super::kernels::{apply_alpha, content_mask, cross_blend, value_mask};
use super::scratch::ScratchDir;
use super::{CompositeError, CompositeRequest};
use crate::cache::TileCache;
use crate::coord::{BoundingBox, GlobalMercator, TileAddress};
use crate::provider::HttpClient;
use crate::raster::{RasterService, Resampling, WarpRequest};
use crate::source::{ResolvedSource, TileSource};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::fs;
use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Renders tiles through the external raster service and the tile cache.
pub struct TileCompositor {
    mercator: GlobalMercator,
    http: Arc<dyn HttpClient>,
    raster: Arc<dyn RasterService>,
    cache: TileCache,
    scratch_root: Option<PathBuf>,
}

/// Which layer a source is rendered for.
#[derive(Debug, Clone, Copy)]
enum Layer {
    Primary,
    Background,
}

impl Layer {
    fn name(self) -> &'static str {
        match self {
            Layer::Primary => "primary",
            Layer::Background => "background",
        }
    }
}

impl TileCompositor {
    pub fn new(
        mercator: GlobalMercator,
        http: Arc<dyn HttpClient>,
        raster: Arc<dyn RasterService>,
        cache: TileCache,
    ) -> Self {
        Self {
            mercator,
            http,
            raster,
            cache,
            scratch_root: None,
        }
    }

    /// Place per-request scratch directories under `root` instead of the
    /// system temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    /// Returns the PNG bytes for a tile, from the cache when present.
    #[instrument(skip(self, request), fields(tile = %request.tile))]
    pub fn composite(&self, request: &CompositeRequest) -> Result<Vec<u8>, CompositeError> {
        let tile = request.tile;
        let cachedir = request.cachedir.as_deref().unwrap_or("");

        match self.cache.get(cachedir, &tile) {
            Ok(Some(data)) => {
                debug!(bytes = data.len(), "Serving cached tile");
                return Ok(data);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Cache read failed, compositing instead"),
        }

        let bounds = self.mercator.address_bounds(&tile);
        let scratch = ScratchDir::new(self.scratch_root.as_deref())?;

        let image = self.render(request, &bounds, &scratch)?;
        let data = encode_png(&image)?;

        if let Some(dir) = &request.cachedir {
            if let Err(e) = self.cache.put(dir, &tile, &data) {
                warn!(error = %e, cachedir = %dir, "Failed to cache tile");
            }
        }

        info!(
            zoom = tile.zoom,
            col = tile.col,
            row = tile.row,
            bytes = data.len(),
            "Composited tile"
        );
        Ok(data)
    }

    fn render(
        &self,
        request: &CompositeRequest,
        bounds: &BoundingBox,
        scratch: &ScratchDir,
    ) -> Result<RgbaImage, CompositeError> {
        let primary = scratch.file("primary.tif");
        self.render_source(
            &request.primary,
            &request.tile,
            bounds,
            request.resampling,
            Layer::Primary,
            scratch,
            &primary,
        )?;

        // Coverage of the primary source alone, before any ramp or blend.
        // A ramp input keeps its source data type, so its coverage comes
        // from the raster service as an 8-bit mask.
        let (mut mask, working) = match &request.color_ramp {
            Some(ramp) => {
                let coverage = scratch.file("coverage.png");
                self.raster.coverage(&primary, &coverage)?;
                let mask = value_mask(&decode_raster("coverage", &coverage)?.to_luma8());

                let relief = scratch.file("relief.tif");
                self.raster.color_relief(&primary, ramp, &relief)?;
                (mask, relief)
            }
            None => (content_mask(&read_raster("primary", &primary)?), primary),
        };

        if let Some(vector) = &request.vector_mask {
            self.raster.burn_mask(vector, &working)?;
        }

        let foreground = read_raster("foreground", &working)?;
        let (width, height) = foreground.dimensions();
        if mask.dimensions() != (width, height) {
            mask = imageops::resize(&mask, width, height, FilterType::Nearest);
        }

        let mut image = match &request.background {
            Some(source) => {
                let path = scratch.file("background.tif");
                self.render_source(
                    source,
                    &request.tile,
                    bounds,
                    request.resampling,
                    Layer::Background,
                    scratch,
                    &path,
                )?;
                let mut background = read_raster("background", &path)?;
                if background.dimensions() != (width, height) {
                    background = imageops::resize(&background, width, height, FilterType::Triangle);
                }
                debug!(blend = request.blend, "Blending background");
                cross_blend(&foreground, &background, request.blend)
            }
            None => foreground.clone(),
        };

        apply_alpha(&mut image, &mask, &foreground, request.outside_mask);
        Ok(image)
    }

    /// Writes a georeferenced tile for `source` to `output`.
    #[allow(clippy::too_many_arguments)]
    fn render_source(
        &self,
        source: &TileSource,
        tile: &TileAddress,
        bounds: &BoundingBox,
        resampling: Resampling,
        layer: Layer,
        scratch: &ScratchDir,
        output: &Path,
    ) -> Result<(), CompositeError> {
        match source.resolve(tile)? {
            ResolvedSource::Remote(url) => {
                debug!(layer = layer.name(), url = %url, "Fetching web tile");
                let bytes = self.http.get(&url)?;
                let decoded =
                    image::load_from_memory(&bytes).map_err(|source| CompositeError::Decode {
                        what: url.clone(),
                        source,
                    })?;

                // Normalise whatever the server sent to RGBA PNG
                let png = scratch.file(&format!("{}_web.png", layer.name()));
                decoded
                    .to_rgba8()
                    .save_with_format(&png, ImageFormat::Png)
                    .map_err(CompositeError::Encode)?;

                self.raster.georeference(&png, bounds, output)?;
            }
            ResolvedSource::Local(dataset) => {
                debug!(
                    layer = layer.name(),
                    dataset = %dataset.display(),
                    "Resampling dataset"
                );
                let request = WarpRequest {
                    source: &dataset,
                    bounds: *bounds,
                    size: self.mercator.tile_size(),
                    resampling,
                    dst_alpha: matches!(layer, Layer::Primary),
                };
                self.raster.warp(&request, output)?;
            }
        }
        Ok(())
    }
}

/// Reads an intermediate raster produced by the raster service.
fn read_raster(step: &'static str, path: &Path) -> Result<RgbaImage, CompositeError> {
    decode_raster(step, path).map(|img| img.to_rgba8())
}

fn decode_raster(step: &'static str, path: &Path) -> Result<DynamicImage, CompositeError> {
    let missing = || CompositeError::MissingOutput {
        step,
        path: path.to_path_buf(),
    };

    let data = match fs::read(path) {
        Ok(data) if data.is_empty() => return Err(missing()),
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(missing()),
        Err(e) => return Err(e.into()),
    };

    image::load_from_memory(&data).map_err(|source| CompositeError::Decode {
        what: format!("{} raster {}", step, path.display()),
        source,
    })
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CompositeError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(CompositeError::Encode)?;
    Ok(buffer.into_inner())
}
