//! Tile compositor.
//!
//! Produces one finished PNG tile from a [`CompositeRequest`]:
//!
//! ```text
//! cache hit? ──yes──> cached bytes
//!     │no
//! render primary ─> content mask ─> color ramp? ─> vector burn?
//!     ─> blend with background? ─> final alpha ─> PNG ─> cache (if cachedir)
//! ```
//!
//! Intermediate rasters live in a per-request [`ScratchDir`] that is removed
//! when the request finishes, successfully or not.

mod kernels;
mod pipeline;
mod scratch;

pub use kernels::{apply_alpha, content_mask, cross_blend, MASK_ON};
pub use pipeline::TileCompositor;
pub use scratch::ScratchDir;

use crate::coord::TileAddress;
use crate::provider::ProviderError;
use crate::query::TileQuery;
use crate::raster::{RasterError, Resampling};
use crate::source::{SourceError, TileSource};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while compositing a tile.
#[derive(Debug, Error)]
pub enum CompositeError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Failed to fetch web tile: {0}")]
    Fetch(#[from] ProviderError),

    #[error(transparent)]
    Raster(#[from] RasterError),

    /// An intermediate raster is missing or empty, usually because the
    /// tool that should have produced it failed
    #[error("No usable {step} raster at {path}")]
    MissingOutput { step: &'static str, path: PathBuf },

    #[error("Failed to decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode tile: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Scratch file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything needed to render one tile.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeRequest {
    pub tile: TileAddress,
    pub primary: TileSource,
    pub color_ramp: Option<PathBuf>,
    pub background: Option<TileSource>,
    pub vector_mask: Option<PathBuf>,
    /// Weight of the background in the cross blend
    pub blend: f32,
    pub outside_mask: bool,
    pub resampling: Resampling,
    /// Cache subdirectory; `None` disables writing to the cache
    pub cachedir: Option<String>,
}

impl CompositeRequest {
    pub fn new(tile: TileAddress, primary: TileSource) -> Self {
        Self {
            tile,
            primary,
            color_ramp: None,
            background: None,
            vector_mask: None,
            blend: crate::query::DEFAULT_BLEND,
            outside_mask: false,
            resampling: Resampling::default(),
            cachedir: None,
        }
    }

    pub fn from_query(query: &TileQuery) -> Self {
        Self {
            tile: query.address(),
            primary: TileSource::parse(&query.url),
            color_ramp: query.clrfile.clone(),
            background: query.bgurl.as_deref().map(TileSource::parse),
            vector_mask: query.shpfile.clone(),
            blend: query.blend,
            outside_mask: query.outside_mask,
            resampling: query.resample,
            cachedir: query.cachedir.clone(),
        }
    }
}
