//! High-level service facade.
//!
//! Wires the query parser, link generator, compositor and their HTTP and
//! raster collaborators behind two calls that take a raw query string.
//!
//! # Example
//!
//! ```ignore
//! use dyntiles::service::{DynTilesService, ServiceConfig};
//!
//! let config = ServiceConfig::builder()
//!     .cache_directory("/var/cache/dyntiles")
//!     .build();
//! let service = DynTilesService::new(config)?;
//!
//! let kml = service.document("url=http://t/{$z}/{$x}/{$y}.png;&zoom=1-8")?;
//! let png = service.tile("url=/data/dem.tif;&cachedir=dem&zxy=5/16/20")?;
//! ```

mod config;
mod error;
mod facade;

pub use config::{
    ServiceConfig, ServiceConfigBuilder, DEFAULT_CACHE_DIRECTORY, DEFAULT_DOCUMENT_URL,
    DEFAULT_PLACEHOLDER_URL, DEFAULT_TILE_URL,
};
pub use error::ServiceError;
pub use facade::{
    DynTilesService, Response, CONTENT_TYPE_KML, CONTENT_TYPE_PNG, CONTENT_TYPE_TEXT,
    OPEN_FAILURE_MESSAGE,
};
