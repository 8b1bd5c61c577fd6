//! DynTiles - on-demand map tiles and KML link trees
//!
//! This library composites map tiles from web tile servers and local raster
//! datasets on request, and generates the lazily expanded KML documents a
//! virtual globe uses to walk the tile pyramid.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides a simplified facade:
//!
//! ```ignore
//! use dyntiles::service::{DynTilesService, ServiceConfig};
//!
//! let service = DynTilesService::new(ServiceConfig::default())?;
//!
//! // Root document for a local dataset
//! let kml = service.document("url=/data/dem.tif;&clrfile=/data/dem.clr;&")?;
//!
//! // One composited tile
//! let png = service.tile("url=/data/dem.tif;&clrfile=/data/dem.clr;&zxy=6/33/40")?;
//! ```

pub mod cache;
pub mod compositor;
pub mod config;
pub mod coord;
pub mod dataset;
pub mod kml;
pub mod logging;
pub mod provider;
pub mod query;
pub mod raster;
pub mod service;
pub mod source;

/// Version of the DynTiles library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
