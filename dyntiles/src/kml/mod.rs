//! Hierarchical link generator.
//!
//! Builds the lazy KML link tree a viewer walks one level at a time. The
//! root document lists every tile of the starting zoom that covers the
//! requested extent; each tile document shows its own image and links to
//! the (up to four) children that are still inside the extent and zoom
//! range. Children are links only. Nothing below them is computed until
//! the viewer dereferences the link.
//!
//! Icons either point straight at a web tile ("passthrough") or back into
//! the compositor with the original request and the tile address.

mod document;
mod probe;
mod range;

pub use document::{
    draw_order, escape_xml, ChildLink, LinkDocument, Lod, Overlay, UNBOUNDED,
};
pub use probe::ProbeCache;
pub use range::{TileRange, TileRangeTable};

use crate::coord::{GlobalMercator, TileAddress};
use crate::provider::HttpClient;
use crate::query::{Extent, TileQuery, ZoomRange};
use crate::source::UrlTemplate;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Most links a root document may list.
pub const MAX_ROOT_TILES: u64 = 4096;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("Zoom {zoom} needs {count} root tiles for this extent (limit {limit}); use a lower minimum zoom or a smaller ullr")]
    TooManyRootTiles { zoom: u8, count: u64, limit: u64 },
}

/// Endpoints written into generated documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    /// URL of the document endpoint
    pub document_url: String,
    /// URL of the compositor endpoint
    pub tile_url: String,
    /// Image shown when a probed web tile is missing
    pub placeholder_url: String,
}

/// Per-request state shared by every node the request renders.
#[derive(Debug, Clone)]
pub struct LinkContext {
    pub extent: Extent,
    pub zoom: ZoomRange,
    /// Query text re-entered by every link, without `zxy`
    pub base_query: String,
    table: TileRangeTable,
}

impl LinkContext {
    pub fn new(
        mercator: &GlobalMercator,
        extent: Extent,
        zoom: ZoomRange,
        base_query: String,
    ) -> Self {
        let table = TileRangeTable::new(mercator, &extent);
        Self {
            extent,
            zoom,
            base_query,
            table,
        }
    }

    /// Context carried by the request itself: its own `ullr` and `zoom`.
    pub fn from_query(mercator: &GlobalMercator, query: &TileQuery) -> Self {
        Self::new(mercator, query.ullr, query.zoom, query.reentrant_query())
    }

    pub fn table(&self) -> &TileRangeTable {
        &self.table
    }

    fn link(&self, endpoint: &str, tile: &TileAddress) -> String {
        format!("{}?{}&zxy={}", endpoint, self.base_query, tile)
    }
}

/// How a tile's icon is referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconMode {
    /// Point at the web tile itself
    Passthrough { template: UrlTemplate, check_status: bool },
    /// Point back into the compositor
    Composite,
}

impl IconMode {
    pub fn for_query(query: &TileQuery) -> Self {
        if query.needs_compositing() {
            IconMode::Composite
        } else {
            IconMode::Passthrough {
                template: UrlTemplate::new(query.url.clone()),
                check_status: query.check_status,
            }
        }
    }
}

/// Produces root and tile documents.
pub struct LinkGenerator {
    mercator: GlobalMercator,
    settings: LinkSettings,
    http: Arc<dyn HttpClient>,
    probes: ProbeCache,
}

impl LinkGenerator {
    pub fn new(
        mercator: GlobalMercator,
        settings: LinkSettings,
        http: Arc<dyn HttpClient>,
        probes: ProbeCache,
    ) -> Self {
        Self {
            mercator,
            settings,
            http,
            probes,
        }
    }

    pub fn mercator(&self) -> &GlobalMercator {
        &self.mercator
    }

    /// Finite `minLodPixels` used for nodes that have children.
    fn min_lod_pixels(&self) -> i32 {
        i32::try_from(self.mercator.tile_size() / 2).unwrap_or(i32::MAX)
    }

    /// Root document: links to every tile at `start_zoom` inside the extent.
    ///
    /// Fails without enumerating anything when the extent holds more than
    /// [`MAX_ROOT_TILES`] tiles at that zoom.
    pub fn root_document(
        &self,
        ctx: &LinkContext,
        start_zoom: u8,
    ) -> Result<LinkDocument, LinkError> {
        let count = ctx.table.range(start_zoom).map_or(0, TileRange::tile_count);
        if count > MAX_ROOT_TILES {
            warn!(start_zoom, count, "Root document too large");
            return Err(LinkError::TooManyRootTiles {
                zoom: start_zoom,
                count,
                limit: MAX_ROOT_TILES,
            });
        }

        let lod = Lod::new(self.min_lod_pixels());
        let children = ctx
            .table
            .tiles_at(start_zoom)
            .into_iter()
            .map(|tile| self.child_link(ctx, tile, lod))
            .collect::<Vec<_>>();

        debug!(start_zoom, children = children.len(), "Generated root document");
        Ok(LinkDocument {
            tile: None,
            overlay: None,
            children,
        })
    }

    /// Document for one tile: its overlay plus links to in-range children.
    pub fn tile_document(
        &self,
        ctx: &LinkContext,
        mode: &IconMode,
        tile: TileAddress,
    ) -> LinkDocument {
        let child_tiles = ctx.table.children(&tile, ctx.zoom.max);

        let lod = if tile.zoom == ctx.zoom.min || child_tiles.is_empty() {
            Lod::unbounded()
        } else {
            Lod::new(self.min_lod_pixels())
        };

        let overlay = Overlay {
            bounds: self.mercator.address_bounds(&tile),
            lod,
            draw_order: draw_order(&tile),
            icon_href: self.icon_href(ctx, mode, &tile),
        };

        let children = child_tiles
            .into_iter()
            .map(|child| self.child_link(ctx, child, lod))
            .collect::<Vec<_>>();

        debug!(tile = %tile, children = children.len(), "Generated tile document");
        LinkDocument {
            tile: Some(tile),
            overlay: Some(overlay),
            children,
        }
    }

    fn child_link(&self, ctx: &LinkContext, tile: TileAddress, lod: Lod) -> ChildLink {
        ChildLink {
            tile,
            bounds: self.mercator.address_bounds(&tile),
            lod,
            href: ctx.link(&self.settings.document_url, &tile),
        }
    }

    fn icon_href(&self, ctx: &LinkContext, mode: &IconMode, tile: &TileAddress) -> String {
        match mode {
            IconMode::Composite => ctx.link(&self.settings.tile_url, tile),
            IconMode::Passthrough {
                template,
                check_status,
            } => {
                let url = template.substitute(tile);
                if *check_status && !self.probes.exists(self.http.as_ref(), &url) {
                    self.settings.placeholder_url.clone()
                } else {
                    url
                }
            }
        }
    }
}
