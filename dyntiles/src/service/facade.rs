//! Tile service facade implementation.

use super::config::ServiceConfig;
use super::error::ServiceError;
use crate::cache::TileCache;
use crate::compositor::{CompositeRequest, TileCompositor};
use crate::coord::GlobalMercator;
use crate::dataset::DatasetRoot;
use crate::kml::{IconMode, LinkContext, LinkGenerator, LinkSettings, ProbeCache};
use crate::provider::{HttpClient, ReqwestClient};
use crate::query::TileQuery;
use crate::raster::{GdalCommandService, RasterService};
use crate::source::TileSource;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const CONTENT_TYPE_KML: &str = "text/xml";
pub const CONTENT_TYPE_PNG: &str = "image/png";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// Body returned when a dataset root cannot be opened.
pub const OPEN_FAILURE_MESSAGE: &str = "Could not open raster";

/// A response body with its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    pub fn kml(document: String) -> Self {
        Self {
            content_type: CONTENT_TYPE_KML,
            body: document.into_bytes(),
        }
    }

    pub fn png(data: Vec<u8>) -> Self {
        Self {
            content_type: CONTENT_TYPE_PNG,
            body: data,
        }
    }

    pub fn text(message: &str) -> Self {
        Self {
            content_type: CONTENT_TYPE_TEXT,
            body: message.as_bytes().to_vec(),
        }
    }
}

/// Entry point for the two request kinds: link documents and tiles.
///
/// Each call is independent. The only state shared between calls is the
/// on-disk cache and, when enabled, the probe-result cache.
///
/// # Example
///
/// ```ignore
/// use dyntiles::service::{DynTilesService, ServiceConfig};
///
/// let service = DynTilesService::new(ServiceConfig::default())?;
/// let response = service.document("url=/data/dem.tif;&")?;
/// ```
pub struct DynTilesService {
    config: ServiceConfig,
    mercator: GlobalMercator,
    raster: Arc<dyn RasterService>,
    compositor: TileCompositor,
    links: LinkGenerator,
}

impl DynTilesService {
    /// Creates a service backed by reqwest and the GDAL command-line tools.
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        let http = ReqwestClient::with_timeout(config.download_timeout_secs())
            .map_err(ServiceError::HttpClientError)?;
        Ok(Self::with_collaborators(
            config,
            Arc::new(http),
            Arc::new(GdalCommandService::new()),
        ))
    }

    /// Creates a service with explicit HTTP and raster collaborators.
    pub fn with_collaborators(
        config: ServiceConfig,
        http: Arc<dyn HttpClient>,
        raster: Arc<dyn RasterService>,
    ) -> Self {
        let mercator = GlobalMercator::new(config.tile_size());

        let cache = TileCache::new(config.cache_directory(), "png");
        let mut compositor =
            TileCompositor::new(mercator, Arc::clone(&http), Arc::clone(&raster), cache);
        if let Some(dir) = config.scratch_directory() {
            compositor = compositor.with_scratch_root(dir);
        }

        let settings = LinkSettings {
            document_url: config.document_url().to_string(),
            tile_url: config.tile_url().to_string(),
            placeholder_url: config.placeholder_url().to_string(),
        };
        let probes = ProbeCache::new(Duration::from_secs(config.probe_ttl_secs()));
        let links = LinkGenerator::new(mercator, settings, http, probes);

        Self {
            config,
            mercator,
            raster,
            compositor,
            links,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Serves a link document for a raw query string.
    ///
    /// Without `zxy` this is the root document. A root over a local dataset
    /// first discovers the dataset extent; if the dataset cannot be opened
    /// the response is a plain-text error instead of a document.
    pub fn document(&self, raw_query: &str) -> Result<Response, ServiceError> {
        let query = TileQuery::parse(raw_query)?;

        let document = match query.zxy {
            Some(tile) => {
                let ctx = LinkContext::from_query(&self.mercator, &query);
                self.links
                    .tile_document(&ctx, &IconMode::for_query(&query), tile)
            }
            None if query.is_web_tiles() => {
                let ctx = LinkContext::from_query(&self.mercator, &query);
                self.links.root_document(&ctx, query.zoom.min)?
            }
            None => {
                let root = match DatasetRoot::discover(
                    self.raster.as_ref(),
                    &self.mercator,
                    &TileSource::parse(&query.url),
                    self.config.scratch_directory(),
                ) {
                    Ok(root) => root,
                    Err(e) => {
                        warn!(url = %query.url, error = %e, "Could not open dataset");
                        return Ok(Response::text(OPEN_FAILURE_MESSAGE));
                    }
                };
                let ctx = root.link_context(&self.mercator, &query);
                self.links.root_document(&ctx, root.start_zoom)?
            }
        };

        debug!(
            title = %document.title(),
            children = document.children.len(),
            "Serving link document"
        );
        Ok(Response::kml(document.render()))
    }

    /// Serves a composited PNG tile for a raw query string.
    pub fn tile(&self, raw_query: &str) -> Result<Response, ServiceError> {
        let query = TileQuery::parse(raw_query)?;
        let request = CompositeRequest::from_query(&query);
        let data = self.compositor.composite(&request)?;
        Ok(Response::png(data))
    }
}
