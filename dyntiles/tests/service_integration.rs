//! Integration tests for the tile service facade.
//!
//! These tests drive `DynTilesService` the way a viewer would:
//! - Walking the lazy link tree by following the hrefs it emits
//! - Passthrough icons with and without existence probes
//! - Compositing web tiles with a background and caching the result
//! - Discovering a local dataset root and fetching the tiles it links to

use image::{ImageFormat, Rgba, RgbaImage};
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use dyntiles::coord::BoundingBox;
use dyntiles::provider::{HttpClient, ProviderError};
use dyntiles::raster::{DatasetInfo, RasterError, RasterService, WarpRequest};
use dyntiles::service::{
    DynTilesService, Response, ServiceConfig, CONTENT_TYPE_KML, CONTENT_TYPE_PNG,
    CONTENT_TYPE_TEXT,
};

// =============================================================================
// Test Helpers
// =============================================================================

const DOCUMENT_URL: &str = "http://maps.test/kml";
const TILE_URL: &str = "http://maps.test/tile";
const PLACEHOLDER_URL: &str = "http://maps.test/blank.png";

fn png(color: [u8; 4], size: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    RgbaImage::from_pixel(size, size, Rgba(color))
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).unwrap().to_rgba8()
}

/// Tile server answering with a solid tile per host. URLs containing
/// `missing` do not exist.
#[derive(Default)]
struct FakeTileServer {
    colors: HashMap<String, [u8; 4]>,
    requests: Mutex<Vec<String>>,
}

impl FakeTileServer {
    fn with_host(mut self, host: &str, color: [u8; 4]) -> Self {
        self.colors.insert(host.to_string(), color);
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn color_for(&self, url: &str) -> Result<[u8; 4], ProviderError> {
        self.requests.lock().unwrap().push(url.to_string());
        if url.contains("missing") {
            return Err(ProviderError::Status {
                status: 404,
                url: url.to_string(),
            });
        }
        self.colors
            .iter()
            .find(|(host, _)| url.starts_with(host.as_str()))
            .map(|(_, color)| *color)
            .ok_or_else(|| ProviderError::HttpError(format!("unknown host in {}", url)))
    }
}

impl HttpClient for FakeTileServer {
    fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.color_for(url).map(|color| png(color, 256))
    }

    fn probe(&self, url: &str) -> Result<(), ProviderError> {
        self.color_for(url).map(|_| ())
    }
}

/// Raster service that paints solid tiles instead of running GDAL.
struct FakeRaster {
    fill: [u8; 4],
    info: Option<DatasetInfo>,
    calls: AtomicUsize,
}

impl FakeRaster {
    fn new(fill: [u8; 4]) -> Self {
        Self {
            fill,
            info: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn with_info(mut self, info: DatasetInfo) -> Self {
        self.info = Some(info);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl RasterService for FakeRaster {
    fn warp(&self, request: &WarpRequest<'_>, output: &Path) -> Result<(), RasterError> {
        self.count();
        fs::write(output, png(self.fill, request.size)).unwrap();
        Ok(())
    }

    fn coverage(&self, _input: &Path, output: &Path) -> Result<(), RasterError> {
        self.count();
        fs::write(output, png([255, 255, 255, 255], 256)).unwrap();
        Ok(())
    }

    fn georeference(
        &self,
        image: &Path,
        _bounds: &BoundingBox,
        output: &Path,
    ) -> Result<(), RasterError> {
        self.count();
        fs::copy(image, output).unwrap();
        Ok(())
    }

    fn color_relief(&self, input: &Path, _ramp: &Path, output: &Path) -> Result<(), RasterError> {
        self.count();
        fs::copy(input, output).unwrap();
        Ok(())
    }

    fn burn_mask(&self, _vector: &Path, _target: &Path) -> Result<(), RasterError> {
        self.count();
        Ok(())
    }

    fn describe(&self, dataset: &Path, _scratch: &Path) -> Result<DatasetInfo, RasterError> {
        self.count();
        self.info.ok_or_else(|| RasterError::Unreadable {
            path: dataset.to_path_buf(),
            reason: "not a raster".to_string(),
        })
    }
}

struct Harness {
    cache: TempDir,
    _scratch: TempDir,
    service: DynTilesService,
}

impl Harness {
    fn new(http: Arc<FakeTileServer>, raster: Arc<FakeRaster>) -> Self {
        let cache = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let config = ServiceConfig::builder()
            .document_url(DOCUMENT_URL)
            .tile_url(TILE_URL)
            .placeholder_url(PLACEHOLDER_URL)
            .cache_directory(cache.path())
            .scratch_directory(scratch.path())
            .build();
        let service = DynTilesService::with_collaborators(config, http, raster);
        Self {
            cache,
            _scratch: scratch,
            service,
        }
    }
}

fn text(response: &Response) -> &str {
    std::str::from_utf8(&response.body).unwrap()
}

/// Every `<href>` in a document, unescaped.
fn hrefs(kml: &str) -> Vec<String> {
    kml.split("<href>")
        .skip(1)
        .filter_map(|rest| rest.split_once("</href>"))
        .map(|(href, _)| href.replace("&amp;", "&"))
        .collect()
}

/// The query part of a link back into one of the service endpoints.
fn query_of<'a>(href: &'a str, endpoint: &str) -> &'a str {
    href.strip_prefix(endpoint)
        .and_then(|rest| rest.strip_prefix('?'))
        .unwrap_or_else(|| panic!("{} is not a link to {}", href, endpoint))
}

// =============================================================================
// Link tree
// =============================================================================

#[test]
fn test_walk_web_tile_tree_to_leaves() {
    let http = Arc::new(FakeTileServer::default());
    let raster = Arc::new(FakeRaster::new([0, 0, 0, 255]));
    let harness = Harness::new(http.clone(), raster.clone());

    let root = harness
        .service
        .document("url=http://a.test/{$z}/{$x}/{$y}.png;&zoom=1-3")
        .unwrap();
    assert_eq!(root.content_type, CONTENT_TYPE_KML);

    let mut frontier: Vec<String> = hrefs(text(&root))
        .iter()
        .map(|href| query_of(href, DOCUMENT_URL).to_string())
        .collect();
    assert_eq!(frontier.len(), 4);

    let mut documents = 0;
    let mut leaves = 0;
    while let Some(query) = frontier.pop() {
        let kml = harness.service.document(&query).unwrap();
        let kml = text(&kml).to_string();
        documents += 1;

        let links = hrefs(&kml);
        // First href is the passthrough icon
        assert!(links[0].starts_with("http://a.test/"));
        let children: Vec<&String> = links[1..].iter().collect();
        if children.is_empty() {
            leaves += 1;
            assert!(query.ends_with(|c: char| c.is_ascii_digit()));
            assert!(query.contains("zxy=3/"));
        }
        for child in children {
            frontier.push(query_of(child, DOCUMENT_URL).to_string());
        }
    }

    // 4 + 16 + 64 tiles below the root, 64 of them leaves
    assert_eq!(documents, 84);
    assert_eq!(leaves, 64);
    assert!(http.requests().is_empty());
    assert_eq!(raster.calls(), 0);
}

#[test]
fn test_check_status_replaces_missing_tiles() {
    let http = Arc::new(FakeTileServer::default().with_host("http://a.test/", [1, 2, 3, 255]));
    let harness = Harness::new(http.clone(), Arc::new(FakeRaster::new([0, 0, 0, 255])));

    let present = harness
        .service
        .document("url=http://a.test/{$z}/{$x}/{$invY}.png;&checkStatus&zxy=2/1/1")
        .unwrap();
    assert_eq!(hrefs(text(&present))[0], "http://a.test/2/1/1.png");

    let missing = harness
        .service
        .document("url=http://a.test/missing/{$z}/{$x}/{$y}.png;&checkStatus&zxy=2/1/1")
        .unwrap();
    assert_eq!(hrefs(text(&missing))[0], PLACEHOLDER_URL);

    assert_eq!(
        http.requests(),
        vec![
            "http://a.test/2/1/1.png".to_string(),
            "http://a.test/missing/2/1/2.png".to_string(),
        ]
    );
}

// =============================================================================
// Compositing
// =============================================================================

#[test]
fn test_composite_web_tiles_with_background() {
    let http = Arc::new(
        FakeTileServer::default()
            .with_host("http://a.test/", [200, 0, 0, 255])
            .with_host("http://b.test/", [0, 0, 200, 255]),
    );
    let raster = Arc::new(FakeRaster::new([0, 0, 0, 255]));
    let harness = Harness::new(http.clone(), raster.clone());

    let query = "url=http://a.test/{$z}/{$x}/{$y}.png;&bgurl=http://b.test/{$z}/{$x}/{$y}.png;\
                 &blend=0.25&cachedir=mix&zxy=4/3/9";

    // The document links the icon back into the tile endpoint
    let kml = harness.service.document(query).unwrap();
    let icon = hrefs(text(&kml))[0].clone();
    assert_eq!(query_of(&icon, TILE_URL), query);

    let tile = harness.service.tile(query_of(&icon, TILE_URL)).unwrap();
    assert_eq!(tile.content_type, CONTENT_TYPE_PNG);
    let image = decode(&tile.body);
    assert_eq!(image.dimensions(), (256, 256));
    assert_eq!(image.get_pixel(128, 128), &Rgba([150, 0, 50, 255]));

    assert_eq!(
        http.requests(),
        vec![
            "http://a.test/4/3/6.png".to_string(),
            "http://b.test/4/3/6.png".to_string(),
        ]
    );
    assert!(harness.cache.path().join("mix/4/3/9.png").is_file());

    // Served from the cache the second time
    let again = harness.service.tile(query).unwrap();
    assert_eq!(again, tile);
    assert_eq!(http.requests().len(), 2);
    assert_eq!(raster.calls(), 2);
}

#[test]
fn test_unreachable_web_tile_fails_the_tile() {
    let http = Arc::new(FakeTileServer::default());
    let harness = Harness::new(http, Arc::new(FakeRaster::new([0, 0, 0, 255])));

    let result = harness
        .service
        .tile("url=http://nowhere.test/{$z}/{$x}/{$y}.png;&bgurl=http://b.test/{$z}/{$x}/{$y}.png;&zxy=1/0/0");
    assert!(result.is_err());
    assert_eq!(fs::read_dir(harness.cache.path()).unwrap().count(), 0);
}

// =============================================================================
// Local datasets
// =============================================================================

#[test]
fn test_dataset_root_then_tile() {
    let raster = Arc::new(FakeRaster::new([10, 20, 30, 255]).with_info(DatasetInfo {
        cols: 1024,
        rows: 1024,
        geo_transform: [1.0, 0.0078125, 0.0, 9.0, 0.0, -0.0078125],
    }));
    let harness = Harness::new(Arc::new(FakeTileServer::default()), raster.clone());

    let root = harness
        .service
        .document("url=/data/dem.tif;&clrfile=/data/dem.clr;&")
        .unwrap();
    let links = hrefs(text(&root));
    assert_eq!(links.len(), 1);
    let child = query_of(&links[0], DOCUMENT_URL).to_string();
    assert_eq!(
        child,
        "url=/data/dem.tif;&clrfile=/data/dem.clr;&ullr=1_9_9_1&zoom=5-31&zxy=5/16/16"
    );

    let kml = harness.service.document(&child).unwrap();
    let links = hrefs(text(&kml));
    let icon_query = query_of(&links[0], TILE_URL).to_string();
    assert_eq!(icon_query, child);
    // Children stay inside the discovered extent
    for link in &links[1..] {
        assert!(query_of(link, DOCUMENT_URL).contains("zxy=6/"));
    }

    let tile = harness.service.tile(&icon_query).unwrap();
    assert_eq!(decode(&tile.body).get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    // describe, warp, coverage, color relief
    assert_eq!(raster.calls(), 4);
}

#[test]
fn test_unopenable_dataset_root_is_plain_text() {
    let harness = Harness::new(
        Arc::new(FakeTileServer::default()),
        Arc::new(FakeRaster::new([0, 0, 0, 255])),
    );

    let response = harness.service.document("url=/data/nothing.tif;&").unwrap();
    assert_eq!(response.content_type, CONTENT_TYPE_TEXT);
    assert_eq!(text(&response), "Could not open raster");
}
