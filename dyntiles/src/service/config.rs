//! Service configuration types.

use crate::coord::DEFAULT_TILE_SIZE;
use crate::provider::DEFAULT_TIMEOUT_SECS;
use std::path::{Path, PathBuf};

pub const DEFAULT_DOCUMENT_URL: &str = "http://localhost:8080/cgi-bin/generate_kml";
pub const DEFAULT_TILE_URL: &str = "http://localhost:8090/cgi-bin/generate_dynamic_tiles";
pub const DEFAULT_PLACEHOLDER_URL: &str = "http://localhost:8080/static/transparent.png";
pub const DEFAULT_CACHE_DIRECTORY: &str = "dynamic_tiles";

/// Configuration for the tile service.
///
/// # Example
///
/// ```
/// use dyntiles::service::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .cache_directory("/var/cache/dyntiles")
///     .download_timeout_secs(10)
///     .build();
///
/// assert_eq!(config.download_timeout_secs(), 10);
/// assert_eq!(config.tile_size(), 256);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Endpoint that serves link documents
    document_url: String,
    /// Endpoint that serves composited tiles
    tile_url: String,
    /// Image linked when a probed web tile is missing
    placeholder_url: String,
    /// Tile edge length in pixels
    tile_size: u32,
    /// Root of the tile cache
    cache_directory: PathBuf,
    /// Parent of per-request scratch directories (system temp dir if unset)
    scratch_directory: Option<PathBuf>,
    /// Timeout for web tile downloads and probes
    download_timeout_secs: u64,
    /// Lifetime of probe results; 0 disables the probe cache
    probe_ttl_secs: u64,
}

impl ServiceConfig {
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    pub fn document_url(&self) -> &str {
        &self.document_url
    }

    pub fn tile_url(&self) -> &str {
        &self.tile_url
    }

    pub fn placeholder_url(&self) -> &str {
        &self.placeholder_url
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn cache_directory(&self) -> &Path {
        &self.cache_directory
    }

    pub fn scratch_directory(&self) -> Option<&Path> {
        self.scratch_directory.as_deref()
    }

    pub fn download_timeout_secs(&self) -> u64 {
        self.download_timeout_secs
    }

    pub fn probe_ttl_secs(&self) -> u64 {
        self.probe_ttl_secs
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            document_url: DEFAULT_DOCUMENT_URL.to_string(),
            tile_url: DEFAULT_TILE_URL.to_string(),
            placeholder_url: DEFAULT_PLACEHOLDER_URL.to_string(),
            tile_size: DEFAULT_TILE_SIZE,
            cache_directory: PathBuf::from(DEFAULT_CACHE_DIRECTORY),
            scratch_directory: None,
            download_timeout_secs: DEFAULT_TIMEOUT_SECS,
            probe_ttl_secs: 0,
        }
    }
}

/// Builder for [`ServiceConfig`]. Unset fields keep their defaults.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfigBuilder {
    document_url: Option<String>,
    tile_url: Option<String>,
    placeholder_url: Option<String>,
    tile_size: Option<u32>,
    cache_directory: Option<PathBuf>,
    scratch_directory: Option<PathBuf>,
    download_timeout_secs: Option<u64>,
    probe_ttl_secs: Option<u64>,
}

impl ServiceConfigBuilder {
    pub fn document_url(mut self, url: impl Into<String>) -> Self {
        self.document_url = Some(url.into());
        self
    }

    pub fn tile_url(mut self, url: impl Into<String>) -> Self {
        self.tile_url = Some(url.into());
        self
    }

    pub fn placeholder_url(mut self, url: impl Into<String>) -> Self {
        self.placeholder_url = Some(url.into());
        self
    }

    pub fn tile_size(mut self, size: u32) -> Self {
        self.tile_size = Some(size);
        self
    }

    pub fn cache_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_directory = Some(dir.into());
        self
    }

    pub fn scratch_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_directory = Some(dir.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.download_timeout_secs = Some(secs);
        self
    }

    pub fn probe_ttl_secs(mut self, secs: u64) -> Self {
        self.probe_ttl_secs = Some(secs);
        self
    }

    pub fn build(self) -> ServiceConfig {
        let defaults = ServiceConfig::default();
        ServiceConfig {
            document_url: self.document_url.unwrap_or(defaults.document_url),
            tile_url: self.tile_url.unwrap_or(defaults.tile_url),
            placeholder_url: self.placeholder_url.unwrap_or(defaults.placeholder_url),
            tile_size: self.tile_size.unwrap_or(defaults.tile_size),
            cache_directory: self.cache_directory.unwrap_or(defaults.cache_directory),
            scratch_directory: self.scratch_directory.or(defaults.scratch_directory),
            download_timeout_secs: self
                .download_timeout_secs
                .unwrap_or(defaults.download_timeout_secs),
            probe_ttl_secs: self.probe_ttl_secs.unwrap_or(defaults.probe_ttl_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.document_url(), DEFAULT_DOCUMENT_URL);
        assert_eq!(config.tile_url(), DEFAULT_TILE_URL);
        assert_eq!(config.placeholder_url(), DEFAULT_PLACEHOLDER_URL);
        assert_eq!(config.tile_size(), 256);
        assert_eq!(config.cache_directory(), Path::new("dynamic_tiles"));
        assert_eq!(config.scratch_directory(), None);
        assert_eq!(config.download_timeout_secs(), 30);
        assert_eq!(config.probe_ttl_secs(), 0);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ServiceConfig::builder()
            .document_url("http://h/kml")
            .tile_url("http://h/tile")
            .placeholder_url("http://h/blank.png")
            .tile_size(512)
            .scratch_directory("/tmp/scratch")
            .probe_ttl_secs(60)
            .build();

        assert_eq!(config.document_url(), "http://h/kml");
        assert_eq!(config.tile_url(), "http://h/tile");
        assert_eq!(config.placeholder_url(), "http://h/blank.png");
        assert_eq!(config.tile_size(), 512);
        assert_eq!(config.scratch_directory(), Some(Path::new("/tmp/scratch")));
        assert_eq!(config.probe_ttl_secs(), 60);
        assert_eq!(config.download_timeout_secs(), 30);
    }

    #[test]
    fn test_empty_builder_matches_default() {
        assert_eq!(ServiceConfig::builder().build(), ServiceConfig::default());
    }
}
