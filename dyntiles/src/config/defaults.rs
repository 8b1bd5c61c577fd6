//! Default values for all configuration settings.

use std::path::PathBuf;

use super::settings::*;
use crate::coord::DEFAULT_TILE_SIZE;
use crate::provider::DEFAULT_TIMEOUT_SECS;
use crate::service::{
    DEFAULT_CACHE_DIRECTORY, DEFAULT_DOCUMENT_URL, DEFAULT_PLACEHOLDER_URL, DEFAULT_TILE_URL,
};

/// Default download timeout in seconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = DEFAULT_TIMEOUT_SECS;

/// Default probe result lifetime; 0 probes every time.
pub const DEFAULT_PROBE_CACHE_TTL_SECS: u64 = 0;

/// Default log file name inside the log directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "dyntiles.log";

/// Default log file: `~/.dyntiles/logs/dyntiles.log`.
pub fn default_log_file() -> PathBuf {
    super::file::config_directory()
        .join("logs")
        .join(DEFAULT_LOG_FILE_NAME)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                document_url: DEFAULT_DOCUMENT_URL.to_string(),
                tile_url: DEFAULT_TILE_URL.to_string(),
                placeholder_url: DEFAULT_PLACEHOLDER_URL.to_string(),
            },
            tiles: TileSettings {
                size: DEFAULT_TILE_SIZE,
            },
            cache: CacheSettings {
                directory: PathBuf::from(DEFAULT_CACHE_DIRECTORY),
                scratch_directory: None,
            },
            download: DownloadSettings {
                timeout: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            },
            probe: ProbeSettings {
                cache_ttl: DEFAULT_PROBE_CACHE_TTL_SECS,
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}
