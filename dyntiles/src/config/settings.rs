//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub server: ServerSettings,
    pub tiles: TileSettings,
    pub cache: CacheSettings,
    pub download: DownloadSettings,
    pub probe: ProbeSettings,
    pub logging: LoggingSettings,
}

/// Public endpoints written into generated documents.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    /// URL of the link document endpoint
    pub document_url: String,
    /// URL of the tile endpoint
    pub tile_url: String,
    /// Image linked in place of missing web tiles
    pub placeholder_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileSettings {
    /// Tile edge length in pixels
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Root of the tile cache; `cachedir` request values are relative to it
    pub directory: PathBuf,
    /// Parent of per-request scratch directories (system temp dir if unset)
    pub scratch_directory: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    /// Web tile request timeout in seconds
    pub timeout: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeSettings {
    /// Seconds a tile probe result is reused; 0 disables reuse
    pub cache_ttl: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
