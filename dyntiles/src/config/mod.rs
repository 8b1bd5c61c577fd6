//! User configuration stored in `~/.dyntiles/config.ini`.
//!
//! # Example
//!
//! ```
//! use dyntiles::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! let service_config = config.service_config();
//! assert_eq!(service_config.tile_size(), 256);
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{
    default_log_file, DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_LOG_FILE_NAME,
    DEFAULT_PROBE_CACHE_TTL_SECS,
};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    CacheSettings, ConfigFile, DownloadSettings, LoggingSettings, ProbeSettings, ServerSettings,
    TileSettings,
};
