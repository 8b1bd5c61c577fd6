//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and service creation
//! for the request-serving commands.

use crate::error::CliError;
use dyntiles::config::{config_file_path, ConfigFile};
use dyntiles::logging::{init_logging, LoggingGuard};
use dyntiles::service::DynTilesService;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Load the config (defaults if the file is missing) and start logging.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Config file to use instead of `~/.dyntiles/config.ini`
    /// * `debug_mode` - When true, enables debug-level logging unless RUST_LOG is set
    pub fn new(config_path: Option<&Path>, debug_mode: bool) -> Result<Self, CliError> {
        let path = resolve_config_path(config_path);
        let config = ConfigFile::load_from(&path)?;

        let logging_guard = init_logging(&config.logging.file, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;
        debug!(config = %path.display(), "Loaded configuration");

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!(version = dyntiles::VERSION, command, "DynTiles request");
    }

    /// Create a service from the loaded configuration.
    pub fn create_service(&self) -> Result<DynTilesService, CliError> {
        DynTilesService::new(self.config.service_config()).map_err(CliError::ServiceCreation)
    }
}

/// The explicit config path, or the default location.
pub fn resolve_config_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path)
}
