//! Configuration file handling for ~/.dyntiles/config.ini.
//!
//! Settings structs live in [`super::settings`], constants in [`super::defaults`],
//! parsing in [`super::parser`], and serialization in [`super::writer`].

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::settings::ConfigFile;

use crate::service::ServiceConfig;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.dyntiles/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Write a default config file at `path` unless one already exists.
    ///
    /// Returns whether a file was written.
    pub fn init_at(path: &Path) -> Result<bool, ConfigFileError> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        Ok(true)
    }

    /// Service settings described by this file.
    pub fn service_config(&self) -> ServiceConfig {
        let mut builder = ServiceConfig::builder()
            .document_url(self.server.document_url.clone())
            .tile_url(self.server.tile_url.clone())
            .placeholder_url(self.server.placeholder_url.clone())
            .tile_size(self.tiles.size)
            .cache_directory(self.cache.directory.clone())
            .download_timeout_secs(self.download.timeout)
            .probe_ttl_secs(self.probe.cache_ttl);
        if let Some(dir) = &self.cache.scratch_directory {
            builder = builder.scratch_directory(dir.clone());
        }
        builder.build()
    }
}

/// Get the path to the config directory (~/.dyntiles).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dyntiles")
}

/// Get the path to the config file (~/.dyntiles/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
