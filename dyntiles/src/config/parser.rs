//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [server] section
    if let Some(section) = ini.section(Some("server")) {
        if let Some(v) = section.get("document_url").and_then(non_empty) {
            config.server.document_url = v.to_string();
        }
        if let Some(v) = section.get("tile_url").and_then(non_empty) {
            config.server.tile_url = v.to_string();
        }
        if let Some(v) = section.get("placeholder_url").and_then(non_empty) {
            config.server.placeholder_url = v.to_string();
        }
    }

    // [tiles] section
    if let Some(section) = ini.section(Some("tiles")) {
        if let Some(v) = section.get("size") {
            let size: u32 = v
                .trim()
                .parse()
                .map_err(|_| invalid("tiles", "size", v, "must be a positive integer (pixels)"))?;
            if size == 0 || !size.is_power_of_two() {
                return Err(invalid("tiles", "size", v, "must be a power of two"));
            }
            config.tiles.size = size;
        }
    }

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("directory").and_then(non_empty) {
            config.cache.directory = expand_tilde(v);
        }
        if let Some(v) = section.get("scratch_directory").and_then(non_empty) {
            config.cache.scratch_directory = Some(expand_tilde(v));
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("timeout") {
            let timeout: u64 = v.trim().parse().map_err(|_| {
                invalid("download", "timeout", v, "must be a positive integer (seconds)")
            })?;
            if timeout == 0 {
                return Err(invalid(
                    "download",
                    "timeout",
                    v,
                    "must be a positive integer (seconds)",
                ));
            }
            config.download.timeout = timeout;
        }
    }

    // [probe] section
    if let Some(section) = ini.section(Some("probe")) {
        if let Some(v) = section.get("cache_ttl") {
            config.probe.cache_ttl = v.trim().parse().map_err(|_| {
                invalid("probe", "cache_ttl", v, "must be a non-negative integer (seconds)")
            })?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file").and_then(non_empty) {
            config.logging.file = expand_tilde(v);
        }
    }

    Ok(config)
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
