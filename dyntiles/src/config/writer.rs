//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let scratch_directory = config
        .cache
        .scratch_directory
        .as_ref()
        .map(|p| path_to_string(p))
        .unwrap_or_default();

    format!(
        r#"[server]
; Public URL of the link document endpoint, used in NetworkLink hrefs
document_url = {}
; Public URL of the tile endpoint, used in GroundOverlay icons
tile_url = {}
; Image shown when checkStatus finds a web tile missing
placeholder_url = {}

[tiles]
; Tile edge length in pixels (power of two)
size = {}

[cache]
; Root of the tile cache. Request cachedir values are subdirectories of it.
; Tiles are stored as <directory>/<cachedir>/<zoom>/<column>/<row>.png
directory = {}
; Parent directory for per-request scratch files (empty = system temp dir)
scratch_directory = {}

[download]
; Web tile download timeout in seconds
timeout = {}

[probe]
; Seconds to reuse a checkStatus probe result (0 = probe every time)
cache_ttl = {}

[logging]
; Log file location
file = {}
"#,
        config.server.document_url,
        config.server.tile_url,
        config.server.placeholder_url,
        config.tiles.size,
        path_to_string(&config.cache.directory),
        scratch_directory,
        config.download.timeout,
        config.probe.cache_ttl,
        path_to_string(&config.logging.file),
    )
}

/// Convert a path to a string, using `~` for the home directory.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
