//! Disk-backed tile store.

use super::path::cache_path;
use super::types::CacheError;
use crate::coord::TileAddress;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, trace};

/// File-per-tile cache rooted at a fixed directory.
#[derive(Debug, Clone)]
pub struct TileCache {
    root: PathBuf,
    extension: String,
}

impl TileCache {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of a tile inside `cachedir`.
    pub fn path_for(&self, cachedir: &str, tile: &TileAddress) -> PathBuf {
        cache_path(&self.root, cachedir, tile, &self.extension)
    }

    /// Cached bytes for a tile, or `None` if the file does not exist.
    pub fn get(&self, cachedir: &str, tile: &TileAddress) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(cachedir, tile);
        match fs::read(&path) {
            Ok(data) => {
                trace!(path = %path.display(), bytes = data.len(), "Cache hit");
                Ok(Some(data))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Stores a tile, creating directories as needed.
    ///
    /// The data is written to a temporary file beside the target and renamed
    /// into place, so readers never observe a partial tile.
    pub fn put(&self, cachedir: &str, tile: &TileAddress, data: &[u8]) -> Result<PathBuf, CacheError> {
        let path = self.path_for(cachedir, tile);
        let parent = path.parent().unwrap_or(&self.root);

        // Create parent directory
        fs::create_dir_all(parent)?;

        let mut file = NamedTempFile::new_in(parent)?;
        file.write_all(data)?;
        file.persist(&path).map_err(|e| CacheError::Persist {
            path: path.clone(),
            source: e.error,
        })?;

        debug!(path = %path.display(), bytes = data.len(), "Cached tile");
        Ok(path)
    }
}
