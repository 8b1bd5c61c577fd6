//! Cache path construction.

use crate::coord::TileAddress;
use std::path::{Path, PathBuf};

/// Construct the full path for a cached tile.
///
/// Creates a hierarchical path structure:
/// ```text
/// <cache_root>/<cachedir>/<zoom>/<col>/<row>.<ext>
/// ```
///
/// An empty `cachedir` places tiles directly under the root.
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use dyntiles::cache::cache_path;
/// use dyntiles::coord::TileAddress;
///
/// let root = PathBuf::from("/srv/dynamic_tiles");
/// let tile = TileAddress::new(5, 10, 20).unwrap();
/// let path = cache_path(&root, "dem", &tile, "png");
///
/// assert_eq!(path, PathBuf::from("/srv/dynamic_tiles/dem/5/10/20.png"));
/// ```
pub fn cache_path(cache_root: &Path, cachedir: &str, tile: &TileAddress, ext: &str) -> PathBuf {
    column_directory(cache_root, cachedir, tile).join(format!("{}.{}", tile.row, ext))
}

/// Get the directory holding every cached row of one column.
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use dyntiles::cache::column_directory;
/// use dyntiles::coord::TileAddress;
///
/// let tile = TileAddress::new(5, 10, 20).unwrap();
/// let dir = column_directory(&PathBuf::from("/cache"), "", &tile);
///
/// assert_eq!(dir, PathBuf::from("/cache/5/10"));
/// ```
pub fn column_directory(cache_root: &Path, cachedir: &str, tile: &TileAddress) -> PathBuf {
    let mut dir = cache_root.to_path_buf();
    if !cachedir.is_empty() {
        dir.push(cachedir);
    }
    dir.join(tile.zoom.to_string()).join(tile.col.to_string())
}
