//! Per-request scratch directory for intermediate rasters.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempDir};

/// Uniquely named directory removed with everything in it on drop,
/// including when a request fails midway.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Creates a directory under `parent`, or the system temp dir.
    pub fn new(parent: Option<&Path>) -> io::Result<Self> {
        let mut builder = Builder::new();
        builder.prefix("dyntiles-");
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of an intermediate file inside the directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_on_drop() {
        let parent = TempDir::new().unwrap();
        let scratch = ScratchDir::new(Some(parent.path())).unwrap();
        std::fs::write(scratch.file("primary.tif"), b"x").unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.starts_with(parent.path()));

        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_names_are_unique() {
        let a = ScratchDir::new(None).unwrap();
        let b = ScratchDir::new(None).unwrap();
        assert_ne!(a.path(), b.path());
    }
}
