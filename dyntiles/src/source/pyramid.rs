//! Pyramid index files.
//!
//! Each non-empty line reads `<max zoom> <dataset>`, with the dataset named
//! relative to the index file. A request for zoom `z` uses the first line,
//! in file order, whose zoom is at least `z`.

use super::{sibling_path, SourceError};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyramidEntry {
    pub max_zoom: u8,
    pub dataset: PathBuf,
}

/// Parsed index with an ordered lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyramidIndex {
    path: PathBuf,
    entries: Vec<PyramidEntry>,
    /// Entries whose zoom exceeds every earlier zoom, in file order.
    /// Later entries that do not raise the maximum can never be the first
    /// match, so this list is sorted and answers the same queries.
    lookup: Vec<usize>,
}

impl PyramidIndex {
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let text = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self, SourceError> {
        let mut entries = Vec::new();

        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let malformed = || SourceError::Malformed {
                path: path.to_path_buf(),
                line: number + 1,
                text: line.to_string(),
            };

            let (zoom, name) = line.split_once(char::is_whitespace).ok_or_else(malformed)?;
            let max_zoom: u8 = zoom.parse().map_err(|_| malformed())?;
            let name = name.trim();
            if name.is_empty() {
                return Err(malformed());
            }

            entries.push(PyramidEntry {
                max_zoom,
                dataset: sibling_path(path, name),
            });
        }

        let mut lookup = Vec::new();
        let mut running_max: Option<u8> = None;
        for (i, entry) in entries.iter().enumerate() {
            if running_max.map_or(true, |max| entry.max_zoom > max) {
                running_max = Some(entry.max_zoom);
                lookup.push(i);
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
            lookup,
        })
    }

    pub fn entries(&self) -> &[PyramidEntry] {
        &self.entries
    }

    /// Dataset for the first entry whose zoom is at least `zoom`.
    pub fn lookup(&self, zoom: u8) -> Result<PathBuf, SourceError> {
        let pos = self
            .lookup
            .partition_point(|&i| self.entries[i].max_zoom < zoom);
        self.lookup
            .get(pos)
            .map(|&i| self.entries[i].dataset.clone())
            .ok_or_else(|| SourceError::NoEntry {
                path: self.path.clone(),
                zoom,
            })
    }

    /// Dataset on the first line.
    pub fn first(&self) -> Result<PathBuf, SourceError> {
        self.entries
            .first()
            .map(|e| e.dataset.clone())
            .ok_or_else(|| SourceError::Empty(self.path.clone()))
    }
}
