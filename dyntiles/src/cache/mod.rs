//! On-disk tile cache.
//!
//! Finished tiles are stored at
//!
//! ```text
//! <cache_root>/<cachedir>/<zoom>/<col>/<row>.<ext>
//! ```
//!
//! with rows in the bottom-left convention. A file's presence is
//! authoritative: there is no expiry and nothing is ever evicted. Concurrent
//! writers of the same tile race harmlessly because each write is an atomic
//! rename of identical content.

mod disk;
mod path;
mod types;

pub use disk::TileCache;
pub use path::{cache_path, column_directory};
pub use types::CacheError;
