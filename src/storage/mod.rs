//! Persistence for cross-run state.
//!
//! - `blob`: the byte store seam (`BlobStore`) with file and in-memory backends
//! - `history`: the capped log of successful lookups

mod blob;
mod history;

pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};
pub(crate) use blob::{load_json, save_json};
pub use history::{HistoryEntry, HistoryStore};
