//! Incremental loading for linelist
//!
//! # Invariants
//!
//! - Chunks are read in sort order and never re-read
//! - Descending order reverses the store scan, it is not a post-sort
//! - At most `capacity` chunks wait unapplied in the channel
//! - A failed chunk ends the load; nothing after it is read

mod loader;
mod plan;

pub use loader::{IncrementalLoader, LoadEvent, LoadedChunk};
pub use plan::LoadPlan;
