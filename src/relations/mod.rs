//! Relation resolution for linelist
//!
//! Specimens and areas are linked to cases by foreign-key ids only. They are
//! resolved lazily, and only for the cases currently on screen.
//!
//! # Invariants
//!
//! - Store calls per merge are bounded by the page size
//! - A missing area or an empty specimen list is a valid outcome

mod merger;

pub use merger::{PageEntry, RelationMerger};
