//! Record store subsystem for linelist
//!
//! The persisted store is an external collaborator: an ordered key-value
//! store with secondary indexes. This module defines the contract the engine
//! consumes (`RecordStore`) and an in-memory implementation of it.
//!
//! # Contract
//!
//! - Bulk inserts reject duplicate primary keys
//! - Ordered scans reverse the scan for descending order, never post-sort
//! - Equality scans and primary key lookups return empty/absent, not errors,
//!   when nothing matches

mod errors;
mod memory;
mod store;

pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::{FieldScope, RecordStore, SortDirection, SortOrder};
