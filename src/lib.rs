//! linelist - In-memory search indexing and incremental browsing of case records
//!
//! Cases are ingested once into a record store together with a token index.
//! A browse session then streams them into memory in bounded chunks and keeps
//! a filtered, searched and paginated view current while data arrives.

pub mod index;
pub mod ingest;
pub mod loader;
pub mod model;
pub mod observability;
pub mod pipeline;
pub mod relations;
pub mod search;
pub mod session;
pub mod storage;
