//! Browse session subsystem for linelist
//!
//! The presentation-facing facade: one session owns one filter pipeline,
//! drives the incremental loader and publishes view snapshots.
//!
//! # Invariants
//!
//! - Only the bootstrap (first chunk and count) can fail fatally
//! - A failed background chunk stops loading; the session keeps its data
//! - Rejected input leaves the view unchanged
//! - Chunks arriving past page 1 never move the user's page

mod config;
mod errors;
mod session;
mod view;

pub use config::BrowseConfig;
pub use errors::{BrowseError, BrowseResult};
pub use session::BrowseSession;
pub use view::{TotalCount, ViewSnapshot};
