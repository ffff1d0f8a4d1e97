//! Browse session configuration
//!
//! JSON file, every field optional:
//!
//! ```json
//! {
//!   "first_chunk_size": 1000,
//!   "chunk_size": 10000,
//!   "page_size": 10,
//!   "prefetch_chunks": 1,
//!   "sort": { "field": "created", "direction": "desc" },
//!   "scope": { "field": "year", "value": 2024 }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::loader::LoadPlan;
use crate::storage::{FieldScope, SortOrder};

use super::errors::{BrowseError, BrowseResult};

/// Browse session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowseConfig {
    /// Cases read before the session opens
    #[serde(default = "default_first_chunk_size")]
    pub first_chunk_size: usize,

    /// Cases per background chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Background chunks read ahead of the session
    #[serde(default = "default_prefetch_chunks")]
    pub prefetch_chunks: usize,

    #[serde(default)]
    pub sort: SortOrder,

    /// Restrict loading and the unfiltered total to one field value
    #[serde(default)]
    pub scope: Option<FieldScope>,
}

fn default_first_chunk_size() -> usize {
    1000
}
fn default_chunk_size() -> usize {
    10_000
}
fn default_page_size() -> usize {
    10
}
fn default_prefetch_chunks() -> usize {
    1
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            first_chunk_size: default_first_chunk_size(),
            chunk_size: default_chunk_size(),
            page_size: default_page_size(),
            prefetch_chunks: default_prefetch_chunks(),
            sort: SortOrder::default(),
            scope: None,
        }
    }
}

impl BrowseConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> BrowseResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| BrowseError::config(format!("Failed to read config: {}", e)))?;

        let config: BrowseConfig = serde_json::from_str(&content)
            .map_err(|e| BrowseError::config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Check sizes and sort key
    pub fn validate(&self) -> BrowseResult<()> {
        let sizes = [
            ("first_chunk_size", self.first_chunk_size),
            ("chunk_size", self.chunk_size),
            ("page_size", self.page_size),
            ("prefetch_chunks", self.prefetch_chunks),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(BrowseError::config(format!("{} must be > 0", name)));
        }

        if self.sort.field.trim().is_empty() {
            return Err(BrowseError::config("sort.field must not be empty"));
        }

        Ok(())
    }

    pub fn with_chunks(mut self, first_chunk_size: usize, chunk_size: usize) -> Self {
        self.first_chunk_size = first_chunk_size;
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_scope(mut self, scope: FieldScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// The loader's view of this configuration
    pub fn load_plan(&self) -> LoadPlan {
        LoadPlan {
            first_chunk_size: self.first_chunk_size,
            chunk_size: self.chunk_size,
            order: self.sort.clone(),
            scope: self.scope.clone(),
        }
    }
}
