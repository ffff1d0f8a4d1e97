//! Relation merger
//!
//! Attaches specimens and the parent area to the cases of one page window.
//! Work is bounded by the page size, never by the filtered set.

use std::sync::Arc;

use crate::model::{Area, Case, Specimen};
use crate::storage::{RecordStore, StoreResult};

/// A case of the page window with its relations resolved
#[derive(Debug, Clone, PartialEq)]
pub struct PageEntry {
    pub case: Arc<Case>,
    /// Specimens owned by the case, in insertion order
    pub specimens: Vec<Specimen>,
    /// Parent area; `None` when unset or dangling
    pub area: Option<Area>,
}

impl PageEntry {
    /// An entry whose relations were not resolved
    pub fn bare(case: Arc<Case>) -> Self {
        Self {
            case,
            specimens: Vec::new(),
            area: None,
        }
    }
}

/// Resolves page window relations against a record store.
pub struct RelationMerger<'a, S: RecordStore> {
    store: &'a S,
}

impl<'a, S: RecordStore> RelationMerger<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Merge relations into every case of `window`, keeping its order
    pub async fn merge(&self, window: &[Arc<Case>]) -> StoreResult<Vec<PageEntry>> {
        let mut entries = Vec::with_capacity(window.len());
        for case in window {
            entries.push(self.merge_one(Arc::clone(case)).await?);
        }
        Ok(entries)
    }

    async fn merge_one(&self, case: Arc<Case>) -> StoreResult<PageEntry> {
        let specimens = self.store.specimens_of(&case.id).await?;
        let area = match &case.area_id {
            Some(area_id) => self.store.get_area(area_id).await?,
            None => None,
        };
        Ok(PageEntry {
            case,
            specimens,
            area,
        })
    }
}
