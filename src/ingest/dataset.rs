//! Ingestion input

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{Area, Case, RelationEdge, Specimen};

/// Everything written to the store by one ingestion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub cases: Vec<Case>,
    pub specimens: Vec<Specimen>,
    pub areas: Vec<Area>,
    /// Relation tables by name
    pub relations: BTreeMap<String, Vec<RelationEdge>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `(case.id, area.id)` edges to `table` for every case whose area
    /// is part of the dataset. Returns the number of edges added.
    pub fn derive_area_relations(&mut self, table: &str) -> usize {
        let area_ids: HashSet<&str> = self.areas.iter().map(|a| a.id.as_str()).collect();
        let edges: Vec<RelationEdge> = self
            .cases
            .iter()
            .filter_map(|case| {
                case.area_id
                    .as_deref()
                    .filter(|area_id| area_ids.contains(area_id))
                    .map(|area_id| RelationEdge::new(case.id.clone(), area_id))
            })
            .collect();
        let added = edges.len();
        self.relations
            .entry(table.to_string())
            .or_default()
            .extend(edges);
        added
    }

    pub fn relation_edge_count(&self) -> usize {
        self.relations.values().map(Vec::len).sum()
    }
}
