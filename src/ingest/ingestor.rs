//! Ingestor
//!
//! Validates a dataset, tokenizes the declared properties and bulk-writes
//! everything into a record store.
//!
//! Order of work:
//! 1. Specimen foreign keys are checked; nothing is written on failure
//! 2. Index entries are derived from the plan
//! 3. Areas, cases, specimens, relation tables, then index entries are written

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::index::{index, IndexEntry};
use crate::model::{Area, Specimen};
use crate::observability::{log_event_with_fields, Event, ObservationScope};
use crate::storage::RecordStore;

use super::dataset::Dataset;
use super::errors::{IngestError, IngestResult};
use super::plan::{IndexPlan, PropertySource};

/// Per-entity counts of one ingestion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub cases: usize,
    pub specimens: usize,
    pub areas: usize,
    pub relation_edges: usize,
    pub index_entries: usize,
    pub ingested_at: DateTime<Utc>,
}

/// Writes datasets according to an index plan
pub struct Ingestor {
    plan: IndexPlan,
}

impl Ingestor {
    pub fn new(plan: IndexPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &IndexPlan {
        &self.plan
    }

    /// Ingest `dataset` into `store`
    pub async fn ingest<S: RecordStore>(
        &self,
        store: &S,
        dataset: Dataset,
    ) -> IngestResult<IngestReport> {
        let scope = ObservationScope::new("INGEST");

        if let Err(err) = validate_specimens(&dataset) {
            scope.fail(&err.to_string());
            return Err(err);
        }

        let entries = self.index_entries(&dataset);
        let report = IngestReport {
            cases: dataset.cases.len(),
            specimens: dataset.specimens.len(),
            areas: dataset.areas.len(),
            relation_edges: dataset.relation_edge_count(),
            index_entries: entries.len(),
            ingested_at: Utc::now(),
        };

        if let Err(err) = write_all(store, dataset, entries).await {
            scope.fail(&err.to_string());
            return Err(err);
        }

        let cases = report.cases.to_string();
        let index_entries = report.index_entries.to_string();
        scope.complete();
        log_event_with_fields(
            Event::IngestComplete,
            &[
                ("cases", cases.as_str()),
                ("index_entries", index_entries.as_str()),
            ],
        );
        Ok(report)
    }

    /// Derive the index entries the plan declares for `dataset`
    pub fn index_entries(&self, dataset: &Dataset) -> Vec<IndexEntry> {
        let areas: HashMap<&str, &Area> =
            dataset.areas.iter().map(|a| (a.id.as_str(), a)).collect();
        let mut specimens: HashMap<&str, Vec<&Specimen>> = HashMap::new();
        for specimen in &dataset.specimens {
            specimens
                .entry(specimen.case_id.as_str())
                .or_default()
                .push(specimen);
        }

        let mut entries = Vec::new();
        for property in &self.plan.properties {
            let name = property.name.as_str();
            match &property.source {
                PropertySource::Case(field) => {
                    for case in &dataset.cases {
                        if let Some(value) = case.field(field) {
                            entries.extend(index(&case.id, name, &value));
                        }
                    }
                }
                PropertySource::CaseArea(field) => {
                    for case in &dataset.cases {
                        let value = case
                            .area_id
                            .as_deref()
                            .and_then(|id| areas.get(id))
                            .and_then(|area| area.field(field));
                        if let Some(value) = value {
                            entries.extend(index(&case.id, name, &value));
                        }
                    }
                }
                PropertySource::CaseSpecimen(field) => {
                    for case in &dataset.cases {
                        let owned = specimens.get(case.id.as_str()).map_or(&[][..], Vec::as_slice);
                        for specimen in owned {
                            if let Some(value) = specimen.field(field) {
                                entries.extend(index(&case.id, name, &value));
                            }
                        }
                    }
                }
                PropertySource::Area(field) => {
                    for area in &dataset.areas {
                        if let Some(value) = area.field(field) {
                            entries.extend(index(&area.id, name, &value));
                        }
                    }
                }
            }
        }
        entries
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(IndexPlan::standard())
    }
}

fn validate_specimens(dataset: &Dataset) -> IngestResult<()> {
    let case_ids: HashSet<&str> = dataset.cases.iter().map(|c| c.id.as_str()).collect();
    match dataset
        .specimens
        .iter()
        .find(|s| !case_ids.contains(s.case_id.as_str()))
    {
        Some(specimen) => Err(IngestError::DanglingForeignKey {
            specimen_id: specimen.id.clone(),
            case_id: specimen.case_id.clone(),
        }),
        None => Ok(()),
    }
}

async fn write_all<S: RecordStore>(
    store: &S,
    dataset: Dataset,
    entries: Vec<IndexEntry>,
) -> IngestResult<()> {
    store.insert_areas(dataset.areas).await?;
    store.insert_cases(dataset.cases).await?;
    store.insert_specimens(dataset.specimens).await?;
    for (table, edges) in dataset.relations {
        store.insert_relations(&table, edges).await?;
    }
    store.insert_index_entries(entries).await?;
    Ok(())
}
