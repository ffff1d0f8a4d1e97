//! Index plan
//!
//! Declares which properties are tokenized at ingestion. Anything not
//! declared here is never searchable.

use serde::{Deserialize, Serialize};

/// Where an indexed property reads its value from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", content = "field", rename_all = "snake_case")]
pub enum PropertySource {
    /// A field of the case; object id is the case
    Case(String),
    /// A field of the case's area; object id is the case
    CaseArea(String),
    /// A field of each of the case's specimens; object id is the case
    CaseSpecimen(String),
    /// A field of the area; object id is the area
    Area(String),
}

/// A named indexed property, e.g. `case.finalResult`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedProperty {
    pub name: String,
    pub source: PropertySource,
}

impl IndexedProperty {
    pub fn new(name: impl Into<String>, source: PropertySource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

/// The declared indexable properties
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPlan {
    pub properties: Vec<IndexedProperty>,
}

impl IndexPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, source: PropertySource) -> Self {
        self.properties.push(IndexedProperty::new(name, source));
        self
    }

    /// The line list's searchable properties
    pub fn standard() -> Self {
        use PropertySource::*;
        Self::new()
            .with("area.name", Area("name".into()))
            .with("case.area.name", CaseArea("name".into()))
            .with("case.bid", Case("bid".into()))
            .with("case.year", Case("year".into()))
            .with("case.finalResult", Case("finalResult".into()))
            .with("case.patientName", Case("patientName".into()))
            .with("case.age", Case("age".into()))
            .with("case.adeq", Case("adeq".into()))
            .with("case.specimen.bid", CaseSpecimen("bid".into()))
            .with("case.specimen.labSerial", CaseSpecimen("labSerial".into()))
            .with(
                "case.specimen.specimenResult",
                CaseSpecimen("specimenResult".into()),
            )
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
