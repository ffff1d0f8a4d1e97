//! Direct filtering
//!
//! Filters cases strictly according to declared field criteria.
//! No type coercion: text "2024" never equals number 2024.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{Case, Scalar};

/// Expected value of one criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Field must equal the scalar
    Equals(Scalar),
    /// Field must equal one of the scalars; an empty set matches nothing
    AnyOf(Vec<Scalar>),
}

impl FilterValue {
    fn matches(&self, actual: &Scalar) -> bool {
        match self {
            FilterValue::Equals(expected) => actual == expected,
            FilterValue::AnyOf(set) => set.iter().any(|expected| actual == expected),
        }
    }
}

/// Exact/set-membership filter over declared case fields (AND semantics).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectFilter {
    criteria: BTreeMap<String, FilterValue>,
}

impl DirectFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality criterion
    pub fn equals(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.criteria
            .insert(field.into(), FilterValue::Equals(value.into()));
        self
    }

    /// Adds a set-membership criterion
    pub fn any_of<V: Into<Scalar>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.criteria.insert(field.into(), FilterValue::AnyOf(values));
        self
    }

    /// Returns true if no criterion is set
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Number of criteria
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Iterate over criteria in field order
    pub fn criteria(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.criteria.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Checks if a case matches every criterion.
    ///
    /// A missing field never matches.
    pub fn matches(&self, case: &Case) -> bool {
        self.criteria.iter().all(|(field, expected)| {
            case.field(field)
                .map(|actual| expected.matches(&actual))
                .unwrap_or(false)
        })
    }
}

/// Ids produced by a search, intersected with the loaded cases
pub type IdSet = HashSet<String>;
