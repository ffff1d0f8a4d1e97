//! Entity and field value types

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar field value.
///
/// Serialized untagged: JSON numbers become `Number`, JSON strings `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Numeric value
    Number(f64),
    /// Textual value
    Text(String),
}

impl Scalar {
    /// Create a text scalar
    pub fn text(v: impl Into<String>) -> Self {
        Scalar::Text(v.into())
    }

    /// Returns the text if this is a textual value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            Scalar::Number(_) => None,
        }
    }

    /// Returns the number if this is a numeric value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Number(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Number(v as f64)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Number(f64::from(v))
    }
}

/// Extension fields keyed by name, in deterministic order.
pub type FieldBag = BTreeMap<String, Scalar>;

/// Primary record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// Unique, immutable id
    pub id: String,
    /// Creation key in milliseconds, the default sort key
    pub created: i64,
    /// Parent area reference, absent when unresolvable
    #[serde(default)]
    pub area_id: Option<String>,
    /// Extension fields (bid, year, finalResult, ...)
    #[serde(flatten)]
    pub fields: FieldBag,
}

impl Case {
    /// Creates a case with no extension fields
    pub fn new(id: impl Into<String>, created: i64) -> Self {
        Self {
            id: id.into(),
            created,
            area_id: None,
            fields: FieldBag::new(),
        }
    }

    /// Sets the area reference
    pub fn with_area(mut self, area_id: impl Into<String>) -> Self {
        self.area_id = Some(area_id.into());
        self
    }

    /// Sets an extension field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Looks up a field by declared name.
    ///
    /// `id`, `created` and `area_id` resolve to the fixed fields, every other
    /// name to the extension bag.
    pub fn field(&self, name: &str) -> Option<Cow<'_, Scalar>> {
        match name {
            "id" => Some(Cow::Owned(Scalar::Text(self.id.clone()))),
            "created" => Some(Cow::Owned(Scalar::from(self.created))),
            "area_id" => self
                .area_id
                .as_ref()
                .map(|a| Cow::Owned(Scalar::Text(a.clone()))),
            _ => self.fields.get(name).map(Cow::Borrowed),
        }
    }
}

/// Child record owned by a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specimen {
    pub id: String,
    /// Owning case id
    pub case_id: String,
    /// Serial number scoped to a grouping key (restarts per year at ingestion)
    #[serde(rename = "labSerial")]
    pub lab_serial: i64,
    #[serde(flatten)]
    pub fields: FieldBag,
}

impl Specimen {
    pub fn new(id: impl Into<String>, case_id: impl Into<String>, lab_serial: i64) -> Self {
        Self {
            id: id.into(),
            case_id: case_id.into(),
            lab_serial,
            fields: FieldBag::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<Cow<'_, Scalar>> {
        match name {
            "id" => Some(Cow::Owned(Scalar::Text(self.id.clone()))),
            "case_id" => Some(Cow::Owned(Scalar::Text(self.case_id.clone()))),
            "labSerial" => Some(Cow::Owned(Scalar::from(self.lab_serial))),
            _ => self.fields.get(name).map(Cow::Borrowed),
        }
    }
}

/// Parent record referenced by cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub name: String,
    pub created: i64,
}

impl Area {
    pub fn new(id: impl Into<String>, name: impl Into<String>, created: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created,
        }
    }

    pub fn field(&self, name: &str) -> Option<Scalar> {
        match name {
            "id" => Some(Scalar::Text(self.id.clone())),
            "name" => Some(Scalar::Text(self.name.clone())),
            "created" => Some(Scalar::from(self.created)),
            _ => None,
        }
    }
}

/// Row of a many-to-many relation table.
///
/// A match on `fk_id` resolves to `reference_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationEdge {
    pub reference_id: String,
    pub fk_id: String,
}

impl RelationEdge {
    pub fn new(reference_id: impl Into<String>, fk_id: impl Into<String>) -> Self {
        Self {
            reference_id: reference_id.into(),
            fk_id: fk_id.into(),
        }
    }
}
