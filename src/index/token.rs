//! Ordered index tokens
//!
//! Numbers are stored as order-preserving bit patterns so a numeric range
//! query is a plain range over the token map.
//! Ordering is deterministic: Number < Text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Scalar;

/// A single indexable fragment of a field value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Token {
    /// Number (f64 bits remapped for total ordering)
    Number(u64),
    /// Text fragment, stored verbatim
    Text(String),
}

impl Token {
    /// Create a token from a number
    pub fn from_number(v: f64) -> Self {
        let bits = v.to_bits();
        // Negative: flip all bits. Positive: flip sign bit.
        let ordered = if (bits >> 63) == 1 {
            !bits
        } else {
            bits ^ (1 << 63)
        };
        Token::Number(ordered)
    }

    /// Create a token from text
    pub fn from_text(v: impl Into<String>) -> Self {
        Token::Text(v.into())
    }

    /// Create a token holding a whole scalar value
    pub fn from_scalar(value: &Scalar) -> Self {
        match value {
            Scalar::Number(n) => Token::from_number(*n),
            Scalar::Text(s) => Token::from_text(s.as_str()),
        }
    }

    /// Decodes a numeric token back to its value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Token::Number(ordered) => {
                let bits = if (ordered >> 63) == 1 {
                    ordered ^ (1 << 63)
                } else {
                    !ordered
                };
                Some(f64::from_bits(bits))
            }
            Token::Text(_) => None,
        }
    }

    /// Returns the text if this is a text token
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Token::Text(s) => Some(s),
            Token::Number(_) => None,
        }
    }

    /// Converts back into a scalar
    pub fn to_scalar(&self) -> Scalar {
        match self {
            Token::Number(_) => Scalar::Number(self.as_number().unwrap_or_default()),
            Token::Text(s) => Scalar::Text(s.clone()),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(_) => write!(f, "{}", self.as_number().unwrap_or_default()),
            Token::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One row of the inverted index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Id of the object the token was derived from
    pub object_id: String,
    /// Declared property name, e.g. `case.finalResult`
    pub property: String,
    pub token: Token,
}

impl IndexEntry {
    pub fn new(object_id: impl Into<String>, property: impl Into<String>, token: Token) -> Self {
        Self {
            object_id: object_id.into(),
            property: property.into(),
            token,
        }
    }
}
