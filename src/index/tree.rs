//! BTreeMap-based inverted index
//!
//! Maps tokens to the positions of the entries holding them. Text tokens are
//! additionally kept under a lower-cased fold for case-insensitive prefix
//! scans. Positions are always returned sorted ascending.

use std::collections::BTreeMap;
use std::ops::Bound;

use super::token::{IndexEntry, Token};

/// Position of an entry in insertion order
type EntryPos = usize;

/// Query shapes answered by the token index.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenQuery {
    /// Text tokens starting with the prefix, ignoring case
    Prefix(String),
    /// Numeric tokens in `[min, max]`
    Between(f64, f64),
    /// Numeric tokens equal to any of the values
    AnyOf(Vec<f64>),
    /// Numeric tokens equal to the value
    Equals(f64),
}

/// Inverted index over `IndexEntry` rows.
#[derive(Debug, Default)]
pub struct TokenIndex {
    entries: Vec<IndexEntry>,
    by_token: BTreeMap<Token, Vec<EntryPos>>,
    folded: BTreeMap<String, Vec<EntryPos>>,
}

impl TokenIndex {
    /// Creates a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry
    pub fn insert(&mut self, entry: IndexEntry) {
        let pos = self.entries.len();
        if let Token::Text(text) = &entry.token {
            self.folded.entry(text.to_lowercase()).or_default().push(pos);
        }
        self.by_token.entry(entry.token.clone()).or_default().push(pos);
        self.entries.push(entry);
    }

    /// Append many entries
    pub fn extend(&mut self, entries: impl IntoIterator<Item = IndexEntry>) {
        for entry in entries {
            self.insert(entry);
        }
    }

    /// Lookup entries for an exact token
    pub fn lookup_eq(&self, token: &Token) -> Vec<&IndexEntry> {
        let positions = self.by_token.get(token).cloned().unwrap_or_default();
        self.resolve(positions)
    }

    /// Lookup entries in a token range `[min, max]` (inclusive).
    ///
    /// Returns nothing when `min > max`.
    pub fn lookup_range(&self, min: &Token, max: &Token) -> Vec<&IndexEntry> {
        if min > max {
            return Vec::new();
        }
        let positions = self
            .by_token
            .range((Bound::Included(min), Bound::Included(max)))
            .flat_map(|(_, positions)| positions.iter().copied())
            .collect();
        self.resolve(positions)
    }

    /// Lookup entries whose text token starts with `prefix`, ignoring case
    pub fn lookup_prefix(&self, prefix: &str) -> Vec<&IndexEntry> {
        let folded_prefix = prefix.to_lowercase();
        let positions = self
            .folded
            .range::<str, _>((Bound::Included(folded_prefix.as_str()), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(&folded_prefix))
            .flat_map(|(_, positions)| positions.iter().copied())
            .collect();
        self.resolve(positions)
    }

    /// Answer a `TokenQuery`
    pub fn query(&self, query: &TokenQuery) -> Vec<&IndexEntry> {
        match query {
            TokenQuery::Prefix(prefix) => self.lookup_prefix(prefix),
            TokenQuery::Between(min, max) => {
                self.lookup_range(&Token::from_number(*min), &Token::from_number(*max))
            }
            TokenQuery::Equals(value) => self.lookup_eq(&Token::from_number(*value)),
            TokenQuery::AnyOf(values) => {
                let positions = values
                    .iter()
                    .filter_map(|v| self.by_token.get(&Token::from_number(*v)))
                    .flat_map(|positions| positions.iter().copied())
                    .collect();
                self.resolve(positions)
            }
        }
    }

    /// Sorts and de-duplicates positions, then maps them to entries
    fn resolve(&self, mut positions: Vec<EntryPos>) -> Vec<&IndexEntry> {
        positions.sort_unstable();
        positions.dedup();
        positions.into_iter().map(|pos| &self.entries[pos]).collect()
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_token.clear();
        self.folded.clear();
    }

    /// Returns the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of distinct tokens
    pub fn token_count(&self) -> usize {
        self.by_token.len()
    }
}
