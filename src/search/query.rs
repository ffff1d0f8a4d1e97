//! Numeric query parsing
//!
//! - `a-b`: inclusive range, exactly two endpoints
//! - `a,b,c`: set membership
//! - `a`: exact match
//!
//! Parts are trimmed and empty parts dropped before parsing.

use crate::index::TokenQuery;

use super::errors::{SearchError, SearchResult};

/// Parse a numeric search query into a token query.
///
/// Rejects anything that is not well formed without touching the store.
pub fn parse_numeric_query(input: &str) -> SearchResult<TokenQuery> {
    if input.contains('-') {
        let parts = split_parts(input, '-');
        if parts.len() != 2 {
            return Err(SearchError::InvalidRange(input.to_string()));
        }
        let lower = parse_number(parts[0])?;
        let upper = parse_number(parts[1])?;
        return Ok(TokenQuery::Between(lower, upper));
    }

    if input.contains(',') {
        let values = split_parts(input, ',')
            .into_iter()
            .map(parse_number)
            .collect::<SearchResult<Vec<f64>>>()?;
        return Ok(TokenQuery::AnyOf(values));
    }

    parse_number(input.trim()).map(TokenQuery::Equals)
}

fn split_parts(input: &str, separator: char) -> Vec<&str> {
    input
        .split(separator)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

fn parse_number(part: &str) -> SearchResult<f64> {
    part.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SearchError::InvalidNumber(part.to_string()))
}
