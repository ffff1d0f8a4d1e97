//! Tokenizing indexer
//!
//! Segmentation rules for one value:
//! 1. The raw value is always a token
//! 2. Text containing `/` is split on `/`
//! 3. Otherwise text containing `,` is split on `,`
//! 4. Otherwise text is split on whitespace
//!
//! Segments are trimmed and empty segments dropped. Single pass, no nesting,
//! no de-duplication: entries are strictly additive.

use crate::model::Scalar;

use super::token::{IndexEntry, Token};

/// Derives the tokens of a single value, raw value first.
pub fn tokenize(value: &Scalar) -> Vec<Token> {
    let mut tokens = vec![Token::from_scalar(value)];

    let text = match value {
        Scalar::Text(s) => s.as_str(),
        Scalar::Number(_) => return tokens,
    };

    if text.contains('/') {
        push_segments(&mut tokens, text.split('/'));
    } else if text.contains(',') {
        push_segments(&mut tokens, text.split(','));
    } else {
        push_segments(&mut tokens, text.split_whitespace());
    }

    tokens
}

fn push_segments<'a>(tokens: &mut Vec<Token>, parts: impl Iterator<Item = &'a str>) {
    tokens.extend(
        parts
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Token::from_text),
    );
}

/// Builds the index entries of one property value of one object.
pub fn index(object_id: &str, property: &str, value: &Scalar) -> Vec<IndexEntry> {
    tokenize(value)
        .into_iter()
        .map(|token| IndexEntry::new(object_id, property, token))
        .collect()
}
