//! Path traversal over JSON documents
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

use super::ast::{PathExpr, Segment};
use serde_json::Value;

/// Outcome of resolving a path against a document.
///
/// A missing path is an ordinary result, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// The path resolved to this value (which may itself be `null`)
    Found(&'a Value),
    /// Some segment of the path had nothing to select
    NotFound,
}

impl<'a> Lookup<'a> {
    /// Convert into an `Option`, treating `NotFound` as `None`
    pub fn found(self) -> Option<&'a Value> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

impl PathExpr {
    /// Walk the document along this expression.
    ///
    /// Missing keys, out-of-range indices, keys applied to arrays, indices applied
    /// to objects, and any step into a scalar all yield [`Lookup::NotFound`].
    pub fn traverse<'a>(&self, document: &'a Value) -> Lookup<'a> {
        let mut current = document;
        for segment in self.segments() {
            let next = match (segment, current) {
                (Segment::Key(key), Value::Object(map)) => map.get(key),
                (Segment::Index(index), Value::Array(items)) => items.get(*index),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return Lookup::NotFound,
            }
        }
        Lookup::Found(current)
    }
}
