//! Minimal path expressions for locating values inside JSON documents
//!
//! Only the subset needed to reach into channel payloads is supported:
//! dot-separated object keys and `[n]` array indices, optionally rooted at `$`.
//!
//! ```
//! use channelmap_core::jsonpath::{traverse_json_path, Lookup};
//! use serde_json::json;
//!
//! let doc = json!({"data": {"items": [{"id": "X1"}]}});
//! let found = traverse_json_path(&doc, "data.items[0].id").unwrap();
//! assert_eq!(found, Lookup::Found(&json!("X1")));
//!
//! let empty = json!({"data": {"items": []}});
//! let missing = traverse_json_path(&empty, "data.items[0].id").unwrap();
//! assert_eq!(missing, Lookup::NotFound);
//! ```
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

pub mod ast;
pub mod error;
pub mod executor;
pub mod parser;


pub use ast::{PathExpr, Segment};
pub use error::PathError;
pub use executor::Lookup;
pub use parser::Parser;

use serde_json::Value;

/// Parse a path expression
pub fn parse(path: &str) -> Result<PathExpr, PathError> {
    Parser::new(path)?.parse()
}

/// Parse `path` and resolve it against `document`.
///
/// Only a malformed expression is an error; an unresolvable path is
/// `Ok(Lookup::NotFound)`.
pub fn traverse_json_path<'a>(document: &'a Value, path: &str) -> Result<Lookup<'a>, PathError> {
    Ok(parse(path)?.traverse(document))
}
