//! Parsed representation of path expressions
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

use std::fmt;

/// One step of a path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object member access (`.key` or a leading `key`)
    Key(String),
    /// Array element access (`[n]`)
    Index(usize),
}

/// A parsed path expression: a chain of segments applied from the document root.
///
/// An expression with no segments (`$`) selects the document itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    segments: Vec<Segment>,
}

impl PathExpr {
    /// Build an expression from its segments
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Segments in traversal order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the expression selects the document root
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments in the chain
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => write!(f, ".{}", key),
            Segment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Canonical `$`-rooted form, e.g. `$.data.items[0].id`
impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}
