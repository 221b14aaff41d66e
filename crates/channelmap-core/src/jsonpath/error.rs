//! Error types for path expressions
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Errors raised while parsing a path expression.
///
/// Traversal itself never fails: a path that does not resolve is reported as
/// [`super::Lookup::NotFound`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The expression was empty
    #[error("Empty path expression")]
    Empty,

    /// Syntax errors with position information
    #[error("Syntax error at position {position}: {message} (expected {}, found {found})", expected.join(" or "))]
    Syntax {
        message: String,
        position: usize,
        input: String,
        expected: Vec<String>,
        found: String,
    },

    /// An array index did not fit the platform index type
    #[error("Index out of range at position {position}: {digits}")]
    IndexOverflow { digits: String, position: usize },
}

impl PathError {
    /// Create a syntax error with expected/found context
    pub fn syntax(
        message: impl Into<String>,
        position: usize,
        input: impl Into<String>,
        expected: Vec<String>,
        found: impl Into<String>,
    ) -> Self {
        PathError::Syntax {
            message: message.into(),
            position,
            input: input.into(),
            expected,
            found: found.into(),
        }
    }

    /// Byte offset of the error in the expression, when known
    pub fn position(&self) -> Option<usize> {
        match self {
            PathError::Empty => None,
            PathError::Syntax { position, .. } | PathError::IndexOverflow { position, .. } => {
                Some(*position)
            }
        }
    }
}
