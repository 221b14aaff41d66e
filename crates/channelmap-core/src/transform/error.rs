//! Error taxonomy for rule evaluation and rule construction
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

use crate::jsonpath::PathError;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Why a single field could not be transformed.
///
/// These are ordinary values: the mapping engine collects them per field and keeps
/// going.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Input cannot be converted to the type the rule kind requires
    #[error("Cannot convert {value} to {expected}: {reason}")]
    Coercion {
        expected: &'static str,
        value: String,
        reason: String,
    },

    /// Path traversal found nothing
    #[error("No value found at path {path}")]
    PathNotFound { path: String },

    /// Regex rule found no match
    #[error("Pattern {pattern} does not match {value}")]
    NoMatch { pattern: String, value: String },

    /// Regex rule asked for a capture group the pattern does not have
    #[error("Capture group {group} does not exist (pattern has {available} group(s))")]
    InvalidGroup { group: usize, available: usize },

    /// Enum mapping has no entry for the input
    #[error("No enum mapping for {value}")]
    UnmappedValue {
        value: String,
        available: Vec<String>,
    },

    /// Required source field is absent from the input document
    #[error("Required field {field} is missing from input")]
    RequiredFieldMissing { field: String },

    /// The rule itself is malformed; normally rejected before evaluation
    #[error("Malformed rule: {0}")]
    RuleShape(#[from] RuleShapeError),
}

impl TransformError {
    /// Stable machine-readable code for this error kind
    pub fn kind(&self) -> &'static str {
        match self {
            TransformError::Coercion { .. } => "coercion",
            TransformError::PathNotFound { .. } => "path_not_found",
            TransformError::NoMatch { .. } => "no_match",
            TransformError::InvalidGroup { .. } => "invalid_group",
            TransformError::UnmappedValue { .. } => "unmapped_value",
            TransformError::RequiredFieldMissing { .. } => "required_field_missing",
            TransformError::RuleShape(_) => "rule_shape",
        }
    }

    pub(crate) fn coercion(
        expected: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        TransformError::Coercion {
            expected,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Serialized as `{"kind": ..., "message": ...}` for preview reports
impl Serialize for TransformError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TransformError", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// A rule descriptor that does not have the shape its kind requires.
///
/// Raised at the configuration boundary when a rule is created or edited.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleShapeError {
    /// The descriptor could not be decoded (unknown type, missing or extra params)
    #[error("{0}")]
    Malformed(String),

    /// A parameter is present but unusable
    #[error("invalid '{param}' for {kind} rule: {message}")]
    InvalidParam {
        kind: &'static str,
        param: &'static str,
        message: String,
    },

    /// The path of a jsonpath rule does not parse
    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    /// The pattern of a regex rule does not compile
    #[error("invalid regex pattern: {0}")]
    Pattern(String),
}

impl RuleShapeError {
    pub(crate) fn invalid_param(
        kind: &'static str,
        param: &'static str,
        message: impl Into<String>,
    ) -> Self {
        RuleShapeError::InvalidParam {
            kind,
            param,
            message: message.into(),
        }
    }
}
