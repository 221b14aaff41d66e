//! Mapping engine: applies a mapping set to one channel document
//!
//! Every mapping is attempted; failures are collected per field and the output keeps
//! whatever succeeded.
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

use crate::jsonpath::{self, Lookup, PathError};
use crate::transform::{RuleEvaluator, RuleShapeError, StandardEvaluator, TransformError};
use crate::types::FieldMapping;
use serde::Serialize;
use serde_json::{Map, Value};

/// A failure attributed to one mapping
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub channel_field: String,
    pub internal_field: String,
    pub error: TransformError,
}

/// Result of applying a mapping set: partial output plus per-field errors
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MappingOutcome {
    pub output: Map<String, Value>,
    pub errors: Vec<FieldError>,
}

impl MappingOutcome {
    /// True when every mapping succeeded
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Applies mapping sets using a [`RuleEvaluator`]
#[derive(Debug, Clone, Default)]
pub struct MappingEngine<E = StandardEvaluator> {
    evaluator: E,
}

impl MappingEngine<StandardEvaluator> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: RuleEvaluator> MappingEngine<E> {
    /// Use a custom evaluator
    pub fn with_evaluator(evaluator: E) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Apply `mappings` in order to `document`.
    ///
    /// An absent source on a required mapping is reported without invoking the
    /// rule. An absent source on an optional mapping is evaluated as `null`. When
    /// several mappings target the same internal field the last success wins.
    pub fn apply(&self, mappings: &[FieldMapping], document: &Value) -> MappingOutcome {
        let mut outcome = MappingOutcome::default();

        for mapping in mappings {
            match self.apply_one(mapping, document) {
                Ok(value) => {
                    outcome.output.insert(mapping.internal_field.clone(), value);
                }
                Err(error) => outcome.errors.push(FieldError {
                    channel_field: mapping.channel_field.clone(),
                    internal_field: mapping.internal_field.clone(),
                    error,
                }),
            }
        }

        outcome
    }

    fn apply_one(&self, mapping: &FieldMapping, document: &Value) -> Result<Value, TransformError> {
        let source = resolve_source(document, &mapping.channel_field).map_err(RuleShapeError::from)?;

        let null = Value::Null;
        let input = match source {
            Some(value) => value,
            None if mapping.is_required => {
                return Err(TransformError::RequiredFieldMissing {
                    field: mapping.channel_field.clone(),
                })
            }
            None => &null,
        };

        match &mapping.transform_rule {
            Some(rule) => self.evaluator.evaluate(rule, input),
            None => Ok(input.clone()),
        }
    }
}

/// Apply `mappings` to `document` with the standard evaluator
pub fn apply_mappings(mappings: &[FieldMapping], document: &Value) -> MappingOutcome {
    MappingEngine::new().apply(mappings, document)
}

/// Locate the source value for a channel field.
///
/// Plain names are top-level keys of an object document. Names starting with `$`
/// are paths resolved against the whole document.
pub fn resolve_source<'a>(document: &'a Value, channel_field: &str) -> Result<Option<&'a Value>, PathError> {
    if channel_field.starts_with('$') {
        return Ok(match jsonpath::traverse_json_path(document, channel_field)? {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        });
    }
    Ok(document.as_object().and_then(|map| map.get(channel_field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::TransformRule;
    use serde_json::json;

    #[test]
    fn test_plain_and_path_sources() {
        let doc = json!({"out_trade_no": "T1", "resp": {"code": "10000"}});
        assert_eq!(resolve_source(&doc, "out_trade_no").unwrap(), Some(&json!("T1")));
        assert_eq!(resolve_source(&doc, "$.resp.code").unwrap(), Some(&json!("10000")));
        assert_eq!(resolve_source(&doc, "missing").unwrap(), None);
        assert_eq!(resolve_source(&json!([1, 2]), "0").unwrap(), None);
        assert!(resolve_source(&doc, "$.resp..code").is_err());
    }

    #[test]
    fn test_absent_optional_source_is_null() {
        let set = vec![FieldMapping::new("note", "remark")];
        let outcome = apply_mappings(&set, &json!({}));
        assert!(outcome.is_complete());
        assert_eq!(outcome.output.get("remark"), Some(&Value::Null));

        let set = vec![FieldMapping::new("fee", "amount").with_rule(TransformRule::multiply(0.01))];
        let outcome = apply_mappings(&set, &json!({}));
        assert_eq!(outcome.errors[0].error.kind(), "coercion");
        assert!(outcome.output.is_empty());
    }

    #[test]
    fn test_last_mapping_wins_on_shared_target() {
        let set = vec![
            FieldMapping::new("a", "target"),
            FieldMapping::new("b", "target"),
        ];
        let outcome = apply_mappings(&set, &json!({"a": 1, "b": 2}));
        assert_eq!(outcome.output.get("target"), Some(&json!(2)));
    }

    #[test]
    fn test_failed_later_mapping_keeps_earlier_value() {
        let set = vec![
            FieldMapping::new("a", "target"),
            FieldMapping::new("b", "target").with_rule(TransformRule::multiply(2.0)),
        ];
        let outcome = apply_mappings(&set, &json!({"a": 1, "b": "x"}));
        assert_eq!(outcome.output.get("target"), Some(&json!(1)));
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn test_malformed_path_source_is_field_error() {
        let set = vec![FieldMapping::new("$.a[", "x")];
        let outcome = apply_mappings(&set, &json!({"a": [1]}));
        assert_eq!(outcome.errors[0].error.kind(), "rule_shape");
    }

    #[test]
    fn test_outcome_serialization() {
        let set = vec![FieldMapping::new("code", "status").required()];
        let outcome = apply_mappings(&set, &json!({}));
        let encoded = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            encoded,
            json!({
                "output": {},
                "errors": [{
                    "channel_field": "code",
                    "internal_field": "status",
                    "error": {
                        "kind": "required_field_missing",
                        "message": "Required field code is missing from input"
                    }
                }]
            })
        );
    }
}
