//! Rule evaluation
//!
//! Evaluation is a pure function of `(rule, input)`. Every failure is returned as a
//! [`TransformError`]; nothing here panics on user data.
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

use super::coerce::{excerpt, number_to_value, round_to, stringify, to_number, trim_float_noise};
use super::datetime::{format_date, parse_date};
use super::error::{RuleShapeError, TransformError};
use super::rule::{
    DatetimeParams, EnumMapParams, JsonPathParams, MultiplyParams, RegexParams, TransformRule,
};
use crate::jsonpath::{self, Lookup};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

/// Compiled regex patterns, keyed by pattern text
static PATTERNS: OnceLock<RwLock<HashMap<String, Regex>>> = OnceLock::new();

/// Patterns kept before the cache is reset
const PATTERN_CACHE_LIMIT: usize = 256;

/// Applies rules to values.
///
/// The mapping engine is generic over this trait; [`StandardEvaluator`] is the
/// production implementation.
pub trait RuleEvaluator {
    fn evaluate(&self, rule: &TransformRule, input: &Value) -> Result<Value, TransformError>;
}

/// Evaluator backed by [`evaluate`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEvaluator;

impl RuleEvaluator for StandardEvaluator {
    fn evaluate(&self, rule: &TransformRule, input: &Value) -> Result<Value, TransformError> {
        evaluate(rule, input)
    }
}

/// Apply one rule to one input value
pub fn evaluate(rule: &TransformRule, input: &Value) -> Result<Value, TransformError> {
    match rule {
        TransformRule::Multiply(params) => multiply(params, input),
        TransformRule::Datetime(params) => reformat_datetime(params, input),
        TransformRule::Jsonpath(params) => extract_path(params, input),
        TransformRule::Regex(params) => extract_capture(params, input),
        TransformRule::EnumMap(params) => map_enum(params, input),
    }
}

/// Apply an optional rule; `None` is identity
pub fn evaluate_optional(rule: Option<&TransformRule>, input: &Value) -> Result<Value, TransformError> {
    match rule {
        Some(rule) => evaluate(rule, input),
        None => Ok(input.clone()),
    }
}

fn multiply(params: &MultiplyParams, input: &Value) -> Result<Value, TransformError> {
    let n = to_number(input)?;
    let product = match params.precision {
        Some(precision) => round_to(n * params.value, precision),
        None => trim_float_noise(n * params.value),
    };
    number_to_value(product).ok_or_else(|| {
        TransformError::coercion("number", excerpt(input), "product is not finite")
    })
}

fn reformat_datetime(params: &DatetimeParams, input: &Value) -> Result<Value, TransformError> {
    let parsed = parse_date(input, params.input_format.as_deref())?;
    Ok(Value::String(format_date(&parsed, &params.format)))
}

fn extract_path(params: &JsonPathParams, input: &Value) -> Result<Value, TransformError> {
    if !input.is_object() && !input.is_array() {
        return Err(TransformError::coercion(
            "object or array",
            excerpt(input),
            "path extraction needs a structured value",
        ));
    }
    let lookup = jsonpath::traverse_json_path(input, &params.path).map_err(RuleShapeError::from)?;
    match lookup {
        Lookup::Found(value) => Ok(value.clone()),
        Lookup::NotFound => Err(TransformError::PathNotFound {
            path: params.path.clone(),
        }),
    }
}

fn extract_capture(params: &RegexParams, input: &Value) -> Result<Value, TransformError> {
    let re = compiled(&params.pattern)?;
    let text = stringify(input);

    let captures = re.captures(&text).ok_or_else(|| TransformError::NoMatch {
        pattern: params.pattern.clone(),
        value: excerpt(input),
    })?;

    let group = params.group.unwrap_or(0);
    if group >= re.captures_len() {
        return Err(TransformError::InvalidGroup {
            group,
            available: re.captures_len() - 1,
        });
    }

    Ok(captures
        .get(group)
        .map(|m| Value::String(m.as_str().to_string()))
        .unwrap_or(Value::Null))
}

/// Fetch a compiled pattern, compiling and caching it on first use.
///
/// Invalid patterns are not cached. A poisoned lock only disables caching.
fn compiled(pattern: &str) -> Result<Regex, RuleShapeError> {
    let cache = PATTERNS.get_or_init(|| RwLock::new(HashMap::new()));
    if let Ok(patterns) = cache.read() {
        if let Some(re) = patterns.get(pattern) {
            return Ok(re.clone());
        }
    }

    let re = Regex::new(pattern).map_err(|e| RuleShapeError::Pattern(e.to_string()))?;
    if let Ok(mut patterns) = cache.write() {
        if patterns.len() >= PATTERN_CACHE_LIMIT {
            patterns.clear();
        }
        patterns.insert(pattern.to_string(), re.clone());
    }
    Ok(re)
}

fn map_enum(params: &EnumMapParams, input: &Value) -> Result<Value, TransformError> {
    let key = stringify(input);
    let hit = if params.case_sensitive {
        params.mapping.get(&*key)
    } else {
        let folded = key.to_lowercase();
        params
            .mapping
            .iter()
            .find(|(candidate, _)| candidate.to_lowercase() == folded)
            .map(|(_, mapped)| mapped)
    };

    match hit {
        Some(mapped) => Ok(Value::String(mapped.clone())),
        None => Err(TransformError::UnmappedValue {
            value: key.into_owned(),
            available: params.mapping.keys().cloned().collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_multiply_cents() {
        let rule = TransformRule::multiply(100.0);
        assert_eq!(evaluate(&rule, &json!(8.88)).unwrap(), json!(888));
        assert_eq!(evaluate(&rule, &json!("8.88")).unwrap(), json!(888));

        let rule = TransformRule::multiply(0.01);
        assert_eq!(evaluate(&rule, &json!(1234)).unwrap(), json!(12.34));
    }

    #[test]
    fn test_multiply_without_precision_keeps_small_values() {
        let rule = TransformRule::multiply(1.0);
        assert_eq!(evaluate(&rule, &json!(0.004)).unwrap(), json!(0.004));

        let rule = TransformRule::multiply(0.001);
        assert_eq!(evaluate(&rule, &json!(1234)).unwrap(), json!(1.234));

        let rule = TransformRule::multiply(1.0 / 3.0);
        assert_eq!(evaluate(&rule, &json!(1)).unwrap(), json!(0.333333333333333));
    }

    #[test]
    fn test_multiply_precision() {
        let rule = TransformRule::Multiply(MultiplyParams {
            value: 1.0 / 3.0,
            precision: Some(4),
        });
        assert_eq!(evaluate(&rule, &json!(1)).unwrap(), json!(0.3333));

        let rule = TransformRule::Multiply(MultiplyParams {
            value: 0.5,
            precision: Some(0),
        });
        assert_eq!(evaluate(&rule, &json!(5)).unwrap(), json!(3));
    }

    #[test]
    fn test_multiply_rejects_non_numeric() {
        let rule = TransformRule::multiply(100.0);
        for bad in [json!("abc"), Value::Null, json!(true), json!({})] {
            assert_eq!(evaluate(&rule, &bad).unwrap_err().kind(), "coercion");
        }
    }

    #[test]
    fn test_multiply_overflow_is_coercion() {
        let rule = TransformRule::multiply(1e308);
        let err = evaluate(&rule, &json!(1e308)).unwrap_err();
        assert_eq!(err.kind(), "coercion");
    }

    #[test]
    fn test_identity() {
        let doc = json!({"nested": [1, 2]});
        assert_eq!(evaluate_optional(None, &doc).unwrap(), doc);
        assert_eq!(evaluate_optional(None, &Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_malformed_rule_at_runtime_is_rule_shape() {
        let rule = TransformRule::regex("(", None);
        assert_eq!(evaluate(&rule, &json!("x")).unwrap_err().kind(), "rule_shape");

        let rule = TransformRule::jsonpath("a..b");
        assert_eq!(evaluate(&rule, &json!({"a": 1})).unwrap_err().kind(), "rule_shape");
    }

    #[test]
    fn test_regex_pattern_compiled_once_and_reused() {
        let pattern = r"^order-(\d+)$";
        let rule = TransformRule::regex(pattern, Some(1));
        for _ in 0..3 {
            assert_eq!(evaluate(&rule, &json!("order-42")).unwrap(), json!("42"));
        }

        let cached = PATTERNS.get().unwrap().read().unwrap().get(pattern).cloned().unwrap();
        assert_eq!(cached.as_str(), pattern);
        assert_eq!(compiled(pattern).unwrap().as_str(), pattern);
    }

    #[test]
    fn test_invalid_pattern_is_not_cached() {
        assert!(matches!(compiled("(unbalanced"), Err(RuleShapeError::Pattern(_))));
        let patterns = PATTERNS.get_or_init(|| RwLock::new(HashMap::new()));
        assert!(!patterns.read().unwrap().contains_key("(unbalanced"));
    }

    #[test]
    fn test_regex_non_participating_group_is_null() {
        let rule = TransformRule::regex("^(a)?b$", Some(1));
        assert_eq!(evaluate(&rule, &json!("b")).unwrap(), Value::Null);
    }
}
