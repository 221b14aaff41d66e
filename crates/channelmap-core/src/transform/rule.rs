//! Transform rule descriptors
//!
//! A rule is stored as `{"type": "<kind>", "params": {...}}`. The kind is fixed by the
//! enum variant and each variant's params accept exactly the fields of that kind.
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

use super::error::RuleShapeError;
use crate::jsonpath;
use indexmap::IndexMap;
use regex::Regex;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Largest accepted `precision`; beyond this f64 rounding is meaningless
pub const MAX_PRECISION: u32 = 15;

/// Kinds of transform rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Multiply,
    Datetime,
    Jsonpath,
    Regex,
    EnumMap,
}

impl RuleKind {
    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Multiply => "multiply",
            RuleKind::Datetime => "datetime",
            RuleKind::Jsonpath => "jsonpath",
            RuleKind::Regex => "regex",
            RuleKind::EnumMap => "enum_map",
        }
    }

    /// All kinds, in wire-name order used by help text
    pub fn all() -> &'static [RuleKind] {
        &[
            RuleKind::Multiply,
            RuleKind::Datetime,
            RuleKind::Jsonpath,
            RuleKind::Regex,
            RuleKind::EnumMap,
        ]
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed transformation applied to one source value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum TransformRule {
    /// Numeric scaling, e.g. cents to yuan
    Multiply(MultiplyParams),
    /// Date/time reformatting
    Datetime(DatetimeParams),
    /// Extraction from a nested object or array
    Jsonpath(JsonPathParams),
    /// Extraction of a regex capture
    Regex(RegexParams),
    /// Lookup in a fixed code table
    EnumMap(EnumMapParams),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiplyParams {
    /// Factor; numeric strings such as `"100"` are accepted on input
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub value: f64,
    /// Decimal places to round the product to; unrounded when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatetimeParams {
    /// Output pattern, e.g. `YYYY-MM-DD HH:mm:ss`
    pub format: String,
    /// Pattern used to parse inputs that are not ISO-8601
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonPathParams {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegexParams {
    pub pattern: String,
    /// Capture group index; the whole match when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumMapParams {
    /// Source code to internal code, in insertion order
    pub mapping: IndexMap<String, String>,
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,
}

fn default_case_sensitive() -> bool {
    true
}

fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| de::Error::custom("factor is not representable as f64")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("factor {:?} is not a number", s))),
        other => Err(de::Error::custom(format!(
            "factor must be a number, got {}",
            other
        ))),
    }
}

impl TransformRule {
    /// Scale by `factor` without rounding
    pub fn multiply(factor: f64) -> Self {
        TransformRule::Multiply(MultiplyParams {
            value: factor,
            precision: None,
        })
    }

    /// Reformat a date/time into `format`
    pub fn datetime(format: impl Into<String>) -> Self {
        TransformRule::Datetime(DatetimeParams {
            format: format.into(),
            input_format: None,
        })
    }

    /// Extract the value at `path`
    pub fn jsonpath(path: impl Into<String>) -> Self {
        TransformRule::Jsonpath(JsonPathParams { path: path.into() })
    }

    /// Extract capture `group` (whole match when `None`) of `pattern`
    pub fn regex(pattern: impl Into<String>, group: Option<usize>) -> Self {
        TransformRule::Regex(RegexParams {
            pattern: pattern.into(),
            group,
        })
    }

    /// Translate codes through a fixed table
    pub fn enum_map<K, V, I>(entries: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        TransformRule::EnumMap(EnumMapParams {
            mapping: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            case_sensitive,
        })
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            TransformRule::Multiply(_) => RuleKind::Multiply,
            TransformRule::Datetime(_) => RuleKind::Datetime,
            TransformRule::Jsonpath(_) => RuleKind::Jsonpath,
            TransformRule::Regex(_) => RuleKind::Regex,
            TransformRule::EnumMap(_) => RuleKind::EnumMap,
        }
    }

    /// Check that the params are usable by the evaluator.
    ///
    /// Regex capture-group bounds are not checked here; an out-of-range group is
    /// reported per evaluation as an invalid-group error.
    pub fn validate(&self) -> Result<(), RuleShapeError> {
        match self {
            TransformRule::Multiply(params) => {
                if !params.value.is_finite() {
                    return Err(RuleShapeError::invalid_param(
                        "multiply",
                        "value",
                        "factor must be finite",
                    ));
                }
                if let Some(precision) = params.precision {
                    if precision > MAX_PRECISION {
                        return Err(RuleShapeError::invalid_param(
                            "multiply",
                            "precision",
                            format!("must be at most {}", MAX_PRECISION),
                        ));
                    }
                }
            }
            TransformRule::Datetime(params) => {
                if params.format.is_empty() {
                    return Err(RuleShapeError::invalid_param(
                        "datetime",
                        "format",
                        "output format must not be empty",
                    ));
                }
                if matches!(params.input_format.as_deref(), Some("")) {
                    return Err(RuleShapeError::invalid_param(
                        "datetime",
                        "input_format",
                        "input format must not be empty when given",
                    ));
                }
            }
            TransformRule::Jsonpath(params) => {
                jsonpath::parse(&params.path)?;
            }
            TransformRule::Regex(params) => {
                Regex::new(&params.pattern)
                    .map_err(|e| RuleShapeError::Pattern(e.to_string()))?;
            }
            TransformRule::EnumMap(params) => {
                if params.mapping.is_empty() {
                    return Err(RuleShapeError::invalid_param(
                        "enum_map",
                        "mapping",
                        "mapping must contain at least one entry",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Decode and validate a rule descriptor.
    ///
    /// `null` means identity. A string holding an encoded descriptor is accepted as
    /// well, since collaborators commonly store rules as text; an empty string or
    /// `"None"` also means identity.
    pub fn from_json(value: &Value) -> Result<Option<Self>, RuleShapeError> {
        let rule = Self::decode(value)?;
        if let Some(rule) = &rule {
            rule.validate()?;
        }
        Ok(rule)
    }

    /// Decode the text form a collaborator stores, then validate it
    pub fn from_stored_text(text: &str) -> Result<Option<Self>, RuleShapeError> {
        let rule = Self::decode_stored_text(text)?;
        if let Some(rule) = &rule {
            rule.validate()?;
        }
        Ok(rule)
    }

    /// Decode the descriptor shape only.
    ///
    /// Accepts the same forms as [`TransformRule::from_json`] but leaves param
    /// checks such as pattern compilation to [`TransformRule::validate`], so a
    /// mapping set can be loaded and then reported on entry by entry.
    pub fn decode(value: &Value) -> Result<Option<Self>, RuleShapeError> {
        match value {
            Value::Null => Ok(None),
            Value::String(text) => Self::decode_stored_text(text),
            Value::Object(_) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| RuleShapeError::Malformed(e.to_string())),
            other => Err(RuleShapeError::Malformed(format!(
                "rule descriptor must be an object or null, got {}",
                other
            ))),
        }
    }

    fn decode_stored_text(text: &str) -> Result<Option<Self>, RuleShapeError> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "None" || trimmed == "null" {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(trimmed)
            .map_err(|e| RuleShapeError::Malformed(format!("rule text is not JSON: {}", e)))?;
        if value.is_string() {
            return Err(RuleShapeError::Malformed(
                "rule text must encode an object".to_string(),
            ));
        }
        Self::decode(&value)
    }

    /// Encode an optional rule, `null` for identity
    pub fn to_json(rule: Option<&Self>) -> Value {
        match rule {
            // Serializing plain data with string keys cannot fail
            Some(rule) => serde_json::to_value(rule).unwrap_or(Value::Null),
            None => Value::Null,
        }
    }
}

/// One-line summary used in listings
impl fmt::Display for TransformRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformRule::Multiply(p) => {
                write!(f, "multiply by {}", p.value)?;
                if let Some(precision) = p.precision {
                    write!(f, " ({} dp)", precision)?;
                }
                Ok(())
            }
            TransformRule::Datetime(p) => match &p.input_format {
                Some(input) => write!(f, "datetime {} -> {}", input, p.format),
                None => write!(f, "datetime -> {}", p.format),
            },
            TransformRule::Jsonpath(p) => write!(f, "jsonpath {}", p.path),
            TransformRule::Regex(p) => match p.group {
                Some(group) => write!(f, "regex /{}/ group {}", p.pattern, group),
                None => write!(f, "regex /{}/", p.pattern),
            },
            TransformRule::EnumMap(p) => write!(
                f,
                "enum_map ({} entries{})",
                p.mapping.len(),
                if p.case_sensitive { "" } else { ", case-insensitive" }
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_each_kind() {
        let multiply = TransformRule::from_json(&json!({"type": "multiply", "params": {"value": 0.01}}))
            .unwrap()
            .unwrap();
        assert_eq!(multiply, TransformRule::multiply(0.01));

        let datetime = TransformRule::from_json(&json!({
            "type": "datetime",
            "params": {"format": "YYYY-MM-DD", "input_format": "YYYYMMDDHHmmss"}
        }))
        .unwrap()
        .unwrap();
        assert_eq!(datetime.kind(), RuleKind::Datetime);

        let path = TransformRule::from_json(&json!({"type": "jsonpath", "params": {"path": "data.id"}}))
            .unwrap()
            .unwrap();
        assert_eq!(path, TransformRule::jsonpath("data.id"));

        let regex = TransformRule::from_json(&json!({
            "type": "regex",
            "params": {"pattern": "^(\\d+)-(\\d+)$", "group": 2}
        }))
        .unwrap()
        .unwrap();
        assert_eq!(regex, TransformRule::regex("^(\\d+)-(\\d+)$", Some(2)));

        let enum_map = TransformRule::from_json(&json!({
            "type": "enum_map",
            "params": {"mapping": {"SUCCESS": "支付成功"}}
        }))
        .unwrap()
        .unwrap();
        match enum_map {
            TransformRule::EnumMap(p) => assert!(p.case_sensitive),
            other => panic!("unexpected rule {:?}", other),
        }
    }

    #[test]
    fn test_null_and_stored_identity() {
        assert_eq!(TransformRule::from_json(&Value::Null).unwrap(), None);
        assert_eq!(TransformRule::from_json(&json!("None")).unwrap(), None);
        assert_eq!(TransformRule::from_json(&json!("")).unwrap(), None);
        assert_eq!(TransformRule::to_json(None), Value::Null);
    }

    #[test]
    fn test_stored_text_form() {
        let text = r#"{"type": "multiply", "params": {"value": "100"}}"#;
        let rule = TransformRule::from_json(&json!(text)).unwrap().unwrap();
        assert_eq!(rule, TransformRule::multiply(100.0));

        assert!(matches!(
            TransformRule::from_stored_text("{not json"),
            Err(RuleShapeError::Malformed(_))
        ));
        assert!(matches!(
            TransformRule::from_stored_text(r#""\"nested\"""#),
            Err(RuleShapeError::Malformed(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_shapes() {
        let unknown_kind = json!({"type": "uppercase", "params": {}});
        assert!(matches!(
            TransformRule::from_json(&unknown_kind),
            Err(RuleShapeError::Malformed(_))
        ));

        let missing_param = json!({"type": "multiply", "params": {}});
        assert!(matches!(
            TransformRule::from_json(&missing_param),
            Err(RuleShapeError::Malformed(_))
        ));

        let foreign_param = json!({"type": "jsonpath", "params": {"path": "a", "group": 1}});
        assert!(matches!(
            TransformRule::from_json(&foreign_param),
            Err(RuleShapeError::Malformed(_))
        ));

        assert!(matches!(
            TransformRule::from_json(&json!(42)),
            Err(RuleShapeError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_leaves_param_checks_to_validate() {
        let raw = json!({"type": "regex", "params": {"pattern": "(["}});
        let rule = TransformRule::decode(&raw).unwrap().unwrap();
        assert_eq!(rule, TransformRule::regex("([", None));
        assert!(matches!(rule.validate(), Err(RuleShapeError::Pattern(_))));
        assert!(matches!(
            TransformRule::from_json(&raw),
            Err(RuleShapeError::Pattern(_))
        ));

        let stored = json!(r#"{"type": "jsonpath", "params": {"path": "a..b"}}"#);
        assert!(TransformRule::decode(&stored).unwrap().is_some());
        assert!(TransformRule::from_json(&stored).is_err());

        // Shape errors still fail at decode time
        assert!(matches!(
            TransformRule::decode(&json!({"type": "uppercase", "params": {}})),
            Err(RuleShapeError::Malformed(_))
        ));
        assert_eq!(TransformRule::decode(&json!("None")).unwrap(), None);
    }

    #[test]
    fn test_validate_params() {
        assert!(matches!(
            TransformRule::regex("(unclosed", None).validate(),
            Err(RuleShapeError::Pattern(_))
        ));
        assert!(matches!(
            TransformRule::jsonpath("data..id").validate(),
            Err(RuleShapeError::Path(_))
        ));
        assert!(matches!(
            TransformRule::datetime("").validate(),
            Err(RuleShapeError::InvalidParam { param: "format", .. })
        ));
        assert!(matches!(
            TransformRule::enum_map(Vec::<(String, String)>::new(), true).validate(),
            Err(RuleShapeError::InvalidParam { param: "mapping", .. })
        ));
        assert!(matches!(
            TransformRule::multiply(f64::INFINITY).validate(),
            Err(RuleShapeError::InvalidParam { param: "value", .. })
        ));

        let precise = TransformRule::Multiply(MultiplyParams {
            value: 1.0,
            precision: Some(40),
        });
        assert!(precise.validate().is_err());

        // Group bounds are a runtime concern
        assert!(TransformRule::regex("^(\\d+)$", Some(5)).validate().is_ok());
    }

    #[test]
    fn test_serialization_omits_absent_options() {
        let rule = TransformRule::regex("\\d+", None);
        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            json!({"type": "regex", "params": {"pattern": "\\d+"}})
        );

        let rule = TransformRule::enum_map([("b", "2"), ("a", "1")], false);
        let encoded = serde_json::to_string(&rule).unwrap();
        assert_eq!(
            encoded,
            r#"{"type":"enum_map","params":{"mapping":{"b":"2","a":"1"},"case_sensitive":false}}"#
        );
        let decoded: TransformRule = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, rule);
    }

    #[test]
    fn test_display_summary() {
        assert_eq!(TransformRule::multiply(0.01).to_string(), "multiply by 0.01");
        assert_eq!(TransformRule::jsonpath("a.b").to_string(), "jsonpath a.b");
        assert_eq!(
            TransformRule::enum_map([("x", "y")], false).to_string(),
            "enum_map (1 entries, case-insensitive)"
        );
        assert_eq!(RuleKind::EnumMap.to_string(), "enum_map");
        assert_eq!(RuleKind::all().len(), 5);
    }
}
