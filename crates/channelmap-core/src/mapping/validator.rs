//! Mapping set validation
//!
//! Checks a mapping set before it is saved: structural problems are errors, schema
//! mismatches are warnings. Source value types can also be checked against a sample
//! document.
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

use super::engine::resolve_source;
use crate::error::Severity;
use crate::transform::coerce::type_name;
use crate::transform::datetime::parse_date;
use crate::transform::TransformRule;
use crate::types::{ChannelField, FieldMapping, FieldType, InternalSchema, MappingSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// A finding about one mapping, located by a path such as `mappings[2].transform_rule`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field_path: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    pub severity: Severity,
}

impl ValidationIssue {
    fn new(severity: Severity, field_path: String, message: impl Into<String>) -> Self {
        Self {
            field_path,
            message: message.into(),
            expected: None,
            actual: None,
            severity,
        }
    }

    fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    fn actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.field_path, self.message)
    }
}

/// All findings for a mapping set
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// No error-severity findings
    pub fn is_valid(&self) -> bool {
        !self.has(Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(Severity::Warning)
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |issue| issue.severity == severity)
    }

    fn has(&self, severity: Severity) -> bool {
        self.issues.iter().any(|issue| issue.severity == severity)
    }
}

/// A present source value whose JSON type differs from the mapping's `field_type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeWarning {
    pub channel_field: String,
    pub expected: FieldType,
    pub actual: String,
}

impl fmt::Display for TypeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, found {}",
            self.channel_field, self.expected, self.actual
        )
    }
}

/// Validates mapping sets against the internal schema and a channel schema
pub struct MappingValidator<'a> {
    internal: &'a InternalSchema,
    channel_fields: &'a [ChannelField],
}

impl<'a> MappingValidator<'a> {
    /// An empty `channel_fields` means the channel schema is unknown and
    /// channel-side membership is not checked.
    pub fn new(internal: &'a InternalSchema, channel_fields: &'a [ChannelField]) -> Self {
        Self {
            internal,
            channel_fields,
        }
    }

    pub fn validate(&self, mappings: &[FieldMapping]) -> ValidationReport {
        let mut issues = Vec::new();
        let channel_index: HashMap<&str, &ChannelField> = self
            .channel_fields
            .iter()
            .map(|field| (field.name.as_str(), field))
            .collect();
        let mut targets: HashMap<&str, usize> = HashMap::new();

        for (i, mapping) in mappings.iter().enumerate() {
            let prefix = format!("mappings[{}]", i);
            self.check_mapping(&prefix, mapping, &channel_index, &mut issues);

            if !mapping.internal_field.is_empty() {
                if let Some(previous) = targets.insert(mapping.internal_field.as_str(), i) {
                    issues.push(
                        ValidationIssue::new(
                            Severity::Warning,
                            format!("{}.internal_field", prefix),
                            format!(
                                "'{}' is also targeted by mappings[{}]; the later mapping wins",
                                mapping.internal_field, previous
                            ),
                        )
                        .expected("one mapping per internal field"),
                    );
                }
            }
        }

        for field in self.channel_fields.iter().filter(|field| field.required) {
            let mapped = mappings
                .iter()
                .any(|mapping| mapping.channel_field == field.name);
            if !mapped {
                issues.push(ValidationIssue::new(
                    Severity::Info,
                    format!("channel.{}", field.name),
                    format!("required channel field '{}' has no mapping", field.name),
                ));
            }
        }

        ValidationReport { issues }
    }

    fn check_mapping(
        &self,
        prefix: &str,
        mapping: &FieldMapping,
        channel_index: &HashMap<&str, &ChannelField>,
        issues: &mut Vec<ValidationIssue>,
    ) {
        if mapping.channel_field.trim().is_empty() {
            issues.push(ValidationIssue::new(
                Severity::Error,
                format!("{}.channel_field", prefix),
                "channel field must not be empty",
            ));
        } else if mapping.is_path_source() {
            if let Err(err) = crate::jsonpath::parse(&mapping.channel_field) {
                issues.push(
                    ValidationIssue::new(
                        Severity::Error,
                        format!("{}.channel_field", prefix),
                        format!("invalid source path: {}", err),
                    )
                    .actual(mapping.channel_field.clone()),
                );
            }
        } else if !self.channel_fields.is_empty() {
            match channel_index.get(mapping.channel_field.as_str()) {
                None => issues.push(
                    ValidationIssue::new(
                        Severity::Warning,
                        format!("{}.channel_field", prefix),
                        format!("'{}' is not in the channel schema", mapping.channel_field),
                    )
                    .actual(mapping.channel_field.clone()),
                ),
                Some(field) => {
                    if let (Some(declared), Some(mapped)) = (field.field_type, mapping.field_type) {
                        if declared != mapped {
                            issues.push(
                                ValidationIssue::new(
                                    Severity::Warning,
                                    format!("{}.field_type", prefix),
                                    "field type differs from the channel schema",
                                )
                                .expected(declared.to_string())
                                .actual(mapped.to_string()),
                            );
                        }
                    }
                }
            }
        }

        if mapping.internal_field.trim().is_empty() {
            issues.push(ValidationIssue::new(
                Severity::Error,
                format!("{}.internal_field", prefix),
                "internal field must not be empty",
            ));
        } else if !self.internal.contains(&mapping.internal_field) {
            issues.push(
                ValidationIssue::new(
                    Severity::Warning,
                    format!("{}.internal_field", prefix),
                    format!("'{}' is not an internal field", mapping.internal_field),
                )
                .actual(mapping.internal_field.clone()),
            );
        }

        if let Some(rule) = &mapping.transform_rule {
            if let Err(err) = rule.validate() {
                issues.push(
                    ValidationIssue::new(
                        Severity::Error,
                        format!("{}.transform_rule", prefix),
                        err.to_string(),
                    )
                    .actual(rule.kind().to_string()),
                );
            }
        }
    }
}

/// Decode a raw mapping set entry by entry.
///
/// Entries that do not decode are reported as error issues at their index, on
/// `transform_rule` when the rule descriptor is what fails. Decoded entries still
/// need [`MappingValidator::validate`].
pub fn decode_mappings(raw: &[Value]) -> Result<MappingSet, ValidationReport> {
    let mut mappings = Vec::with_capacity(raw.len());
    let mut issues = Vec::new();

    for (i, entry) in raw.iter().enumerate() {
        match serde_json::from_value::<FieldMapping>(entry.clone()) {
            Ok(mapping) => mappings.push(mapping),
            Err(err) => issues.push(decode_issue(i, entry, &err)),
        }
    }

    if issues.is_empty() {
        Ok(mappings)
    } else {
        Err(ValidationReport { issues })
    }
}

fn decode_issue(index: usize, entry: &Value, err: &serde_json::Error) -> ValidationIssue {
    let prefix = format!("mappings[{}]", index);
    let rule_error = entry
        .get("transform_rule")
        .and_then(|raw| TransformRule::decode(raw).err());

    match rule_error {
        Some(rule_err) => ValidationIssue::new(
            Severity::Error,
            format!("{}.transform_rule", prefix),
            rule_err.to_string(),
        ),
        None => ValidationIssue::new(Severity::Error, prefix, format!("invalid mapping: {}", err))
            .actual(type_name(entry)),
    }
}

/// Whether `value` has the JSON shape `expected` describes
pub fn value_matches(value: &Value, expected: FieldType) -> bool {
    match expected {
        FieldType::String => value.is_string(),
        FieldType::Number => value.is_number(),
        FieldType::Integer => match value {
            Value::Number(n) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            _ => false,
        },
        FieldType::Boolean => value.is_boolean(),
        FieldType::Array => value.is_array(),
        FieldType::Object => value.is_object(),
        FieldType::Datetime => value.is_number() || (value.is_string() && parse_date(value, None).is_ok()),
    }
}

/// Report source values in `document` whose type differs from their mapping's
/// declared `field_type`. Absent and `null` values are not checked.
pub fn check_types(mappings: &[FieldMapping], document: &Value) -> Vec<TypeWarning> {
    mappings
        .iter()
        .filter_map(|mapping| {
            let expected = mapping.field_type?;
            let value = resolve_source(document, &mapping.channel_field).ok()??;
            if value.is_null() || value_matches(value, expected) {
                return None;
            }
            Some(TypeWarning {
                channel_field: mapping.channel_field.clone(),
                expected,
                actual: type_name(value).to_string(),
            })
        })
        .collect()
}
