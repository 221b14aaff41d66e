//! Property-based testing strategies for generating test data
//!
//! This module provides proptest strategies for generating random
//! but valid rules, mappings, paths and documents.

#![cfg(test)]

use crate::transform::{
    DatetimeParams, EnumMapParams, MultiplyParams, RegexParams, TransformRule,
};
use crate::types::{FieldMapping, FieldType};
use indexmap::IndexMap;
use proptest::collection::{hash_map, vec};
use proptest::option;
use proptest::prelude::*;
use serde_json::Value;

/// Strategy for generating simple JSON values with controlled depth
pub fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        (-1e9f64..1e9).prop_map(|f| serde_json::json!(f)),
        "[a-zA-Z0-9 .:-]{0,30}".prop_map(Value::String),
    ];

    leaf.prop_recursive(
        3,  // max depth
        20, // max size
        5,  // items per collection
        |inner| {
            prop_oneof![
                vec(inner.clone(), 0..5).prop_map(Value::Array),
                hash_map("[a-z_]{1,8}", inner, 0..5)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        },
    )
}

/// Strategy for generating well-formed path expressions
pub fn path_strategy() -> impl Strategy<Value = String> {
    let segment = prop_oneof![
        "[a-z_][a-z0-9_]{0,8}".prop_map(|key| format!(".{}", key)),
        (0usize..6).prop_map(|index| format!("[{}]", index)),
    ];
    (any::<bool>(), "[a-z_][a-z0-9_]{0,8}", vec(segment, 0..4)).prop_map(
        |(rooted, head, rest)| {
            let mut path = if rooted {
                format!("$.{}", head)
            } else {
                head
            };
            for segment in rest {
                path.push_str(&segment);
            }
            path
        },
    )
}

fn pattern_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(r"^(\d+)-(\d+)$".to_string()),
        Just(r"\d+".to_string()),
        Just(r"([A-Z]+)_(\w+)".to_string()),
        Just(r"(a)?b".to_string()),
        "[a-z]{1,5}",
    ]
}

fn token_pattern_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("YYYY-MM-DD HH:mm:ss".to_string()),
        Just("YYYY/MM/DD".to_string()),
        Just("%Y%m%d".to_string()),
        Just("HH:mm:ss.SSS".to_string()),
        "[A-Za-z%:/ -]{1,12}",
    ]
}

/// Strategy for generating valid transform rules of every kind
pub fn rule_strategy() -> impl Strategy<Value = TransformRule> {
    prop_oneof![
        (-1e6f64..1e6, option::of(0u32..=6)).prop_map(|(value, precision)| {
            TransformRule::Multiply(MultiplyParams { value, precision })
        }),
        (token_pattern_strategy(), option::of(token_pattern_strategy())).prop_map(
            |(format, input_format)| {
                TransformRule::Datetime(DatetimeParams {
                    format,
                    input_format,
                })
            }
        ),
        path_strategy().prop_map(TransformRule::jsonpath),
        (pattern_strategy(), option::of(0usize..4))
            .prop_map(|(pattern, group)| TransformRule::Regex(RegexParams { pattern, group })),
        (vec(("[A-Za-z_]{1,10}", "[a-z一-龥]{1,6}"), 1..6), any::<bool>()).prop_map(
            |(entries, case_sensitive)| {
                TransformRule::EnumMap(EnumMapParams {
                    mapping: entries.into_iter().collect::<IndexMap<_, _>>(),
                    case_sensitive,
                })
            }
        ),
    ]
}

/// Strategy for generating field types
pub fn field_type_strategy() -> impl Strategy<Value = FieldType> {
    prop_oneof![
        Just(FieldType::String),
        Just(FieldType::Number),
        Just(FieldType::Integer),
        Just(FieldType::Boolean),
        Just(FieldType::Array),
        Just(FieldType::Object),
        Just(FieldType::Datetime),
    ]
}

/// Strategy for generating field mappings over a small key space
pub fn field_mapping_strategy() -> impl Strategy<Value = FieldMapping> {
    (
        "[a-e]",  // channel_field
        "[v-z]",  // internal_field
        option::of(rule_strategy()),
        option::of(field_type_strategy()),
        any::<bool>(), // is_required
    )
        .prop_map(
            |(channel_field, internal_field, transform_rule, field_type, is_required)| {
                FieldMapping {
                    id: None,
                    channel_field,
                    internal_field,
                    transform_rule,
                    field_type,
                    is_required,
                    description: None,
                }
            },
        )
}
