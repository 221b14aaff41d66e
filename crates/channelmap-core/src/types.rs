//! Core data types for channel mappings
//!
//! This module contains the field mapping model, channel and internal schemas, and
//! the catalog document used to seed a collaborator.
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

use crate::transform::TransformRule;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Expected JSON type of a source or target value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    /// A date/time string or epoch seconds
    Datetime,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Datetime => "datetime",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One channel-field to internal-field association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Identifier assigned by the store, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Key in the channel document; a `$`-prefixed value is a path into it
    pub channel_field: String,
    /// Key in the internal document
    pub internal_field: String,
    /// `None` means identity
    #[serde(default, deserialize_with = "deserialize_rule")]
    pub transform_rule: Option<TransformRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Ordered mappings for one channel; replaced as a whole on save
pub type MappingSet = Vec<FieldMapping>;

/// Accepts an inline rule object, `null`, or the stored text form.
///
/// Only the descriptor shape is checked here; param checks are reported by the
/// mapping validator against the entry that carries the rule.
fn deserialize_rule<'de, D>(deserializer: D) -> Result<Option<TransformRule>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    TransformRule::decode(&raw).map_err(de::Error::custom)
}

impl FieldMapping {
    /// Identity mapping from `channel_field` to `internal_field`
    pub fn new(channel_field: impl Into<String>, internal_field: impl Into<String>) -> Self {
        Self {
            id: None,
            channel_field: channel_field.into(),
            internal_field: internal_field.into(),
            transform_rule: None,
            field_type: None,
            is_required: false,
            description: None,
        }
    }

    pub fn with_rule(mut self, rule: TransformRule) -> Self {
        self.transform_rule = Some(rule);
        self
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// Whether the channel field is a path rather than a plain key
    pub fn is_path_source(&self) -> bool {
        self.channel_field.starts_with('$')
    }
}

/// A field in a channel's API schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelField {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A field of the canonical internal schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl InternalField {
    pub fn new(name: &str, field_type: FieldType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            description: Some(description.to_string()),
        }
    }
}

/// The set of internal fields mappings may target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternalSchema {
    fields: Vec<InternalField>,
}

impl InternalSchema {
    pub fn new(fields: Vec<InternalField>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[InternalField] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&InternalField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl Default for InternalSchema {
    fn default() -> Self {
        Self::new(vec![
            InternalField::new("order_id", FieldType::String, "订单号"),
            InternalField::new("amount", FieldType::Number, "金额"),
            InternalField::new("currency", FieldType::String, "币种"),
            InternalField::new("status", FieldType::String, "状态"),
            InternalField::new("created_time", FieldType::Datetime, "创建时间"),
        ])
    }
}

/// A payment channel with its schema and mappings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<ChannelField>,
    #[serde(default)]
    pub mappings: MappingSet,
}

/// Document listing channels, their schemas and mappings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Replaces the default internal schema when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_fields: Option<InternalSchema>,
    #[serde(default)]
    pub channels: Vec<Channel>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "channel id must be a string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_mapping_accepts_rule_forms() {
        let inline: FieldMapping = serde_json::from_value(json!({
            "channel_field": "total_fee",
            "internal_field": "amount",
            "transform_rule": {"type": "multiply", "params": {"value": 0.01}}
        }))
        .unwrap();
        assert_eq!(inline.transform_rule, Some(TransformRule::multiply(0.01)));
        assert!(!inline.is_required);

        let stored: FieldMapping = serde_json::from_value(json!({
            "id": 7,
            "channel_field": "total_fee",
            "internal_field": "amount",
            "transform_rule": "{\"type\": \"multiply\", \"params\": {\"value\": 0.01}}",
            "field_type": "integer",
            "is_required": true
        }))
        .unwrap();
        assert_eq!(stored.transform_rule, inline.transform_rule);
        assert_eq!(stored.field_type, Some(FieldType::Integer));
        assert_eq!(stored.id, Some(7));

        for identity in [json!(null), json!("None"), json!("")] {
            let mapping: FieldMapping = serde_json::from_value(json!({
                "channel_field": "a",
                "internal_field": "b",
                "transform_rule": identity
            }))
            .unwrap();
            assert_eq!(mapping.transform_rule, None);
        }
    }

    #[test]
    fn test_field_mapping_rejects_malformed_rule_shape() {
        let result: Result<FieldMapping, _> = serde_json::from_value(json!({
            "channel_field": "a",
            "internal_field": "b",
            "transform_rule": {"type": "uppercase", "params": {}}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_field_mapping_keeps_invalid_params_for_validation() {
        let mapping: FieldMapping = serde_json::from_value(json!({
            "channel_field": "a",
            "internal_field": "b",
            "transform_rule": {"type": "regex", "params": {"pattern": "(("}}
        }))
        .unwrap();
        let rule = mapping.transform_rule.unwrap();
        assert!(rule.validate().is_err());
    }

    #[test]
    fn test_builder_and_serialization() {
        let mapping = FieldMapping::new("$.resp.trade_no", "order_id")
            .required()
            .with_type(FieldType::String)
            .with_description("渠道订单号");
        assert!(mapping.is_path_source());

        let encoded = serde_json::to_value(&mapping).unwrap();
        assert_eq!(
            encoded,
            json!({
                "channel_field": "$.resp.trade_no",
                "internal_field": "order_id",
                "transform_rule": null,
                "field_type": "string",
                "is_required": true,
                "description": "渠道订单号"
            })
        );
        let decoded: FieldMapping = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, mapping);
    }

    #[test]
    fn test_default_internal_schema() {
        let schema = InternalSchema::default();
        assert_eq!(schema.get("order_id").unwrap().field_type, FieldType::String);
        assert_eq!(schema.get("amount").unwrap().field_type, FieldType::Number);
        assert!(!schema.contains("unknown"));
    }

    #[test]
    fn test_catalog_accepts_numeric_channel_ids() {
        let catalog: Catalog = serde_json::from_value(json!({
            "channels": [{
                "id": 3,
                "name": "微信支付",
                "code": "wechat",
                "fields": [{"name": "total_fee", "type": "integer", "required": true}]
            }]
        }))
        .unwrap();
        let channel = &catalog.channels[0];
        assert_eq!(channel.id, "3");
        assert!(channel.mappings.is_empty());
        assert!(channel.fields[0].required);
        assert!(catalog.internal_fields.is_none());
    }
}
