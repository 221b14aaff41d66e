//! Preview, rule testing and mapping persistence
//!
//! [`MappingService`] sits between callers and two collaborators: a
//! [`MappingStore`] holding each channel's mapping set and a [`ChannelSchemaSource`]
//! describing channel fields. Preview and rule testing share the mapping engine with
//! live mapping, so what an operator sees is what production computes.
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

pub mod memory;

use crate::error::{Error, Result};
use crate::mapping::{check_types, FieldError, MappingEngine, MappingValidator, TypeWarning, ValidationReport};
use crate::transform::TransformRule;
use crate::types::{ChannelField, FieldMapping, InternalSchema, MappingSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use memory::InMemoryCatalog;

/// Field name used by the synthetic mapping of [`MappingService::test_rule`]
pub const TEST_FIELD: &str = "value";

/// Source of channel schemas
pub trait ChannelSchemaSource {
    /// Fields declared by the channel's API schema
    fn channel_fields(&self, channel_id: &str) -> Result<Vec<ChannelField>>;

    /// Internal fields mappings may target
    fn internal_schema(&self) -> Result<InternalSchema> {
        Ok(InternalSchema::default())
    }
}

/// Storage for mapping sets
pub trait MappingStore {
    fn fetch_mappings(&self, channel_id: &str) -> Result<MappingSet>;

    /// Replace the channel's whole set
    fn replace_mappings(&self, channel_id: &str, mappings: MappingSet) -> Result<()>;
}

impl<T: ChannelSchemaSource + ?Sized> ChannelSchemaSource for &T {
    fn channel_fields(&self, channel_id: &str) -> Result<Vec<ChannelField>> {
        (**self).channel_fields(channel_id)
    }

    fn internal_schema(&self) -> Result<InternalSchema> {
        (**self).internal_schema()
    }
}

impl<T: ChannelSchemaSource + ?Sized> ChannelSchemaSource for Arc<T> {
    fn channel_fields(&self, channel_id: &str) -> Result<Vec<ChannelField>> {
        (**self).channel_fields(channel_id)
    }

    fn internal_schema(&self) -> Result<InternalSchema> {
        (**self).internal_schema()
    }
}

impl<T: MappingStore + ?Sized> MappingStore for &T {
    fn fetch_mappings(&self, channel_id: &str) -> Result<MappingSet> {
        (**self).fetch_mappings(channel_id)
    }

    fn replace_mappings(&self, channel_id: &str, mappings: MappingSet) -> Result<()> {
        (**self).replace_mappings(channel_id, mappings)
    }
}

impl<T: MappingStore + ?Sized> MappingStore for Arc<T> {
    fn fetch_mappings(&self, channel_id: &str) -> Result<MappingSet> {
        (**self).fetch_mappings(channel_id)
    }

    fn replace_mappings(&self, channel_id: &str, mappings: MappingSet) -> Result<()> {
        (**self).replace_mappings(channel_id, mappings)
    }
}

/// A request to preview a channel's stored mappings against a sample document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub channel_id: String,
    pub input_document: Value,
}

impl PreviewRequest {
    pub fn new(channel_id: impl Into<String>, input_document: Value) -> Self {
        Self {
            channel_id: channel_id.into(),
            input_document,
        }
    }
}

/// Everything a preview produced
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PreviewReport {
    /// Internal document built from the successful mappings
    pub output: Map<String, Value>,
    /// Per-field failures, in mapping order
    pub errors: Vec<FieldError>,
    /// Source values whose type differs from the declared field type
    pub type_warnings: Vec<TypeWarning>,
}

impl PreviewReport {
    /// No errors and no type warnings
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.type_warnings.is_empty()
    }
}

/// Preview, test and save operations over the collaborators
pub struct MappingService<S, C> {
    store: S,
    schemas: C,
    engine: MappingEngine,
}

impl<S: MappingStore, C: ChannelSchemaSource> MappingService<S, C> {
    pub fn new(store: S, schemas: C) -> Self {
        Self {
            store,
            schemas,
            engine: MappingEngine::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn schemas(&self) -> &C {
        &self.schemas
    }

    /// Run the channel's stored mappings against the request document
    pub fn preview(&self, request: &PreviewRequest) -> Result<PreviewReport> {
        let mappings = self.store.fetch_mappings(&request.channel_id)?;
        debug!(
            channel_id = %request.channel_id,
            mappings = mappings.len(),
            "Running preview"
        );

        let report = self.preview_with(&mappings, &request.input_document);
        debug!(
            channel_id = %request.channel_id,
            fields = report.output.len(),
            errors = report.errors.len(),
            type_warnings = report.type_warnings.len(),
            "Preview finished"
        );
        Ok(report)
    }

    /// Run caller-supplied mappings against `document`
    pub fn preview_with(&self, mappings: &[FieldMapping], document: &Value) -> PreviewReport {
        let outcome = self.engine.apply(mappings, document);
        PreviewReport {
            output: outcome.output,
            errors: outcome.errors,
            type_warnings: check_types(mappings, document),
        }
    }

    /// Evaluate one rule against one value through the regular mapping path.
    ///
    /// The value is wrapped as `{"value": value}` and mapped by a single mapping from
    /// `value` to `value`.
    pub fn test_rule(&self, rule: Option<TransformRule>, value: Value) -> PreviewReport {
        let mut mapping = FieldMapping::new(TEST_FIELD, TEST_FIELD);
        mapping.transform_rule = rule;

        let mut document = Map::new();
        document.insert(TEST_FIELD.to_string(), value);
        self.preview_with(&[mapping], &Value::Object(document))
    }

    /// Validate and store a channel's mapping set, returning what the store now holds.
    ///
    /// The set is rejected with [`Error::Validation`] when any error-severity issue is
    /// found. After replacement the set is read back so the caller sees
    /// store-assigned values such as ids.
    pub fn save_mappings(&self, channel_id: &str, mappings: MappingSet) -> Result<MappingSet> {
        let report = self.validate_set(channel_id, &mappings)?;
        if !report.is_valid() {
            warn!(
                channel_id = %channel_id,
                errors = report.errors().count(),
                "Rejected mapping set"
            );
            return Err(Error::Validation {
                issues: report.issues,
            });
        }

        let count = mappings.len();
        self.store.replace_mappings(channel_id, mappings)?;
        info!(
            channel_id = %channel_id,
            mappings = count,
            warnings = report.warnings().count(),
            "Saved mapping set"
        );

        self.store.fetch_mappings(channel_id)
    }

    /// Validate the channel's stored mapping set
    pub fn validate_mappings(&self, channel_id: &str) -> Result<ValidationReport> {
        let mappings = self.store.fetch_mappings(channel_id)?;
        self.validate_set(channel_id, &mappings)
    }

    /// Fields of the channel's API schema
    pub fn channel_fields(&self, channel_id: &str) -> Result<Vec<ChannelField>> {
        self.schemas.channel_fields(channel_id)
    }

    /// Validate a candidate mapping set for the channel without storing it
    pub fn validate_set(&self, channel_id: &str, mappings: &[FieldMapping]) -> Result<ValidationReport> {
        let fields = self.schemas.channel_fields(channel_id)?;
        let internal = self.schemas.internal_schema()?;
        Ok(MappingValidator::new(&internal, &fields).validate(mappings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Channel;
    use serde_json::json;

    fn catalog() -> InMemoryCatalog {
        let catalog = InMemoryCatalog::new();
        catalog
            .insert_channel(Channel {
                id: "1".to_string(),
                name: "支付宝".to_string(),
                code: "alipay".to_string(),
                status: None,
                description: None,
                fields: vec![],
                mappings: vec![FieldMapping::new("out_trade_no", "order_id").required()],
            })
            .unwrap();
        catalog
    }

    #[test]
    fn test_test_rule_uses_value_field() {
        let catalog = catalog();
        let service = MappingService::new(&catalog, &catalog);

        let report = service.test_rule(Some(TransformRule::multiply(100.0)), json!(8.88));
        assert_eq!(report.output.get(TEST_FIELD), Some(&json!(888)));
        assert!(report.is_clean());

        let report = service.test_rule(None, json!({"kept": true}));
        assert_eq!(report.output.get(TEST_FIELD), Some(&json!({"kept": true})));

        let report = service.test_rule(Some(TransformRule::multiply(100.0)), json!("abc"));
        assert!(report.output.is_empty());
        assert_eq!(report.errors[0].internal_field, TEST_FIELD);
    }

    #[test]
    fn test_preview_unknown_channel() {
        let catalog = catalog();
        let service = MappingService::new(&catalog, &catalog);
        let err = service
            .preview(&PreviewRequest::new("nope", json!({})))
            .unwrap_err();
        assert!(matches!(err, Error::ChannelNotFound { .. }));
    }

    #[test]
    fn test_report_serialization_shape() {
        let catalog = catalog();
        let service = MappingService::new(&catalog, &catalog);
        let report = service
            .preview(&PreviewRequest::new("alipay", json!({"out_trade_no": "T9"})))
            .unwrap();
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"output": {"order_id": "T9"}, "errors": [], "type_warnings": []})
        );
    }
}
