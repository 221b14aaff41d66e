//! Channelmap Core - field mapping engine for payment channel integration
//!
//! This crate maps fields of an external payment channel's API payload onto an
//! internal canonical schema, applying a typed transform rule per field, and lets
//! operators preview and test mappings on the same code path production uses.
//!
//! # Main Components
//!
//! - **Transform rules**: multiply, datetime, jsonpath, regex and enum_map rules with
//!   a pure evaluator ([`transform`])
//! - **Path traversal**: dotted/indexed paths into JSON documents ([`jsonpath`])
//! - **Mapping engine**: applies a mapping set with per-field error collection
//!   ([`mapping`])
//! - **Service boundary**: preview, rule testing and validated saves over storage
//!   collaborators ([`service`])
//!
//! # Example
//!
//! ```
//! use channelmap_core::{FieldMapping, InMemoryCatalog, MappingService, PreviewRequest};
//! use channelmap_core::transform::built_in;
//! use serde_json::json;
//!
//! # fn main() -> channelmap_core::Result<()> {
//! let catalog = InMemoryCatalog::new();
//! catalog.insert_channel(serde_json::from_value(json!({
//!     "id": "wechat", "name": "微信支付", "code": "wechat"
//! }))?)?;
//!
//! let service = MappingService::new(&catalog, &catalog);
//! service.save_mappings("wechat", vec![
//!     FieldMapping::new("out_trade_no", "order_id").required(),
//!     FieldMapping::new("total_fee", "amount").with_rule(built_in::cents_to_yuan()),
//!     FieldMapping::new("trade_state", "status").with_rule(built_in::wechat_trade_state()),
//! ])?;
//!
//! let report = service.preview(&PreviewRequest::new(
//!     "wechat",
//!     json!({"out_trade_no": "T1", "total_fee": 1999, "trade_state": "SUCCESS"}),
//! ))?;
//! assert_eq!(report.output["amount"], json!(19.99));
//! assert_eq!(report.output["status"], json!("支付成功"));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod jsonpath;
pub mod mapping;
pub mod service;
pub mod transform;
pub mod types;

#[cfg(test)]
pub(crate) mod proptest_strategies;

// Re-export main types for convenience
pub use error::{Error, Result, Severity};
pub use mapping::{
    apply_mappings, decode_mappings, FieldError, MappingOutcome, TypeWarning, ValidationIssue, ValidationReport,
};
pub use service::{
    ChannelSchemaSource, InMemoryCatalog, MappingService, MappingStore, PreviewReport,
    PreviewRequest,
};
pub use transform::{evaluate, RuleShapeError, TransformError, TransformRule};
pub use types::{
    Catalog, Channel, ChannelField, FieldMapping, FieldType, InternalField, InternalSchema,
    MappingSet,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
