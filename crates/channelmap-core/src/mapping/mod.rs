//! Applying and validating mapping sets
//!
//! [`apply_mappings`] turns one channel document into an internal document, collecting
//! per-field failures. [`MappingValidator`] checks a set before it is stored.
//!
//! ```
//! use channelmap_core::mapping::apply_mappings;
//! use channelmap_core::transform::TransformRule;
//! use channelmap_core::FieldMapping;
//! use serde_json::json;
//!
//! let set = vec![
//!     FieldMapping::new("out_trade_no", "order_id").required(),
//!     FieldMapping::new("total_fee", "amount").with_rule(TransformRule::multiply(0.01)),
//! ];
//! let outcome = apply_mappings(&set, &json!({"out_trade_no": "T1", "total_fee": 1999}));
//! assert!(outcome.is_complete());
//! assert_eq!(outcome.output["amount"], json!(19.99));
//! ```
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

pub mod engine;
pub mod validator;

pub use engine::{apply_mappings, resolve_source, FieldError, MappingEngine, MappingOutcome};
pub use validator::{
    check_types, decode_mappings, value_matches, MappingValidator, TypeWarning, ValidationIssue,
    ValidationReport,
};
