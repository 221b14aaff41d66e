//! Transform rules and their evaluation
//!
//! A [`TransformRule`] describes how one channel value becomes one internal value:
//! numeric scaling, date reformatting, nested extraction, regex capture or code
//! translation. Evaluation is pure and never panics; failures are
//! [`TransformError`] values the caller collects.
//!
//! # Module Organization
//!
//! - [`rule`] - Rule descriptors, decoding and validation
//! - [`evaluator`] - Rule evaluation and the [`RuleEvaluator`] seam
//! - [`coerce`] - Number and text coercion shared by the rule kinds
//! - [`datetime`] - Date parsing and token-based formatting
//! - [`built_in`] - Ready-made rules for common channel conventions
//! - [`error`] - Per-field and rule-shape errors
//!
//! # Examples
//!
//! ```
//! use channelmap_core::transform::{built_in, evaluate, TransformRule};
//! use serde_json::json;
//!
//! // Cents to internal amount units
//! let rule = TransformRule::multiply(100.0);
//! assert_eq!(evaluate(&rule, &json!(8.88)).unwrap(), json!(888));
//!
//! // Channel status codes
//! let status = built_in::wechat_trade_state();
//! assert_eq!(evaluate(&status, &json!("SUCCESS")).unwrap(), json!("支付成功"));
//! ```
//!
//! Rules arrive from configuration as JSON and are validated once, there:
//!
//! ```
//! use channelmap_core::transform::TransformRule;
//! use serde_json::json;
//!
//! let descriptor = json!({"type": "regex", "params": {"pattern": "^(\\d+)-(\\d+)$", "group": 2}});
//! let rule = TransformRule::from_json(&descriptor).unwrap();
//! assert!(rule.is_some());
//!
//! let broken = json!({"type": "regex", "params": {"pattern": "(("}});
//! assert!(TransformRule::from_json(&broken).is_err());
//! ```
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

pub mod built_in;
pub mod coerce;
pub mod datetime;
pub mod error;
pub mod evaluator;
pub mod rule;


pub use error::{RuleShapeError, TransformError};
pub use evaluator::{evaluate, evaluate_optional, RuleEvaluator, StandardEvaluator};
pub use rule::{
    DatetimeParams, EnumMapParams, JsonPathParams, MultiplyParams, RegexParams, RuleKind,
    TransformRule,
};
