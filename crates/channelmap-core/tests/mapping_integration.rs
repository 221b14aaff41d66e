//! Mapping engine integration tests over realistic channel payloads


use channelmap_core::mapping::{apply_mappings, MappingEngine};
use channelmap_core::transform::TransformRule;
use channelmap_core::FieldMapping;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_support::*;

#[test]
fn test_wechat_query_maps_cleanly() {
    let outcome = apply_mappings(&wechat_mappings(), &wechat_query());
    assert!(outcome.is_complete(), "{:?}", outcome.errors);
    assert_eq!(
        serde_json::to_value(&outcome.output).unwrap(),
        json!({
            "order_id": "ORD-20240315-0042",
            "amount": 19.99,
            "currency": "CNY",
            "status": "支付成功",
            "created_time": "2024-03-15 09:30:00"
        })
    );
}

#[test]
fn test_alipay_path_sources() {
    let outcome = apply_mappings(&alipay_channel().mappings, &alipay_query());
    assert!(outcome.is_complete(), "{:?}", outcome.errors);
    assert_eq!(outcome.output["order_id"], json!("ORD-20240315-0043"));
    assert_eq!(outcome.output["amount"], json!(88.8));
    assert_eq!(outcome.output["status"], json!("支付成功"));
}

#[test]
fn test_partial_failure_keeps_successes() {
    let mappings = vec![
        FieldMapping::new("a", "x").with_rule(TransformRule::multiply(2.0)),
        FieldMapping::new("b", "y").with_rule(TransformRule::multiply(2.0)),
    ];
    let outcome = apply_mappings(&mappings, &json!({"a": 3, "b": "zz"}));

    assert_eq!(serde_json::to_value(&outcome.output).unwrap(), json!({"x": 6}));
    assert_eq!(outcome.errors.len(), 1);
    let failure = &outcome.errors[0];
    assert_eq!(failure.channel_field, "b");
    assert_eq!(failure.internal_field, "y");
    assert_eq!(failure.error.kind(), "coercion");
}

#[test]
fn test_required_missing_skips_rule_evaluation() {
    let engine = MappingEngine::with_evaluator(CountingEvaluator::default());
    let mappings = vec![FieldMapping::new("a", "x")
        .required()
        .with_rule(TransformRule::multiply(2.0))];

    let outcome = engine.apply(&mappings, &json!({}));

    assert_eq!(engine.evaluator().calls(), 0);
    assert!(outcome.output.is_empty());
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].error.kind(), "required_field_missing");
}

#[test]
fn test_present_null_on_required_field_is_evaluated() {
    let engine = MappingEngine::with_evaluator(CountingEvaluator::default());
    let mappings = vec![FieldMapping::new("a", "x")
        .required()
        .with_rule(TransformRule::multiply(2.0))];

    let outcome = engine.apply(&mappings, &json!({"a": null}));

    assert_eq!(engine.evaluator().calls(), 1);
    assert_eq!(outcome.errors[0].error.kind(), "coercion");
}

#[test]
fn test_every_mapping_is_attempted() {
    let engine = MappingEngine::with_evaluator(CountingEvaluator::default());
    let mut query = wechat_query();
    query["total_fee"] = json!("not a number");
    query["trade_state"] = json!("MYSTERY");

    let outcome = engine.apply(&wechat_mappings(), &query);

    // Three of the five mappings carry rules
    assert_eq!(engine.evaluator().calls(), 3);
    let kinds: Vec<&str> = outcome.errors.iter().map(|e| e.error.kind()).collect();
    assert_eq!(kinds, vec!["coercion", "unmapped_value"]);
    assert_eq!(outcome.output["order_id"], json!("ORD-20240315-0042"));
    assert_eq!(outcome.output["created_time"], json!("2024-03-15 09:30:00"));
}

#[test]
fn test_non_object_document_has_no_keys() {
    let mappings = vec![
        FieldMapping::new("a", "x").required(),
        FieldMapping::new("b", "y"),
    ];
    let outcome = apply_mappings(&mappings, &json!(["a", "b"]));
    assert_eq!(outcome.errors[0].error.kind(), "required_field_missing");
    assert_eq!(outcome.output["y"], serde_json::Value::Null);
}
