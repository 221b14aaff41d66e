//! Benchmarks for rule evaluation, path traversal and mapping sets
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

use channelmap_core::jsonpath::{parse, traverse_json_path};
use channelmap_core::mapping::apply_mappings;
use channelmap_core::transform::{built_in, evaluate, TransformRule};
use channelmap_core::FieldMapping;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};

fn order_batch(size: usize) -> Value {
    let items: Vec<Value> = (0..size)
        .map(|i| {
            json!({
                "id": format!("ITEM-{:05}", i),
                "price": (i as f64) * 1.5 + 0.99,
                "state": if i % 2 == 0 { "SUCCESS" } else { "NOTPAY" }
            })
        })
        .collect();
    json!({"data": {"total": size, "items": items}})
}

fn bench_rule_kinds(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_kinds");

    let cases: Vec<(&str, TransformRule, Value)> = vec![
        ("multiply", TransformRule::multiply(100.0), json!(8.88)),
        ("datetime_iso", built_in::standard_datetime(), json!("2024-03-15T09:30:00+08:00")),
        ("datetime_compact", built_in::compact_datetime(), json!("20240315093000")),
        ("jsonpath", TransformRule::jsonpath("data.items[0].id"), order_batch(4)),
        ("regex", TransformRule::regex(r"^(\d+)-(\d+)$", Some(2)), json!("12-34")),
        ("enum_map", built_in::wechat_trade_state(), json!("PAYERROR")),
        (
            "enum_map_folded",
            TransformRule::enum_map([("SUCCESS", "ok"), ("FAIL", "ko")], false),
            json!("fail"),
        ),
    ];

    for (name, rule, input) in &cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, input| {
            b.iter(|| evaluate(black_box(rule), black_box(input)))
        });
    }

    group.finish();
}

fn bench_path_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_traversal");

    group.bench_function("parse", |b| {
        b.iter(|| parse(black_box("$.alipay_trade_query_response.fund_bill_list[0].amount")))
    });

    for size in [10, 100, 1000] {
        let doc = order_batch(size);
        let path = format!("data.items[{}].price", size - 1);
        group.bench_with_input(BenchmarkId::new("last_item", size), &doc, |b, doc| {
            b.iter(|| traverse_json_path(black_box(doc), black_box(&path)))
        });
    }

    group.finish();
}

fn bench_mapping_sets(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapping_sets");

    let query = json!({
        "out_trade_no": "ORD-20240315-0042",
        "total_fee": 1999,
        "fee_type": "CNY",
        "trade_state": "SUCCESS",
        "time_end": "20240315093000"
    });
    let mappings = vec![
        FieldMapping::new("out_trade_no", "order_id").required(),
        FieldMapping::new("total_fee", "amount").with_rule(built_in::cents_to_yuan()),
        FieldMapping::new("fee_type", "currency"),
        FieldMapping::new("trade_state", "status").with_rule(built_in::wechat_trade_state()),
        FieldMapping::new("time_end", "created_time").with_rule(built_in::compact_datetime()),
    ];

    group.bench_function("wechat_query", |b| {
        b.iter(|| apply_mappings(black_box(&mappings), black_box(&query)))
    });

    for width in [10, 50, 200] {
        let doc = order_batch(width);
        let wide: Vec<FieldMapping> = (0..width)
            .map(|i| {
                FieldMapping::new(format!("$.data.items[{}].price", i), format!("price_{}", i))
                    .with_rule(TransformRule::multiply(100.0))
            })
            .collect();
        group.bench_with_input(BenchmarkId::new("path_sources", width), &doc, |b, doc| {
            b.iter(|| apply_mappings(black_box(&wide), black_box(doc)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rule_kinds, bench_path_traversal, bench_mapping_sets);
criterion_main!(benches);
