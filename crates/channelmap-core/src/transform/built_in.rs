//! Built-in rules for common payment channel conventions
//!
//! Amount unit changes, the timestamp layouts channels send, and the trade state
//! codes of the major wallets.
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

use super::datetime::DEFAULT_FORMAT;
use super::rule::{DatetimeParams, MultiplyParams, TransformRule};

/// Convert an amount in cents (fen) to yuan
pub fn cents_to_yuan() -> TransformRule {
    TransformRule::multiply(0.01)
}

/// Convert an amount in yuan to whole cents (fen)
pub fn yuan_to_cents() -> TransformRule {
    TransformRule::Multiply(MultiplyParams {
        value: 100.0,
        precision: Some(0),
    })
}

/// Normalize ISO-8601 timestamps and epoch seconds to `YYYY-MM-DD HH:mm:ss`
pub fn standard_datetime() -> TransformRule {
    TransformRule::datetime(DEFAULT_FORMAT)
}

/// Parse compact `yyyyMMddHHmmss` timestamps such as WeChat Pay's `time_end`
pub fn compact_datetime() -> TransformRule {
    TransformRule::Datetime(DatetimeParams {
        format: DEFAULT_FORMAT.to_string(),
        input_format: Some("YYYYMMDDHHmmss".to_string()),
    })
}

/// Alipay `trade_status` codes
pub fn alipay_trade_status() -> TransformRule {
    TransformRule::enum_map(
        [
            ("WAIT_BUYER_PAY", "待支付"),
            ("TRADE_SUCCESS", "支付成功"),
            ("TRADE_FINISHED", "交易完结"),
            ("TRADE_CLOSED", "已关闭"),
        ],
        true,
    )
}

/// WeChat Pay `trade_state` codes
pub fn wechat_trade_state() -> TransformRule {
    TransformRule::enum_map(
        [
            ("SUCCESS", "支付成功"),
            ("REFUND", "转入退款"),
            ("NOTPAY", "未支付"),
            ("CLOSED", "已关闭"),
            ("REVOKED", "已撤销"),
            ("USERPAYING", "用户支付中"),
            ("PAYERROR", "支付失败"),
        ],
        true,
    )
}

/// Trailing run of digits, e.g. the sequence part of `ORD-20240315-0042`
pub fn trailing_digits() -> TransformRule {
    TransformRule::regex(r"(\d+)$", Some(1))
}

/// Names accepted by [`preset`]
pub const PRESET_NAMES: &[&str] = &[
    "cents_to_yuan",
    "yuan_to_cents",
    "standard_datetime",
    "compact_datetime",
    "alipay_trade_status",
    "wechat_trade_state",
    "trailing_digits",
];

/// Look up a built-in rule by name
pub fn preset(name: &str) -> Option<TransformRule> {
    let rule = match name {
        "cents_to_yuan" => cents_to_yuan(),
        "yuan_to_cents" => yuan_to_cents(),
        "standard_datetime" => standard_datetime(),
        "compact_datetime" => compact_datetime(),
        "alipay_trade_status" => alipay_trade_status(),
        "wechat_trade_state" => wechat_trade_state(),
        "trailing_digits" => trailing_digits(),
        _ => return None,
    };
    Some(rule)
}
