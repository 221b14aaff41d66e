//! Value coercion helpers shared by the rule kinds
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

use super::error::TransformError;
use serde_json::{Number, Value};
use std::borrow::Cow;

/// Largest magnitude at which every integer is exactly representable in f64
const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Significant digits kept by [`trim_float_noise`]
const SIGNIFICANT_DIGITS: usize = 15;

/// Longest input excerpt quoted in error messages
const EXCERPT_CHARS: usize = 64;

/// Convert a JSON value to a finite f64.
///
/// Numbers are taken as-is. Strings are trimmed and parsed as plain base-10
/// floats. Everything else is rejected.
pub fn to_number(value: &Value) -> Result<f64, TransformError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        other => {
            return Err(TransformError::coercion(
                "number",
                excerpt(other),
                format!("{} is not numeric", type_name(other)),
            ))
        }
    };

    match parsed {
        Some(n) if n.is_finite() => Ok(n),
        Some(_) => Err(TransformError::coercion(
            "number",
            excerpt(value),
            "value is not finite",
        )),
        None => Err(TransformError::coercion(
            "number",
            excerpt(value),
            "not a decimal number",
        )),
    }
}

/// Render a value as text: strings verbatim, everything else as compact JSON
pub fn stringify(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Round half away from zero to `precision` decimal places
pub fn round_to(n: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let scaled = n * factor;
    if !scaled.is_finite() {
        return n;
    }
    scaled.round() / factor
}

/// Drop binary representation noise beyond 15 significant digits.
///
/// `8.88 * 100.0` is `888.0000000000001` and `1999.0 * 0.01` is `19.990000000000002`
/// in f64; both come back as the decimal the inputs describe.
pub fn trim_float_noise(n: f64) -> f64 {
    if !n.is_finite() || n == 0.0 {
        return n;
    }
    format!("{:.*e}", SIGNIFICANT_DIGITS - 1, n)
        .parse()
        .unwrap_or(n)
}

/// Encode a finite f64 as JSON, using an integer when the value is integral.
///
/// Returns `None` for NaN and infinities.
pub fn number_to_value(n: f64) -> Option<Value> {
    if !n.is_finite() {
        return None;
    }
    if n.fract() == 0.0 && n.abs() <= EXACT_INT_LIMIT {
        return Some(Value::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number)
}

/// JSON type name as used in messages and type warnings
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Short textual form of a value for error messages
pub fn excerpt(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= EXCERPT_CHARS {
        return text;
    }
    let mut cut: String = text.chars().take(EXCERPT_CHARS).collect();
    cut.push('…');
    cut
}
