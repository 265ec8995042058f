//! Decimal amounts and lenient numeric coercion.
//!
//! Form-originated values may arrive as numbers, numeric strings, empty strings
//! or be missing entirely. Coercion never fails: anything that is not a number
//! becomes zero.

use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce an arbitrary JSON value into a decimal, falling back to zero.
pub fn coerce_decimal(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => parse_number(&n.to_string())
            .or_else(|| n.as_f64().and_then(Decimal::from_f64))
            .unwrap_or(Decimal::ZERO),
        Value::String(s) => parse_number(s.trim()).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

fn parse_number(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Serde adapter: `#[serde(deserialize_with = "billbook_core::money::lenient")]`.
///
/// Pair with `#[serde(default)]` so that a missing field also becomes zero.
pub fn lenient<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_decimal(&value))
}

/// Coerce a value into a whole number of days, falling back to zero.
pub fn coerce_days(value: &Value) -> i64 {
    coerce_decimal(value).trunc().to_i64().unwrap_or(0)
}
