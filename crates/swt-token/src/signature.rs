//! Canonical form and double HMAC-SHA256 signatures.
//!
//! ```text
//! inner     = HMAC-SHA256(salt1, canonical_json(content))
//! signature = base64(HMAC-SHA256(salt2, inner))
//! ```
//!
//! Forging a signature needs both salts.

use crate::error::SwtError;
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use serde_json::{Map, Number, Value};
use sha2::Sha256;
use swt_core::{Salts, SwtContent};

type HmacSha256 = Hmac<Sha256>;

/// 2^63; integral floats below this magnitude are written as integers.
const INTEGRAL_FLOAT_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Serialize content to the bytes that get signed.
///
/// Compact JSON laid out the way `JSON.stringify` lays it out. In every
/// object, array-index keys (`"0"`, `"10"`, ...) come first in ascending
/// numeric order. The other keys follow in insertion order, which puts the
/// fixed fields before the extras. Integral floats are written without a
/// fraction.
pub fn canonicalize(content: &SwtContent) -> Result<Vec<u8>, SwtError> {
    let value = canonical_value(serde_json::to_value(content)?);
    Ok(serde_json::to_vec(&value)?)
}

fn canonical_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut indexed = Vec::new();
            let mut named = Map::new();
            for (key, value) in map {
                let value = canonical_value(value);
                match array_index(&key) {
                    Some(index) => indexed.push((index, key, value)),
                    None => {
                        named.insert(key, value);
                    }
                }
            }
            indexed.sort_by_key(|(index, _, _)| *index);

            let mut ordered: Map<String, Value> = indexed
                .into_iter()
                .map(|(_, key, value)| (key, value))
                .collect();
            ordered.extend(named);
            Value::Object(ordered)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonical_value).collect()),
        Value::Number(number) => Value::Number(canonical_number(number)),
        other => other,
    }
}

/// Canonical decimal below 2^32 - 1, the keys JavaScript orders numerically.
fn array_index(key: &str) -> Option<u32> {
    let digits_only = !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit());
    if !digits_only || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    key.parse::<u32>().ok().filter(|index| *index != u32::MAX)
}

fn canonical_number(number: Number) -> Number {
    match number.as_f64() {
        Some(float)
            if number.is_f64() && float.fract() == 0.0 && float.abs() < INTEGRAL_FLOAT_LIMIT =>
        {
            Number::from(float as i64)
        }
        _ => number,
    }
}

/// Compute the base64 signature for `content`.
pub fn sign(content: &SwtContent, salts: &Salts) -> Result<String, SwtError> {
    let outer = outer_mac(content, salts)?;
    Ok(STANDARD.encode(outer.finalize().into_bytes()))
}

/// Check `signature` against `content` in constant time.
pub fn verify(content: &SwtContent, salts: &Salts, signature: &str) -> Result<(), SwtError> {
    let presented = STANDARD
        .decode(signature)
        .map_err(|_| SwtError::InvalidSignature)?;
    outer_mac(content, salts)?
        .verify_slice(&presented)
        .map_err(|_| SwtError::InvalidSignature)
}

/// Outer MAC, already fed with the inner digest.
fn outer_mac(content: &SwtContent, salts: &Salts) -> Result<HmacSha256, SwtError> {
    if !salts.is_defined() {
        return Err(SwtError::SaltsNotDefined);
    }

    let canonical = canonicalize(content)?;

    let mut inner = keyed(salts.inner())?;
    inner.update(&canonical);
    let digest = inner.finalize().into_bytes();

    let mut outer = keyed(salts.outer())?;
    outer.update(&digest);
    Ok(outer)
}

fn keyed(key: &str) -> Result<HmacSha256, SwtError> {
    HmacSha256::new_from_slice(key.as_bytes()).map_err(|_| SwtError::SaltsNotDefined)
}
