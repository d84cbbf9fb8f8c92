//! Request builder: turns the active variant and the raw field values into a
//! [`JobRequest`].
//!
//! The builder has no failure mode; it forwards whatever the inputs hold and
//! leaves validation to the backend.

use super::registry;
use crate::models::{Field, JobRequest, LabelConfiguration};
use serde_json::Value;

/// Distance quantization: backend units per inch.
pub const LENGTH_UNIT: f64 = 128.0;

/// Build the job request for the current configuration.
pub fn build_request(config: &LabelConfiguration) -> JobRequest {
    let variant = config.active_variant;
    let mut request = JobRequest::new(variant);

    for &field in registry::fields_for(variant) {
        let raw = config.values.get(field);
        let value = match field {
            // Unselected radio group: key omitted, no default injected
            Field::Align => match &config.values.align {
                Some(align) => Value::from(align.as_str()),
                None => continue,
            },
            Field::Lines => split_lines(raw),
            Field::Length => scaled_length(raw),
            _ => Value::from(raw),
        };
        request.label.insert(field.key().to_string(), value);
    }

    tracing::debug!(
        "Built {} request with fields: {:?}",
        variant,
        request.keys().collect::<Vec<_>>()
    );

    request
}

/// Split multi-line text on `\n`. Empty text yields one empty line.
pub fn split_lines(text: &str) -> Value {
    Value::from(text.split('\n').collect::<Vec<_>>())
}

/// Coerce the typed length the way a browser `Number()` does for decimal
/// text and scale it to backend units.
///
/// Non-numeric text becomes NaN, which JSON encodes as `null`; it is
/// forwarded rather than rejected.
pub fn scaled_length(text: &str) -> Value {
    let scaled = coerce_number(text) * LENGTH_UNIT;

    if scaled.is_nan() {
        tracing::warn!("Length '{}' is not numeric; forwarding null", text);
        return Value::Null;
    }

    if scaled.fract() == 0.0 && scaled.abs() < i64::MAX as f64 {
        Value::from(scaled as i64)
    } else {
        // Infinite values also end up here and serialize as null
        Value::from(scaled)
    }
}

fn coerce_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(value) = radix_literal(trimmed) {
        return value;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // Rust also accepts "inf"/"nan" spellings; Number() does not
        t if t.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => f64::NAN,
        t => t.parse::<f64>().unwrap_or(f64::NAN),
    }
}

/// Unsigned `0x`/`0o`/`0b` integer literals. A sign, a bare prefix or a
/// stray digit makes the whole text NaN.
fn radix_literal(text: &str) -> Option<f64> {
    let radix = match text.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    let value = digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    });
    Some(value.unwrap_or(f64::NAN))
}
