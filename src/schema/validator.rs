//! Input validator - coerces raw parameter values into field types
//!
//! The rules mirror the lenient conversions a web framework applies to query
//! string input: numeric strings become numbers, floats truncate into
//! integers, and only the literal `"true"` reads as a true boolean.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Number, Value};

use super::InputType;
use crate::error::CoercionError;

lazy_static! {
    // Optional sign, digits, single underscores allowed between digit groups
    static ref INT_LITERAL: Regex = Regex::new(r"^[+-]?\d+(?:_\d+)*$").unwrap();

    static ref FLOAT_LITERAL: Regex = Regex::new(
        r"^[+-]?(?:\d+(?:_\d+)*(?:\.(?:\d+(?:_\d+)*)?)?|\.\d+(?:_\d+)*)(?:[eE][+-]?\d+(?:_\d+)*)?$"
    ).unwrap();
}

/// Short name of a value's JSON type, for error messages
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whether a value counts as "nothing to search for"
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Loose equality used for allow-lists: numbers compare by value
pub fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// Coerce into the given scalar type
pub fn coerce(value: &Value, input_type: InputType) -> Result<Value, CoercionError> {
    match input_type {
        InputType::Int => coerce_int(value).map(Value::from),
        InputType::Float => coerce_float(value),
        InputType::Str => coerce_str(value).map(Value::String),
        InputType::Bool => coerce_bool(value).map(Value::Bool),
    }
}

/// Integer coercion; floats truncate toward zero
pub fn coerce_int(value: &Value) -> Result<i64, CoercionError> {
    match value {
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.trunc() >= i64::MIN as f64 && f.trunc() < i64::MAX as f64 => {
                    Ok(f.trunc() as i64)
                }
                _ => Err(CoercionError::OutOfRange(n.to_string())),
            }
        }
        Value::String(s) => {
            let literal = s.trim();
            if !INT_LITERAL.is_match(literal) {
                return Err(CoercionError::InvalidLiteral {
                    expected: "integer",
                    literal: s.clone(),
                });
            }
            literal
                .replace('_', "")
                .parse::<i64>()
                .map_err(|_| CoercionError::OutOfRange(s.clone()))
        }
        other => Err(CoercionError::Mismatch {
            expected: "integer",
            found: type_name(other),
        }),
    }
}

/// Float coercion; the result must be finite to be representable in JSON
pub fn coerce_float(value: &Value) -> Result<Value, CoercionError> {
    let f = match value {
        Value::Bool(b) => {
            if *b { 1.0 } else { 0.0 }
        }
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| CoercionError::OutOfRange(n.to_string()))?,
        Value::String(s) => {
            let literal = s.trim();
            if !FLOAT_LITERAL.is_match(literal) {
                return Err(CoercionError::InvalidLiteral {
                    expected: "float",
                    literal: s.clone(),
                });
            }
            literal
                .replace('_', "")
                .parse::<f64>()
                .map_err(|_| CoercionError::InvalidLiteral {
                    expected: "float",
                    literal: s.clone(),
                })?
        }
        other => {
            return Err(CoercionError::Mismatch {
                expected: "float",
                found: type_name(other),
            })
        }
    };

    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| CoercionError::OutOfRange(f.to_string()))
}

/// String coercion for scalars
pub fn coerce_str(value: &Value) -> Result<String, CoercionError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(CoercionError::Mismatch {
            expected: "string",
            found: type_name(other),
        }),
    }
}

/// Boolean coercion: only the string `"true"` is true
pub fn coerce_bool(value: &Value) -> Result<bool, CoercionError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => Ok(s == "true"),
        other => Err(CoercionError::Mismatch {
            expected: "boolean",
            found: type_name(other),
        }),
    }
}

/// Sequence coercion: arrays keep their order, objects yield their keys
pub fn coerce_sequence(value: &Value) -> Result<Vec<Value>, CoercionError> {
    match value {
        Value::Array(items) => Ok(items.clone()),
        Value::Object(map) => Ok(map.keys().cloned().map(Value::String).collect()),
        other => Err(CoercionError::Mismatch {
            expected: "sequence",
            found: type_name(other),
        }),
    }
}
