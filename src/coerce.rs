//! Numeric coercion of loosely typed values.
//!
//! Values coming from the evalexpr parser (or from callers holding an
//! `evalexpr::Value`) are not guaranteed to be numbers. `enforce_number` is the
//! validation step every public constructor runs before a value enters a tree.

use std::fmt;

use evalexpr::Value;

use crate::errors::VariableError;

/// Numeric representation a value can be coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericType {
    #[default]
    Float,
    Int,
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float => write!(f, "float"),
            Self::Int => write!(f, "int"),
        }
    }
}

/// Tries to convert `value` into the `target` numeric type.
///
/// No conversion is attempted when `value` is already numeric, or when `target` is
/// `None`; the value is returned unchanged in both cases.
///
/// # Errors
/// Returns `VariableError::Coercion` if the value cannot be represented as `target`.
///
/// # Example
/// ```
/// use evalexpr::Value;
/// use lazy_params::coerce::{enforce_number, NumericType};
///
/// let v = enforce_number(&Value::from("2.5"), Some(NumericType::Float)).unwrap();
/// assert_eq!(v, Value::Float(2.5));
/// ```
pub fn enforce_number(value: &Value, target: Option<NumericType>) -> Result<Value, VariableError> {
    if matches!(value, Value::Float(_) | Value::Int(_)) {
        return Ok(value.clone());
    }
    let Some(target) = target else {
        return Ok(value.clone());
    };

    let converted = match (value, target) {
        (Value::String(s), NumericType::Float) => s.trim().parse::<f64>().ok().map(Value::Float),
        (Value::String(s), NumericType::Int) => s.trim().parse::<i64>().ok().map(Value::Int),
        (Value::Boolean(b), NumericType::Float) => Some(Value::Float(if *b { 1.0 } else { 0.0 })),
        (Value::Boolean(b), NumericType::Int) => Some(Value::Int(i64::from(*b))),
        _ => None,
    };

    converted.ok_or_else(|| {
        tracing::debug!(?value, %target, "numeric coercion failed");
        VariableError::Coercion {
            value: value.to_string(),
            target,
        }
    })
}

/// Coerces `value` to a float and returns it as a scalar.
pub fn as_scalar(value: &Value) -> Result<f64, VariableError> {
    match enforce_number(value, Some(NumericType::Float))? {
        Value::Float(f) => Ok(f),
        Value::Int(i) => Ok(i as f64),
        other => Err(VariableError::Coercion {
            value: other.to_string(),
            target: NumericType::Float,
        }),
    }
}
