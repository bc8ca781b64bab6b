//! Value coercions used by the operators.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::value::Value;

static NUMERIC_STRING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$").expect("numeric pattern is valid")
});

/// Arithmetic operand after coercion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(n) => n as f64,
            Number::Float(n) => n,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Number::Float(_))
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Integer(n) => Value::Integer(n),
            Number::Float(n) => Value::Float(n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot coerce {found} to {target}")]
pub struct CoercionError {
    pub target: &'static str,
    pub found: String,
}

impl CoercionError {
    fn new(target: &'static str, value: &Value) -> Self {
        let found = match value {
            Value::String(s) => format!("string \"{}\"", s),
            other => other.type_name().to_string(),
        };
        CoercionError { target, found }
    }
}

/// Whether a string looks like a floating-point number (`.`, `e` or `E`).
pub fn is_float_string(s: &str) -> bool {
    s.contains(['.', 'e', 'E'])
}

/// Parses a numeric string. Float-looking strings become floats.
pub fn parse_number(s: &str) -> Option<Number> {
    if !NUMERIC_STRING.is_match(s) {
        return None;
    }
    if is_float_string(s) {
        s.parse::<f64>().ok().map(Number::Float)
    } else {
        s.parse::<i64>()
            .map(Number::Integer)
            .or_else(|_| s.parse::<f64>().map(Number::Float))
            .ok()
    }
}

/// Numeric coercion: null and "" are 0, strings are parsed, everything
/// else fails.
pub fn to_number(value: &Value) -> Result<Number, CoercionError> {
    match value {
        Value::Null => Ok(Number::Integer(0)),
        Value::Integer(n) => Ok(Number::Integer(*n)),
        Value::Float(n) => Ok(Number::Float(*n)),
        Value::String(s) if s.is_empty() => Ok(Number::Integer(0)),
        Value::String(s) => parse_number(s).ok_or_else(|| CoercionError::new("number", value)),
        _ => Err(CoercionError::new("number", value)),
    }
}

/// Boolean coercion: null, "", and "false" (any case) are false; every
/// other non-boolean value is true.
pub fn to_boolean(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Boolean(b) => *b,
        Value::String(s) => !(s.is_empty() || s.eq_ignore_ascii_case("false")),
        _ => true,
    }
}

/// Parses "true"/"false" (any case) for equality against booleans.
pub fn parse_boolean(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// List index coercion. Floats truncate toward zero.
pub fn to_index(value: &Value) -> Result<i64, CoercionError> {
    match value {
        Value::Integer(n) => Ok(*n),
        Value::Float(n) => Ok(n.trunc() as i64),
        Value::String(s) => match parse_number(s.trim()) {
            Some(Number::Integer(n)) => Ok(n),
            Some(Number::Float(n)) => Ok(n.trunc() as i64),
            None => Err(CoercionError::new("index", value)),
        },
        _ => Err(CoercionError::new("index", value)),
    }
}

/// Mapping key / property name coercion.
pub fn to_key(value: &Value) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_numbers() {
        assert_eq!(parse_number("10"), Some(Number::Integer(10)));
        assert_eq!(parse_number("-3"), Some(Number::Integer(-3)));
        assert_eq!(parse_number("2.5"), Some(Number::Float(2.5)));
        assert_eq!(parse_number("1e3"), Some(Number::Float(1000.0)));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("1.2.3"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_null_and_empty_are_zero() {
        assert_eq!(to_number(&Value::Null), Ok(Number::Integer(0)));
        assert_eq!(to_number(&Value::from("")), Ok(Number::Integer(0)));
        assert!(to_number(&Value::Boolean(true)).is_err());
    }

    #[test]
    fn test_boolean_coercion() {
        assert!(!to_boolean(&Value::Null));
        assert!(!to_boolean(&Value::from("")));
        assert!(!to_boolean(&Value::from("FALSE")));
        assert!(to_boolean(&Value::from("no")));
        assert!(to_boolean(&Value::Integer(0)));
        assert!(to_boolean(&Value::Array(vec![])));
    }

    #[test]
    fn test_index_coercion() {
        assert_eq!(to_index(&Value::from("2")), Ok(2));
        assert_eq!(to_index(&Value::Float(1.9)), Ok(1));
        assert!(to_index(&Value::from("first")).is_err());
    }
}
