use std::{collections::HashMap, fmt, sync::Arc};

use thiserror::Error;

/// A dynamically-typed value produced by expression evaluation or stored in
/// a scope.
///
/// Numbers keep the integer/float distinction: arithmetic on two integers
/// stays integral, anything touching a float is floating-point.
///
/// # Examples
///
/// ```
/// use jstl_el::Value;
/// use std::collections::HashMap;
///
/// let name = Value::from("Alice");
/// let age = Value::Integer(30);
///
/// let mut user = HashMap::new();
/// user.insert("name".to_string(), name);
/// user.insert("age".to_string(), age);
/// let user = Value::Object(user);
///
/// assert!(!user.is_empty());
/// ```
#[derive(Clone)]
pub enum Value {
    /// Absent or explicitly null
    Null,

    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Ordered, indexable sequence
    Array(Vec<Value>),

    /// Mapping with string keys
    Object(HashMap<String, Value>),

    /// Opaque host object exposing named properties
    Bean(Arc<dyn Bean>),
}

/// Host object whose properties are reachable through `.name` / `["name"]`.
///
/// This stands in for getter introspection on container objects such as
/// the request, the session or a cookie.
pub trait Bean: Send + Sync {
    /// Type name shown in diagnostics and string coercion.
    fn type_name(&self) -> &str;

    /// Reads the property `name`.
    fn property(&self, name: &str) -> Result<Value, PropertyError>;
}

/// Failure reading a bean property.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// The bean has no readable property with that name
    #[error("no readable property")]
    NotFound,

    /// The getter exists but failed
    #[error("getter failed: {0}")]
    Getter(String),
}

impl Value {
    /// Human-readable type name for diagnostics.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Bean(bean) => bean.type_name(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// The `empty` operator: null, "", and empty collections are empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(arr) => arr.is_empty(),
            Value::Object(obj) => obj.is_empty(),
            _ => false,
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string slice, only for string values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn bean(bean: impl Bean + 'static) -> Self {
        Value::Bean(Arc::new(bean))
    }
}

/// Formats a float the way the page output expects: whole numbers keep one
/// fractional digit (`5.0`), huge or tiny magnitudes use exponent notation.
pub(crate) fn format_float(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = n.abs();
    if magnitude != 0.0 && !(1e-3..1e7).contains(&magnitude) {
        return format!("{:E}", n);
    }
    if n.fract() == 0.0 {
        format!("{:.1}", n)
    } else {
        n.to_string()
    }
}

/// String coercion: null renders as the empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => f.write_str(&format_float(*n)),
            Value::String(s) => f.write_str(s),
            Value::Array(arr) => {
                f.write_str("[")?;
                for (i, item) in arr.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(obj) => {
                let mut keys: Vec<_> = obj.keys().collect();
                keys.sort();
                f.write_str("{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", key, obj[key])?;
                }
                f.write_str("}")
            }
            Value::Bean(bean) => f.write_str(bean.type_name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Integer(n) => f.debug_tuple("Integer").field(n).finish(),
            Value::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Array(arr) => f.debug_tuple("Array").field(arr).finish(),
            Value::Object(obj) => f.debug_tuple("Object").field(obj).finish(),
            Value::Bean(bean) => write!(f, "Bean({})", bean.type_name()),
        }
    }
}

/// Structural equality; beans compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Bean(a), Value::Bean(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;

    impl Bean for Widget {
        fn type_name(&self) -> &str {
            "Widget"
        }

        fn property(&self, name: &str) -> Result<Value, PropertyError> {
            match name {
                "size" => Ok(Value::Integer(3)),
                _ => Err(PropertyError::NotFound),
            }
        }
    }

    #[test]
    fn test_float_formatting() {
        assert_eq!(Value::Float(5.0).to_string(), "5.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Float(-0.25).to_string(), "-0.25");
        assert_eq!(Value::Float(1e10).to_string(), "1E10");
    }

    #[test]
    fn test_null_renders_empty() {
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn test_bean_identity() {
        let a = Value::bean(Widget);
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Value::bean(Widget));
        assert_eq!(a.type_name(), "Widget");
    }

    #[test]
    fn test_is_empty() {
        assert!(Value::Null.is_empty());
        assert!(Value::from("").is_empty());
        assert!(Value::Array(vec![]).is_empty());
        assert!(Value::Object(HashMap::new()).is_empty());
        assert!(!Value::Integer(0).is_empty());
        assert!(!Value::bean(Widget).is_empty());
    }
}
