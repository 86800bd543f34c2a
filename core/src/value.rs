//! Value types and coercion of raw argument strings.
//!
//! Every descriptor declares a [`ValueType`]; the matcher coerces the raw
//! strings it collects into [`Value`]s through [`ValueType::coerce`]. The set
//! of coercion targets is closed, so every match over it is exhaustive.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coercion target for a positional or option value.
///
/// # Examples
///
/// ```
/// use command_model_core::{Value, ValueType};
///
/// assert_eq!(ValueType::Integer.coerce("15"), Some(Value::Integer(15)));
/// assert_eq!(ValueType::Integer.coerce("fifteen"), None);
///
/// let format = ValueType::Enum(vec!["json".into(), "yaml".into()]);
/// assert_eq!(format.coerce("yaml"), Some(Value::String("yaml".into())));
/// assert_eq!(format.coerce("YAML"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Raw text, never fails to coerce (the default).
    #[default]
    String,
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit float.
    Float,
    /// Boolean. As an option this is a zero-argument flag.
    Boolean,
    /// One of a fixed set of variants, matched case-sensitively.
    Enum(Vec<String>),
}

impl ValueType {
    /// Coerces a raw argument string, returning `None` when it does not fit.
    pub fn coerce(&self, raw: &str) -> Option<Value> {
        match self {
            ValueType::String => Some(Value::String(raw.to_string())),
            ValueType::Integer => raw.parse().ok().map(Value::Integer),
            ValueType::Float => raw.parse().ok().map(Value::Float),
            ValueType::Boolean => parse_bool(raw).map(Value::Boolean),
            ValueType::Enum(variants) => variants
                .iter()
                .any(|variant| variant == raw)
                .then(|| Value::String(raw.to_string())),
        }
    }

    /// Returns `true` if an already-coerced value is a valid instance of
    /// this type. Used to check declared defaults at registration time.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueType::String, Value::String(_)) => true,
            (ValueType::Integer, Value::Integer(_)) => true,
            (ValueType::Float, Value::Float(_)) => true,
            (ValueType::Boolean, Value::Boolean(_)) => true,
            (ValueType::Enum(variants), Value::String(s)) => variants.contains(s),
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => write!(f, "string"),
            ValueType::Integer => write!(f, "integer"),
            ValueType::Float => write!(f, "float"),
            ValueType::Boolean => write!(f, "boolean"),
            ValueType::Enum(variants) => write!(f, "one of [{}]", variants.join(", ")),
        }
    }
}

/// A coerced argument value.
///
/// Variadic descriptors bind a [`Value::List`]; everything else binds a
/// scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a float. Integers widen losslessly enough for
    /// argument values.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
            Value::List(items) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", rendered.join(", "))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

/// Parses the boolean spellings accepted on the command line.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "t" | "1" | "on" => Some(true),
        "no" | "n" | "false" | "f" | "0" | "off" => Some(false),
        _ => None,
    }
}
