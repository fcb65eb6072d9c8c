use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Dictionary;

/// A single configuration entry.
///
/// Values deserialize untagged, so a JSON document maps onto them directly: `true` becomes
/// [`Value::Bool`], `3` an [`Value::Integer`], `0.5` a [`Value::Double`] and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    List(Vec<Value>),
    Dictionary(Dictionary),
}

impl Value {
    /// A short name for the kind of value, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Dictionary(_) => "dictionary",
        }
    }

    /// Borrow the value as a string, if it is one.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the value as a list, if it is one.
    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Borrow the value as a dictionary, if it is one.
    #[inline]
    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Coerce to a double. Numeric strings are parsed, booleans map to `0.0` / `1.0`.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Integer(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            Value::String(s) => s.trim().parse().ok(),
            Value::List(_) | Value::Dictionary(_) => None,
        }
    }

    /// Coerce to a signed integer. Doubles are truncated.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Integer(i) => Some(*i),
            Value::Double(d) => Some(*d as i64),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|d| d as i64))
            }
            Value::List(_) | Value::Dictionary(_) => None,
        }
    }

    /// Coerce to an unsigned integer. Negative values do not coerce.
    pub fn as_unsigned(&self) -> Option<u64> {
        self.as_int().and_then(|i| u64::try_from(i).ok())
    }

    /// Coerce to a boolean. Strings accept `true/false`, `yes/no`, `on/off` and `1/0`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Integer(i) => Some(*i != 0),
            Value::Double(d) => Some(*d != 0.0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            },
            Value::List(_) | Value::Dictionary(_) => None,
        }
    }

    /// Determine if the value is a string that does not read as a number.
    ///
    /// Numeric parameters given this way name an entry of the root dictionary instead.
    pub fn is_reference(&self) -> bool {
        matches!(self, Value::String(s) if s.trim().parse::<f64>().is_err())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::String(s) => write!(f, "{s}"),
            Value::List(list) => {
                write!(f, "[")?;
                for (index, value) in list.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            Value::Dictionary(dict) => write!(f, "{{{} entries}}", dict.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
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

impl From<Dictionary> for Value {
    fn from(value: Dictionary) -> Self {
        Value::Dictionary(value)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(value: Vec<V>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coercions() {
        assert_eq!(Value::from("2.5").as_double(), Some(2.5));
        assert_eq!(Value::from(3i64).as_double(), Some(3.0));
        assert_eq!(Value::from(3.9).as_int(), Some(3));
        assert_eq!(Value::from(-1i64).as_unsigned(), None);
        assert_eq!(Value::from("mesh").as_double(), None);
    }

    #[test]
    fn boolean_coercions() {
        assert_eq!(Value::from("Yes").as_bool(), Some(true));
        assert_eq!(Value::from("off").as_bool(), Some(false));
        assert_eq!(Value::from(0i64).as_bool(), Some(false));
        assert_eq!(Value::from("maybe").as_bool(), None);
    }

    #[test]
    fn non_numeric_strings_are_references() {
        assert!(Value::from("gravity").is_reference());
        assert!(!Value::from(" 9.81 ").is_reference());
        assert!(!Value::from(9.81).is_reference());
    }

    #[test]
    fn untagged_deserialization() {
        // Given
        let json = r#"[true, 3, 0.5, "x", [1], {"a": 1}]"#;

        // When
        let value: Value = serde_json::from_str(json).unwrap();

        // Then
        let list = value.as_list().unwrap();
        assert_eq!(list[0], Value::Bool(true));
        assert_eq!(list[1], Value::Integer(3));
        assert_eq!(list[2], Value::Double(0.5));
        assert_eq!(list[3], Value::from("x"));
        assert_eq!(list[4], Value::from(vec![1i64]));
        assert_eq!(list[5].as_dictionary().unwrap().len(), 1);
    }
}
