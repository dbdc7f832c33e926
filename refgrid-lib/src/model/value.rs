//! Value enum for dynamic cell values

use std::cmp::Ordering;
use std::fmt;

/// Placeholder shown for cells with no data.
pub const NULL_SENTINEL: &str = "N/A";

/// A scalar cell value.
///
/// Backends disagree on field types, so rows hold values dynamically. Nested
/// JSON (objects, arrays) is flattened to its JSON text when a row is built.
///
/// # Example
///
/// ```
/// use refgrid_lib::model::Value;
///
/// let name = Value::from("Clemenceau Medical Center");
/// let capacity = Value::from(200);
/// let missing = Value::na();
///
/// assert!(missing.is_null_sentinel());
/// assert_eq!(capacity.as_display(), "200");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Null/empty value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
}

impl Value {
    /// Returns the `"N/A"` placeholder value.
    pub fn na() -> Self {
        Value::String(NULL_SENTINEL.to_string())
    }

    /// Returns `true` if this is a real null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for null and for the `"N/A"` placeholder.
    pub fn is_null_sentinel(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s == NULL_SENTINEL,
            _ => false,
        }
    }

    /// Returns `true` for null, the empty string and the placeholder.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty() || s == NULL_SENTINEL,
            _ => false,
        }
    }

    /// Returns `false` for null, `false`, zero, NaN and the empty string.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
        }
    }

    /// Returns `true` for values a drag can start from: truthy and not the placeholder.
    pub fn is_fillable(&self) -> bool {
        self.is_truthy() && !self.is_null_sentinel()
    }

    /// String form shown in a cell. Null renders as the placeholder.
    pub fn as_display(&self) -> String {
        match self {
            Value::Null => NULL_SENTINEL.to_string(),
            other => other.to_string(),
        }
    }

    /// String form used by column filters. Null maps to the empty string.
    pub fn as_filter_key(&self) -> String {
        match self {
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Parses the value as a number, if it has a numeric form. NaN has none.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n).filter(|n| !n.is_nan()),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
                }
            }
            _ => None,
        }
    }

    /// Converts to JSON for transmission, turning the placeholder into `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            v if v.is_null_sentinel() => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Float(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Null => serde_json::Value::Null,
        }
    }

    /// Converts a JSON value received from a backend.
    ///
    /// Integers that fit `i64` stay integers; nested objects and arrays are
    /// kept as their JSON text.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::String(n.to_string())
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            other => Value::String(other.to_string()),
        }
    }

    /// Compares two values for sorting, ignoring null placeholders.
    ///
    /// Values with a numeric form compare numerically and sort before all
    /// other values, which compare case-insensitively by string form.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self
                .to_string()
                .to_lowercase()
                .cmp(&other.to_string().to_lowercase()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
        }
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        Value::from_json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sentinel() {
        assert!(Value::Null.is_null_sentinel());
        assert!(Value::na().is_null_sentinel());
        assert!(!Value::from("NA").is_null_sentinel());
        assert!(!Value::from(0).is_null_sentinel());
    }

    #[test]
    fn test_fillable() {
        assert!(Value::from("Beirut").is_fillable());
        assert!(Value::from(true).is_fillable());
        assert!(Value::from(12).is_fillable());
        assert!(!Value::from(false).is_fillable());
        assert!(!Value::from(0).is_fillable());
        assert!(!Value::from(0.0).is_fillable());
        assert!(!Value::from("").is_fillable());
        assert!(!Value::na().is_fillable());
        assert!(!Value::Null.is_fillable());
    }

    #[test]
    fn test_blank() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("").is_blank());
        assert!(Value::na().is_blank());
        assert!(!Value::from(0).is_blank());
        assert!(!Value::from(false).is_blank());
        assert!(Value::na().is_truthy());
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(Value::Null.as_display(), "N/A");
        assert_eq!(Value::Null.as_filter_key(), "");
        assert_eq!(Value::from(1.5).as_display(), "1.5");
        assert_eq!(Value::from(true).as_filter_key(), "true");
    }

    #[test]
    fn test_to_json_translates_sentinel() {
        assert_eq!(Value::na().to_json(), serde_json::Value::Null);
        assert_eq!(Value::from("x").to_json(), serde_json::json!("x"));
        assert_eq!(Value::from(3).to_json(), serde_json::json!(3));
    }

    #[test]
    fn test_from_json_flattens_nested() {
        let json = serde_json::json!({"a": [1, 2]});
        assert_eq!(Value::from_json(&json), Value::from(r#"{"a":[1,2]}"#));
        assert_eq!(Value::from_json(&serde_json::json!(420)), Value::Int(420));
        assert_eq!(Value::from_json(&serde_json::json!(2.5)), Value::Float(2.5));
    }

    #[test]
    fn test_compare_numeric_and_text() {
        assert_eq!(Value::from("10").compare(&Value::from(9)), Ordering::Greater);
        assert_eq!(Value::from("apple").compare(&Value::from("Banana")), Ordering::Less);
        assert_eq!(Value::from("ABC").compare(&Value::from("abc")), Ordering::Equal);
    }

    #[test]
    fn test_compare_number_ties_with_its_text() {
        assert_eq!(Value::Int(10).compare(&Value::from("10")), Ordering::Equal);
        assert_eq!(Value::from(" 10 ").compare(&Value::Float(10.0)), Ordering::Equal);
    }

    #[test]
    fn test_compare_numbers_before_text() {
        let two = Value::from("2");
        let ten = Value::from("10");
        let mixed = Value::from("1a");

        assert_eq!(two.compare(&ten), Ordering::Less);
        assert_eq!(ten.compare(&mixed), Ordering::Less);
        assert_eq!(two.compare(&mixed), Ordering::Less);
        assert_eq!(mixed.compare(&two), Ordering::Greater);
        assert_eq!(Value::Float(f64::NAN).compare(&Value::from(1)), Ordering::Greater);
    }
}
